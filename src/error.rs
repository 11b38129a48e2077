use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset root is not a directory: {0}")]
    InvalidRoot(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported asset format: {0}")]
    UnsupportedFormat(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Replacement for {path} could not be verified: {reason}")]
    UnverifiedWrite { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Glob error: {0}")]
    Glob(#[from] globset::Error),

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl AssetError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert!(AssetError::config("x")
            .to_string()
            .starts_with("Invalid configuration:"));
        assert!(AssetError::translation("timeout")
            .to_string()
            .contains("timeout"));
        assert!(AssetError::InvalidRoot(PathBuf::from("/nope"))
            .to_string()
            .contains("/nope"));
    }

    #[test]
    fn test_io_error_conversion() {
        let err: AssetError = std::io::Error::other("boom").into();
        assert!(matches!(err, AssetError::IoError(_)));
        assert!(err.to_string().contains("boom"));
    }
}
