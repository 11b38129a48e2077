//! Run configuration
//!
//! All directories and thresholds live in one [`AssetConfig`] loaded from an
//! optional JSON file. Every field has a default matching the app's asset
//! layout, so a config file only needs the values that differ. Each command
//! validates its own section before touching any file; a validation error is
//! the only kind of failure that aborts a run.
//!
//! ```json
//! {
//!   "clip": { "root": "assets/images", "alpha_threshold": 64 },
//!   "translate": { "provider": "libre", "target_lang": "de" }
//! }
//! ```

use crate::audio::{default_bank, NamedTone};
use crate::codegen::TableFormat;
use crate::error::{AssetError, Result};
use crate::imaging::{CornerZone, DensityParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    pub clip: ClipConfig,
    pub scan: ScanConfig,
    pub tables: TablesConfig,
    pub tones: TonesConfig,
    pub svg: SvgConfig,
    pub translate: TranslateConfig,
    pub merge: MergeConfig,
}

impl AssetConfig {
    /// Load configuration from a JSON file, or defaults when `path` is `None`
    ///
    /// # Returns
    /// * `Ok(AssetConfig)` - Parsed configuration with defaults filled in
    /// * `Err(AssetError)` - If the file cannot be read or is not valid JSON
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)?;
                let config = serde_json::from_str(&text)?;
                tracing::debug!("loaded configuration from {}", path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Target encoding for the clip job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless WebP with alpha
    #[default]
    Webp,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Png => "png",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            OutputFormat::Webp => image::ImageFormat::WebP,
            OutputFormat::Png => image::ImageFormat::Png,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClipConfig {
    pub root: PathBuf,
    pub extensions: Vec<String>,
    /// Pixels with `0 < alpha < alpha_threshold` are cleared
    pub alpha_threshold: u8,
    /// Downscale images whose width or height exceeds this
    pub max_dimension: Option<u32>,
    pub erase_zones: Vec<CornerZone>,
    pub output_format: OutputFormat,
    /// Delete a source file after it was converted to `output_format`
    pub delete_converted_sources: bool,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("mobile/assets/images"),
            extensions: vec!["png".to_string(), "webp".to_string()],
            alpha_threshold: 50,
            max_dimension: Some(1000),
            erase_zones: Vec::new(),
            output_format: OutputFormat::Webp,
            delete_converted_sources: true,
        }
    }
}

impl ClipConfig {
    pub fn validate(&self) -> Result<()> {
        validate_root(&self.root)?;
        validate_extensions(&self.extensions)?;
        if self.max_dimension == Some(0) {
            return Err(AssetError::config("clip.max_dimension must be at least 1"));
        }
        if self
            .erase_zones
            .iter()
            .any(|zone| zone.width == 0 || zone.height == 0)
        {
            return Err(AssetError::config("clip.erase_zones entries must be non-empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub root: PathBuf,
    pub extensions: Vec<String>,
    pub density: DensityParams,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("mobile/assets/images/furniture"),
            extensions: vec!["webp".to_string()],
            density: DensityParams::default(),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        validate_root(&self.root)?;
        validate_extensions(&self.extensions)?;
        if self.density.cell_size == 0 || self.density.sample_stride == 0 {
            return Err(AssetError::config(
                "scan.density cell_size and sample_stride must be at least 1",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TablesConfig {
    pub format: TableFormat,
    pub sizes_output: PathBuf,
    pub hitboxes_output: PathBuf,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            format: TableFormat::Dart,
            sizes_output: PathBuf::from("mobile/lib/widgets/cozy/image_meta.dart"),
            hitboxes_output: PathBuf::from("mobile/lib/widgets/cozy/voxel_data.dart"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TonesConfig {
    pub output_dir: PathBuf,
    pub tones: Vec<NamedTone>,
}

impl Default for TonesConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("mobile/assets/audio"),
            tones: default_bank(),
        }
    }
}

impl TonesConfig {
    pub fn validate(&self) -> Result<()> {
        for tone in &self.tones {
            let spec = &tone.spec;
            if !(spec.duration_secs.is_finite() && spec.duration_secs >= 0.0) {
                return Err(AssetError::config(format!(
                    "tone {} has an invalid duration",
                    tone.file.display()
                )));
            }
            if !(spec.volume.is_finite() && (0.0..=1.0).contains(&spec.volume)) {
                return Err(AssetError::config(format!(
                    "tone {} volume must be within 0.0..=1.0",
                    tone.file.display()
                )));
            }
            if spec.frequencies.iter().any(|f| !f.is_finite() || *f < 0.0) {
                return Err(AssetError::config(format!(
                    "tone {} has an invalid frequency",
                    tone.file.display()
                )));
            }
            if tone.file.is_absolute() {
                return Err(AssetError::config(format!(
                    "tone file {} must be relative to tones.output_dir",
                    tone.file.display()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SvgConfig {
    pub root: PathBuf,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("mobile/assets"),
        }
    }
}

impl SvgConfig {
    pub fn validate(&self) -> Result<()> {
        validate_root(&self.root)
    }
}

/// Translation backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Public Google Translate web endpoint
    #[default]
    Google,
    /// Self-hosted LibreTranslate
    Libre,
    /// Offline: prefix text with the target language tag
    Tagging,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslateConfig {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    /// Filename glob selecting the batches to translate
    pub pattern: String,
    /// Prepended to each batch file name in `target_dir`
    pub output_prefix: String,
    pub merged_output: PathBuf,
    pub source_lang: String,
    pub target_lang: String,
    pub provider: Provider,
    pub libre_url: String,
    /// Size of the per-batch worker pool
    pub workers: usize,
    /// Pause between batch files, in milliseconds
    pub pause_ms: u64,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("backend/src/data/questions"),
            target_dir: PathBuf::from("backend/src/data/questions/hungarian"),
            pattern: "high_density_batch_*.json".to_string(),
            output_prefix: "hu_".to_string(),
            merged_output: PathBuf::from("backend/src/data/questions/all_questions_hungarian.json"),
            source_lang: "auto".to_string(),
            target_lang: "hu".to_string(),
            provider: Provider::Google,
            libre_url: "http://localhost:5000".to_string(),
            workers: 5,
            pause_ms: 1000,
        }
    }
}

impl TranslateConfig {
    pub fn validate(&self) -> Result<()> {
        validate_root(&self.source_dir)?;
        if self.workers == 0 {
            return Err(AssetError::config("translate.workers must be at least 1"));
        }
        if self.target_lang.trim().is_empty() {
            return Err(AssetError::config("translate.target_lang must not be empty"));
        }
        if self.pattern.trim().is_empty() {
            return Err(AssetError::config("translate.pattern must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MergeConfig {
    pub dir: PathBuf,
    /// Batch file name with `{n}` standing for the sequence number
    pub template: String,
    pub first: u32,
    pub last: u32,
    pub output: PathBuf,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            template: "tk10_batch_{n}_bilingual.json".to_string(),
            first: 1,
            last: 32,
            output: PathBuf::from("endocrinology_questions.json"),
        }
    }
}

impl MergeConfig {
    pub fn validate(&self) -> Result<()> {
        validate_root(&self.dir)?;
        if !self.template.contains("{n}") {
            return Err(AssetError::config("merge.template must contain {n}"));
        }
        if self.first > self.last {
            return Err(AssetError::config(format!(
                "merge range is empty: {}..={}",
                self.first, self.last
            )));
        }
        Ok(())
    }
}

/// Fail unless `root` is an existing directory
pub fn validate_root(root: &Path) -> Result<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(AssetError::InvalidRoot(root.to_path_buf()))
    }
}

fn validate_extensions(extensions: &[String]) -> Result<()> {
    if extensions.iter().all(|e| e.trim_start_matches('.').is_empty()) {
        return Err(AssetError::config("at least one file extension is required"));
    }
    Ok(())
}
