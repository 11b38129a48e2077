use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of asset based on file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Raster sprite (`.png`, `.webp`)
    Image,
    /// Waveform (`.wav`)
    Audio,
    /// Vector markup (`.svg`)
    Vector,
    /// Question batches and other documents (`.json`)
    Json,
}

impl AssetKind {
    /// Classify a path by its extension (case-insensitive)
    ///
    /// # Examples
    /// ```
    /// use assetprep::types::AssetKind;
    /// use std::path::Path;
    ///
    /// assert_eq!(AssetKind::from_path(Path::new("a/bed.WEBP")), Some(AssetKind::Image));
    /// assert_eq!(AssetKind::from_path(Path::new("notes.txt")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" | "webp" => Some(Self::Image),
            "wav" => Some(Self::Audio),
            "svg" => Some(Self::Vector),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// A candidate file yielded by the directory walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub path: PathBuf,
    /// `None` for files whose extension is not one of the recognized kinds
    pub kind: Option<AssetKind>,
}

impl AssetRecord {
    pub fn new(path: PathBuf) -> Self {
        let kind = AssetKind::from_path(&path);
        Self { path, kind }
    }

    /// File name as UTF-8 (lossy), used as the key in generated tables
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Per-run counters reported at the end of every command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items that produced output
    pub processed: usize,
    /// Items decoded successfully that needed no change
    pub unchanged: usize,
    /// Items filtered out or intentionally skipped
    pub skipped: usize,
    /// Items that failed to decode, transform or write
    pub errored: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.processed + self.unchanged + self.skipped + self.errored
    }

    pub fn merge(&mut self, other: RunSummary) {
        self.processed += other.processed;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
        self.errored += other.errored;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} unchanged, {} skipped, {} errored",
            self.processed, self.unchanged, self.skipped, self.errored
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_kind_from_extension() {
        assert_eq!(AssetKind::from_path(Path::new("x.png")), Some(AssetKind::Image));
        assert_eq!(AssetKind::from_path(Path::new("x.Webp")), Some(AssetKind::Image));
        assert_eq!(AssetKind::from_path(Path::new("x.wav")), Some(AssetKind::Audio));
        assert_eq!(AssetKind::from_path(Path::new("x.svg")), Some(AssetKind::Vector));
        assert_eq!(AssetKind::from_path(Path::new("x.json")), Some(AssetKind::Json));
        assert_eq!(AssetKind::from_path(Path::new("x")), None);
        assert_eq!(AssetKind::from_path(Path::new("x.jpg")), None);
    }

    #[test]
    fn test_asset_record_file_name() {
        let record = AssetRecord::new(PathBuf::from("assets/furniture/bed.webp"));
        assert_eq!(record.file_name(), "bed.webp");
        assert_eq!(record.kind, Some(AssetKind::Image));
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10, 20, 5, 5);
        assert!(rect.contains(10, 20));
        assert!(rect.contains(14, 24));
        assert!(!rect.contains(15, 24));
        assert!(!rect.contains(9, 20));
        assert_eq!(rect.right(), 15);
        assert_eq!(rect.bottom(), 25);
    }

    #[test]
    fn test_summary_merge_and_display() {
        let mut summary = RunSummary {
            processed: 2,
            unchanged: 1,
            skipped: 0,
            errored: 1,
        };
        summary.merge(RunSummary {
            processed: 1,
            ..Default::default()
        });
        assert_eq!(summary.total(), 5);
        assert_eq!(
            summary.to_string(),
            "3 processed, 1 unchanged, 0 skipped, 1 errored"
        );
    }
}
