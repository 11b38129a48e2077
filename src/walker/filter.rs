use crate::error::Result;
use globset::{Glob, GlobMatcher};
use std::collections::BTreeSet;
use std::path::Path;

/// Predicate deciding which files the walker yields
#[derive(Debug, Clone)]
pub enum FileFilter {
    /// Accept files whose extension (lowercase, no dot) is in the set
    Extensions(BTreeSet<String>),
    /// Accept files whose name matches the glob
    Pattern(GlobMatcher),
}

impl FileFilter {
    /// Build an extension filter; leading dots and case are normalized
    ///
    /// # Examples
    /// ```
    /// use assetprep::walker::FileFilter;
    /// use std::path::Path;
    ///
    /// let filter = FileFilter::extensions(&[".PNG", "webp"]);
    /// assert!(filter.accepts(Path::new("sprites/bed.png")));
    /// assert!(!filter.accepts(Path::new("sprites/bed.svg")));
    /// ```
    pub fn extensions<S: AsRef<str>>(exts: &[S]) -> Self {
        let set = exts
            .iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        FileFilter::Extensions(set)
    }

    /// Build a filename glob filter such as `high_density_batch_*.json`
    ///
    /// # Returns
    /// * `Ok(FileFilter)` - Compiled pattern
    /// * `Err(AssetError::Glob)` - If the pattern is malformed
    pub fn pattern(glob: &str) -> Result<Self> {
        Ok(FileFilter::Pattern(Glob::new(glob)?.compile_matcher()))
    }

    /// Check whether a file path is accepted
    pub fn accepts(&self, path: &Path) -> bool {
        match self {
            FileFilter::Extensions(set) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| set.contains(&e.to_ascii_lowercase()))
                .unwrap_or(false),
            FileFilter::Pattern(matcher) => path
                .file_name()
                .map(|name| matcher.is_match(Path::new(name)))
                .unwrap_or(false),
        }
    }
}
