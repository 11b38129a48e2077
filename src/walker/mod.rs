//! Recursive file enumeration
//!
//! The walker is the first stage of every asset job: it yields the files under
//! a root that pass a [`FileFilter`], in filesystem traversal order.

pub mod filter;

pub use filter::FileFilter;

use crate::types::AssetRecord;
use std::fs;
use std::path::{Path, PathBuf};

/// Lazy depth-first iterator over matching files
///
/// Directories are read one at a time as the iterator advances. Entries that
/// cannot be read are logged and skipped. Symlinked directories are not
/// descended into; symlinked files are yielded when their target exists.
pub struct WalkFiles {
    filter: FileFilter,
    pending_dirs: Vec<PathBuf>,
    current: Option<fs::ReadDir>,
}

/// Recursively walk `root`, yielding every file accepted by `filter`
///
/// # Arguments
/// * `root` - Directory to walk
/// * `filter` - Extension or filename predicate
///
/// # Examples
/// ```no_run
/// use assetprep::walker::{walk_files, FileFilter};
///
/// let filter = FileFilter::extensions(&["webp"]);
/// for record in walk_files("assets/images", filter) {
///     println!("{}", record.path.display());
/// }
/// ```
pub fn walk_files(root: impl AsRef<Path>, filter: FileFilter) -> WalkFiles {
    WalkFiles {
        filter,
        pending_dirs: vec![root.as_ref().to_path_buf()],
        current: None,
    }
}

impl Iterator for WalkFiles {
    type Item = AssetRecord;

    fn next(&mut self) -> Option<AssetRecord> {
        loop {
            if let Some(entries) = self.current.as_mut() {
                match entries.next() {
                    Some(Ok(entry)) => {
                        let path = entry.path();
                        // DirEntry::file_type does not follow symlinks
                        let file_type = match entry.file_type() {
                            Ok(file_type) => file_type,
                            Err(e) => {
                                tracing::warn!("skipping {}: {e}", path.display());
                                continue;
                            }
                        };
                        if file_type.is_dir() {
                            self.pending_dirs.push(path);
                        } else if (file_type.is_file() || path.is_file())
                            && self.filter.accepts(&path)
                        {
                            return Some(AssetRecord::new(path));
                        }
                        continue;
                    }
                    Some(Err(e)) => {
                        tracing::warn!("skipping unreadable directory entry: {e}");
                        continue;
                    }
                    None => self.current = None,
                }
            }

            let dir = self.pending_dirs.pop()?;
            match fs::read_dir(&dir) {
                Ok(entries) => self.current = Some(entries),
                Err(e) => tracing::warn!("skipping unreadable directory {}: {e}", dir.display()),
            }
        }
    }
}

/// Collect and sort records by path for callers that need deterministic order
pub fn sorted(records: impl IntoIterator<Item = AssetRecord>) -> Vec<AssetRecord> {
    let mut records: Vec<AssetRecord> = records.into_iter().collect();
    records.sort_by(|a, b| a.path.cmp(&b.path));
    records
}
