use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Write `bytes` to `path` so that readers see either the old or the new file
///
/// The data is written to a hidden sibling temp file first and then renamed
/// over the destination. Parent directories are created as needed. On failure
/// the temp file is removed and the destination is left untouched.
///
/// # Arguments
/// * `path` - Destination file
/// * `bytes` - Full file contents
///
/// # Examples
/// ```no_run
/// use assetprep::pipeline::write_atomic;
///
/// write_atomic("mobile/lib/voxel_data.dart".as_ref(), b"// generated\n").unwrap();
/// ```
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = temp_sibling(path);
    if let Err(e) = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out/nested/file.txt");

        write_atomic(&target, b"first").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"first");

        write_atomic(&target, b"second").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"second");

        // No temp file is left behind
        let leftovers: Vec<_> = fs::read_dir(target.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_temp_sibling_name() {
        assert_eq!(
            temp_sibling(Path::new("a/b/c.webp")),
            PathBuf::from("a/b/.c.webp.tmp")
        );
    }
}
