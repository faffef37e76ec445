//! # Status Module
//!
//! Filesystem bookkeeping for processed files. Each run sorts matched
//! files into status folders next to the source images:
//! - `Done` - metadata written successfully
//! - `Failed` - matched, but the write collaborator reported failure
//! - `NoMatch` / `Ambiguous` - reserved for manual triage
//!
//! Moves fall back to copy+verify+delete when a rename crosses
//! filesystems; an incomplete copy never deletes the source.

use crate::error::WriteError;
use std::fs;
use std::path::{Path, PathBuf};

/// The status folders of one working directory.
#[derive(Debug, Clone)]
pub struct StatusDirs {
    pub done: PathBuf,
    pub failed: PathBuf,
    pub no_match: PathBuf,
    pub ambiguous: PathBuf,
}

impl StatusDirs {
    /// The conventional folder names; the scanner's exclusion filter
    /// derives its defaults from this list.
    pub const NAMES: [&'static str; 4] = ["Done", "Failed", "NoMatch", "Ambiguous"];

    pub fn new(root: &Path) -> Self {
        Self {
            done: root.join("Done"),
            failed: root.join("Failed"),
            no_match: root.join("NoMatch"),
            ambiguous: root.join("Ambiguous"),
        }
    }

    /// Create all status folders if they don't exist
    pub fn ensure(&self) -> std::io::Result<()> {
        for dir in [&self.done, &self.failed, &self.no_match, &self.ambiguous] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Destination inside `Done` for a source file
    pub fn done_path(&self, source: &Path) -> PathBuf {
        self.done.join(file_name(source))
    }

    /// Destination inside `Failed` for a source file
    pub fn failed_path(&self, source: &Path) -> PathBuf {
        self.failed.join(file_name(source))
    }
}

fn file_name(path: &Path) -> std::ffi::OsString {
    path.file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default()
}

/// Move a file into a status folder.
///
/// Rename first; on failure (typically a cross-filesystem move), copy,
/// verify the destination size, then delete the source.
pub fn move_file(source: &Path, destination: &Path) -> Result<(), WriteError> {
    if !source.exists() {
        return Err(WriteError::FileNotFound {
            path: source.to_path_buf(),
        });
    }

    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }

    let fallback = || -> std::io::Result<()> {
        let source_size = fs::metadata(source)?.len();
        fs::copy(source, destination)?;

        let dest_size = fs::metadata(destination)?.len();
        if dest_size != source_size {
            // Copy was incomplete, don't delete source
            let _ = fs::remove_file(destination);
            return Err(std::io::Error::other(format!(
                "copy verification failed: source {} bytes, dest {} bytes",
                source_size, dest_size
            )));
        }

        fs::remove_file(source)
    };

    fallback().map_err(|e| WriteError::MoveFailed {
        path: source.to_path_buf(),
        destination: destination.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn ensure_creates_all_folders() {
        let temp = TempDir::new().unwrap();
        let dirs = StatusDirs::new(temp.path());

        dirs.ensure().unwrap();

        assert!(dirs.done.is_dir());
        assert!(dirs.failed.is_dir());
        assert!(dirs.no_match.is_dir());
        assert!(dirs.ambiguous.is_dir());
    }

    #[test]
    fn ensure_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dirs = StatusDirs::new(temp.path());

        dirs.ensure().unwrap();
        dirs.ensure().unwrap();
    }

    #[test]
    fn done_path_keeps_file_name() {
        let dirs = StatusDirs::new(Path::new("/photos"));
        assert_eq!(
            dirs.done_path(Path::new("/photos/IMG_001.jpg")),
            PathBuf::from("/photos/Done/IMG_001.jpg")
        );
    }

    #[test]
    fn move_file_relocates_content() {
        let temp = TempDir::new().unwrap();
        let dirs = StatusDirs::new(temp.path());
        dirs.ensure().unwrap();

        let source = temp.path().join("photo.jpg");
        let mut f = fs::File::create(&source).unwrap();
        f.write_all(b"image bytes").unwrap();
        drop(f);

        let destination = dirs.done_path(&source);
        move_file(&source, &destination).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&destination).unwrap(), b"image bytes");
    }

    #[test]
    fn move_missing_source_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = move_file(
            &temp.path().join("gone.jpg"),
            &temp.path().join("Done/gone.jpg"),
        )
        .unwrap_err();

        assert!(matches!(err, WriteError::FileNotFound { .. }));
    }
}
