//! Directory walking implementation using walkdir.

use super::{filter::ImageFilter, FileEnumerator, ScanResult, SourceFile};
use crate::error::IndexError;
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum directory depth (the export layout is flat)
    pub max_depth: usize,
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
    /// Custom status folder names to exclude (None = use defaults)
    pub status_dirs: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            follow_symlinks: false,
            extensions: None,
            status_dirs: None,
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ImageFilter::new();

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        if let Some(ref dirs) = config.status_dirs {
            filter = filter.with_status_dirs(dirs.clone());
        }

        Self { config, filter }
    }
}

impl FileEnumerator for WalkDirScanner {
    fn scan(&self, root: &PathBuf) -> Result<ScanResult, IndexError> {
        if !root.exists() || !root.is_dir() {
            return Err(IndexError::DirectoryNotFound { path: root.clone() });
        }

        let mut files = Vec::new();
        let mut errors = Vec::new();

        let walker = WalkDir::new(root)
            .max_depth(self.config.max_depth)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if path.is_dir() {
                        continue;
                    }

                    if !self.filter.should_include(path) {
                        continue;
                    }

                    match fs::metadata(path) {
                        Ok(metadata) => {
                            files.push(SourceFile {
                                path: path.to_path_buf(),
                                size: metadata.len(),
                                modified: metadata
                                    .modified()
                                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
                                format: self.filter.get_format(path),
                            });
                        }
                        Err(e) => {
                            errors.push(IndexError::ReadDirectory {
                                path: path.to_path_buf(),
                                source: e,
                            });
                        }
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        IndexError::PermissionDenied { path }
                    } else {
                        IndexError::ReadDirectory {
                            path,
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    errors.push(error);
                }
            }
        }

        Ok(ScanResult { files, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::super::ImageFormat;
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_photo(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        // Write minimal JPEG header
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        path
    }

    #[test]
    fn scan_empty_directory_returns_empty_vec() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = WalkDirScanner::new(ScanConfig::default());

        let result = scanner.scan(&temp_dir.path().to_path_buf()).unwrap();

        assert!(result.files.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn scan_finds_single_photo() {
        let temp_dir = TempDir::new().unwrap();
        create_test_photo(&temp_dir, "photo.jpg");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&temp_dir.path().to_path_buf()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path.ends_with("photo.jpg"));
        assert_eq!(result.files[0].format, ImageFormat::Jpeg);
    }

    #[test]
    fn scan_excludes_non_image_files() {
        let temp_dir = TempDir::new().unwrap();
        create_test_photo(&temp_dir, "photo.jpg");

        File::create(temp_dir.path().join("metadata.csv")).unwrap();
        File::create(temp_dir.path().join("notes.txt")).unwrap();

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&temp_dir.path().to_path_buf()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path.ends_with("photo.jpg"));
    }

    #[test]
    fn scan_skips_status_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        create_test_photo(&temp_dir, "fresh.jpg");

        let done = temp_dir.path().join("Done");
        fs::create_dir(&done).unwrap();
        let mut file = File::create(done.join("processed.jpg")).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&temp_dir.path().to_path_buf()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path.ends_with("fresh.jpg"));
    }

    #[test]
    fn scan_is_ordered_by_file_name() {
        let temp_dir = TempDir::new().unwrap();
        create_test_photo(&temp_dir, "b.jpg");
        create_test_photo(&temp_dir, "a.jpg");
        create_test_photo(&temp_dir, "c.jpg");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&temp_dir.path().to_path_buf()).unwrap();

        let names: Vec<_> = result
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn scan_nonexistent_directory_returns_error() {
        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&PathBuf::from("/nonexistent/path/12345"));

        assert!(result.is_err());
    }
}
