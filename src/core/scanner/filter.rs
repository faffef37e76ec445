//! File filtering logic for the scanner.

use super::ImageFormat;
use crate::core::status::StatusDirs;
use std::path::Path;

/// Filters files to determine if they are eligible candidates
pub struct ImageFilter {
    /// File extensions to include
    extensions: std::collections::HashSet<String>,
    /// Directory names excluded from scanning (processed-file folders)
    status_dirs: Vec<String>,
}

impl ImageFilter {
    /// Create a new filter with default extensions and status folders
    pub fn new() -> Self {
        Self {
            extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()]
                .into_iter()
                .collect(),
            status_dirs: StatusDirs::NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.into_iter().collect();
        self
    }

    /// Override the list of excluded status folders
    pub fn with_status_dirs(mut self, dirs: Vec<String>) -> Self {
        self.status_dirs = dirs;
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        // Hidden files never participate in matching
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                return false;
            }
        }

        // Files already sorted into a status folder are out
        if self.is_in_status_dir(path) {
            return false;
        }

        // Check extension
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            let ext_lower = ext.to_lowercase();
            self.extensions.contains(&ext_lower)
        } else {
            false
        }
    }

    /// Check if any path component is a known status folder
    pub fn is_in_status_dir(&self, path: &Path) -> bool {
        path.components().any(|c| {
            c.as_os_str()
                .to_str()
                .map(|name| self.status_dirs.iter().any(|d| d == name))
                .unwrap_or(false)
        })
    }

    /// Get the image format for a path
    pub fn get_format(&self, path: &Path) -> ImageFormat {
        path.extension()
            .and_then(|e| e.to_str())
            .map(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Unknown)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}
