//! # Scanner Module
//!
//! Enumerates image files eligible for matching.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//!
//! The export workflow drops everything into one flat folder, so the
//! scanner stays at the top level and skips the status subdirectories
//! (`Done`, `Failed`, `NoMatch`, `Ambiguous`) that hold files from
//! earlier runs.
//!
//! ## Example
//! ```rust,ignore
//! use photo_reconcile::core::scanner::{FileEnumerator, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let files = scanner.scan(&"/Users/photos/export".into())?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// Represents a discovered image file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path to the image file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified time
    pub modified: SystemTime,
    /// Detected image format
    pub format: ImageFormat,
}

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            _ => ImageFormat::Unknown,
        }
    }

    /// Check if this format is supported
    pub fn is_supported(&self) -> bool {
        !matches!(self, ImageFormat::Unknown)
    }
}

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Successfully discovered files
    pub files: Vec<SourceFile>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<IndexError>,
}

/// Trait for file enumerators
///
/// Implement this trait to create custom enumerators (e.g., for testing).
pub trait FileEnumerator: Send + Sync {
    /// Scan the working directory and return discovered image files
    fn scan(&self, root: &PathBuf) -> Result<ScanResult, IndexError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_format_from_extension_lowercase() {
        assert_eq!(ImageFormat::from_extension("jpg"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("jpeg"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("png"), ImageFormat::Png);
    }

    #[test]
    fn image_format_from_extension_uppercase() {
        assert_eq!(ImageFormat::from_extension("JPG"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("PNG"), ImageFormat::Png);
    }

    #[test]
    fn unknown_extension_returns_unknown() {
        assert_eq!(ImageFormat::from_extension("txt"), ImageFormat::Unknown);
        assert_eq!(ImageFormat::from_extension("heic"), ImageFormat::Unknown);
    }

    #[test]
    fn unknown_format_is_not_supported() {
        assert!(!ImageFormat::Unknown.is_supported());
        assert!(ImageFormat::Jpeg.is_supported());
    }
}
