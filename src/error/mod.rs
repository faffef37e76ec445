//! # Error Module
//!
//! User-friendly error types for the photo reconciler.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-row outcomes are values, not errors** - a row that finds no
//!   match is a result the caller routes, never a fault that propagates

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Indexing error: {0}")]
    Index(#[from] IndexError),

    #[error("Row source error: {0}")]
    Row(#[from] RowError),

    #[error("Metadata write error: {0}")]
    Write(#[from] WriteError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while building the candidate index
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur reading the tabular export
#[derive(Error, Debug)]
pub enum RowError {
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read CSV {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV {path} has no header row")]
    MissingHeader { path: PathBuf },

    #[error("CSV {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },
}

/// Errors that occur writing metadata back into a file
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("exiftool not found at {path}. Install exiftool or pass --exiftool.")]
    ToolNotFound { path: PathBuf },

    #[error("Failed to launch exiftool for {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("exiftool reported failure for {path}: {stderr}")]
    ToolFailed { path: PathBuf, stderr: String },

    #[error("Failed to move {path} to {destination}: {reason}")]
    MoveFailed {
        path: PathBuf,
        destination: PathBuf,
        reason: String,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_error_includes_path() {
        let error = IndexError::DirectoryNotFound {
            path: PathBuf::from("/photos/export"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/export"));
    }

    #[test]
    fn row_error_names_missing_column() {
        let error = RowError::MissingColumn {
            path: PathBuf::from("/photos/metadata.csv"),
            column: "Filename".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("Filename"));
        assert!(message.contains("metadata.csv"));
    }

    #[test]
    fn write_error_suggests_recovery() {
        let error = WriteError::ToolNotFound {
            path: PathBuf::from("/usr/local/bin/exiftool"),
        };
        let message = error.to_string();
        assert!(message.contains("--exiftool"));
    }
}
