//! # Writer Module
//!
//! Writes a row's descriptive fields into the matched file's embedded
//! metadata.
//!
//! ## Field Mapping
//! JPEGs receive IPTC tags (plus `XMP:PersonInImage`, which has no IPTC
//! counterpart). PNGs have no IPTC support, so they receive the XMP
//! equivalents throughout. Empty values are omitted, never written as
//! blanks.
//!
//! The actual write goes through the [`MetadataWriter`] trait so tests
//! can substitute a recording writer; the production implementation
//! shells out to exiftool.

use crate::core::index::ImageRecord;
use crate::core::rows::MetadataRow;
use crate::core::scanner::ImageFormat;
use crate::error::WriteError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// An ordered mapping of metadata field names to non-empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    fields: Vec<(String, String)>,
}

impl FieldMapping {
    /// Build the tag mapping for one row/candidate pair.
    ///
    /// The target format decides the tag family; empty row fields are
    /// left out entirely.
    pub fn for_row(row: &MetadataRow, format: ImageFormat) -> Self {
        let mut mapping = Self::default();

        match format {
            ImageFormat::Png => {
                mapping.set("XMP:Title", &row.title);
                mapping.set("XMP:Description", &row.description);
                mapping.set("XMP:Subject", &row.tags);
                mapping.set("XMP:Rights", &row.credit);
                mapping.set("XMP:PersonInImage", &row.people);
            }
            _ => {
                mapping.set("IPTC:Headline", &row.title);
                mapping.set("IPTC:Caption-Abstract", &row.description);
                mapping.set("IPTC:Keywords", &row.tags);
                mapping.set("IPTC:CopyrightNotice", &row.credit);
                mapping.set("XMP:PersonInImage", &row.people);
            }
        }

        mapping
    }

    /// Add a field unless its value is empty
    pub fn set(&mut self, tag: &str, value: &str) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.fields.push((tag.to_string(), trimmed.to_string()));
        }
    }

    /// The fields, in insertion order
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Writes a field mapping into a file's embedded metadata.
///
/// Failure is a per-file signal; the caller decides how to route it.
pub trait MetadataWriter: Send + Sync {
    fn write(&self, path: &Path, mapping: &FieldMapping) -> Result<(), WriteError>;
}

/// Writer that shells out to exiftool.
pub struct ExiftoolWriter {
    exiftool: PathBuf,
}

impl ExiftoolWriter {
    /// Default exiftool location when none is configured
    pub const DEFAULT_PATH: &'static str = "exiftool";

    pub fn new(exiftool: PathBuf) -> Self {
        Self { exiftool }
    }
}

impl Default for ExiftoolWriter {
    fn default() -> Self {
        Self::new(PathBuf::from(Self::DEFAULT_PATH))
    }
}

impl MetadataWriter for ExiftoolWriter {
    fn write(&self, path: &Path, mapping: &FieldMapping) -> Result<(), WriteError> {
        if !path.exists() {
            return Err(WriteError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut command = Command::new(&self.exiftool);
        command
            .arg("-overwrite_original")
            .arg("-charset")
            .arg("IPTC=UTF8")
            .arg("-charset")
            .arg("XMP=UTF8");

        for (tag, value) in mapping.fields() {
            command.arg(format!("-{tag}={value}"));
        }

        command.arg(path);

        let output = command.output().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                WriteError::ToolNotFound {
                    path: self.exiftool.clone(),
                }
            } else {
                WriteError::Launch {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        if !output.status.success() {
            return Err(WriteError::ToolFailed {
                path: path.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::warn!(path = %path.display(), "exiftool stderr: {}", stderr.trim());
        }

        Ok(())
    }
}

/// Pick the field mapping for a matched candidate based on its filename
pub fn mapping_for(row: &MetadataRow, record: &ImageRecord) -> FieldMapping {
    let format = record
        .path
        .extension()
        .and_then(|e| e.to_str())
        .map(ImageFormat::from_extension)
        .unwrap_or(ImageFormat::Unknown);
    FieldMapping::for_row(row, format)
}
