//! # Rows Module
//!
//! Reads the tabular metadata export: a semicolon-delimited CSV with
//! one row per published photo.
//!
//! ## Expected Columns
//! `Filename` is required; everything else is optional and reads as
//! empty when absent. `File Size` and `Published Date` feed the
//! matcher; the remaining columns (`Title`, `Description`, `Tags`,
//! `Kreditering`, `Personer i bildet`) are opaque descriptive text
//! passed straight through to the metadata writer.

use crate::error::RowError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One entry from the tabular export describing a published asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataRow {
    /// File name of the published asset (primary matching key)
    pub filename: String,
    /// Declared file size in bytes, zero if unknown
    pub declared_size_bytes: u64,
    /// Publish timestamp as exported, possibly unparsable
    pub published_at: String,
    /// Headline / title text
    pub title: String,
    /// Caption / description text
    pub description: String,
    /// Keyword list
    pub tags: String,
    /// Credit line
    pub credit: String,
    /// Names of people in the picture
    pub people: String,
}

impl MetadataRow {
    /// Parse the publish timestamp ("YYYY-MM-DD HH:MM:SS").
    ///
    /// Malformed values read as `None` and never fail a comparison.
    pub fn published_at_parsed(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(self.published_at.trim(), "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    }
}

/// Reads rows from a semicolon-delimited CSV file.
pub struct CsvRowSource {
    delimiter: char,
}

impl CsvRowSource {
    pub fn new() -> Self {
        Self { delimiter: ';' }
    }

    /// Override the field delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read all rows from the export, in file order.
    ///
    /// Rows with an empty `Filename` are skipped; a malformed
    /// `File Size` reads as zero (unknown).
    pub fn read(&self, path: &Path) -> Result<Vec<MetadataRow>, RowError> {
        if !path.exists() {
            return Err(RowError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| RowError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut records = parse_delimited(&content, self.delimiter);
        if records.is_empty() {
            return Err(RowError::MissingHeader {
                path: path.to_path_buf(),
            });
        }

        let header = records.remove(0);
        let columns: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim(), i))
            .collect();

        if !columns.contains_key("Filename") {
            return Err(RowError::MissingColumn {
                path: path.to_path_buf(),
                column: "Filename".to_string(),
            });
        }

        let field = |record: &[String], name: &str| -> String {
            columns
                .get(name)
                .and_then(|&i| record.get(i))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let mut rows = Vec::new();
        for record in &records {
            let filename = field(record, "Filename");
            if filename.is_empty() {
                continue;
            }

            rows.push(MetadataRow {
                filename,
                declared_size_bytes: field(record, "File Size").parse().unwrap_or(0),
                published_at: field(record, "Published Date"),
                title: field(record, "Title"),
                description: field(record, "Description"),
                tags: field(record, "Tags"),
                credit: field(record, "Kreditering"),
                people: field(record, "Personer i bildet"),
            });
        }

        Ok(rows)
    }
}

impl Default for CsvRowSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse delimiter-separated records with double-quote escaping.
///
/// Quoted fields may contain the delimiter, doubled quotes and
/// embedded newlines. Blank lines are dropped.
fn parse_delimited(content: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut value = String::new();
    let mut in_quotes = false;

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    value.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                value.push(c);
            }
        } else if c == '"' && value.is_empty() {
            in_quotes = true;
        } else if c == delimiter {
            record.push(std::mem::take(&mut value));
        } else if c == '\n' {
            record.push(std::mem::take(&mut value));
            records.push(std::mem::take(&mut record));
        } else if c != '\r' {
            value.push(c);
        }
    }

    if !value.is_empty() || !record.is_empty() {
        record.push(value);
        records.push(record);
    }

    records.retain(|r| !(r.len() == 1 && r[0].is_empty()));
    records
}
