//! EXIF extraction for candidate records.
//!
//! Wraps kamadak-exif behind a trait so tests can substitute a fixed
//! extractor. Extraction is strictly best-effort: any failure falls
//! back to the degraded record shape.

use super::ImageRecord;
use crate::core::scanner::SourceFile;
use chrono::{DateTime, NaiveDateTime, Utc};
use exif::{Context, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;

/// TIFF DocumentName (0x010D), where capture and ingest software record
/// the file's original name. Not in the Exif tag tables, so addressed
/// by number.
const TAG_DOCUMENT_NAME: Tag = Tag(Context::Tiff, 0x010d);

/// Extracts embedded metadata from an image file.
///
/// `extract` never fails - a file without readable metadata yields a
/// degraded record.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, file: &SourceFile) -> ImageRecord;
}

/// Extractor backed by kamadak-exif
pub struct ExifExtractor;

impl MetadataExtractor for ExifExtractor {
    fn extract(&self, file: &SourceFile) -> ImageRecord {
        let mut record = ImageRecord::degraded(file);

        let opened = match File::open(&file.path) {
            Ok(f) => f,
            Err(_) => return record,
        };

        let mut bufreader = BufReader::new(&opened);
        let exif_reader = match Reader::new().read_from_container(&mut bufreader) {
            Ok(r) => r,
            Err(_) => return record,
        };

        if let Some(field) = exif_reader.get_field(TAG_DOCUMENT_NAME, In::PRIMARY) {
            if let Some(name) = get_string_value(&field.value) {
                record.embedded_original_name = name;
            }
        }

        // Prefer actual pixel dimensions, fall back to image width/height
        if let Some(field) = exif_reader.get_field(Tag::PixelXDimension, In::PRIMARY) {
            record.width = get_u32_value(&field.value).unwrap_or(0);
        }
        if let Some(field) = exif_reader.get_field(Tag::PixelYDimension, In::PRIMARY) {
            record.height = get_u32_value(&field.value).unwrap_or(0);
        }
        if record.width == 0 {
            if let Some(field) = exif_reader.get_field(Tag::ImageWidth, In::PRIMARY) {
                record.width = get_u32_value(&field.value).unwrap_or(0);
            }
        }
        if record.height == 0 {
            if let Some(field) = exif_reader.get_field(Tag::ImageLength, In::PRIMARY) {
                record.height = get_u32_value(&field.value).unwrap_or(0);
            }
        }

        // Capture timestamp: DateTimeOriginal, falling back to DateTime
        record.created_at = get_datetime_value(&exif_reader, Tag::DateTimeOriginal)
            .or_else(|| get_datetime_value(&exif_reader, Tag::DateTime));

        if let Some(field) = exif_reader.get_field(Tag::Model, In::PRIMARY) {
            if let Some(model) = get_string_value(&field.value) {
                record.camera_model = model;
            }
        }

        if let Some(field) = exif_reader.get_field(Tag::LensModel, In::PRIMARY) {
            if let Some(lens) = get_string_value(&field.value) {
                record.lens = lens;
            }
        }

        record
    }
}

/// Helper to extract u32 from various EXIF value types
fn get_u32_value(value: &Value) -> Option<u32> {
    match value {
        Value::Long(vec) => vec.first().copied(),
        Value::Short(vec) => vec.first().map(|v| *v as u32),
        _ => None,
    }
}

/// Helper to extract string from EXIF ASCII value
fn get_string_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

/// Helper to parse an EXIF "YYYY:MM:DD HH:MM:SS" timestamp field
fn get_datetime_value(reader: &exif::Exif, tag: Tag) -> Option<DateTime<Utc>> {
    let field = reader.get_field(tag, In::PRIMARY)?;
    let raw = get_string_value(&field.value)?;
    parse_exif_datetime(&raw)
}

/// Parse an EXIF timestamp, tolerating subseconds and timezone suffixes
pub(crate) fn parse_exif_datetime(raw: &str) -> Option<DateTime<Utc>> {
    // "2023:06:01 12:30:45.123+02:00" -> "2023:06:01 12:30:45"
    // A 19-byte prefix that cuts a multi-byte character reads as None
    let head = raw.trim().get(..19)?;
    NaiveDateTime::parse_from_str(head, "%Y:%m:%d %H:%M:%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::ImageFormat;
    use std::path::PathBuf;
    use std::time::SystemTime;

    #[test]
    fn extract_from_nonexistent_returns_degraded() {
        let file = SourceFile {
            path: PathBuf::from("/nonexistent/file.jpg"),
            size: 42,
            modified: SystemTime::UNIX_EPOCH,
            format: ImageFormat::Jpeg,
        };

        let record = ExifExtractor.extract(&file);

        assert_eq!(record.filename, "file.jpg");
        assert_eq!(record.size_bytes, 42);
        assert!(!record.has_embedded_data());
    }

    #[test]
    fn extract_from_non_exif_file_returns_degraded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plain.jpg");
        std::fs::write(&path, b"not an image at all").unwrap();

        let file = SourceFile {
            path,
            size: 19,
            modified: SystemTime::now(),
            format: ImageFormat::Jpeg,
        };

        let record = ExifExtractor.extract(&file);

        assert_eq!(record.filename, "plain.jpg");
        assert!(record.embedded_original_name.is_empty());
        assert_eq!(record.width, 0);
    }

    #[test]
    fn exif_datetime_parses_standard_format() {
        let parsed = parse_exif_datetime("2023:06:01 12:30:45").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-06-01T12:30:45+00:00");
    }

    #[test]
    fn exif_datetime_tolerates_subseconds() {
        let parsed = parse_exif_datetime("2023:06:01 12:30:45.250").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-06-01T12:30:45+00:00");
    }

    #[test]
    fn exif_datetime_tolerates_timezone_suffix() {
        let parsed = parse_exif_datetime("2023:06:01 12:30:45+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-06-01T12:30:45+00:00");
    }

    #[test]
    fn exif_datetime_rejects_garbage() {
        assert!(parse_exif_datetime("").is_none());
        assert!(parse_exif_datetime("not a date").is_none());
        assert!(parse_exif_datetime("2023-06-01 12:30:45").is_none());
    }

    #[test]
    fn exif_datetime_degrades_on_multibyte_boundary() {
        // 20 bytes with the 19-byte cut landing inside the two-byte 'é'
        assert!(parse_exif_datetime("2023:06:01 12:30:4é").is_none());
        assert!(parse_exif_datetime("2023:06:01 12:30").is_none());
    }
}
