//! # Index Module
//!
//! Builds the in-memory candidate index: one [`ImageRecord`] per image
//! file discovered in the working directory.
//!
//! ## Best-effort Contract
//! The build never fails because of a single file. When embedded
//! metadata cannot be extracted, a degraded record is kept (filename,
//! byte size and filesystem mtime are always available) so the matcher
//! can still use the size and filename heuristics.

mod extractor;

pub use extractor::{ExifExtractor, MetadataExtractor};

use crate::core::scanner::SourceFile;
use crate::events::{Event, EventSender, IndexEvent, IndexProgress};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// One indexed image file with its extracted attributes.
///
/// Created once per run when the index is built, immutable thereafter.
/// Empty strings and zero dimensions mean "unknown" - comparisons never
/// see a null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Path to the file on disk
    pub path: PathBuf,
    /// File name as stored on disk
    pub filename: String,
    /// Name the capture device originally assigned, empty if unknown
    pub embedded_original_name: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// Image width in pixels, zero if unknown
    pub width: u32,
    /// Image height in pixels, zero if unknown
    pub height: u32,
    /// Original capture timestamp
    pub created_at: Option<DateTime<Utc>>,
    /// Filesystem modification timestamp
    pub modified_at: Option<DateTime<Utc>>,
    /// Camera model, empty if unknown
    pub camera_model: String,
    /// Lens model, empty if unknown
    pub lens: String,
}

impl ImageRecord {
    /// A minimal record built from filesystem information alone.
    ///
    /// This is the degraded shape emitted when extraction fails.
    pub fn degraded(file: &SourceFile) -> Self {
        Self {
            path: file.path.clone(),
            filename: file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            embedded_original_name: String::new(),
            size_bytes: file.size,
            width: 0,
            height: 0,
            created_at: None,
            modified_at: Some(DateTime::<Utc>::from(file.modified)),
            camera_model: String::new(),
            lens: String::new(),
        }
    }

    /// Check if any embedded metadata was extracted
    pub fn has_embedded_data(&self) -> bool {
        !self.embedded_original_name.is_empty()
            || self.width > 0
            || self.height > 0
            || self.created_at.is_some()
            || !self.camera_model.is_empty()
            || !self.lens.is_empty()
    }
}

/// The in-memory collection of candidate records, built once per run.
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    records: Vec<ImageRecord>,
}

impl CandidateIndex {
    /// Build the index from discovered files.
    ///
    /// Extraction runs per file and is independent; failures degrade to
    /// a minimal record instead of aborting the build.
    pub fn build(
        files: &[SourceFile],
        extractor: &dyn MetadataExtractor,
        events: &EventSender,
    ) -> Self {
        let total = files.len();
        let completed = AtomicUsize::new(0);

        let mut records: Vec<ImageRecord> = files
            .par_iter()
            .map(|file| {
                let record = extractor.extract(file);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

                if record.has_embedded_data() {
                    events.send(Event::Index(IndexEvent::FileIndexed {
                        path: file.path.clone(),
                    }));
                } else {
                    events.send(Event::Index(IndexEvent::Degraded {
                        path: file.path.clone(),
                        message: "no embedded metadata".to_string(),
                    }));
                }

                events.send(Event::Index(IndexEvent::Progress(IndexProgress {
                    completed: done,
                    total,
                    current_path: file.path.clone(),
                })));

                record
            })
            .collect();

        // par_iter preserves input order, but make the invariant explicit:
        // records are sorted and unique by filename.
        records.sort_by(|a, b| a.filename.cmp(&b.filename));
        records.dedup_by(|a, b| a.filename == b.filename);

        events.send(Event::Index(IndexEvent::Completed {
            total_candidates: records.len(),
        }));

        Self { records }
    }

    /// Create an index directly from records (useful for tests)
    pub fn from_records(records: Vec<ImageRecord>) -> Self {
        Self { records }
    }

    /// The candidate records, in filename order
    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove a consumed candidate from later eligibility.
    ///
    /// Called by the pipeline after a row resolves, never by the matcher
    /// itself - `resolve` stays pure.
    pub fn remove(&mut self, path: &Path) {
        self.records.retain(|r| r.path != path);
    }
}
