//! # Pipeline Module
//!
//! Orchestrates the full reconcile workflow: ensure status folders,
//! build the candidate index, read the export, then resolve rows one
//! at a time and hand each resolution to the write/move collaborators.
//!
//! The pipeline owns the cross-row bookkeeping the matcher deliberately
//! doesn't: a resolved candidate is removed from the pool before the
//! next row is considered, so two rows can never claim the same file.

use crate::core::index::{CandidateIndex, ExifExtractor, MetadataExtractor};
use crate::core::matcher::{MatchResult, Matcher};
use crate::core::rows::{CsvRowSource, MetadataRow};
use crate::core::scanner::{FileEnumerator, ScanConfig, WalkDirScanner};
use crate::core::status::{move_file, StatusDirs};
use crate::core::writer::{mapping_for, ExiftoolWriter, FieldMapping, MetadataWriter};
use crate::error::ReconcileError;
use crate::events::{
    null_sender, Event, EventSender, IndexEvent, PipelineEvent, PipelinePhase, RowEvent, RunSummary,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

/// How one row ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowOutcome {
    /// Matched and written (or would be, in a dry run)
    Succeeded,
    /// Matched, but the metadata write failed
    WriteFailed,
    /// No candidate matched
    NoMatch,
    /// Multiple indistinguishable candidates
    Ambiguous,
}

/// Per-row report for result output.
#[derive(Debug, Clone, Serialize)]
pub struct RowReport {
    /// Row filename as exported
    pub filename: String,
    /// Outcome kind
    pub outcome: RowOutcome,
    /// Matched file, when one was resolved
    pub candidate: Option<PathBuf>,
    /// Strategy that produced the match
    pub strategy: Option<String>,
    /// Fields that were (or would be) written
    pub fields_written: usize,
}

/// Result of a pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    /// One report per processed row, in input order
    pub reports: Vec<RowReport>,
    /// Aggregate counts
    pub summary: RunSummary,
    /// Non-fatal errors encountered along the way
    pub errors: Vec<String>,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Working directory holding the images and the export
    pub root: PathBuf,
    /// Path to the metadata CSV (defaults to `metadata.csv` in root)
    pub csv: Option<PathBuf>,
    /// Resolve and report only; no writes, no moves
    pub dry_run: bool,
    /// Scanner configuration
    pub scan_config: ScanConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            csv: None,
            dry_run: false,
            scan_config: ScanConfig::default(),
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    extractor: Option<Box<dyn MetadataExtractor>>,
    writer: Option<Box<dyn MetadataWriter>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            extractor: None,
            writer: None,
        }
    }

    /// Set the working directory
    pub fn root(mut self, root: PathBuf) -> Self {
        self.config.root = root;
        self
    }

    /// Set the CSV path
    pub fn csv(mut self, csv: PathBuf) -> Self {
        self.config.csv = Some(csv);
        self
    }

    /// Resolve without writing or moving anything
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Substitute the metadata extractor
    pub fn extractor(mut self, extractor: Box<dyn MetadataExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Substitute the metadata writer
    pub fn writer(mut self, writer: Box<dyn MetadataWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            extractor: self.extractor.unwrap_or_else(|| Box::new(ExifExtractor)),
            writer: self.writer.unwrap_or_else(|| Box::<ExiftoolWriter>::default()),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The reconcile pipeline
pub struct Pipeline {
    config: PipelineConfig,
    extractor: Box<dyn MetadataExtractor>,
    writer: Box<dyn MetadataWriter>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, ReconcileError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, ReconcileError> {
        let start_time = Instant::now();
        let mut errors = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));

        let status = StatusDirs::new(&self.config.root);
        if !self.config.dry_run {
            status.ensure().map_err(|e| {
                ReconcileError::Config(format!(
                    "failed to create status folders in {}: {e}",
                    self.config.root.display()
                ))
            })?;
        }

        // Phase 1: Indexing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Indexing,
        }));
        events.send(Event::Index(IndexEvent::Started {
            path: self.config.root.clone(),
        }));

        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let scan_result = scanner.scan(&self.config.root)?;
        for error in scan_result.errors {
            errors.push(error.to_string());
        }

        let mut pool = CandidateIndex::build(&scan_result.files, self.extractor.as_ref(), events);

        // Phase 2: Resolving
        let csv_path = self
            .config
            .csv
            .clone()
            .unwrap_or_else(|| self.config.root.join("metadata.csv"));
        let rows = CsvRowSource::new().read(&csv_path)?;

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Resolving,
        }));
        events.send(Event::Row(RowEvent::Started {
            total_rows: rows.len(),
        }));

        let matcher = Matcher::new();
        let mut reports = Vec::with_capacity(rows.len());
        let mut summary = RunSummary {
            total_rows: rows.len(),
            succeeded: 0,
            write_failed: 0,
            no_match: 0,
            ambiguous: 0,
            duration_ms: 0,
        };

        for row in &rows {
            let report = match matcher.resolve(row, pool.records()) {
                MatchResult::Resolved { record, strategy } => {
                    events.send(Event::Row(RowEvent::Resolved {
                        filename: row.filename.clone(),
                        candidate: record.path.clone(),
                        strategy: strategy.to_string(),
                    }));

                    // A resolved candidate leaves the pool either way
                    pool.remove(&record.path);

                    let mapping = mapping_for(row, &record);
                    let outcome =
                        self.apply(row, &record.path, &mapping, &status, events, &mut errors);

                    match outcome {
                        RowOutcome::Succeeded => summary.succeeded += 1,
                        RowOutcome::WriteFailed => summary.write_failed += 1,
                        _ => {}
                    }

                    RowReport {
                        filename: row.filename.clone(),
                        outcome,
                        candidate: Some(record.path.clone()),
                        strategy: Some(strategy.to_string()),
                        fields_written: mapping.len(),
                    }
                }
                MatchResult::NoMatch => {
                    events.send(Event::Row(RowEvent::NoMatch {
                        filename: row.filename.clone(),
                    }));
                    summary.no_match += 1;

                    RowReport {
                        filename: row.filename.clone(),
                        outcome: RowOutcome::NoMatch,
                        candidate: None,
                        strategy: None,
                        fields_written: 0,
                    }
                }
                MatchResult::Ambiguous { candidates } => {
                    events.send(Event::Row(RowEvent::Ambiguous {
                        filename: row.filename.clone(),
                        tie_count: candidates.len(),
                    }));
                    summary.ambiguous += 1;

                    RowReport {
                        filename: row.filename.clone(),
                        outcome: RowOutcome::Ambiguous,
                        candidate: None,
                        strategy: None,
                        fields_written: 0,
                    }
                }
            };

            reports.push(report);
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: summary.clone(),
        }));

        Ok(PipelineResult {
            reports,
            summary,
            errors,
        })
    }

    /// Write the mapping into the matched file and move it to its
    /// status folder. Dry runs skip both.
    fn apply(
        &self,
        row: &MetadataRow,
        path: &std::path::Path,
        mapping: &FieldMapping,
        status: &StatusDirs,
        events: &EventSender,
        errors: &mut Vec<String>,
    ) -> RowOutcome {
        if self.config.dry_run {
            return RowOutcome::Succeeded;
        }

        // Already sorted into Done by an earlier run
        let done_dest = status.done_path(path);
        if done_dest.exists() {
            events.send(Event::Row(RowEvent::Skipped {
                filename: row.filename.clone(),
            }));
            return RowOutcome::Succeeded;
        }

        // Nothing to write is a success; the file still moves to Done
        let write_result = if mapping.is_empty() {
            Ok(())
        } else {
            self.writer.write(path, mapping)
        };

        match write_result {
            Ok(()) => {
                events.send(Event::Row(RowEvent::Written {
                    path: path.to_path_buf(),
                }));

                if let Err(e) = move_file(path, &done_dest) {
                    errors.push(e.to_string());
                    return RowOutcome::WriteFailed;
                }

                RowOutcome::Succeeded
            }
            Err(e) => {
                events.send(Event::Row(RowEvent::WriteFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }));
                errors.push(e.to_string());

                // Best-effort: park the file in Failed for triage
                if let Err(move_err) = move_file(path, &status.failed_path(path)) {
                    errors.push(move_err.to_string());
                }

                RowOutcome::WriteFailed
            }
        }
    }
}
