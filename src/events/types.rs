//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the reconcile pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Candidate indexing phase events
    Index(IndexEvent),
    /// Per-row resolution phase events
    Row(RowEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the candidate indexing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IndexEvent {
    /// Indexing has started
    Started { path: PathBuf },
    /// Progress update during indexing
    Progress(IndexProgress),
    /// A file was indexed with full embedded metadata
    FileIndexed { path: PathBuf },
    /// Extraction failed for a file; a degraded record was kept
    Degraded { path: PathBuf, message: String },
    /// Indexing completed
    Completed { total_candidates: usize },
}

/// Progress information during indexing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexProgress {
    /// Number of files indexed so far
    pub completed: usize,
    /// Total number of files to index
    pub total: usize,
    /// Current file being indexed
    pub current_path: PathBuf,
}

/// Events during the per-row resolution phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RowEvent {
    /// Row processing has started
    Started { total_rows: usize },
    /// A row was resolved to exactly one candidate
    Resolved {
        filename: String,
        candidate: PathBuf,
        strategy: String,
    },
    /// A row matched no candidate
    NoMatch { filename: String },
    /// A row matched several indistinguishable candidates
    Ambiguous { filename: String, tie_count: usize },
    /// Metadata was written into the matched file
    Written { path: PathBuf },
    /// The write collaborator reported failure; the run continues
    WriteFailed { path: PathBuf, message: String },
    /// The matched file was already processed in a previous run
    Skipped { filename: String },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: RunSummary },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Indexing,
    Resolving,
}

/// Summary of a reconcile run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Total rows read from the export
    pub total_rows: usize,
    /// Rows matched and written successfully
    pub succeeded: usize,
    /// Rows matched but the metadata write failed
    pub write_failed: usize,
    /// Rows with no matching candidate
    pub no_match: usize,
    /// Rows with multiple indistinguishable candidates
    pub ambiguous: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Indexing => write!(f, "Indexing"),
            PipelinePhase::Resolving => write!(f, "Resolving"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Row(RowEvent::Resolved {
            filename: "IMG_001.jpg".to_string(),
            candidate: PathBuf::from("/photos/IMG_001.jpg"),
            strategy: "embedded original name".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Row(RowEvent::Resolved { filename, .. }) => {
                assert_eq!(filename, "IMG_001.jpg");
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn run_summary_is_serializable() {
        let summary = RunSummary {
            total_rows: 120,
            succeeded: 100,
            write_failed: 2,
            no_match: 15,
            ambiguous: 3,
            duration_ms: 5000,
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("120"));
    }
}
