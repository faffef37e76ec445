//! # Core Module
//!
//! The UI-agnostic reconciliation engine.
//!
//! ## Modules
//! - `scanner` - Enumerates image files in the working directory
//! - `index` - Builds the in-memory candidate index
//! - `rows` - Reads the tabular metadata export
//! - `matcher` - Resolves each row to exactly one candidate
//! - `writer` - Writes descriptive fields into matched files
//! - `status` - Moves processed files between status folders
//! - `pipeline` - Orchestrates the full workflow

pub mod index;
pub mod matcher;
pub mod pipeline;
pub mod rows;
pub mod scanner;
pub mod status;
pub mod writer;

// Re-export commonly used types
pub use index::{CandidateIndex, ImageRecord};
pub use matcher::{MatchResult, Matcher, StrategyKind};
pub use pipeline::{Pipeline, PipelineResult, RowOutcome};
pub use rows::MetadataRow;
pub use scanner::SourceFile;
pub use writer::FieldMapping;
