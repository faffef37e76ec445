//! # Photo Reconcile
//!
//! Reconciles a tabular metadata export (one row per published photo)
//! with a directory of image files, and writes the row's descriptive
//! text into the matched file's embedded IPTC/XMP metadata.
//!
//! ## Core Philosophy
//! - **Never guess** - ambiguous rows are reported, not force-matched
//! - **Never abort** - one bad row or unreadable file never stops the run
//! - **Show WHY** - every resolution names the strategy that produced it
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - candidate indexing, matching and disambiguation
//! - `events` - event-driven progress reporting
//! - `error` - user-friendly error types
//! - `cli` - command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ReconcileError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
