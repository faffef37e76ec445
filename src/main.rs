//! # photo-reconcile CLI
//!
//! Command-line interface for the photo metadata reconciler.
//!
//! ## Usage
//! ```bash
//! photo-reconcile apply ~/Exports --dry-run
//! photo-reconcile apply ~/Exports --csv metadata.csv --output json
//! ```

mod cli;

use photo_reconcile::Result;

fn main() -> Result<()> {
    cli::run()
}
