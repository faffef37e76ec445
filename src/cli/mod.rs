//! # CLI Module
//!
//! Command-line interface for the photo metadata reconciler.
//!
//! ## Usage
//! ```bash
//! # Reconcile the export against the images in a folder
//! photo-reconcile apply ~/Photos/export
//!
//! # With an explicit CSV and exiftool location
//! photo-reconcile apply ~/Photos/export --csv ~/Downloads/metadata.csv --exiftool /opt/bin/exiftool
//!
//! # Resolve only, touch nothing
//! photo-reconcile apply ~/Photos/export --dry-run
//!
//! # JSON output
//! photo-reconcile apply ~/Photos/export --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_reconcile::core::pipeline::{Pipeline, PipelineResult, RowOutcome};
use photo_reconcile::core::writer::ExiftoolWriter;
use photo_reconcile::error::Result;
use photo_reconcile::events::{Event, EventChannel, IndexEvent, PipelineEvent, RowEvent};
use std::path::PathBuf;
use std::thread;

/// Photo Metadata Reconciler - Never guess, never abort, show why
#[derive(Parser, Debug)]
#[command(name = "photo-reconcile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Match export rows to image files and write their metadata
    Apply {
        /// Working directory holding the images
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Metadata CSV (defaults to metadata.csv inside the working directory)
        #[arg(short, long)]
        csv: Option<PathBuf>,

        /// Path to the exiftool binary
        #[arg(long)]
        exiftool: Option<PathBuf>,

        /// Resolve and report only; write and move nothing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (unresolved filenames only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            path,
            csv,
            exiftool,
            dry_run,
            output,
            verbose,
        } => run_apply(path, csv, exiftool, dry_run, output, verbose),
    }
}

fn run_apply(
    path: PathBuf,
    csv: Option<PathBuf>,
    exiftool: Option<PathBuf>,
    dry_run: bool,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    if verbose {
        photo_reconcile::init_tracing();
    }

    let term = Term::stderr();

    // Print header
    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}{}",
            style("Photo Metadata Reconciler").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim(),
            if dry_run {
                format!(" {}", style("(dry run)").yellow())
            } else {
                String::new()
            }
        ))
        .ok();
        term.write_line("").ok();
    }

    // Build pipeline
    let mut builder = Pipeline::builder().root(path).dry_run(dry_run);

    if let Some(csv) = csv {
        builder = builder.csv(csv);
    }
    if let Some(exiftool) = exiftool {
        builder = builder.writer(Box::new(ExiftoolWriter::new(exiftool)));
    }

    let pipeline = builder.build();

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(0);
                        pb.set_message(format!("{}", phase));
                    }
                }
                Event::Index(IndexEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(p.total as u64);
                        pb.set_position(p.completed as u64);
                    }
                }
                Event::Row(RowEvent::Started { total_rows }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(total_rows as u64);
                    }
                }
                Event::Row(
                    RowEvent::Resolved { .. }
                    | RowEvent::NoMatch { .. }
                    | RowEvent::Ambiguous { .. },
                ) => {
                    if let Some(ref pb) = progress_clone {
                        pb.inc(1);
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    // Run the pipeline
    let result = pipeline.run_with_events(&sender)?;

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    // Output results
    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &result, verbose),
        OutputFormat::Json => print_json_results(&result),
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    Ok(())
}

fn print_pretty_results(term: &Term, result: &PipelineResult, verbose: bool) {
    let summary = &result.summary;

    term.write_line("").ok();
    term.write_line(&format!("{} Reconcile Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} rows processed in {:.1}s",
        style(summary.total_rows).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!("  {} written", style(summary.succeeded).green()))
        .ok();

    if summary.write_failed > 0 {
        term.write_line(&format!(
            "  {} write failures",
            style(summary.write_failed).red()
        ))
        .ok();
    }

    term.write_line(&format!("  {} no match", style(summary.no_match).yellow()))
        .ok();
    term.write_line(&format!("  {} ambiguous", style(summary.ambiguous).yellow()))
        .ok();

    term.write_line("").ok();

    // Matched rows, with the strategy that decided each one
    if verbose {
        for report in &result.reports {
            if report.outcome != RowOutcome::Succeeded {
                continue;
            }
            let candidate = report
                .candidate
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            term.write_line(&format!(
                "  {} {} → {} ({})",
                style("✓").green(),
                report.filename,
                candidate,
                style(report.strategy.as_deref().unwrap_or("?")).dim()
            ))
            .ok();
        }
        term.write_line("").ok();
    }

    // Unresolved rows always print; they need a human
    let unresolved: Vec<_> = result
        .reports
        .iter()
        .filter(|r| matches!(r.outcome, RowOutcome::NoMatch | RowOutcome::Ambiguous))
        .collect();

    if !unresolved.is_empty() {
        term.write_line(&format!("{}", style("Needs review:").bold().underlined()))
            .ok();
        for report in unresolved {
            let reason = match report.outcome {
                RowOutcome::NoMatch => "no match",
                RowOutcome::Ambiguous => "ambiguous",
                _ => unreachable!(),
            };
            term.write_line(&format!(
                "  {} {} ({})",
                style("○").yellow(),
                report.filename,
                style(reason).dim()
            ))
            .ok();
        }
        term.write_line("").ok();
    }

    for error in &result.errors {
        term.write_line(&format!("  {} {}", style("!").red(), style(error).dim()))
            .ok();
    }
}

fn print_json_results(result: &PipelineResult) {
    let output = serde_json::json!({
        "summary": result.summary,
        "rows": result.reports,
        "errors": result.errors,
    });

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn print_minimal_results(result: &PipelineResult) {
    for report in &result.reports {
        if matches!(report.outcome, RowOutcome::NoMatch | RowOutcome::Ambiguous) {
            println!("{}", report.filename);
        }
    }
}
