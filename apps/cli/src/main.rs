// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `structalign` - aligns a structural building model onto its axis grid.
//!
//! Consumes the JSON interchange document produced by the external model
//! extractor, runs the alignment pipeline, and writes the aligned model
//! plus a JSON report. Exit codes are stable: 0 on success, 10 for invalid
//! input, 20 when no axes were found, 30 on validation failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use structalign_core::{CancelToken, Error, PipelineConfig};
use structalign_transform::run_pipeline;

mod ingest;
mod output;

#[derive(Debug, Parser)]
#[command(name = "structalign", version, about = "Structural model alignment pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full alignment pipeline on a model document.
    Align(AlignArgs),
}

#[derive(Debug, Args)]
struct AlignArgs {
    /// Input model document (JSON interchange).
    #[arg(long)]
    input_model: PathBuf,

    /// Output path for the aligned model document.
    #[arg(long)]
    output: PathBuf,

    /// Optional reference model for recall and drift checks.
    #[arg(long)]
    reference_model: Option<PathBuf>,

    /// Output path for the JSON report (default: next to the output model).
    #[arg(long)]
    report: Option<PathBuf>,

    /// Primary snap tolerance in meters.
    #[arg(long)]
    max_snap_distance: Option<f64>,

    /// Escalated snap tolerance in meters.
    #[arg(long)]
    outlier_snap_distance: Option<f64>,

    /// Minimum distinct floor levels for an axis line.
    #[arg(long)]
    min_floors: Option<u32>,

    /// Coordinate rounding grid in meters.
    #[arg(long)]
    rounding_precision: Option<f64>,

    /// Log level filter (overrides RUST_LOG).
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Align(args) => {
            init_logging(args.log_level.as_deref());
            match run_align(&args) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    tracing::error!(error = %err, "pipeline failed");
                    ExitCode::from(err.exit_code().clamp(0, 255) as u8)
                }
            }
        }
    }
}

fn init_logging(log_level: Option<&str>) {
    let filter = log_level
        .map(str::to_owned)
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_align(args: &AlignArgs) -> Result<(), Error> {
    let mut config = PipelineConfig::default();
    if let Some(d) = args.max_snap_distance {
        config.max_snap_distance = d;
    }
    if let Some(d) = args.outlier_snap_distance {
        config.outlier_snap_distance = d;
    }
    if let Some(n) = args.min_floors {
        config.min_floors = n;
    }
    if let Some(p) = args.rounding_precision {
        config.rounding_precision = p;
    }

    let model = ingest::read_model(&args.input_model)?;
    tracing::info!(
        path = %args.input_model.display(),
        elements = model.elements.len(),
        vertices = model.vertex_count(),
        "model loaded"
    );

    let reference = match &args.reference_model {
        Some(path) => {
            let reference = ingest::read_model(path)?;
            tracing::info!(path = %path.display(), "reference model loaded");
            Some(reference)
        }
        None => None,
    };

    let cancel = CancelToken::new();
    let outcome = run_pipeline(&model, &config, reference.as_ref(), &cancel)?;

    output::write_model(&args.output, &outcome.output)?;
    let report_path = args
        .report
        .clone()
        .unwrap_or_else(|| args.output.with_extension("report.json"));
    output::write_report(&report_path, &outcome.report)?;

    tracing::info!(
        output = %args.output.display(),
        report = %report_path.display(),
        edits = outcome.edits.len(),
        "alignment complete"
    );
    Ok(())
}
