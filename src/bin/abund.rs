//! abund - qPCR-calibrated absolute abundance CLI
//!
//! Command-line interface for converting microbiome time-series read
//! counts into absolute abundance estimates.

use clap::{Parser, Subcommand};
use qpcr_abund::assembly::process_dataset;
use qpcr_abund::data::{MouseDataset, MouseRecord, QpcrCalibration, ReadMatrix};
use qpcr_abund::error::Result;
use qpcr_abund::profile::profile_read_depth;
use std::path::PathBuf;

/// qPCR-calibrated absolute abundance estimation
#[derive(Parser)]
#[command(name = "abund")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every mouse in a dataset manifest
    Process {
        /// Path to dataset manifest YAML
        #[arg(short, long)]
        manifest: PathBuf,

        /// Output directory for per-mouse result tables
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert a single mouse's reads and calibration
    Convert {
        /// Path to read count TSV
        #[arg(short, long)]
        reads: PathBuf,

        /// Path to qPCR calibration CSV
        #[arg(short, long)]
        qpcr: PathBuf,

        /// Mouse id used in output file names
        #[arg(short, long, default_value = "mouse")]
        id: String,

        /// Output directory for result tables
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Profile sequencing depth of a read matrix
    Profile {
        /// Path to read count TSV
        #[arg(short, long)]
        reads: PathBuf,

        /// Output format: text, json, or yaml
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process { manifest, output } => cmd_process(&manifest, &output),
        Commands::Convert {
            reads,
            qpcr,
            id,
            output,
        } => cmd_convert(&reads, &qpcr, &id, &output),
        Commands::Profile { reads, format } => cmd_profile(&reads, &format),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Process a whole dataset
fn cmd_process(manifest_path: &PathBuf, output_dir: &PathBuf) -> Result<()> {
    eprintln!("Loading dataset from {:?}...", manifest_path);
    let dataset = MouseDataset::load(manifest_path)?;
    eprintln!("Loaded {} mice", dataset.len());

    eprintln!("Processing...");
    let outcome = process_dataset(&dataset);

    for (id, bundle) in &outcome.mice {
        bundle.write_dir(output_dir, id)?;
    }
    eprintln!(
        "Done! {} mice written to {:?}",
        outcome.n_processed(),
        output_dir
    );

    if !outcome.is_complete() {
        for failure in &outcome.failures {
            eprintln!("  failed: {}", failure.error);
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Convert one mouse
fn cmd_convert(
    reads_path: &PathBuf,
    qpcr_path: &PathBuf,
    id: &str,
    output_dir: &PathBuf,
) -> Result<()> {
    eprintln!("Loading data...");
    let reads = ReadMatrix::from_tsv(reads_path)?;
    let qpcr = QpcrCalibration::from_csv(qpcr_path)?;
    eprintln!(
        "Loaded {} features x {} time points",
        reads.n_features(),
        reads.n_time_points()
    );

    let record = MouseRecord { reads, qpcr };
    let bundle = qpcr_abund::assembly::process_mouse(id, &record)?;
    bundle.write_dir(output_dir, id)?;

    eprintln!("Done! Results written to {:?}", output_dir);
    Ok(())
}

/// Profile sequencing depth
fn cmd_profile(reads_path: &PathBuf, format: &str) -> Result<()> {
    let reads = ReadMatrix::from_tsv(reads_path)?;
    let profile = profile_read_depth(&reads);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&profile)?),
        "yaml" => println!("{}", serde_yaml::to_string(&profile)?),
        _ => print!("{}", profile),
    }

    if profile.has_degenerate_time_points() {
        eprintln!(
            "Warning: {} time point(s) have zero total reads and cannot be converted",
            profile.degenerate_time_points.len()
        );
    }
    Ok(())
}
