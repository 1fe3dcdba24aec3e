//! Labelsweep: a quality gate for paired image/annotation datasets.
//!
//! Labelsweep checks a directory of images against a directory of VOC-style
//! XML annotations, flags structural defects (missing pair members, empty
//! annotations, out-of-range coordinates, missing or duplicated required
//! classes), and copies the offending files into bucket-named subdirectories
//! of a fresh output directory for human review. Source directories are
//! never modified.
//!
//! # Modules
//!
//! - [`annotation`]: VOC XML loading and the annotation data model
//! - [`pairs`]: image/annotation basename pairing
//! - [`rules`]: the validation rule catalog
//! - [`quarantine`]: bucket materialization on disk
//! - [`validate`]: run orchestration and reporting
//! - [`error`]: error types for labelsweep operations

pub mod annotation;
pub mod error;
pub mod pairs;
pub mod quarantine;
pub mod rules;
pub mod validate;

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::LabelsweepError;

use rules::RuleConfig;
use validate::{run_validation, ValidateOptions};

/// The labelsweep CLI application.
#[derive(Parser)]
#[command(name = "labelsweep")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate an image/annotation directory pair and quarantine offenders.
    Validate(ValidateArgs),
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Directory of image files.
    #[arg(long)]
    images: PathBuf,

    /// Directory of XML annotation files.
    #[arg(long)]
    annotations: PathBuf,

    /// Output directory for quarantine buckets (must not exist).
    #[arg(long)]
    out: PathBuf,

    /// Image file extension.
    #[arg(long, default_value = "jpg")]
    image_ext: String,

    /// JSON file with the class catalog and thresholds; defaults to the
    /// built-in bill-of-lading catalog.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,

    /// Exit non-zero if any bucket received an offender.
    #[arg(long)]
    strict: bool,
}

/// Run the labelsweep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LabelsweepError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        None => {
            println!("labelsweep {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Quality gate for paired image/annotation datasets.");
            println!();
            println!("Run 'labelsweep --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), LabelsweepError> {
    let config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(LabelsweepError::Io)?;
            serde_json::from_str(&raw).map_err(|source| LabelsweepError::ConfigParse {
                path: path.clone(),
                source,
            })?
        }
        None => RuleConfig::bill_of_lading(),
    };

    let opts = ValidateOptions {
        image_dir: args.images,
        annotation_dir: args.annotations,
        output_dir: args.out,
        image_ext: args.image_ext,
        config,
    };
    let report = run_validation(&opts)?;

    match args.report.as_str() {
        "text" => print!("{report}"),
        "json" => {
            let json = serde_json::to_string_pretty(&report).map_err(|source| {
                LabelsweepError::ReportWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{json}");
        }
        other => {
            return Err(LabelsweepError::UnsupportedReportFormat(other.to_string()));
        }
    }

    if args.strict && !report.is_clean() {
        return Err(LabelsweepError::AnomaliesFound {
            offender_count: report.offender_count(),
            bucket_count: report.populated_bucket_count(),
        });
    }

    Ok(())
}
