//! Validation run orchestration.
//!
//! Wires the pair index, rule catalog, and quarantine writer together: after
//! the directory preconditions pass, every rule runs in a fixed sequence and
//! each of its buckets is materialized and summarized. A rule that fails
//! outright is logged and skipped; it never aborts the run.

mod report;

pub use report::RunReport;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LabelsweepError;
use crate::quarantine::write_bucket;
use crate::rules::{build_rules, Rule, RuleConfig, RuleContext};

/// Name of the JSON summary written into the output directory.
pub const REPORT_FILE_NAME: &str = "report.json";

/// Inputs for one validation run.
#[derive(Clone, Debug)]
pub struct ValidateOptions {
    /// Directory of image files.
    pub image_dir: PathBuf,

    /// Directory of annotation files.
    pub annotation_dir: PathBuf,

    /// Output directory; must not exist yet.
    pub output_dir: PathBuf,

    /// Image file extension without the leading dot.
    pub image_ext: String,

    /// Class catalog and thresholds for the class-based rules.
    pub config: RuleConfig,
}

/// Run the full validation sequence.
///
/// Fails before any side effect when an input directory is missing or the
/// output directory already exists, keeping runs non-clobbering. On success
/// the output directory holds one subdirectory per populated bucket plus
/// [`REPORT_FILE_NAME`].
pub fn run_validation(opts: &ValidateOptions) -> Result<RunReport, LabelsweepError> {
    require_directory(&opts.image_dir)?;
    require_directory(&opts.annotation_dir)?;
    if opts.output_dir.exists() {
        return Err(LabelsweepError::OutputDirExists {
            path: opts.output_dir.clone(),
        });
    }

    fs::create_dir_all(&opts.output_dir).map_err(LabelsweepError::Io)?;

    let ctx = RuleContext {
        image_dir: &opts.image_dir,
        annotation_dir: &opts.annotation_dir,
        image_ext: opts.image_ext.trim_start_matches('.'),
    };

    let mut report = RunReport::new();
    for rule in build_rules(&opts.config) {
        if let Err(error) = apply_rule(rule.as_ref(), &ctx, &opts.output_dir, &mut report) {
            eprintln!(
                "Warning: {} check failed and was skipped: {error}",
                rule.name()
            );
        }
    }

    report.write_json(&opts.output_dir.join(REPORT_FILE_NAME))?;
    Ok(report)
}

fn apply_rule(
    rule: &dyn Rule,
    ctx: &RuleContext<'_>,
    out_dir: &Path,
    report: &mut RunReport,
) -> Result<(), LabelsweepError> {
    for bucket in rule.evaluate(ctx)? {
        report.add(write_bucket(out_dir, &bucket, ctx)?);
    }
    Ok(())
}

fn require_directory(path: &Path) -> Result<(), LabelsweepError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(LabelsweepError::InvalidDirectory {
            path: path.to_path_buf(),
        })
    }
}
