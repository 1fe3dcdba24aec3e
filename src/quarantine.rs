//! Quarantine materialization.
//!
//! Copies offending files into bucket-named subdirectories of the output
//! root. Sources are never moved or deleted; a quarantine run only ever adds
//! review copies.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::annotation::annotation_path;
use crate::error::LabelsweepError;
use crate::rules::{Bucket, BucketFiles, RuleContext};

/// Per-bucket outcome of a quarantine write.
#[derive(Clone, Debug, Serialize)]
pub struct BucketSummary {
    /// Bucket name, matching the subdirectory name when files were copied.
    pub name: String,

    /// Number of offending basenames.
    pub count: usize,

    /// The offending basenames themselves.
    pub offenders: Vec<String>,
}

/// Materialize one bucket under `out_dir`.
///
/// Empty buckets create no subdirectory. The output root must already exist;
/// creating it is the orchestrator's job, so a missing root surfaces as an
/// IO error here. A missing source file on one side of a pair is skipped
/// rather than treated as fatal - the missing-pair rules report those.
pub fn write_bucket(
    out_dir: &Path,
    bucket: &Bucket,
    ctx: &RuleContext<'_>,
) -> Result<BucketSummary, LabelsweepError> {
    let summary = BucketSummary {
        name: bucket.name.clone(),
        count: bucket.offenders.len(),
        offenders: bucket.offenders.clone(),
    };

    if bucket.is_empty() {
        return Ok(summary);
    }

    let subdir = out_dir.join(&bucket.name);
    fs::create_dir(&subdir).map_err(LabelsweepError::Io)?;

    for basename in &bucket.offenders {
        if matches!(bucket.files, BucketFiles::Image | BucketFiles::Both) {
            copy_if_present(&ctx.image_path(basename), &subdir)?;
        }
        if matches!(bucket.files, BucketFiles::Annotation | BucketFiles::Both) {
            copy_if_present(&annotation_path(ctx.annotation_dir, basename), &subdir)?;
        }
    }

    Ok(summary)
}

fn copy_if_present(source: &Path, subdir: &Path) -> Result<(), LabelsweepError> {
    if !source.is_file() {
        return Ok(());
    }
    let file_name = source
        .file_name()
        .ok_or_else(|| LabelsweepError::InvalidDirectory {
            path: source.to_path_buf(),
        })?;
    fs::copy(source, subdir.join(file_name)).map_err(LabelsweepError::Io)?;
    Ok(())
}
