//! Structured run reports.
//!
//! A run report lists every evaluated bucket with its offender count, so
//! clean checks show up as explicit zeros. It renders as operator-facing
//! text and serializes to JSON as the durable artifact written into the
//! output directory.

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::error::LabelsweepError;
use crate::quarantine::BucketSummary;

/// The outcome of one validation run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunReport {
    /// Per-bucket summaries in evaluation order.
    pub buckets: Vec<BucketSummary>,
}

impl RunReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bucket summary to the report.
    pub fn add(&mut self, summary: BucketSummary) {
        self.buckets.push(summary);
    }

    /// Total number of flagged files across all buckets.
    ///
    /// A file appearing in several buckets is counted once per bucket.
    pub fn offender_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.count).sum()
    }

    /// Number of buckets that flagged at least one file.
    pub fn populated_bucket_count(&self) -> usize {
        self.buckets.iter().filter(|bucket| bucket.count > 0).count()
    }

    /// Returns true if no bucket flagged any file.
    pub fn is_clean(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.count == 0)
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), LabelsweepError> {
        let file = File::create(path).map_err(LabelsweepError::Io)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|source| {
            LabelsweepError::ReportWrite {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            writeln!(f, "Validation passed: no offending files found")?;
        } else {
            writeln!(
                f,
                "Validation flagged {} file(s) across {} bucket(s):",
                self.offender_count(),
                self.populated_bucket_count()
            )?;
        }
        writeln!(f)?;

        for bucket in &self.buckets {
            writeln!(f, "  {}: {} file(s)", bucket.name, bucket.count)?;
        }

        Ok(())
    }
}
