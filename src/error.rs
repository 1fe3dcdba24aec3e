use std::path::PathBuf;
use thiserror::Error;

/// The main error type for labelsweep operations.
#[derive(Debug, Error)]
pub enum LabelsweepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse annotation {path}: {message}")]
    AnnotationParse { path: PathBuf, message: String },

    #[error("Invalid directory: {path}")]
    InvalidDirectory { path: PathBuf },

    #[error("Output directory {path} already exists; delete it or choose another")]
    OutputDirExists { path: PathBuf },

    #[error("Failed to parse config from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write report to {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Found {offender_count} offending file(s) across {bucket_count} bucket(s)")]
    AnomaliesFound {
        offender_count: usize,
        bucket_count: usize,
    },

    #[error("Unsupported report format: {0}")]
    UnsupportedReportFormat(String),
}
