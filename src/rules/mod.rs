//! The validation rule catalog.
//!
//! Each rule is an independent check over the (image, annotation) pair set.
//! Rules never mutate shared state: every rule performs its own directory
//! scan and per-file load, so they can run in any order. A rule classifies
//! offending basenames into named buckets; materializing the buckets on disk
//! is left to the quarantine writer.

mod classes;
mod geometry;
mod structural;

pub use classes::{ClassNameCheck, KeyConsistencyCheck, MaxCountCheck, MissingBoxCheck};
pub use geometry::GeometryCheck;
pub use structural::{EmptyAnnotation, MissingAnnotation, MissingImage};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::annotation::{load_annotation, Annotation};
use crate::error::LabelsweepError;

/// A single validation rule.
///
/// Implementations must be read-only on the source directories; per-file
/// load failures are logged and skipped rather than propagated, so an `Err`
/// from [`Rule::evaluate`] means the rule could not run at all.
pub trait Rule {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Run the rule, returning every bucket it evaluates (including empty
    /// ones, so the report can show zero counts).
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Bucket>, LabelsweepError>;
}

/// Shared read-only inputs for rule evaluation.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    pub image_dir: &'a Path,
    pub annotation_dir: &'a Path,

    /// Image file extension without the leading dot.
    pub image_ext: &'a str,
}

impl RuleContext<'_> {
    /// Returns the path of the image for `basename`.
    pub fn image_path(&self, basename: &str) -> PathBuf {
        self.image_dir.join(format!("{basename}.{}", self.image_ext))
    }

    /// Load an annotation, treating failures as "skip this file".
    ///
    /// Returns `None` both when the file is absent (handled by the
    /// missing-pair rule) and when it fails to parse; parse failures are
    /// logged with the filename.
    pub fn load_or_skip(&self, basename: &str) -> Option<Annotation> {
        match load_annotation(self.annotation_dir, basename) {
            Ok(found) => found,
            Err(error) => {
                eprintln!("Warning: skipping annotation for '{basename}': {error}");
                None
            }
        }
    }
}

/// Which side(s) of a pair the quarantine writer should copy for a bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BucketFiles {
    /// Copy the image file only.
    Image,
    /// Copy the annotation file only.
    Annotation,
    /// Copy both files of the pair.
    Both,
}

/// A named anomaly classification with its offending basenames.
#[derive(Clone, Debug)]
pub struct Bucket {
    /// Bucket name, used as the quarantine subdirectory name.
    pub name: String,

    /// Which files to copy for each offender.
    pub files: BucketFiles,

    /// Offending basenames, sorted and free of duplicates.
    pub offenders: Vec<String>,
}

impl Bucket {
    /// Creates a bucket, sorting and deduplicating the offender list.
    pub fn new(name: impl Into<String>, files: BucketFiles, mut offenders: Vec<String>) -> Self {
        offenders.sort();
        offenders.dedup();
        Self {
            name: name.into(),
            files,
            offenders,
        }
    }

    /// Returns true if no file was flagged.
    pub fn is_empty(&self) -> bool {
        self.offenders.is_empty()
    }
}

/// Class catalog and thresholds driving the class-based rules.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Every class name an annotation may legally use. `<class>Key`
    /// companions are accepted implicitly.
    pub valid_classes: Vec<String>,

    /// Classes that must appear at least once per file. An entry may be an
    /// `A|B` alternation, satisfied by any of its alternatives.
    pub required_classes: Vec<String>,

    /// Per-class box-count ceiling for [`MaxCountCheck`].
    pub max_boxes: usize,

    /// Classes subject to the box-count ceiling.
    pub max_count_classes: Vec<String>,

    /// Classes whose `<class>Key` companion must occur in equal number.
    pub key_classes: Vec<String>,
}

impl RuleConfig {
    /// The bill-of-lading catalog this tool was originally built around.
    pub fn bill_of_lading() -> Self {
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|name| name.to_string()).collect()
        }

        Self {
            valid_classes: names(&[
                "Shipper",
                "Consignee",
                "Carrier",
                "NotifyParty",
                "Issuer",
                "IssuerLogo",
                "DestinationAgent",
                "CompanyName",
                "Address",
                "FreightPaymentTerms",
                "ShippedOnBoardDate",
                "JobRef",
                "SCAC",
                "ExportRef",
            ]),
            required_classes: names(&[
                "Shipper",
                "Consignee",
                "Carrier",
                "NotifyParty",
                "Issuer",
                "IssuerLogo",
                "DestinationAgent",
                "CompanyName",
                "Address",
                "FreightPaymentTerms",
                "ShippedOnBoardDate",
                "ExportRef",
            ]),
            max_boxes: 1,
            max_count_classes: names(&[
                "Shipper",
                "Consignee",
                "Carrier",
                "NotifyParty",
                "Issuer",
                "IssuerLogo",
                "DestinationAgent",
                "FreightPaymentTerms",
                "ShippedOnBoardDate",
                "SCAC",
                "ExportRef",
            ]),
            key_classes: names(&[
                "Shipper",
                "Consignee",
                "NotifyParty",
                "DestinationAgent",
                "ShippedOnBoardDate",
                "ExportRef",
            ]),
        }
    }
}

/// Build the full rule sequence for a configuration.
///
/// The orchestrator runs these in order; each entry is independent, so a
/// failure in one never blocks the rest.
pub fn build_rules(config: &RuleConfig) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(MissingAnnotation),
        Box::new(MissingImage),
        Box::new(EmptyAnnotation),
        Box::new(GeometryCheck),
        Box::new(ClassNameCheck::new(config.valid_classes.clone())),
        Box::new(MissingBoxCheck::new(config.required_classes.clone())),
        Box::new(MaxCountCheck::new(
            config.max_boxes,
            config.max_count_classes.clone(),
        )),
        Box::new(KeyConsistencyCheck::new(config.key_classes.clone())),
    ]
}
