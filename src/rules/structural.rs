//! Structural rules: missing pair members and empty annotations.

use super::{Bucket, BucketFiles, Rule, RuleContext};
use crate::annotation::ANNOTATION_EXTENSION;
use crate::error::LabelsweepError;
use crate::pairs::{build_pair_index, list_basenames};

/// Flags images that have no annotation file.
#[derive(Clone, Copy, Debug, Default)]
pub struct MissingAnnotation;

impl Rule for MissingAnnotation {
    fn name(&self) -> &'static str {
        "missing-annotation"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Bucket>, LabelsweepError> {
        let index = build_pair_index(ctx.image_dir, ctx.annotation_dir, ctx.image_ext)?;
        Ok(vec![Bucket::new(
            "missing_xml",
            BucketFiles::Image,
            index.images_without_annotation,
        )])
    }
}

/// Flags annotation files that have no image.
#[derive(Clone, Copy, Debug, Default)]
pub struct MissingImage;

impl Rule for MissingImage {
    fn name(&self) -> &'static str {
        "missing-image"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Bucket>, LabelsweepError> {
        let index = build_pair_index(ctx.image_dir, ctx.annotation_dir, ctx.image_ext)?;
        Ok(vec![Bucket::new(
            "missing_image",
            BucketFiles::Annotation,
            index.annotations_without_image,
        )])
    }
}

/// Flags annotations that parse successfully but contain zero objects.
///
/// This is the only rule that reports empty files; the class-based rules
/// short-circuit on an empty class set so a file is not double-flagged.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyAnnotation;

impl Rule for EmptyAnnotation {
    fn name(&self) -> &'static str {
        "empty-annotation"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Bucket>, LabelsweepError> {
        let mut offenders = Vec::new();

        for basename in list_basenames(ctx.annotation_dir, ANNOTATION_EXTENSION)? {
            let Some(annotation) = ctx.load_or_skip(&basename) else {
                continue;
            };
            if annotation.objects.is_empty() {
                offenders.push(basename);
            }
        }

        Ok(vec![Bucket::new(
            "empty_annotation",
            BucketFiles::Annotation,
            offenders,
        )])
    }
}
