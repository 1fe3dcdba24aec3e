//! Geometric consistency between images and their annotations.

use super::{Bucket, BucketFiles, Rule, RuleContext};
use crate::error::LabelsweepError;
use crate::pairs::build_pair_index;

/// Maximum relative difference between actual and recorded image dimensions.
/// Exactly this much is still acceptable; the comparison is strict.
const DIMENSION_TOLERANCE: f64 = 0.05;

/// Box coordinates may reach this multiple of the image dimension before
/// being flagged, absorbing small annotation-tool rounding overshoot.
const COORDINATE_SLACK: f64 = 1.05;

/// Flags matched pairs whose recorded size disagrees with the actual image,
/// or whose boxes extend well past the image bounds.
///
/// Image dimensions are read from file headers only; images are never
/// decoded. Pairs whose image dimensions cannot be read are logged and
/// skipped, like any other per-file load failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeometryCheck;

impl Rule for GeometryCheck {
    fn name(&self) -> &'static str {
        "geometry"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Bucket>, LabelsweepError> {
        let index = build_pair_index(ctx.image_dir, ctx.annotation_dir, ctx.image_ext)?;
        let mut offenders = Vec::new();

        for basename in index.matched {
            let Some(annotation) = ctx.load_or_skip(&basename) else {
                continue;
            };

            let image_path = ctx.image_path(&basename);
            let dims = match imagesize::size(&image_path) {
                Ok(dims) => dims,
                Err(error) => {
                    eprintln!(
                        "Warning: skipping '{basename}': cannot read image size from {}: {error}",
                        image_path.display()
                    );
                    continue;
                }
            };

            let img_w = dims.width as f64;
            let img_h = dims.height as f64;

            if dimensions_disagree(img_w, annotation.width as f64)
                || dimensions_disagree(img_h, annotation.height as f64)
            {
                offenders.push(basename);
                continue;
            }

            let out_of_bounds = annotation.objects.iter().any(|obj| {
                let bbox = obj.bbox;
                exceeds(bbox.xmin, img_w)
                    || exceeds(bbox.xmax, img_w)
                    || exceeds(bbox.ymin, img_h)
                    || exceeds(bbox.ymax, img_h)
            });

            if out_of_bounds {
                offenders.push(basename);
            }
        }

        Ok(vec![Bucket::new(
            "invalid_coordinates",
            BucketFiles::Image,
            offenders,
        )])
    }
}

fn dimensions_disagree(actual: f64, recorded: f64) -> bool {
    (actual - recorded).abs() / actual > DIMENSION_TOLERANCE
}

fn exceeds(coordinate: i64, dimension: f64) -> bool {
    coordinate as f64 > dimension * COORDINATE_SLACK
}
