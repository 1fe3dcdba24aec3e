use labelsweep::annotation::BndBox;
use proptest::prelude::*;

proptest! {
    /// Flipping between top-left and bottom-left origin twice with the same
    /// height restores the original box.
    #[test]
    fn flip_vertical_is_involutive(
        xmin in -1_000i64..1_000,
        ymin in -1_000i64..1_000,
        xmax in -1_000i64..1_000,
        ymax in -1_000i64..1_000,
        height in 1i64..10_000,
    ) {
        let bbox = BndBox { xmin, ymin, xmax, ymax };
        prop_assert_eq!(bbox.flip_vertical(height).flip_vertical(height), bbox);
    }

    /// Flipping preserves x entirely and maps the y interval endpoints to
    /// `height - ymax` and `height - ymin`.
    #[test]
    fn flip_vertical_swaps_y_extent(
        ymin in 0i64..500,
        span in 0i64..500,
        height in 1_000i64..2_000,
    ) {
        let bbox = BndBox { xmin: 1, ymin, xmax: 2, ymax: ymin + span };
        let flipped = bbox.flip_vertical(height);
        prop_assert_eq!(flipped.xmin, bbox.xmin);
        prop_assert_eq!(flipped.xmax, bbox.xmax);
        prop_assert_eq!(flipped.ymin, height - bbox.ymax);
        prop_assert_eq!(flipped.ymax, height - bbox.ymin);
        // Ordering is preserved for ordered input.
        prop_assert!(flipped.ymin <= flipped.ymax);
    }
}
