//! Linear mapping between a data domain (years) and a pixel range.
//!
//! Both functions are total: a degenerate input domain never produces NaN or
//! infinity. `scale_and_shift` collapses onto `out_min` and `rescale` onto
//! zero, so a zero-width view simply draws everything at its left edge.

/// Maps `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Swapping the "in" and "out" pairs gives the inverse mapping, which is how
/// the view converts both year to pixel and pixel to year.
pub fn scale_and_shift(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let span = in_max - in_min;
    if span == 0.0 || !span.is_finite() {
        return out_min;
    }
    let mapped = (value - in_min) / span * (out_max - out_min) + out_min;
    if mapped.is_finite() { mapped } else { out_min }
}

/// Converts a delta measured in the input domain into the output domain.
///
/// Unlike [`scale_and_shift`] there is no offset term, so a pixel drag
/// distance turns into a year distance without picking up the absolute
/// position of the view.
pub fn rescale(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let span = in_max - in_min;
    if span == 0.0 || !span.is_finite() {
        return 0.0;
    }
    let scaled = value * (out_max - out_min) / span;
    if scaled.is_finite() { scaled } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scale_and_shift_maps_endpoints() {
        assert_eq!(scale_and_shift(1800.0, 1800.0, 1900.0, -200.0, 1400.0), -200.0);
        assert_eq!(scale_and_shift(1900.0, 1800.0, 1900.0, -200.0, 1400.0), 1400.0);
        assert_eq!(scale_and_shift(1850.0, 1800.0, 1900.0, -200.0, 1400.0), 600.0);
    }

    #[test]
    fn scale_and_shift_round_trips() {
        let cases = [
            (1813.42, 1800.0, 1900.0, -200.0, 1400.0),
            (-3500.0, -5000.0, 2000.0, 0.0, 800.0),
            (0.001, 0.0, 1.0, 10.0, 11.0),
            (2400.0, 1900.0, 1950.0, 0.0, 1920.0),
        ];
        for (value, in_min, in_max, out_min, out_max) in cases {
            let there = scale_and_shift(value, in_min, in_max, out_min, out_max);
            let back = scale_and_shift(there, out_min, out_max, in_min, in_max);
            assert!(
                (back - value).abs() < 1e-9 * value.abs().max(1.0),
                "{value} -> {there} -> {back}"
            );
        }
    }

    #[test]
    fn rescale_ignores_offsets() {
        // 160px across a 1600px view of a 100 year span is ten years,
        // wherever the view starts.
        assert!((rescale(160.0, -200.0, 1400.0, 1800.0, 1900.0) - 10.0).abs() < 1e-12);
        assert!((rescale(160.0, 0.0, 1600.0, -40.0, 60.0) - 10.0).abs() < 1e-12);
        assert!((rescale(-80.0, 0.0, 1600.0, 0.0, 100.0) + 5.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_domain_does_not_produce_nan() {
        assert_eq!(scale_and_shift(5.0, 3.0, 3.0, 10.0, 20.0), 10.0);
        assert_eq!(rescale(5.0, 3.0, 3.0, 10.0, 20.0), 0.0);
        assert_eq!(scale_and_shift(f64::NAN, 0.0, 1.0, 10.0, 20.0), 10.0);
        assert_eq!(rescale(1.0, 0.0, f64::INFINITY, 0.0, 1.0), 0.0);
    }

    proptest! {
        #[test]
        fn scale_and_shift_inverts_on_any_window(
            in_min in -5_000.0f64..5_000.0,
            in_span in 0.5f64..5_000.0,
            out_min in -2_000.0f64..2_000.0,
            out_span in 50.0f64..4_000.0,
            position in -1.0f64..2.0,
        ) {
            let in_max = in_min + in_span;
            let out_max = out_min + out_span;
            let value = in_min + position * in_span;
            let there = scale_and_shift(value, in_min, in_max, out_min, out_max);
            let back = scale_and_shift(there, out_min, out_max, in_min, in_max);
            prop_assert!(there.is_finite());
            prop_assert!((back - value).abs() <= 1e-9 * (value.abs() + in_span + 1.0));
        }

        #[test]
        fn rescale_matches_difference_of_mapped_points(
            in_min in -5_000.0f64..5_000.0,
            in_span in 0.5f64..5_000.0,
            from in -1.0f64..2.0,
            delta in -1.0f64..1.0,
        ) {
            let (out_min, out_max) = (-200.0, 1400.0);
            let in_max = in_min + in_span;
            let a = in_min + from * in_span;
            let b = a + delta * in_span;
            let mapped = scale_and_shift(b, in_min, in_max, out_min, out_max)
                - scale_and_shift(a, in_min, in_max, out_min, out_max);
            let scaled = rescale(b - a, in_min, in_max, out_min, out_max);
            prop_assert!((mapped - scaled).abs() < 1e-6);
        }
    }
}
