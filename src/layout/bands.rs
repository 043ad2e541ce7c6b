use super::ViewWindow;
use serde::Serialize;

/// Width used when no candidate yields more than four bands.
const FALLBACK_BAND_WIDTH: f64 = 2.0;
/// A band width qualifies once the visible span covers more than this many.
const MIN_VISIBLE_BANDS: f64 = 4.0;
/// Past this many bands the width grows by powers of ten.
const MAX_VISIBLE_BANDS: f64 = 64.0;

/// One background strip covering `width_years` starting at `start_year`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub index: i64,
    pub start_year: f64,
    pub width_years: f64,
    pub x: f64,
    pub width_px: f64,
    /// Alternating fill: set on even band indices.
    pub shaded: bool,
    pub caption: String,
}

/// Widest candidate (years per band) that still gives more than four bands
/// across `span`. Candidates are tried in the order given.
///
/// When even the widest candidate would give more than 64 bands, it is
/// multiplied by ten until at most 64 remain.
pub fn band_width(span: f64, candidates: &[f64]) -> f64 {
    let mut width = candidates
        .iter()
        .copied()
        .find(|width| *width > 0.0 && span / width > MIN_VISIBLE_BANDS)
        .or_else(|| candidates.last().copied().filter(|width| *width > 0.0))
        .unwrap_or(FALLBACK_BAND_WIDTH);
    if span.is_finite() {
        while span / width > MAX_VISIBLE_BANDS {
            width *= 10.0;
        }
    }
    width
}

/// Bands covering the visible range, leftmost first. Empty when the view
/// range is not finite.
pub fn compute_bands(view: &ViewWindow, candidates: &[f64]) -> Vec<Band> {
    if !view.min_year.is_finite() || !view.max_year.is_finite() {
        return Vec::new();
    }
    let width_years = band_width(view.span(), candidates);
    let first = (view.min_year / width_years).floor() as i64;
    let last = (view.max_year / width_years).floor() as i64;
    let width_px = view.pixels_for_years(width_years);
    (first..=last)
        .map(|index| {
            let start_year = index as f64 * width_years;
            Band {
                index,
                start_year,
                width_years,
                x: view.pixel_from_year(start_year),
                width_px,
                shaded: index.rem_euclid(2) == 0,
                caption: format_year(start_year),
            }
        })
        .collect()
}

fn format_year(year: f64) -> String {
    if year.fract() == 0.0 {
        format!("{}", year as i64)
    } else {
        format!("{year:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ZoomDirection;

    const CANDIDATES: [f64; 6] = [100.0, 50.0, 25.0, 10.0, 5.0, 2.0];

    #[test]
    fn picks_widest_band_with_more_than_four_bands() {
        assert_eq!(band_width(1000.0, &CANDIDATES), 100.0);
        assert_eq!(band_width(400.0, &CANDIDATES), 50.0);
        assert_eq!(band_width(100.0, &CANDIDATES), 10.0);
        assert_eq!(band_width(30.0, &CANDIDATES), 5.0);
    }

    #[test]
    fn defaults_to_smallest_candidate() {
        assert_eq!(band_width(3.0, &CANDIDATES), 2.0);
        assert_eq!(band_width(0.0, &CANDIDATES), 2.0);
        assert_eq!(band_width(3.0, &[]), FALLBACK_BAND_WIDTH);
    }

    #[test]
    fn bands_cover_visible_range_and_alternate() {
        let view = ViewWindow::new(1803.0, 1897.0, 0.0, 940.0, 500.0);
        let bands = compute_bands(&view, &CANDIDATES);
        assert_eq!(bands.first().unwrap().start_year, 1800.0);
        assert_eq!(bands.last().unwrap().start_year, 1890.0);
        assert_eq!(bands.len(), 10);
        assert!((bands[0].x + 30.0).abs() < 1e-9);
        assert!((bands[0].width_px - 100.0).abs() < 1e-9);
        for pair in bands.windows(2) {
            assert_ne!(pair[0].shaded, pair[1].shaded);
        }
        assert_eq!(bands[0].caption, "1800");
    }

    #[test]
    fn huge_spans_widen_by_powers_of_ten() {
        assert_eq!(band_width(6_400.0, &CANDIDATES), 100.0);
        assert_eq!(band_width(6_500.0, &CANDIDATES), 1_000.0);
        assert_eq!(band_width(1.0e7, &CANDIDATES), 1.0e6);
        assert_eq!(band_width(f64::INFINITY, &CANDIDATES), 100.0);
    }

    #[test]
    fn band_count_stays_bounded_under_repeated_zoom_out() {
        let mut view = ViewWindow::new(1800.0, 1900.0, -200.0, 1400.0, 500.0);
        for step in 0..400 {
            view.zoom(600.0, ZoomDirection::Out, 0.1);
            let bands = compute_bands(&view, &CANDIDATES);
            assert!(bands.len() <= 66, "step {step}: {} bands", bands.len());
            if let Some(band) = bands.first() {
                assert!(band.width_px >= 1600.0 / 65.0, "step {step}: {}px", band.width_px);
            }
        }
    }

    #[test]
    fn non_finite_view_has_no_bands() {
        let view = ViewWindow::new(f64::NEG_INFINITY, 1900.0, 0.0, 100.0, 500.0);
        assert!(compute_bands(&view, &CANDIDATES).is_empty());
    }

    #[test]
    fn negative_years_alternate_too() {
        let view = ViewWindow::new(-55.0, -5.0, 0.0, 500.0, 500.0);
        let bands = compute_bands(&view, &CANDIDATES);
        assert_eq!(bands[0].start_year, -60.0);
        assert_eq!(bands[0].caption, "-60");
        for pair in bands.windows(2) {
            assert_ne!(pair[0].shaded, pair[1].shaded);
        }
    }
}
