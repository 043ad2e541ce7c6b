use crate::scale::{rescale, scale_and_shift};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    /// Bounds move toward the anchor year.
    In,
    /// Bounds move away from the anchor year.
    Out,
}

impl ZoomDirection {
    /// Wheel convention: scrolling up (negative delta) zooms in.
    pub fn from_wheel(delta_y: f64) -> Option<Self> {
        if delta_y < 0.0 {
            Some(Self::In)
        } else if delta_y > 0.0 {
            Some(Self::Out)
        } else {
            None
        }
    }
}

/// Visible year range, the pixel range it maps onto, and the label baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewWindow {
    pub min_year: f64,
    pub max_year: f64,
    pub left_pixel: f64,
    pub right_pixel: f64,
    /// Labels stack upward from this y.
    pub baseline_y: f64,
}

impl ViewWindow {
    pub fn new(min_year: f64, max_year: f64, left_pixel: f64, right_pixel: f64, baseline_y: f64) -> Self {
        Self {
            min_year,
            max_year,
            left_pixel,
            right_pixel,
            baseline_y,
        }
    }

    pub fn span(&self) -> f64 {
        self.max_year - self.min_year
    }

    pub fn pixel_from_year(&self, year: f64) -> f64 {
        scale_and_shift(year, self.min_year, self.max_year, self.left_pixel, self.right_pixel)
    }

    pub fn year_from_pixel(&self, x: f64) -> f64 {
        scale_and_shift(x, self.left_pixel, self.right_pixel, self.min_year, self.max_year)
    }

    /// Width in pixels of a run of `years`.
    pub fn pixels_for_years(&self, years: f64) -> f64 {
        rescale(years, self.min_year, self.max_year, self.left_pixel, self.right_pixel)
    }

    /// Years covered by a pixel distance.
    pub fn years_for_pixels(&self, pixels: f64) -> f64 {
        rescale(pixels, self.left_pixel, self.right_pixel, self.min_year, self.max_year)
    }

    pub fn contains_year(&self, year: i32) -> bool {
        let year = f64::from(year);
        year >= self.min_year && year <= self.max_year
    }

    /// Drags the timeline by `dx` pixels: content follows the pointer, so a
    /// drag to the right reveals earlier years. The span is unchanged.
    pub fn pan(&mut self, dx: f64) {
        let delta_year = self.years_for_pixels(dx);
        self.min_year -= delta_year;
        self.max_year -= delta_year;
    }

    pub fn shift_baseline(&mut self, dy: f64) {
        self.baseline_y += dy;
    }

    /// Zooms about the year under pixel `anchor_x`, which keeps its pixel
    /// position. Each bound moves by `factor` of its distance to the anchor.
    pub fn zoom(&mut self, anchor_x: f64, direction: ZoomDirection, factor: f64) {
        let anchor_year = self.year_from_pixel(anchor_x);
        let step = match direction {
            ZoomDirection::In => factor,
            ZoomDirection::Out => -factor,
        };
        let min_year = self.min_year + step * (anchor_year - self.min_year);
        let max_year = self.max_year + step * (anchor_year - self.max_year);
        if max_year - min_year <= f64::EPSILON * max_year.abs().max(1.0) {
            log::debug!("zoom limit reached at {anchor_year:.3}");
            return;
        }
        self.min_year = min_year;
        self.max_year = max_year;
    }

    /// Year range to request from the data source: the visible range padded
    /// by `padding` of the span on each side.
    pub fn fetch_range(&self, padding: f64) -> (f64, f64) {
        let pad = self.span() * padding;
        (self.min_year - pad, self.max_year + pad)
    }

    /// Re-targets the pixel range after the surface changed size.
    pub fn set_pixel_range(&mut self, left_pixel: f64, right_pixel: f64) {
        self.left_pixel = left_pixel;
        self.right_pixel = right_pixel;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn view() -> ViewWindow {
        ViewWindow::new(1800.0, 1900.0, -200.0, 1400.0, 680.0)
    }

    #[test]
    fn year_pixel_conversions_are_inverse() {
        let view = view();
        for year in [1800.0, 1813.5, 1850.0, 1899.99] {
            let back = view.year_from_pixel(view.pixel_from_year(year));
            assert!((back - year).abs() < 1e-9);
        }
        assert_eq!(view.pixels_for_years(10.0), 160.0);
        assert_eq!(view.years_for_pixels(160.0), 10.0);
    }

    #[test]
    fn pan_preserves_span_and_moves_midpoint() {
        let mut view = view();
        view.pan(160.0);
        assert!((view.span() - 100.0).abs() < 1e-9);
        assert!((view.min_year - 1790.0).abs() < 1e-9);
        view.pan(-320.0);
        assert!((view.min_year - 1810.0).abs() < 1e-9);
        assert!((view.max_year - 1910.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        for direction in [ZoomDirection::In, ZoomDirection::Out] {
            let mut view = view();
            let anchor_x = 437.0;
            let anchor_year = view.year_from_pixel(anchor_x);
            view.zoom(anchor_x, direction, 0.1);
            assert!((view.pixel_from_year(anchor_year) - anchor_x).abs() < 1e-9);
            assert!((view.year_from_pixel(anchor_x) - anchor_year).abs() < 1e-9);
        }
    }

    #[test]
    fn zoom_in_narrows_and_zoom_out_widens() {
        let mut view = view();
        view.zoom(600.0, ZoomDirection::In, 0.1);
        assert!((view.span() - 90.0).abs() < 1e-9);
        let mut view = self::view();
        view.zoom(600.0, ZoomDirection::Out, 0.1);
        assert!((view.span() - 110.0).abs() < 1e-9);
    }

    #[test]
    fn wheel_direction_mapping() {
        assert_eq!(ZoomDirection::from_wheel(-3.0), Some(ZoomDirection::In));
        assert_eq!(ZoomDirection::from_wheel(120.0), Some(ZoomDirection::Out));
        assert_eq!(ZoomDirection::from_wheel(0.0), None);
    }

    #[test]
    fn fetch_range_pads_both_sides() {
        assert_eq!(view().fetch_range(0.25), (1775.0, 1925.0));
    }

    #[test]
    fn contains_year_is_inclusive() {
        let view = view();
        assert!(view.contains_year(1800));
        assert!(view.contains_year(1900));
        assert!(!view.contains_year(1901));
    }

    proptest! {
        #[test]
        fn pan_keeps_span(
            min_year in -3_000.0f64..3_000.0,
            span in 1.0f64..1_000.0,
            drags in prop::collection::vec(-2_000.0f64..2_000.0, 1..8),
        ) {
            let mut view = ViewWindow::new(min_year, min_year + span, -200.0, 1400.0, 680.0);
            for dx in drags {
                view.pan(dx);
            }
            prop_assert!((view.span() - span).abs() <= 1e-9 * (view.min_year.abs() + span + 1.0));
        }

        #[test]
        fn zoom_leaves_anchor_year_under_the_pointer(
            min_year in -3_000.0f64..3_000.0,
            span in 1.0f64..1_000.0,
            anchor_x in -200.0f64..1400.0,
            factor in 0.01f64..0.5,
            zoom_in in any::<bool>(),
        ) {
            let mut view = ViewWindow::new(min_year, min_year + span, -200.0, 1400.0, 680.0);
            let anchor_year = view.year_from_pixel(anchor_x);
            let direction = if zoom_in { ZoomDirection::In } else { ZoomDirection::Out };
            view.zoom(anchor_x, direction, factor);
            prop_assert!((view.pixel_from_year(anchor_year) - anchor_x).abs() < 1e-6);
            let expected = if zoom_in { span * (1.0 - factor) } else { span * (1.0 + factor) };
            prop_assert!((view.span() - expected).abs() <= 1e-9 * (min_year.abs() + span + 1.0));
        }
    }
}
