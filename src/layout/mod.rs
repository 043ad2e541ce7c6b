mod bands;
mod view;

pub use bands::{Band, band_width, compute_bands};
pub use view::{ViewWindow, ZoomDirection};

use crate::config::TimelineConfig;
use crate::label::{Label, LabelBox, Stacking, stack_y};
use serde::Serialize;

/// Drawing surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// y of the timeline axis.
    pub fn timeline_y(&self, config: &TimelineConfig) -> f64 {
        self.height - config.timeline_offset
    }

    /// View a fresh timeline starts with: the configured years spread over
    /// the surface plus the overscan on each side.
    pub fn initial_view(&self, config: &TimelineConfig) -> ViewWindow {
        ViewWindow::new(
            config.initial_min_year,
            config.initial_max_year,
            -config.pixel_overscan,
            self.width + config.pixel_overscan,
            self.timeline_y(config) - config.label_base_gap,
        )
    }
}

/// Where one label ended up in a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLabel {
    /// Index into the label slice the frame was computed from.
    pub label: usize,
    #[serde(flatten)]
    pub bounds: LabelBox,
    pub hovered: bool,
}

/// Output of one layout pass: everything the renderer needs besides the
/// label text itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameLayout {
    pub view: ViewWindow,
    pub surface: Surface,
    pub timeline_y: f64,
    pub band_width: f64,
    pub bands: Vec<Band>,
    /// In placement order: most important first.
    pub labels: Vec<PlacedLabel>,
}

impl FrameLayout {
    /// Topmost-drawn label under the point. Labels placed later are drawn
    /// later, so the search runs back to front.
    pub fn label_at(&self, px: f64, py: f64) -> Option<&PlacedLabel> {
        self.labels
            .iter()
            .rev()
            .find(|placed| placed.bounds.contains_point(px, py))
    }
}

/// Visible labels in placement order.
///
/// Labels whose event year lies in the visible range are kept and sorted by
/// importance, highest first. The sort is stable: equal importance keeps the
/// input order. Placement results depend on this order.
pub fn placement_order(labels: &[Label], view: &ViewWindow) -> Vec<usize> {
    let mut order: Vec<usize> = (0..labels.len())
        .filter(|&idx| view.contains_year(labels[idx].year()))
        .collect();
    order.sort_by(|&a, &b| labels[b].importance().total_cmp(&labels[a].importance()));
    order
}

/// Runs the per-frame pipeline: filter, sort, place each label against the
/// ones already shown, and lay out the background bands.
pub fn compute_frame(
    labels: &[Label],
    view: &ViewWindow,
    surface: Surface,
    pointer: Option<(f64, f64)>,
    config: &TimelineConfig,
) -> FrameLayout {
    let stacking = Stacking {
        policy: config.stacking,
        margin: config.stack_margin,
        fill_budget: config.fill_budget,
    };

    let order = placement_order(labels, view);
    let mut shown: Vec<LabelBox> = Vec::with_capacity(order.len());
    let mut placed = Vec::with_capacity(order.len());
    for idx in order {
        let label = &labels[idx];
        let x = view.pixel_from_year(label.event().fractional_year());
        let y = stack_y(x, label.width(), label.height(), &shown, view.baseline_y, &stacking);
        let bounds = LabelBox {
            x,
            y,
            width: label.width(),
            height: label.height(),
        };
        let hovered = pointer.is_some_and(|(px, py)| bounds.contains_point(px, py));
        shown.push(bounds);
        placed.push(PlacedLabel {
            label: idx,
            bounds,
            hovered,
        });
    }

    let bands = compute_bands(view, &config.band_candidates);
    FrameLayout {
        view: *view,
        surface,
        timeline_y: surface.timeline_y(config),
        band_width: bands
            .first()
            .map(|band| band.width_years)
            .unwrap_or_else(|| band_width(view.span(), &config.band_candidates)),
        bands,
        labels: placed,
    }
}
