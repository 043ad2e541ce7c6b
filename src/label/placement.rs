use serde::{Deserialize, Serialize};

/// How a label picks its vertical slot among already placed labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackingPolicy {
    /// Always sit above the topmost label this one overlaps horizontally.
    #[default]
    Strict,
    /// Take the lowest free slot near the baseline, falling back to
    /// [`StackingPolicy::Strict`] when nothing fits.
    Fill,
}

/// Stacking parameters for one placement pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stacking {
    pub policy: StackingPolicy,
    /// Gap kept between a label and the one it is stacked on.
    pub margin: f64,
    /// How far above the baseline fill stacking may go.
    pub fill_budget: f64,
}

/// Pixel box of a placed label: horizontally centred on `x`, top at `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LabelBox {
    pub fn left(&self) -> f64 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn overlaps_x(&self, other: &LabelBox) -> bool {
        overlaps_x(self.x, self.width, other.x, other.width)
    }

    pub fn overlaps_y(&self, other: &LabelBox) -> bool {
        overlaps_y(self.y, self.height, other.y, other.height)
    }

    /// Inclusive hit test.
    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        px >= self.left() && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

pub fn overlaps_x(x1: f64, width1: f64, x2: f64, width2: f64) -> bool {
    (x1 - x2).abs() < (width1 + width2) / 2.0
}

/// Centre distance below half the summed heights, for top-anchored boxes.
pub fn overlaps_y(y1: f64, height1: f64, y2: f64, height2: f64) -> bool {
    (y1 - y2 + (height1 - height2) / 2.0).abs() < (height1 + height2) / 2.0
}

/// Top of a `width × height` label anchored at `x`, stacked against
/// `placed` above `baseline`.
///
/// Only labels overlapping in x are considered. The result never overlaps any
/// of them vertically, whichever policy is selected.
pub fn stack_y(
    x: f64,
    width: f64,
    height: f64,
    placed: &[LabelBox],
    baseline: f64,
    stacking: &Stacking,
) -> f64 {
    match stacking.policy {
        StackingPolicy::Strict => strict_y(x, width, height, placed, baseline, stacking.margin),
        StackingPolicy::Fill => fill_y(x, width, height, placed, baseline, stacking),
    }
}

fn strict_y(x: f64, width: f64, height: f64, placed: &[LabelBox], baseline: f64, margin: f64) -> f64 {
    let topmost = placed
        .iter()
        .filter(|other| overlaps_x(x, width, other.x, other.width))
        .map(|other| other.y)
        .reduce(f64::min);
    match topmost {
        Some(top) => top - height - margin,
        None => baseline - height,
    }
}

fn fill_y(x: f64, width: f64, height: f64, placed: &[LabelBox], baseline: f64, stacking: &Stacking) -> f64 {
    let neighbours: Vec<&LabelBox> = placed
        .iter()
        .filter(|other| overlaps_x(x, width, other.x, other.width))
        .collect();
    if neighbours.is_empty() {
        return baseline - height;
    }

    let ceiling = baseline - stacking.fill_budget;
    let mut slots: Vec<f64> = Vec::with_capacity(neighbours.len() + 1);
    slots.push(baseline - height);
    slots.extend(neighbours.iter().map(|other| other.y - height - stacking.margin));
    // Nearest the baseline first; the sort is stable so equal slots keep
    // placement order.
    slots.sort_by(|a, b| b.total_cmp(a));

    slots
        .into_iter()
        .filter(|y| *y >= ceiling)
        .find(|y| {
            neighbours
                .iter()
                .all(|other| !overlaps_y(*y, height, other.y, other.height))
        })
        .unwrap_or_else(|| strict_y(x, width, height, placed, baseline, stacking.margin))
}
