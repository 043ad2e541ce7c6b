//! Text blocks for timeline events: wrapping, importance-driven sizing and
//! collision-aware vertical stacking.

mod placement;
mod sizing;
mod text;

pub use placement::{LabelBox, Stacking, StackingPolicy, overlaps_x, overlaps_y, stack_y};
pub use sizing::LabelSizing;
pub use text::{event_lines, wrap_text};

use crate::error::MeasureError;
use crate::event::Event;
use crate::text_metrics::{FontSpec, TextMeasure};
use std::sync::Arc;

/// Wrapped, measured text for one event.
///
/// A label is immutable once built. Its position is not part of it: every
/// frame places labels afresh and records the result as
/// [`crate::layout::PlacedLabel`].
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    event: Arc<Event>,
    lines: Vec<String>,
    font: FontSpec,
    line_increment: f64,
    width: f64,
    height: f64,
}

impl Label {
    /// Wraps and measures `event` with the font its importance calls for.
    pub fn build(
        event: Arc<Event>,
        sizing: &LabelSizing,
        measure: &dyn TextMeasure,
    ) -> Result<Self, MeasureError> {
        let font = FontSpec::new(sizing.font_family.clone(), sizing.font_size(event.importance));
        let max_width = sizing.wrap_width(event.importance);
        let lines = event_lines(&event, max_width, |line| measure.text_width(line, &font))?;

        let mut widest = 0.0f64;
        for line in &lines {
            widest = widest.max(measure.text_width(line, &font)?);
        }
        let line_increment = measure.ascent_descent(&font)? + sizing.line_padding;
        let width = widest + sizing.horizontal_gap;
        let height = lines.len() as f64 * line_increment + sizing.vertical_gap;

        Ok(Self {
            event,
            lines,
            font,
            line_increment,
            width,
            height,
        })
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn font_size(&self) -> f64 {
        self.font.size
    }

    /// Distance between consecutive line tops.
    pub fn line_increment(&self) -> f64 {
        self.line_increment
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn importance(&self) -> f64 {
        self.event.importance
    }

    pub fn year(&self) -> i32 {
        self.event.year
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// 7px per character, 12px ascent + descent, at any size.
    pub(crate) struct FixedMeasurer;

    impl TextMeasure for FixedMeasurer {
        fn text_width(&self, text: &str, _font: &FontSpec) -> Result<f64, MeasureError> {
            Ok(text.chars().count() as f64 * 7.0)
        }

        fn ascent_descent(&self, _font: &FontSpec) -> Result<f64, MeasureError> {
            Ok(12.0)
        }
    }

    /// Fails on any text containing `!`.
    pub(crate) struct PickyMeasurer;

    impl TextMeasure for PickyMeasurer {
        fn text_width(&self, text: &str, font: &FontSpec) -> Result<f64, MeasureError> {
            if text.contains('!') {
                Err(MeasureError::FontUnavailable(font.family.clone()))
            } else {
                FixedMeasurer.text_width(text, font)
            }
        }

        fn ascent_descent(&self, font: &FontSpec) -> Result<f64, MeasureError> {
            FixedMeasurer.ascent_descent(font)
        }
    }
}
