use crate::config::TimelineConfig;
use crate::theme::Theme;

/// Importance-to-geometry mapping shared by every label of a refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSizing {
    pub font_family: String,
    pub min_importance: f64,
    pub max_importance: f64,
    pub min_font_size: f64,
    pub max_font_size: f64,
    pub min_wrap_width: f64,
    pub max_wrap_width: f64,
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
    pub line_padding: f64,
}

impl LabelSizing {
    pub fn new(config: &TimelineConfig, theme: &Theme) -> Self {
        Self {
            font_family: theme.font_family.clone(),
            min_importance: config.min_importance,
            max_importance: config.max_importance,
            min_font_size: config.min_font_size,
            max_font_size: config.max_font_size,
            min_wrap_width: config.min_wrap_width,
            max_wrap_width: config.max_wrap_width,
            horizontal_gap: config.horizontal_gap,
            vertical_gap: config.vertical_gap,
            line_padding: config.line_padding,
        }
    }

    /// Position of `importance` inside the configured range, in `[0, 1]`.
    ///
    /// Importance below the range maps to 0 and above it to 1; an empty or
    /// inverted range maps everything to 0.
    pub fn importance_ratio(&self, importance: f64) -> f64 {
        let span = self.max_importance - self.min_importance;
        if span <= 0.0 || !span.is_finite() || !importance.is_finite() {
            return 0.0;
        }
        let clamped = (importance - self.min_importance).clamp(0.0, span);
        clamped / span
    }

    /// Whole-pixel font size, monotonic non-decreasing in importance.
    pub fn font_size(&self, importance: f64) -> f64 {
        let ratio = self.importance_ratio(importance);
        (self.min_font_size + ratio * (self.max_font_size - self.min_font_size)).ceil()
    }

    /// Width lines are wrapped to; grows with importance like the font.
    pub fn wrap_width(&self, importance: f64) -> f64 {
        let ratio = self.importance_ratio(importance);
        self.min_wrap_width + ratio * (self.max_wrap_width - self.min_wrap_width)
    }
}
