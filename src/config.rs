use crate::error::{Result, TimelineError};
use crate::label::StackingPolicy;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BAND_CANDIDATES: [f64; 6] = [100.0, 50.0, 25.0, 10.0, 5.0, 2.0];

/// Label geometry, view behaviour and data-refresh knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub min_importance: f64,
    pub max_importance: f64,
    pub min_font_size: f64,
    pub max_font_size: f64,
    pub min_wrap_width: f64,
    pub max_wrap_width: f64,
    /// Added to the widest line.
    pub horizontal_gap: f64,
    /// Added below the last line.
    pub vertical_gap: f64,
    /// Added to ascent + descent to get the line increment.
    pub line_padding: f64,
    /// Gap kept between a label and the one it is stacked on.
    pub stack_margin: f64,
    pub stacking: StackingPolicy,
    /// How far above the baseline fill stacking may look for a free slot.
    pub fill_budget: f64,
    pub zoom_factor: f64,
    /// Fraction of the visible span fetched beyond each edge.
    pub fetch_padding: f64,
    pub max_events: usize,
    pub band_candidates: Vec<f64>,
    pub initial_min_year: f64,
    pub initial_max_year: f64,
    /// Pixels the year range extends past each side of the surface.
    pub pixel_overscan: f64,
    /// Distance of the timeline axis from the bottom of the surface.
    pub timeline_offset: f64,
    /// Distance of the label baseline above the axis.
    pub label_base_gap: f64,
    pub click_threshold_sq: f64,
    pub tap_threshold: f64,
    pub fast_text_metrics: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            min_importance: 0.0,
            max_importance: 20_000.0,
            min_font_size: 11.0,
            max_font_size: 22.0,
            min_wrap_width: 120.0,
            max_wrap_width: 150.0,
            horizontal_gap: 8.0,
            vertical_gap: 4.0,
            line_padding: 2.0,
            stack_margin: 10.0,
            stacking: StackingPolicy::Strict,
            fill_budget: 600.0,
            zoom_factor: 0.1,
            fetch_padding: 0.25,
            max_events: 1000,
            band_candidates: BAND_CANDIDATES.to_vec(),
            initial_min_year: 1800.0,
            initial_max_year: 1900.0,
            pixel_overscan: 200.0,
            timeline_offset: 115.0,
            label_base_gap: 5.0,
            click_threshold_sq: 1.0,
            tap_threshold: 10.0,
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub timeline: TimelineConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            timeline: TimelineConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    year_font_family: Option<String>,
    year_font_size: Option<f32>,
    year_text_color: Option<String>,
    band_color: Option<String>,
    band_alt_color: Option<String>,
    axis_color: Option<String>,
    tick_color: Option<String>,
    hover_fill: Option<String>,
    hover_border: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TimelineConfigFile {
    min_importance: Option<f64>,
    max_importance: Option<f64>,
    min_font_size: Option<f64>,
    max_font_size: Option<f64>,
    min_wrap_width: Option<f64>,
    max_wrap_width: Option<f64>,
    horizontal_gap: Option<f64>,
    vertical_gap: Option<f64>,
    line_padding: Option<f64>,
    stack_margin: Option<f64>,
    stacking: Option<StackingPolicy>,
    fill_budget: Option<f64>,
    zoom_factor: Option<f64>,
    fetch_padding: Option<f64>,
    max_events: Option<usize>,
    band_candidates: Option<Vec<f64>>,
    min_year: Option<f64>,
    max_year: Option<f64>,
    pixel_overscan: Option<f64>,
    timeline_offset: Option<f64>,
    label_base_gap: Option<f64>,
    click_threshold_sq: Option<f64>,
    tap_threshold: Option<f64>,
    fast_text_metrics: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    timeline: Option<TimelineConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        log::info!("using default configuration");
        return Ok(Config::default());
    };
    log::info!("loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a config document. Plain JSON is tried first; JSON5 (comments,
/// trailing commas, unquoted keys) is accepted as a fallback.
pub fn parse_config(contents: &str) -> Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents).map_err(|json5_err| {
            TimelineError::Config(format!("{json_err}; as JSON5: {json5_err}"))
        })?,
    };

    let mut config = Config::default();
    if let Some(name) = parsed.theme.as_deref() {
        match Theme::by_name(name) {
            Some(theme) => config.theme = theme,
            None => log::warn!("unknown theme `{name}`, keeping the default"),
        }
    }
    if let Some(vars) = parsed.theme_variables {
        apply_theme_variables(&mut config.theme, vars);
    }
    if let Some(timeline) = parsed.timeline {
        apply_timeline(&mut config.timeline, timeline);
    }
    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
    }
    config.render.background = config.theme.background.clone();
    validate(&config.timeline)?;
    Ok(config)
}

fn apply_theme_variables(theme: &mut Theme, vars: ThemeVariables) {
    if let Some(v) = vars.font_family {
        theme.font_family = v;
    }
    if let Some(v) = vars.year_font_family {
        theme.year_font_family = v;
    }
    if let Some(v) = vars.year_font_size {
        theme.year_font_size = v;
    }
    if let Some(v) = vars.year_text_color {
        theme.year_text_color = v;
    }
    if let Some(v) = vars.band_color {
        theme.band_color = v;
    }
    if let Some(v) = vars.band_alt_color {
        theme.band_alt_color = v;
    }
    if let Some(v) = vars.axis_color {
        theme.axis_color = v;
    }
    if let Some(v) = vars.tick_color {
        theme.tick_color = v;
    }
    if let Some(v) = vars.hover_fill {
        theme.hover_fill = v;
    }
    if let Some(v) = vars.hover_border {
        theme.hover_border = v;
    }
    if let Some(v) = vars.background {
        theme.background = v;
    }
}

fn apply_timeline(config: &mut TimelineConfig, file: TimelineConfigFile) {
    if let Some(v) = file.min_importance {
        config.min_importance = v;
    }
    if let Some(v) = file.max_importance {
        config.max_importance = v;
    }
    if let Some(v) = file.min_font_size {
        config.min_font_size = v;
    }
    if let Some(v) = file.max_font_size {
        config.max_font_size = v;
    }
    if let Some(v) = file.min_wrap_width {
        config.min_wrap_width = v;
    }
    if let Some(v) = file.max_wrap_width {
        config.max_wrap_width = v;
    }
    if let Some(v) = file.horizontal_gap {
        config.horizontal_gap = v;
    }
    if let Some(v) = file.vertical_gap {
        config.vertical_gap = v;
    }
    if let Some(v) = file.line_padding {
        config.line_padding = v;
    }
    if let Some(v) = file.stack_margin {
        config.stack_margin = v;
    }
    if let Some(v) = file.stacking {
        config.stacking = v;
    }
    if let Some(v) = file.fill_budget {
        config.fill_budget = v;
    }
    if let Some(v) = file.zoom_factor {
        config.zoom_factor = v;
    }
    if let Some(v) = file.fetch_padding {
        config.fetch_padding = v;
    }
    if let Some(v) = file.max_events {
        config.max_events = v;
    }
    if let Some(v) = file.band_candidates {
        config.band_candidates = v;
    }
    if let Some(v) = file.min_year {
        config.initial_min_year = v;
    }
    if let Some(v) = file.max_year {
        config.initial_max_year = v;
    }
    if let Some(v) = file.pixel_overscan {
        config.pixel_overscan = v;
    }
    if let Some(v) = file.timeline_offset {
        config.timeline_offset = v;
    }
    if let Some(v) = file.label_base_gap {
        config.label_base_gap = v;
    }
    if let Some(v) = file.click_threshold_sq {
        config.click_threshold_sq = v;
    }
    if let Some(v) = file.tap_threshold {
        config.tap_threshold = v;
    }
    if let Some(v) = file.fast_text_metrics {
        config.fast_text_metrics = v;
    }
}

fn validate(config: &TimelineConfig) -> Result<()> {
    if config.initial_max_year <= config.initial_min_year {
        return Err(TimelineError::Config(format!(
            "maxYear ({}) must be greater than minYear ({})",
            config.initial_max_year, config.initial_min_year
        )));
    }
    if config.max_font_size < config.min_font_size || config.min_font_size <= 0.0 {
        return Err(TimelineError::Config(
            "font sizes must be positive with minFontSize <= maxFontSize".to_string(),
        ));
    }
    if !(0.0..1.0).contains(&config.zoom_factor) {
        return Err(TimelineError::Config(format!(
            "zoomFactor must be in [0, 1), got {}",
            config.zoom_factor
        )));
    }
    if config.band_candidates.iter().any(|width| *width <= 0.0) {
        return Err(TimelineError::Config(
            "bandCandidates must all be positive".to_string(),
        ));
    }
    Ok(())
}
