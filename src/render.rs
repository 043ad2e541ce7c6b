use crate::config::RenderConfig;
use crate::label::Label;
use crate::layout::{FrameLayout, PlacedLabel};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const TICK_RADIUS: f64 = 3.0;
/// Captions sit this far right of the band edge and above the axis.
const CAPTION_INSET: f64 = 5.0;

/// Draws one frame: bands, axis, ticks, labels, then band captions on top.
///
/// `labels` must be the slice the frame was computed from.
pub fn render_svg(frame: &FrameLayout, labels: &[Label], theme: &Theme) -> String {
    let mut svg = String::new();
    let width = frame.surface.width.max(1.0);
    let height = frame.surface.height.max(1.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    for band in &frame.bands {
        let fill = if band.shaded {
            &theme.band_color
        } else {
            &theme.band_alt_color
        };
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"0\" width=\"{:.2}\" height=\"{height}\" fill=\"{fill}\"/>",
            band.x, band.width_px
        ));
    }

    svg.push_str(&format!(
        "<line x1=\"0\" y1=\"{y:.2}\" x2=\"{width}\" y2=\"{y:.2}\" stroke=\"{}\" stroke-width=\"1.5\"/>",
        theme.axis_color,
        y = frame.timeline_y
    ));

    for placed in &frame.labels {
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{TICK_RADIUS}\" fill=\"{}\"/>",
            placed.bounds.x, frame.timeline_y, theme.tick_color
        ));
    }

    for placed in &frame.labels {
        let Some(label) = labels.get(placed.label) else {
            continue;
        };
        svg.push_str(&label_svg(placed, label, theme));
    }

    for band in &frame.bands {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            band.x + CAPTION_INSET,
            frame.timeline_y - CAPTION_INSET,
            escape_xml(&theme.year_font_family),
            theme.year_font_size,
            theme.year_text_color,
            escape_xml(&band.caption)
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn label_svg(placed: &PlacedLabel, label: &Label, theme: &Theme) -> String {
    let bounds = placed.bounds;
    let mut text = String::new();
    if placed.hovered {
        text.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"3\" ry=\"3\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            bounds.left(),
            bounds.y,
            bounds.width,
            bounds.height,
            theme.hover_fill,
            theme.hover_border
        ));
    }

    let x = bounds.x;
    let first_baseline = bounds.y + label.font_size();
    text.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{first_baseline:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        escape_xml(&label.font().family),
        label.font_size(),
        author_color(label.event().color_key())
    ));
    for (idx, line) in label.lines().iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { label.line_increment() };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

/// Stable text colour for an author: the low 24 bits of the djb2 hash over
/// UTF-16 code units, so browser-drawn timelines pick the same colours.
pub fn author_color(key: &str) -> String {
    let hash = key
        .encode_utf16()
        .fold(5381u32, |hash, unit| hash.wrapping_mul(33).wrapping_add(u32::from(unit)));
    format!("#{:06x}", hash & 0x00FF_FFFF)
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = primary_family(&theme.font_family);
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(1200.0, 800.0))
        .ok_or_else(|| anyhow::anyhow!("invalid output size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    log::info!("wrote {}x{} png to {}", size.width(), size.height(), output.display());
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    anyhow::bail!("png output needs the `png` feature")
}

#[cfg(feature = "png")]
fn primary_family(css: &str) -> String {
    css.split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .filter(|family| !family.is_empty())
        .unwrap_or_else(|| "serif".to_string())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
