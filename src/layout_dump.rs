use crate::label::Label;
use crate::layout::FrameLayout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f64,
    pub height: f64,
    pub min_year: f64,
    pub max_year: f64,
    pub timeline_y: f64,
    pub baseline_y: f64,
    pub band_width: f64,
    pub bands: Vec<BandDump>,
    pub labels: Vec<LabelDump>,
}

#[derive(Debug, Serialize)]
pub struct BandDump {
    pub start_year: f64,
    pub x: f64,
    pub width: f64,
    pub shaded: bool,
}

#[derive(Debug, Serialize)]
pub struct LabelDump {
    pub title: String,
    pub year: i32,
    pub importance: f64,
    pub font_size: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub lines: Vec<String>,
    pub hovered: bool,
    pub url: Option<String>,
}

impl LayoutDump {
    pub fn from_frame(frame: &FrameLayout, labels: &[Label]) -> Self {
        let bands = frame
            .bands
            .iter()
            .map(|band| BandDump {
                start_year: band.start_year,
                x: band.x,
                width: band.width_px,
                shaded: band.shaded,
            })
            .collect();

        let labels = frame
            .labels
            .iter()
            .filter_map(|placed| {
                let label = labels.get(placed.label)?;
                Some(LabelDump {
                    title: label.event().display_title().to_string(),
                    year: label.year(),
                    importance: label.importance(),
                    font_size: label.font_size(),
                    x: placed.bounds.x,
                    y: placed.bounds.y,
                    width: placed.bounds.width,
                    height: placed.bounds.height,
                    lines: label.lines().to_vec(),
                    hovered: placed.hovered,
                    url: label.event().url.clone(),
                })
            })
            .collect();

        LayoutDump {
            width: frame.surface.width,
            height: frame.surface.height,
            min_year: frame.view.min_year,
            max_year: frame.view.max_year,
            timeline_y: frame.timeline_y,
            baseline_y: frame.view.baseline_y,
            band_width: frame.band_width,
            bands,
            labels,
        }
    }
}

pub fn write_layout_dump(path: &Path, frame: &FrameLayout, labels: &[Label]) -> anyhow::Result<()> {
    let dump = LayoutDump::from_frame(frame, labels);
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
