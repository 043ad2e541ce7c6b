#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod label;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod scale;
pub mod source;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, TimelineConfig, load_config};
pub use controller::{Command, FetchOutcome, FetchRequest, TimelineController};
pub use error::{MeasureError, Result, TimelineError};
pub use event::{Event, EventKind};
pub use label::{Label, LabelSizing, StackingPolicy};
pub use layout::{FrameLayout, Surface, ViewWindow, ZoomDirection, compute_frame};
pub use render::render_svg;
pub use source::{EventSource, MemorySource};
pub use text_metrics::{FontSpec, TextMeasure};
pub use theme::Theme;
