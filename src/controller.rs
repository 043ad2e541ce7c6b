//! Interactive timeline state: view window, current labels, pointer state and
//! data refresh bookkeeping.
//!
//! The controller performs no I/O. Input handlers return [`Command`]s for the
//! host to carry out: redraw, fetch events for a year range, open a link or
//! dismiss the article overlay. Fetch results come back through
//! [`TimelineController::apply_fetch`] tagged with the sequence number of the
//! request they answer, and anything older than the newest applied response
//! is dropped.

use crate::config::TimelineConfig;
use crate::error::TimelineError;
use crate::event::Event;
use crate::label::{Label, LabelSizing};
use crate::layout::{FrameLayout, Surface, ViewWindow, ZoomDirection, compute_frame};
use crate::text_metrics::TextMeasure;
use crate::theme::Theme;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Redraw,
    Fetch(FetchRequest),
    OpenLink(String),
    DismissOverlay,
}

/// Events wanted for `[start_year, end_year]`, most important first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchRequest {
    pub seq: u64,
    pub start_year: f64,
    pub end_year: f64,
    pub max_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Labels were replaced; `labels` of `events` could be measured.
    Applied { events: usize, labels: usize },
    /// A newer response was already applied.
    Stale,
    /// The fetch failed; the previous labels stay.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    kind: PointerKind,
    start: (f64, f64),
    previous: (f64, f64),
}

pub struct TimelineController {
    config: TimelineConfig,
    sizing: LabelSizing,
    measure: Box<dyn TextMeasure>,
    surface: Surface,
    view: ViewWindow,
    events: Vec<Arc<Event>>,
    labels: Vec<Label>,
    pointer: Option<(f64, f64)>,
    drag: Option<Drag>,
    next_seq: u64,
    newest_response: Option<u64>,
    last_frame: Option<FrameLayout>,
}

impl std::fmt::Debug for TimelineController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineController")
            .field("view", &self.view)
            .field("surface", &self.surface)
            .field("events", &self.events.len())
            .field("labels", &self.labels.len())
            .field("next_seq", &self.next_seq)
            .field("newest_response", &self.newest_response)
            .finish_non_exhaustive()
    }
}

impl TimelineController {
    pub fn new(
        config: TimelineConfig,
        theme: &Theme,
        surface: Surface,
        measure: Box<dyn TextMeasure>,
    ) -> Self {
        let sizing = LabelSizing::new(&config, theme);
        let view = surface.initial_view(&config);
        Self {
            config,
            sizing,
            measure,
            surface,
            view,
            events: Vec::new(),
            labels: Vec::new(),
            pointer: None,
            drag: None,
            next_seq: 0,
            newest_response: None,
            last_frame: None,
        }
    }

    pub fn view(&self) -> &ViewWindow {
        &self.view
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn events(&self) -> &[Arc<Event>] {
        &self.events
    }

    pub fn last_frame(&self) -> Option<&FrameLayout> {
        self.last_frame.as_ref()
    }

    /// Initial load: draw the empty timeline and fetch the first window.
    pub fn start(&mut self) -> Vec<Command> {
        vec![Command::Redraw, Command::Fetch(self.fetch_request())]
    }

    /// Lays out the current labels and remembers the result for hit testing.
    pub fn frame(&mut self) -> &FrameLayout {
        let frame = compute_frame(&self.labels, &self.view, self.surface, self.pointer, &self.config);
        self.last_frame.insert(frame)
    }

    /// Replaces the event set if `seq` answers a request newer than any
    /// response applied so far.
    pub fn apply_fetch(
        &mut self,
        seq: u64,
        result: Result<Vec<Event>, TimelineError>,
    ) -> FetchOutcome {
        if self.newest_response.is_some_and(|newest| seq <= newest) {
            log::debug!("dropping stale fetch response #{seq}");
            return FetchOutcome::Stale;
        }
        self.newest_response = Some(seq);
        match result {
            Ok(events) => {
                self.events = events.into_iter().map(Arc::new).collect();
                self.rebuild_labels();
                log::debug!(
                    "fetch #{seq}: {} events, {} labels",
                    self.events.len(),
                    self.labels.len()
                );
                FetchOutcome::Applied {
                    events: self.events.len(),
                    labels: self.labels.len(),
                }
            }
            Err(err) => {
                log::warn!("fetch #{seq} failed, keeping current labels: {err}");
                FetchOutcome::Failed
            }
        }
    }

    /// Changes the importance range that drives font sizes and re-measures
    /// the current events without fetching.
    pub fn set_importance_range(&mut self, min_importance: f64, max_importance: f64) -> Vec<Command> {
        self.config.min_importance = min_importance;
        self.config.max_importance = max_importance;
        self.sizing.min_importance = min_importance;
        self.sizing.max_importance = max_importance;
        self.rebuild_labels();
        vec![Command::Redraw]
    }

    /// The surface changed size; the pixel range follows it and the axis
    /// baseline is re-derived.
    pub fn resize(&mut self, width: f64, height: f64) -> Vec<Command> {
        let old_timeline_y = self.surface.timeline_y(&self.config);
        self.surface = Surface::new(width, height);
        self.view
            .set_pixel_range(-self.config.pixel_overscan, width + self.config.pixel_overscan);
        self.view
            .shift_baseline(self.surface.timeline_y(&self.config) - old_timeline_y);
        vec![Command::Redraw]
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> Vec<Command> {
        self.begin_drag(PointerKind::Mouse, x, y);
        Vec::new()
    }

    pub fn touch_start(&mut self, x: f64, y: f64) -> Vec<Command> {
        self.begin_drag(PointerKind::Touch, x, y);
        Vec::new()
    }

    /// Drags pan the view; plain moves update hover.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Vec<Command> {
        if self.drag.is_some() {
            return self.drag_to(x, y);
        }
        let before = self.hovered_label();
        self.pointer = Some((x, y));
        if self.hovered_label() != before {
            vec![Command::Redraw]
        } else {
            Vec::new()
        }
    }

    pub fn touch_move(&mut self, x: f64, y: f64) -> Vec<Command> {
        if self.drag.is_some_and(|drag| drag.kind == PointerKind::Touch) {
            self.drag_to(x, y)
        } else {
            Vec::new()
        }
    }

    /// Ends a drag. A release within the click threshold of the press is a
    /// click: it opens the clicked label's link, or dismisses the overlay
    /// when no label was hit.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Vec<Command> {
        let drag = self.drag.take();
        let Some(drag) = drag else {
            return Vec::new();
        };
        let dist_sq = (x - drag.start.0).powi(2) + (y - drag.start.1).powi(2);
        if dist_sq < self.config.click_threshold_sq {
            self.click(x, y)
        } else {
            Vec::new()
        }
    }

    pub fn touch_end(&mut self, x: f64, y: f64) -> Vec<Command> {
        let Some(drag) = self.drag.take() else {
            return Vec::new();
        };
        let distance = ((x - drag.start.0).powi(2) + (y - drag.start.1).powi(2)).sqrt();
        if distance < self.config.tap_threshold {
            self.click(x, y)
        } else {
            Vec::new()
        }
    }

    /// Pointer left the surface: the drag ends and nothing is hovered.
    pub fn pointer_leave(&mut self) -> Vec<Command> {
        self.drag = None;
        let had_hover = self.hovered_label().is_some();
        self.pointer = None;
        if had_hover { vec![Command::Redraw] } else { Vec::new() }
    }

    /// Zooms about the year under `x`. Negative `delta_y` (wheel up) zooms in.
    pub fn wheel(&mut self, x: f64, delta_y: f64) -> Vec<Command> {
        let Some(direction) = ZoomDirection::from_wheel(delta_y) else {
            return Vec::new();
        };
        self.zoom(x, direction)
    }

    pub fn zoom(&mut self, x: f64, direction: ZoomDirection) -> Vec<Command> {
        self.view.zoom(x, direction, self.config.zoom_factor);
        vec![Command::Redraw, Command::Fetch(self.fetch_request())]
    }

    /// Pans by a pixel delta as a drag would.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Vec<Command> {
        self.view.pan(dx);
        self.view.shift_baseline(dy);
        vec![Command::Redraw, Command::Fetch(self.fetch_request())]
    }

    /// Label under the point in the most recent frame.
    pub fn label_at(&self, x: f64, y: f64) -> Option<&Label> {
        let frame = self.last_frame.as_ref()?;
        let placed = frame.label_at(x, y)?;
        self.labels.get(placed.label)
    }

    fn begin_drag(&mut self, kind: PointerKind, x: f64, y: f64) {
        self.drag = Some(Drag {
            kind,
            start: (x, y),
            previous: (x, y),
        });
    }

    fn drag_to(&mut self, x: f64, y: f64) -> Vec<Command> {
        let Some(drag) = self.drag.as_mut() else {
            return Vec::new();
        };
        let dx = x - drag.previous.0;
        let dy = y - drag.previous.1;
        drag.previous = (x, y);
        self.pointer = Some((x, y));
        self.pan(dx, dy)
    }

    fn click(&self, x: f64, y: f64) -> Vec<Command> {
        let Some(label) = self.label_at(x, y) else {
            return vec![Command::DismissOverlay];
        };
        match &label.event().url {
            Some(url) => {
                log::info!("opening {url}");
                vec![Command::OpenLink(url.clone())]
            }
            None => Vec::new(),
        }
    }

    fn hovered_label(&self) -> Option<usize> {
        let (x, y) = self.pointer?;
        self.last_frame.as_ref()?.label_at(x, y).map(|placed| placed.label)
    }

    fn fetch_request(&mut self) -> FetchRequest {
        self.next_seq += 1;
        let (start_year, end_year) = self.view.fetch_range(self.config.fetch_padding);
        FetchRequest {
            seq: self.next_seq,
            start_year,
            end_year,
            max_count: self.config.max_events,
        }
    }

    fn rebuild_labels(&mut self) {
        let mut labels = Vec::with_capacity(self.events.len());
        for event in &self.events {
            match Label::build(Arc::clone(event), &self.sizing, self.measure.as_ref()) {
                Ok(label) => labels.push(label),
                Err(err) => log::warn!("skipping label for `{}`: {err}", event.display_title()),
            }
        }
        self.labels = labels;
        // Hit testing must see the new labels before the host redraws.
        self.frame();
    }
}
