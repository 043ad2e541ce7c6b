//! Where events come from.
//!
//! The controller only ever asks for "the most important events between two
//! years". [`MemorySource`] answers that from a table loaded once from a CSV
//! export or a JSON document; other backends implement [`EventSource`].

use crate::error::{Result, TimelineError};
use crate::event::{Event, RawEvent};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

pub trait EventSource {
    /// Up to `max_count` events whose year lies in `[start_year, end_year]`,
    /// most important first.
    fn events(&self, start_year: f64, end_year: f64, max_count: usize) -> Result<Vec<Event>>;

    /// Article text shown in the overlay for a clicked label, if the source
    /// has any.
    fn article_content(&self, _url: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    events: Vec<Event>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonEvents {
    List(Vec<RawEvent>),
    Wrapped { events: Vec<RawEvent> },
}

impl MemorySource {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Loads `.csv` or `.json` by extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        let source = match extension.as_deref() {
            Some("csv") => Self::load_csv(std::fs::File::open(path)?)?,
            Some("json") => Self::load_json(&std::fs::read_to_string(path)?)?,
            _ => return Err(TimelineError::UnsupportedFormat(path.display().to_string())),
        };
        log::info!("loaded {} events from {}", source.len(), path.display());
        Ok(source)
    }

    /// Reads a headered CSV table. Rows that cannot be turned into an event
    /// are skipped with a warning.
    pub fn load_csv<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut events = Vec::new();
        for (row, record) in reader.deserialize::<RawEvent>().enumerate() {
            let raw = match record {
                Ok(raw) => raw,
                Err(err) => {
                    log::warn!("skipping csv row {}: {err}", row + 1);
                    continue;
                }
            };
            match raw.resolve() {
                Ok(event) => events.push(event),
                Err(reason) => log::warn!("skipping csv row {}: {reason}", row + 1),
            }
        }
        Ok(Self { events })
    }

    /// Reads a JSON array of records, or an object with an `events` array.
    pub fn load_json(text: &str) -> Result<Self> {
        let raw = match serde_json::from_str::<JsonEvents>(text)? {
            JsonEvents::List(raw) | JsonEvents::Wrapped { events: raw } => raw,
        };
        let mut events = Vec::with_capacity(raw.len());
        for (idx, record) in raw.into_iter().enumerate() {
            match record.resolve() {
                Ok(event) => events.push(event),
                Err(reason) => log::warn!("skipping json record {idx}: {reason}"),
            }
        }
        Ok(Self { events })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn all(&self) -> &[Event] {
        &self.events
    }
}

impl EventSource for MemorySource {
    fn events(&self, start_year: f64, end_year: f64, max_count: usize) -> Result<Vec<Event>> {
        let mut selected: Vec<&Event> = self
            .events
            .iter()
            .filter(|event| {
                let year = f64::from(event.year);
                year >= start_year && year <= end_year
            })
            .collect();
        selected.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        selected.truncate(max_count);
        Ok(selected.into_iter().cloned().collect())
    }
}
