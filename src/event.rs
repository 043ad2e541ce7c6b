use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DAYS_PER_YEAR: f64 = 365.0;
/// Day used when a record only knows its year.
pub const MID_YEAR_DAY: f64 = 183.0;

static YEAR_IN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").expect("year pattern is valid")
});
static BEFORE_COMMON_ERA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(bc|bce)\b").expect("era pattern is valid"));

/// What an event displays. Resolved once when a record is ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A creative work: rendered as title lines followed by "Author, Year".
    Work { title: String, author: String },
    /// Anything else: rendered as description lines followed by the year.
    Occurrence { description: String },
}

/// Catalogue metadata carried along from the source records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub pubdate: Option<String>,
    pub genre: Option<String>,
    pub country: Option<String>,
    pub in_links: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub year: i32,
    pub day_in_year: f64,
    /// Drives font size and placement priority (article length for works).
    pub importance: f64,
    pub url: Option<String>,
    #[serde(default)]
    pub details: EventDetails,
}

impl Event {
    pub fn work(title: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self::new(
            EventKind::Work {
                title: title.into(),
                author: author.into(),
            },
            year,
        )
    }

    pub fn occurrence(description: impl Into<String>, year: i32) -> Self {
        Self::new(
            EventKind::Occurrence {
                description: description.into(),
            },
            year,
        )
    }

    fn new(kind: EventKind, year: i32) -> Self {
        Self {
            kind,
            year,
            day_in_year: MID_YEAR_DAY,
            importance: 0.0,
            url: None,
            details: EventDetails::default(),
        }
    }

    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_day(mut self, day_in_year: f64) -> Self {
        self.day_in_year = day_in_year;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Year plus the elapsed fraction of it; the value the x axis maps.
    pub fn fractional_year(&self) -> f64 {
        f64::from(self.year) + self.day_in_year / DAYS_PER_YEAR
    }

    /// Key used to pick a stable text colour: the author for works.
    pub fn color_key(&self) -> &str {
        match &self.kind {
            EventKind::Work { author, .. } => author,
            EventKind::Occurrence { description } => description,
        }
    }

    pub fn display_title(&self) -> &str {
        match &self.kind {
            EventKind::Work { title, .. } => title,
            EventKind::Occurrence { description } => description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    #[error("record has neither title/author nor description")]
    MissingText,
    #[error("record has no recognisable year")]
    MissingYear,
}

/// A loosely typed record as it appears in CSV exports or JSON responses.
///
/// Field presence decides the event kind: a record with an author becomes a
/// [`EventKind::Work`], anything with only a description becomes an
/// [`EventKind::Occurrence`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    #[serde(alias = "Title")]
    pub title: Option<String>,
    #[serde(alias = "Author")]
    pub author: Option<String>,
    #[serde(alias = "Description")]
    pub description: Option<String>,
    #[serde(alias = "Year")]
    pub year: Option<NumberOrString>,
    pub day_in_year: Option<NumberOrString>,
    #[serde(alias = "Date")]
    pub date: Option<String>,
    pub pubdate: Option<String>,
    pub genre: Option<String>,
    pub country: Option<String>,
    pub in_links: Option<NumberOrString>,
    pub article_length: Option<NumberOrString>,
    pub importance: Option<NumberOrString>,
    #[serde(alias = "URL", alias = "url")]
    pub page_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrString::Number(val) => Some(*val).filter(|v| v.is_finite()),
            NumberOrString::String(val) => val.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            NumberOrString::Number(_) => None,
            NumberOrString::String(val) => Some(val.as_str()),
        }
    }
}

impl RawEvent {
    pub fn resolve(self) -> Result<Event, RejectReason> {
        let year = self.resolve_year().ok_or(RejectReason::MissingYear)?;
        let day_in_year = self
            .day_in_year
            .as_ref()
            .and_then(NumberOrString::as_f64)
            .filter(|day| (0.0..=366.0).contains(day))
            .unwrap_or(MID_YEAR_DAY);
        let importance = self
            .article_length
            .as_ref()
            .or(self.importance.as_ref())
            .and_then(NumberOrString::as_f64)
            .unwrap_or(0.0)
            .max(0.0);
        let in_links = self
            .in_links
            .as_ref()
            .and_then(NumberOrString::as_f64)
            .filter(|v| *v >= 0.0)
            .map(|v| v as u64);

        let title = non_empty(self.title);
        let author = non_empty(self.author);
        let description = non_empty(self.description);
        let kind = match (author, title, description) {
            (Some(author), Some(title), _) => EventKind::Work { title, author },
            (Some(author), None, Some(description)) => EventKind::Work {
                title: description,
                author,
            },
            (None, Some(text), _) | (_, None, Some(text)) => EventKind::Occurrence { description: text },
            _ => return Err(RejectReason::MissingText),
        };

        Ok(Event {
            kind,
            year,
            day_in_year,
            importance,
            url: non_empty(self.page_url),
            details: EventDetails {
                pubdate: non_empty(self.pubdate),
                genre: non_empty(self.genre),
                country: non_empty(self.country),
                in_links,
            },
        })
    }

    fn resolve_year(&self) -> Option<i32> {
        if let Some(year) = self.year.as_ref() {
            if let Some(value) = year.as_f64() {
                return Some(value.trunc() as i32);
            }
            if let Some(found) = year.as_text().and_then(extract_year) {
                return Some(found);
            }
        }
        self.pubdate
            .as_deref()
            .and_then(extract_year)
            .or_else(|| self.date.as_deref().and_then(extract_year))
    }
}

/// Pulls the first run of four digits out of a free-form date such as
/// `"28 January 1813"` or `"1813-01-28"`. A trailing `BC`/`BCE` negates it.
pub fn extract_year(text: &str) -> Option<i32> {
    let caps = YEAR_IN_TEXT.captures(text)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    if BEFORE_COMMON_ERA.is_match(text) {
        Some(-year)
    } else {
        Some(year)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn author_field_selects_work_kind() {
        let raw = RawEvent {
            title: text("Emma"),
            author: text("Jane Austen"),
            year: Some(NumberOrString::Number(1815.0)),
            article_length: Some(NumberOrString::String("6400".into())),
            ..Default::default()
        };
        let event = raw.resolve().unwrap();
        assert_eq!(
            event.kind,
            EventKind::Work {
                title: "Emma".into(),
                author: "Jane Austen".into()
            }
        );
        assert_eq!(event.year, 1815);
        assert_eq!(event.day_in_year, MID_YEAR_DAY);
        assert_eq!(event.importance, 6400.0);
    }

    #[test]
    fn description_only_selects_occurrence_kind() {
        let raw = RawEvent {
            description: text("Spinning jenny"),
            date: text("1764"),
            page_url: text("https://en.wikipedia.org/wiki/Spinning_jenny"),
            ..Default::default()
        };
        let event = raw.resolve().unwrap();
        assert!(matches!(event.kind, EventKind::Occurrence { .. }));
        assert_eq!(event.year, 1764);
        assert!(event.url.is_some());
    }

    #[test]
    fn year_is_repaired_from_pubdate() {
        let raw = RawEvent {
            title: text("Pride and Prejudice"),
            author: text("Jane Austen"),
            year: Some(NumberOrString::String("28 January 1813".into())),
            ..Default::default()
        };
        assert_eq!(raw.resolve().unwrap().year, 1813);

        let raw = RawEvent {
            title: text("Waverley"),
            author: text("Walter Scott"),
            pubdate: text("July 1814|1814-07-07|"),
            ..Default::default()
        };
        assert_eq!(raw.resolve().unwrap().year, 1814);
    }

    #[test]
    fn records_without_year_or_text_are_rejected() {
        let raw = RawEvent {
            title: text("Undated"),
            author: text("Anon"),
            ..Default::default()
        };
        assert_eq!(raw.resolve().unwrap_err(), RejectReason::MissingYear);

        let raw = RawEvent {
            author: text("  "),
            year: Some(NumberOrString::Number(1900.0)),
            ..Default::default()
        };
        assert_eq!(raw.resolve().unwrap_err(), RejectReason::MissingText);
    }

    #[test]
    fn extract_year_handles_eras_and_noise() {
        assert_eq!(extract_year("c. 3500 BC"), Some(-3500));
        assert_eq!(extract_year("published 1851 in London"), Some(1851));
        assert_eq!(extract_year("no digits"), None);
        assert_eq!(extract_year("12"), None);
    }

    #[test]
    fn fractional_year_adds_day_fraction() {
        let event = Event::work("Moby-Dick", "Herman Melville", 1851).with_day(73.0);
        assert!((event.fractional_year() - 1851.2).abs() < 1e-12);
    }
}
