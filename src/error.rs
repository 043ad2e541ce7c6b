use thiserror::Error;

/// Failure to measure a run of text on the current surface.
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("no usable font face for family `{0}`")]
    FontUnavailable(String),
    #[error("text measurer cache is poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported event file `{0}` (expected .csv or .json)")]
    UnsupportedFormat(String),
    #[error("event source unavailable: {0}")]
    Source(String),
}

pub type Result<T, E = TimelineError> = std::result::Result<T, E>;
