use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid filters: {}", .0.join(", "))]
    InvalidFilter(Vec<String>),

    #[error("filter keys given more than once: {}", .0.join(", "))]
    RepeatedFilter(Vec<String>),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("a parking spot already exists at this position: {0}")]
    DuplicateId(String),

    #[error("parking spot not found: {0}")]
    NotFound(String),

    #[error("no updatable property provided (allowed: name, access, fee, surface)")]
    NoUpdatableFields,

    #[error("failed to persist changes: {0}")]
    Persist(String),

    #[error("store busy: mutation lock not acquired within {0:?}")]
    Busy(Duration),

    #[error("backing document is corrupt: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether resubmitting the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Persist(_) | Self::Busy(_))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
