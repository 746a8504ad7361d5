//! Error types for habitree

use std::path::PathBuf;

/// Errors surfaced by the tracker and the storage layer.
///
/// Loading never produces one of these (a bad data file falls back to
/// defaults); they come from saving, importing, and mutators given bad input.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid habit data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no habit matches `{0}`")]
    HabitNotFound(String),

    #[error("`{query}` matches {count} habits; use the habit id")]
    AmbiguousHabit { query: String, count: usize },

    #[error("habit name must not be blank")]
    InvalidName,

    #[error("days to show must be 7, 14 or 30 (got {0})")]
    InvalidDaysToShow(u32),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
