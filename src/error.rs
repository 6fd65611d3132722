//! Error taxonomy shared by the scoring core, the stores and the CLI.
//!
//! Nothing in here is process-fatal. `main` prints the message and exits
//! non-zero; library callers can match on the variant to tell "rate more
//! songs" apart from "loosen the filters".

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the library.
pub type Result<T, E = RecommendError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RecommendError {
    /// Fewer ratings recorded than a recommendation needs.
    #[error("need at least {need} ratings to recommend, only {have} recorded")]
    InsufficientData { have: usize, need: usize },

    /// Missing or unknown genre, song, method, or count.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("rating {0} is outside the 1-5 range")]
    InvalidRating(f64),

    /// Every candidate was removed by the minimum-score filter.
    #[error("no recommendations matched the requested filters")]
    NoQualifyingResults,

    #[error("playlist '{0}' already exists")]
    DuplicatePlaylist(String),

    #[error("playlist '{0}' does not exist")]
    UnknownPlaylist(String),

    #[error("playlist '{0}' is empty")]
    EmptyPlaylist(String),

    /// Reading or writing one of the JSON files failed.
    #[error("failed to persist {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The background recommendation worker died before answering.
    #[error("recommendation worker failed: {0}")]
    Background(String),
}

impl RecommendError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence { path: path.into(), source }
    }

    /// True for the two "soft" outcomes a user can fix by rating more songs
    /// or relaxing the request.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::NoQualifyingResults)
    }
}
