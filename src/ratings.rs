//! In-memory, append-only rating store.
//!
//! The store never updates or removes an entry. Lookups are linear scans,
//! which is fine at the catalog's scale (tens of ratings).

use crate::catalog::SongId;
use chrono::{DateTime, Local};
use log::trace;
use std::collections::HashSet;

/// Identifier of a (local) user. The application has exactly one, but the
/// store and the factorization model key on it like any other dimension.
pub type UserId = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub user_id: UserId,
    pub song_id: SongId,
    /// 1.0 to 5.0 inclusive; enforced by the caller, not the store.
    pub rating: f64,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, Default)]
pub struct RatingStore {
    entries: Vec<Rating>,
}

impl RatingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one rating.
    pub fn record(&mut self, user_id: UserId, song_id: SongId, rating: f64, timestamp: DateTime<Local>) {
        trace!("Recording rating {rating} for song {song_id} by user {user_id}");
        self.entries.push(Rating { user_id, song_id, rating, timestamp });
    }

    /// Total number of entries across all users and songs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Song ids already rated by `user_id`.
    #[must_use]
    pub fn ratings_for_user(&self, user_id: UserId) -> HashSet<SongId> {
        self.entries
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.song_id)
            .collect()
    }

    /// Every entry, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[Rating] {
        &self.entries
    }

    /// Raw rating values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|r| r.rating)
    }
}
