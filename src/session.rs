//! The application context.
//!
//! A [`Session`] owns everything the scoring core reads: the catalog, the
//! rating store and the rating history. It is created once at start-up,
//! mutated only through [`Session::submit_rating`], and lends read-only
//! [`ScoringContext`]s to the strategies.
//!
//! Each CLI invocation is a fresh process, so [`Session::open`] rebuilds the
//! rating store by replaying the persisted history for the configured user.

use crate::algorithm::{Recommendation, ScoringContext};
use crate::catalog::{Catalog, SongId};
use crate::config::{RuntimeConfig, Settings};
use crate::error::{RecommendError, Result};
use crate::factorization::RATING_SCALE;
use crate::history::{HistoryStore, RatingHistoryEntry};
use crate::ratings::{RatingStore, UserId};
use crate::recommend::{self, RecommendationRequest};
use chrono::{DateTime, Local, TimeZone};
use log::{error, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug)]
pub struct Session {
    catalog: Arc<Catalog>,
    ratings: RatingStore,
    history: HistoryStore,
    settings: Settings,
}

/// A recommendation running on a worker thread.
#[derive(Debug)]
pub struct PendingRecommendation {
    handle: JoinHandle<Result<Vec<Recommendation>>>,
}

impl PendingRecommendation {
    /// Block until the worker answers.
    ///
    /// # Errors
    ///
    /// The worker's own error, or [`RecommendError::Background`] if it
    /// panicked.
    pub fn wait(self) -> Result<Vec<Recommendation>> {
        self.handle
            .join()
            .map_err(|_| RecommendError::Background("recommendation thread panicked".into()))?
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Session {
    /// Open the session described by `config` over the built-in catalog.
    #[must_use]
    pub fn open(config: &RuntimeConfig) -> Self {
        let history = HistoryStore::load(config.history_path());
        Self::new(Catalog::builtin(), history, config.settings.clone())
    }

    /// Build a session and replay `history` into a fresh rating store.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, history: HistoryStore, settings: Settings) -> Self {
        let mut ratings = RatingStore::new();
        for entry in history.entries() {
            let Some(song_id) = catalog.id_of(&entry.song_info) else {
                warn!("Skipping history entry for unknown song `{}'", entry.song_info);
                continue;
            };
            if !is_valid_rating(entry.rating) {
                warn!("Skipping history entry with rating {} for `{}'", entry.rating, entry.song_info);
                continue;
            }
            let at = entry
                .parsed_timestamp()
                .and_then(|naive| Local.from_local_datetime(&naive).earliest())
                .unwrap_or_else(Local::now);
            ratings.record(settings.user_id, song_id, entry.rating, at);
        }
        info!("Session ready with {} ratings replayed from history", ratings.count());

        Self { catalog, ratings, history, settings }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn ratings(&self) -> &RatingStore {
        &self.ratings
    }

    /// Read-only access for history, stats and chart views.
    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.settings.user_id
    }

    #[must_use]
    pub fn min_ratings(&self) -> usize {
        self.settings.min_ratings
    }

    /// Record a rating of `song_label` (in `genre`) for the current user.
    ///
    /// # Errors
    ///
    /// - `InvalidSelection` for a missing/unknown genre or song
    /// - `InvalidRating` outside 1..=5
    /// - `Persistence` if the history file cannot be written; the rating is
    ///   still recorded in memory
    pub fn submit_rating(&mut self, genre: &str, song_label: &str, rating: f64) -> Result<SongId> {
        self.submit_rating_at(genre, song_label, rating, Local::now())
    }

    /// [`Session::submit_rating`] with an explicit time.
    ///
    /// # Errors
    ///
    /// See [`Session::submit_rating`].
    pub fn submit_rating_at(
        &mut self,
        genre: &str,
        song_label: &str,
        rating: f64,
        at: DateTime<Local>,
    ) -> Result<SongId> {
        if genre.trim().is_empty() || song_label.trim().is_empty() {
            return Err(RecommendError::InvalidSelection("select a genre and a song".into()));
        }
        if !self.catalog.has_genre(genre) {
            return Err(RecommendError::InvalidSelection(format!("unknown genre `{genre}'")));
        }
        let Some((song_id, _)) = self.catalog.find_in_genre(genre, song_label) else {
            return Err(RecommendError::InvalidSelection(format!("`{song_label}' is not a {genre} song")));
        };
        if !is_valid_rating(rating) {
            return Err(RecommendError::InvalidRating(rating));
        }

        self.ratings.record(self.settings.user_id, song_id, rating, at);
        let entry = RatingHistoryEntry::new(genre, song_label, rating, at);
        if let Err(e) = self.history.append(entry) {
            error!("Failed to save rating history: {e}");
            return Err(e);
        }

        info!("Saved new rating: {song_label} - {rating}");
        Ok(song_id)
    }

    fn scoring_context(&self) -> ScoringContext<'_> {
        ScoringContext {
            catalog: &self.catalog,
            ratings: &self.ratings,
            user_id: self.settings.user_id,
            min_ratings: self.settings.min_ratings,
            factorization: &self.settings.factorization,
        }
    }

    /// Recommend on the calling thread.
    ///
    /// # Errors
    ///
    /// See [`recommend::recommend`].
    pub fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<Recommendation>> {
        recommend::recommend(&self.scoring_context(), request)
    }

    /// Recommend on a worker thread against a snapshot of the current
    /// ratings. Later submissions do not affect the running request.
    ///
    /// # Errors
    ///
    /// [`RecommendError::Background`] if the thread cannot be spawned.
    pub fn recommend_in_background(&self, request: RecommendationRequest) -> Result<PendingRecommendation> {
        let catalog = Arc::clone(&self.catalog);
        let ratings = self.ratings.clone();
        let settings = self.settings.clone();

        let handle = thread::Builder::new()
            .name("recommender".into())
            .spawn(move || {
                let ctx = ScoringContext {
                    catalog: &catalog,
                    ratings: &ratings,
                    user_id: settings.user_id,
                    min_ratings: settings.min_ratings,
                    factorization: &settings.factorization,
                };
                recommend::recommend(&ctx, &request)
            })
            .map_err(|e| RecommendError::Background(e.to_string()))?;

        Ok(PendingRecommendation { handle })
    }
}

fn is_valid_rating(rating: f64) -> bool {
    (RATING_SCALE.0..=RATING_SCALE.1).contains(&rating)
}
