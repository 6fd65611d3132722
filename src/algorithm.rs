//! Song scoring strategies.
//!
//! Three independent strategies turn the rating store and the catalog into
//! `(label, predicted score)` pairs:
//!
//! - [`Strategy::Collaborative`] fits a [`LatentFactorModel`] on every rating
//!   and predicts the current user's score for each song they have not rated.
//! - [`Strategy::Genre`] broadcasts one scalar, the mean of every positive
//!   rating, onto every catalog song.
//! - [`Strategy::Artist`] broadcasts the mean of every rating above 3 onto
//!   every song of every artist.
//!
//! ## Global aggregation
//!
//! Neither content strategy scopes its ratings to the genre or artist it is
//! scoring: the mean is taken over the whole store and then copied onto the
//! matching songs, so every song a content strategy emits carries the same
//! score. Both strategies are pure functions of the store and the catalog.

use crate::catalog::Catalog;
use crate::factorization::{FactorizationParams, LatentFactorModel};
use crate::ratings::{RatingStore, UserId};
use log::{debug, error, info, warn};
use serde::Serialize;

/// Ratings a store must hold before any recommendation is attempted.
pub const MIN_RATINGS: usize = 5;

/// Ratings strictly above this count toward the artist mean.
const ARTIST_RATING_FLOOR: f64 = 3.0;

/// One scored candidate. `label` is what the user sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub label: String,
    pub score: f64,
}

impl Recommendation {
    #[must_use]
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self { label: label.into(), score }
    }
}

/// Read-only view every strategy scores against.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub catalog: &'a Catalog,
    pub ratings: &'a RatingStore,
    pub user_id: UserId,
    /// Below this many ratings the collaborative strategy yields nothing.
    pub min_ratings: usize,
    pub factorization: &'a FactorizationParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Collaborative,
    Genre,
    Artist,
}

impl Strategy {
    /// Run this strategy. Never fails; an unusable input yields an empty list.
    #[must_use]
    pub fn score(self, ctx: &ScoringContext<'_>) -> Vec<Recommendation> {
        let scored = match self {
            Self::Collaborative => collaborative(ctx),
            Self::Genre => genre_based(ctx),
            Self::Artist => artist_based(ctx),
        };
        debug!("{self:?} strategy produced {} candidates", scored.len());
        scored
    }
}

fn collaborative(ctx: &ScoringContext<'_>) -> Vec<Recommendation> {
    info!("Training collaborative-filtering model");
    if ctx.ratings.count() < ctx.min_ratings {
        warn!(
            "Only {} ratings recorded, collaborative filtering needs {}",
            ctx.ratings.count(),
            ctx.min_ratings
        );
        return Vec::new();
    }

    let triples: Vec<_> = ctx
        .ratings
        .entries()
        .iter()
        .map(|r| (r.user_id, r.song_id, r.rating))
        .collect();

    let model = match LatentFactorModel::fit(&triples, ctx.factorization) {
        Ok(model) => model,
        Err(e) => {
            error!("Collaborative filtering failed: {e}");
            return Vec::new();
        }
    };

    let rated = ctx.ratings.ratings_for_user(ctx.user_id);
    ctx.catalog
        .iter()
        .filter(|(id, _)| !rated.contains(id))
        .filter_map(|(id, song)| match model.predict(ctx.user_id, id) {
            Ok(score) => Some(Recommendation::new(song.label(), score)),
            Err(e) => {
                error!("Skipping `{}': {e}", song.label());
                None
            }
        })
        .collect()
}

/// Arithmetic mean of `values`, `None` when empty.
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

fn genre_based(ctx: &ScoringContext<'_>) -> Vec<Recommendation> {
    info!("Computing genre-based scores");
    let Some(score) = mean(ctx.ratings.values().filter(|&r| r > 0.0)) else {
        return Vec::new();
    };

    ctx.catalog
        .genres()
        .iter()
        .flat_map(|genre| ctx.catalog.songs_in(genre))
        .map(|song| Recommendation::new(song.label_with_genre(), score))
        .collect()
}

fn artist_based(ctx: &ScoringContext<'_>) -> Vec<Recommendation> {
    info!("Computing artist-based scores");
    let Some(score) = mean(ctx.ratings.values().filter(|&r| r > ARTIST_RATING_FLOOR)) else {
        return Vec::new();
    };

    ctx.catalog
        .artists()
        .into_iter()
        .flat_map(|artist| {
            ctx.catalog
                .iter()
                .filter(move |(_, song)| song.artist == artist)
                .map(move |(_, song)| Recommendation::new(song.label_with_genre(), score))
        })
        .collect()
}
