//! Recommendation aggregation.
//!
//! Runs the strategies a [`Method`] selects, then merges their output:
//!
//! 1. concatenate in strategy order (collaborative, genre, artist)
//! 2. drop exact `(label, score)` duplicates, keeping the first
//! 3. drop scores below the threshold
//! 4. stable sort by score, descending
//! 5. keep the first `count`
//!
//! Because de-duplication looks at the pair, the same song can come back
//! more than once when two strategies score it differently.

use crate::algorithm::{Recommendation, ScoringContext, Strategy};
use crate::error::{RecommendError, Result};
use log::{debug, info};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Which strategies a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Collaborative,
    Genre,
    Artist,
    /// All three strategies, merged.
    Hybrid,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Collaborative, Method::Genre, Method::Artist, Method::Hybrid];

    #[must_use]
    pub fn strategies(self) -> &'static [Strategy] {
        match self {
            Self::Collaborative => &[Strategy::Collaborative],
            Self::Genre => &[Strategy::Genre],
            Self::Artist => &[Strategy::Artist],
            Self::Hybrid => &[Strategy::Collaborative, Strategy::Genre, Strategy::Artist],
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Collaborative => "collaborative",
            Self::Genre => "genre",
            Self::Artist => "artist",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted.is_empty() {
            return Err(RecommendError::InvalidSelection("no recommendation method selected".into()));
        }
        Self::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| RecommendError::InvalidSelection(format!("unknown recommendation method `{s}'")))
    }
}

/// Parameters of one recommendation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationRequest {
    pub method: Method,
    /// Maximum number of results, at least 1.
    pub count: usize,
    /// Results scoring below this are dropped.
    pub min_score: f64,
}

impl Default for RecommendationRequest {
    fn default() -> Self {
        Self { method: Method::Hybrid, count: 5, min_score: 3.0 }
    }
}

/// f64 wrapper hashed by bit pattern so scores can key a `HashSet`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedFloat(f64);

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Produce a ranked list for `request`.
///
/// # Errors
///
/// - [`RecommendError::InsufficientData`] when the store holds fewer than
///   `ctx.min_ratings` ratings, whatever the method
/// - [`RecommendError::InvalidSelection`] for a zero count or a non-finite
///   threshold
/// - [`RecommendError::NoQualifyingResults`] when nothing survives filtering
pub fn recommend(ctx: &ScoringContext<'_>, request: &RecommendationRequest) -> Result<Vec<Recommendation>> {
    let have = ctx.ratings.count();
    if have < ctx.min_ratings {
        return Err(RecommendError::InsufficientData { have, need: ctx.min_ratings });
    }
    if request.count == 0 {
        return Err(RecommendError::InvalidSelection("recommendation count must be at least 1".into()));
    }
    if !request.min_score.is_finite() {
        return Err(RecommendError::InvalidSelection(format!(
            "minimum score must be a number, got {}",
            request.min_score
        )));
    }

    info!(
        "Recommending - method: {}, count: {}, min score: {}",
        request.method, request.count, request.min_score
    );

    // Indexed parallel collect keeps strategy order.
    let candidates: Vec<Recommendation> = request
        .method
        .strategies()
        .par_iter()
        .map(|strategy| strategy.score(ctx))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    let ranked = aggregate(candidates, request.count, request.min_score);
    if ranked.is_empty() {
        return Err(RecommendError::NoQualifyingResults);
    }

    info!("Recommendation finished with {} results", ranked.len());
    Ok(ranked)
}

/// De-duplicate, filter, rank and truncate already-concatenated candidates.
#[must_use]
pub fn aggregate(candidates: Vec<Recommendation>, count: usize, min_score: f64) -> Vec<Recommendation> {
    let total = candidates.len();
    let mut seen = HashSet::new();

    let mut ranked: Vec<Recommendation> = candidates
        .into_iter()
        .filter(|r| seen.insert((r.label.clone(), OrderedFloat(r.score))))
        .filter(|r| r.score >= min_score)
        .collect();

    // sort_by is stable, so equal scores keep concatenation order.
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(count);

    debug!("Aggregated {total} candidates into {} results", ranked.len());
    ranked
}
