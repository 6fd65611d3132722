//! Biased latent-factor model fitted with stochastic gradient descent.
//!
//! Approximates the sparse user × song rating matrix as
//!
//! ```text
//! r̂(u, i) = μ + b_u + b_i + q_iᵀ p_u
//! ```
//!
//! where μ is the global mean, `b_u`/`b_i` are user/item biases and `p_u`/`q_i`
//! are `factors`-dimensional vectors. Each epoch walks every observed rating
//! once and nudges all four terms against the prediction error, with L2
//! regularization. Predictions for unseen users or items fall back to the
//! terms that are known, and every prediction is clipped to the rating scale.

use crate::catalog::SongId;
use crate::ratings::UserId;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Lowest and highest rating the model may predict.
pub const RATING_SCALE: (f64, f64) = (1.0, 5.0);

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("cannot fit a model without any ratings")]
    EmptyTrainingSet,

    #[error("invalid factorization parameters: {0}")]
    InvalidParams(String),

    #[error("prediction for user {user}, song {song} is not a finite number")]
    NonFinite { user: UserId, song: SongId },
}

/// Hyper-parameters of the SGD fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorizationParams {
    pub factors: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub regularization: f64,
    /// Standard deviation of the normal distribution factors start from.
    pub init_std: f64,
    /// Fixed seed for reproducible fits; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for FactorizationParams {
    fn default() -> Self {
        Self {
            factors: 100,
            epochs: 20,
            learning_rate: 0.005,
            regularization: 0.02,
            init_std: 0.1,
            seed: None,
        }
    }
}

impl FactorizationParams {
    fn validate(&self) -> Result<(), ModelError> {
        if self.factors == 0 {
            return Err(ModelError::InvalidParams("factors must be positive".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ModelError::InvalidParams(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.regularization.is_finite() && self.regularization >= 0.0) {
            return Err(ModelError::InvalidParams(format!(
                "regularization must be non-negative, got {}",
                self.regularization
            )));
        }
        if !(self.init_std.is_finite() && self.init_std >= 0.0) {
            return Err(ModelError::InvalidParams(format!(
                "init std must be non-negative, got {}",
                self.init_std
            )));
        }
        Ok(())
    }
}

/// A fitted model. Immutable after [`LatentFactorModel::fit`].
#[derive(Debug, Clone)]
pub struct LatentFactorModel {
    global_mean: f64,
    users: HashMap<UserId, usize>,
    songs: HashMap<SongId, usize>,
    user_bias: Vec<f64>,
    song_bias: Vec<f64>,
    user_factors: Vec<Vec<f64>>,
    song_factors: Vec<Vec<f64>>,
}

impl LatentFactorModel {
    /// Fit on `(user, song, rating)` triples.
    ///
    /// # Errors
    ///
    /// [`ModelError::EmptyTrainingSet`] without triples,
    /// [`ModelError::InvalidParams`] for unusable hyper-parameters.
    pub fn fit(triples: &[(UserId, SongId, f64)], params: &FactorizationParams) -> Result<Self, ModelError> {
        params.validate()?;
        if triples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        // Dense indices in order of first appearance.
        let mut users = HashMap::new();
        let mut songs = HashMap::new();
        let indexed: Vec<(usize, usize, f64)> = triples
            .iter()
            .map(|&(u, i, r)| {
                let next_u = users.len();
                let next_i = songs.len();
                let u = *users.entry(u).or_insert(next_u);
                let i = *songs.entry(i).or_insert(next_i);
                (u, i, r)
            })
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let global_mean = indexed.iter().map(|t| t.2).sum::<f64>() / indexed.len() as f64;

        let mut model = Self {
            global_mean,
            user_bias: vec![0.0; users.len()],
            song_bias: vec![0.0; songs.len()],
            user_factors: random_matrix(&mut rng, users.len(), params.factors, params.init_std),
            song_factors: random_matrix(&mut rng, songs.len(), params.factors, params.init_std),
            users,
            songs,
        };

        debug!(
            "Fitting latent-factor model: {} ratings, {} users, {} songs, {} factors, {} epochs",
            indexed.len(),
            model.users.len(),
            model.songs.len(),
            params.factors,
            params.epochs
        );

        let (lr, reg) = (params.learning_rate, params.regularization);
        for _ in 0..params.epochs {
            for &(u, i, r) in &indexed {
                let interaction = dot(&model.user_factors[u], &model.song_factors[i]);
                let err = r - (model.global_mean + model.user_bias[u] + model.song_bias[i] + interaction);

                model.user_bias[u] += lr * (err - reg * model.user_bias[u]);
                model.song_bias[i] += lr * (err - reg * model.song_bias[i]);

                for f in 0..params.factors {
                    let puf = model.user_factors[u][f];
                    let qif = model.song_factors[i][f];
                    model.user_factors[u][f] += lr * (err * qif - reg * puf);
                    model.song_factors[i][f] += lr * (err * puf - reg * qif);
                }
            }
        }

        Ok(model)
    }

    /// Predicted rating of `song` by `user`, clipped to [`RATING_SCALE`].
    ///
    /// # Errors
    ///
    /// [`ModelError::NonFinite`] when the fit diverged for this pair.
    pub fn predict(&self, user: UserId, song: SongId) -> Result<f64, ModelError> {
        let u = self.users.get(&user).copied();
        let i = self.songs.get(&song).copied();

        let mut estimate = self.global_mean;
        if let Some(u) = u {
            estimate += self.user_bias[u];
        }
        if let Some(i) = i {
            estimate += self.song_bias[i];
        }
        if let (Some(u), Some(i)) = (u, i) {
            estimate += dot(&self.user_factors[u], &self.song_factors[i]);
        }

        if !estimate.is_finite() {
            return Err(ModelError::NonFinite { user, song });
        }
        Ok(estimate.clamp(RATING_SCALE.0, RATING_SCALE.1))
    }

    #[must_use]
    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `rows × cols` matrix drawn from N(0, std²) via Box-Muller.
fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize, std: f64) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|_| (0..cols).map(|_| standard_normal(rng) * std).collect())
        .collect()
}

fn standard_normal(rng: &mut StdRng) -> f64 {
    // gen::<f64>() is in [0, 1); shift to (0, 1] so ln never sees zero.
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
