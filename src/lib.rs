//! Offline song recommendations from a small fixed catalog.
//!
//! Core modules:
//! - [`catalog`] - The static song catalog and its id mapping
//! - [`ratings`] - Append-only rating store
//! - [`algorithm`] - The three scoring strategies
//! - [`factorization`] - Latent-factor model behind collaborative filtering
//! - [`recommend`] - Merging, filtering and ranking strategy output
//! - [`session`] - The owned application context
//!
//! ### Supporting Modules
//!
//! - [`history`] - Persisted rating history, stats and trends
//! - [`playlist`] - Playlist index and per-playlist files
//! - [`config`] - Data directory and runtime settings
//! - [`report`] - Plain-text rendering
//! - [`cli`] / [`completion`] - Command-line definitions and shell completions
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use musicrec::config::RuntimeConfig;
//! use musicrec::recommend::{Method, RecommendationRequest};
//! use musicrec::session::Session;
//!
//! let config = RuntimeConfig::load(None)?;
//! let mut session = Session::open(&config);
//!
//! session.submit_rating("K-POP", "Ditto - NewJeans", 5.0)?;
//!
//! let request = RecommendationRequest { method: Method::Hybrid, count: 5, min_score: 3.0 };
//! match session.recommend(&request) {
//!     Ok(results) => {
//!         for rec in results {
//!             println!("{} ({:.2})", rec.label, rec.score);
//!         }
//!     }
//!     Err(e) if e.is_recoverable() => println!("{e}"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`error::Result`] with a [`RecommendError`];
//! configuration and the binary use `anyhow`. Missing or corrupt JSON files
//! are read as empty, never as errors.

pub mod algorithm;
pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod factorization;
pub mod history;
pub mod persist;
pub mod playlist;
pub mod ratings;
pub mod recommend;
pub mod report;
pub mod session;

pub use error::RecommendError;
