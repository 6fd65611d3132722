//! # Configuration Module
//!
//! Locates the data directory and loads runtime settings.
//!
//! ## Data Storage
//!
//! Musicrec keeps its JSON files in the platform-standard data directory
//! unless `--data-dir` (or `MUSICREC_DATA_DIR`) points elsewhere:
//! - Linux: `~/.local/share/musicrec/`
//! - macOS: `~/Library/Application Support/musicrec/`
//! - Windows: `%APPDATA%\musicrec\`
//!
//! The directory holds `rating_history.json`, `playlists.json`, one
//! `playlist_<name>.json` per playlist and an optional `config.json`.

use crate::algorithm::MIN_RATINGS;
use crate::factorization::FactorizationParams;
use crate::persist;
use crate::ratings::UserId;
use anyhow::{Context, Result};
use log::debug;
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const HISTORY_FILE: &str = "rating_history.json";
pub const CONFIG_FILE: &str = "config.json";

/// Returns the platform-appropriate data directory, creating it if needed.
///
/// # Errors
///
/// This function will return an error if:
/// - The system data directory cannot be determined
/// - The musicrec subdirectory cannot be created due to permissions
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    ensure_dir(&data_dir.join("musicrec"))
}

/// Make `dir` absolute and create it.
fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    let dir = dir
        .absolutize()
        .with_context(|| format!("Failed to resolve data directory {}", dir.display()))?
        .into_owned();
    fs::create_dir_all(&dir).with_context(|| {
        format!("Failed to create data directory at {}. Please check file permissions.", dir.display())
    })?;
    Ok(dir)
}

/// Settings read from `config.json`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The local user every rating is recorded for.
    pub user_id: UserId,
    /// Ratings needed before recommendations are offered.
    pub min_ratings: usize,
    pub factorization: FactorizationParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_id: 1,
            min_ratings: MIN_RATINGS,
            factorization: FactorizationParams::default(),
        }
    }
}

/// Configuration for runtime behavior
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub data_dir: PathBuf,
    pub settings: Settings,
}

impl RuntimeConfig {
    /// Resolve the data directory (explicit or platform default) and load
    /// `config.json` from it.
    ///
    /// # Errors
    ///
    /// Fails only when the data directory cannot be determined or created.
    pub fn load(data_dir: Option<&Path>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => ensure_dir(dir)?,
            None => get_data_dir()?,
        };
        let settings: Settings = persist::read_json_or_default(&data_dir.join(CONFIG_FILE));
        debug!("Using data directory {} with {settings:?}", data_dir.display());
        Ok(Self { data_dir, settings })
    }

    /// Configuration with explicit data directory and default settings.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), settings: Settings::default() }
    }

    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }
}
