//! # Command-Line Interface Module
//!
//! This module defines the command-line interface for Musicrec using Clap
//! derive macros.
//!
//! ## Commands
//!
//! - `genres` / `songs`: Browse the catalog
//! - `rate`: Rate a song from 1 to 5
//! - `recommend`: Get recommendations (collaborative, genre, artist, hybrid)
//! - `history` / `stats` / `trends`: Look back at past ratings
//! - `playlist`: Manage playlists
//!
//! ## Examples
//!
//! ```bash
//! musicrec rate K-POP "Ditto - NewJeans" 5
//! musicrec recommend --method hybrid --count 10 --min-score 3.5
//! musicrec playlist add Morning "Starboy - The Weeknd"
//! ```

use crate::recommend::Method;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Recommendation methods as accepted on the command line
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum MethodArg {
    /// Matrix-factorization collaborative filtering
    Collaborative,
    /// Average rating broadcast over every genre
    Genre,
    /// Average of high ratings broadcast over every artist
    Artist,
    /// All three methods merged
    Hybrid,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Collaborative => Method::Collaborative,
            MethodArg::Genre => Method::Genre,
            MethodArg::Artist => Method::Artist,
            MethodArg::Hybrid => Method::Hybrid,
        }
    }
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "musicrec")]
#[command(about = "Musicrec: rate songs and get offline recommendations")]
#[command(version)]
pub struct Args {
    /// Directory holding ratings, playlists and config.json
    ///
    /// Defaults to the platform data directory (e.g. ~/.local/share/musicrec).
    #[arg(long, global = true, env = "MUSICREC_DATA_DIR", value_hint = clap::ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    /// Rate and recommend as this user instead of the configured one
    #[arg(long, global = true, env = "MUSICREC_USER_ID")]
    pub user_id: Option<u32>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the catalog's genres
    Genres,

    /// List catalog songs, optionally for one genre
    ///
    /// Songs are printed as "title - artist", the form `rate` and
    /// `playlist add` expect.
    Songs {
        /// Only list songs of this genre
        #[arg(short, long)]
        genre: Option<String>,
    },

    /// Rate a song
    ///
    /// Records the rating for recommendations and appends it to the
    /// rating history.
    Rate {
        /// Genre the song belongs to (see `musicrec genres`)
        genre: String,

        /// Song as "title - artist" (see `musicrec songs`)
        #[arg(value_hint = clap::ValueHint::Other)]
        song: String,

        /// Rating from 1 to 5 (fractions allowed)
        rating: f64,
    },

    /// Get song recommendations
    ///
    /// Needs at least five recorded ratings. The model is trained on a
    /// worker thread.
    Recommend {
        /// Scoring method
        #[arg(short, long, value_enum, default_value_t = MethodArg::Hybrid)]
        method: MethodArg,

        /// Maximum number of songs to recommend
        #[arg(short, long, default_value_t = 5)]
        count: usize,

        /// Drop recommendations scoring below this
        #[arg(long, default_value_t = 3.0)]
        min_score: f64,
    },

    /// Show past ratings, newest first
    History,

    /// Show overall and per-genre rating statistics
    Stats,

    /// Show average rating per genre and the rating timeline
    Trends,

    /// Manage playlists
    Playlist {
        #[command(subcommand)]
        action: PlaylistAction,
    },

    /// Generate shell completions
    ///
    /// Usage: musicrec completion bash > ~/.local/share/bash-completion/completions/musicrec
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// List song labels and genres for completion (hidden command)
    ///
    /// Called by the fish completion script for `rate` and `playlist add`.
    #[command(hide = true)]
    CompleteSongs,
}

/// Playlist management actions
#[derive(Subcommand, Debug)]
pub enum PlaylistAction {
    /// List playlists
    List,

    /// Create an empty playlist
    Create {
        /// Playlist name
        name: String,
    },

    /// Append songs to a playlist
    Add {
        /// Playlist name
        name: String,

        /// Songs as "title - artist"
        #[arg(required = true, value_hint = clap::ValueHint::Other)]
        songs: Vec<String>,
    },

    /// Print the songs of a playlist
    Show {
        /// Playlist name
        name: String,
    },

    /// Print a shareable text version of a playlist
    Share {
        /// Playlist name
        name: String,
    },

    /// Delete a playlist and its file
    Delete {
        /// Playlist name
        name: String,
    },
}
