//! # Musicrec
//!
//! Rate songs from a small built-in catalog and get recommendations from
//! three strategies: latent-factor collaborative filtering, genre averages
//! and artist averages.
//!
//! ## Usage
//!
//! ```bash
//! # Browse the catalog
//! musicrec genres
//! musicrec songs --genre Rock
//!
//! # Rate and recommend
//! musicrec rate Rock "Thunder - Imagine Dragons" 4
//! musicrec recommend --method collaborative --count 10
//!
//! # Look back
//! musicrec history
//! musicrec stats
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use musicrec::catalog::Catalog;
use musicrec::cli::{self, Command, PlaylistAction};
use musicrec::config::RuntimeConfig;
use musicrec::playlist::PlaylistStore;
use musicrec::recommend::RecommendationRequest;
use musicrec::session::Session;
use musicrec::{completion, report};
use std::io;
use std::path::Path;
use std::process::ExitCode;

/// Exit status when recommendations are unavailable (too few ratings or
/// nothing passed the filters).
const EXIT_NO_RECOMMENDATIONS: u8 = 2;

/// Main entry point for the Musicrec application.
///
/// Initializes logging, parses command-line arguments, and routes commands.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug musicrec recommend` - Enable debug logging
/// - `RUST_LOG=musicrec::factorization=debug musicrec recommend` - Module-specific logging
fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli::Args { data_dir, user_id, command } = cli::Args::parse();
    let data_dir = data_dir.as_deref();

    match command {
        Command::Genres => {
            for genre in Catalog::builtin().genres() {
                println!("{genre}");
            }
        }
        Command::Songs { genre } => {
            let catalog = Catalog::builtin();
            match genre {
                Some(genre) => {
                    if !catalog.has_genre(&genre) {
                        anyhow::bail!("Unknown genre `{genre}'. Run `musicrec genres` to list them.");
                    }
                    for song in catalog.songs_in(&genre) {
                        println!("{}", song.label());
                    }
                }
                None => {
                    for (_, song) in catalog.iter() {
                        println!("{}\t{}", song.genre, song.label());
                    }
                }
            }
        }
        Command::Rate { genre, song, rating } => {
            let mut session = open_session(data_dir, user_id)?;
            session
                .submit_rating(&genre, &song, rating)
                .with_context(|| format!("Could not save rating for `{song}'"))?;
            println!("Rating saved: {song} - {rating}");
            println!("Songs rated so far: {}", session.ratings().count());
        }
        Command::Recommend { method, count, min_score } => {
            let session = open_session(data_dir, user_id)?;
            let request = RecommendationRequest { method: method.into(), count, min_score };
            debug!("Dispatching {request:?} to worker thread");

            match session.recommend_in_background(request)?.wait() {
                Ok(results) => print!("{}", report::recommendations(&request, &results)),
                Err(e) if e.is_recoverable() => {
                    print!("{}", report::recommendation_failure(&request, &e));
                    return Ok(ExitCode::from(EXIT_NO_RECOMMENDATIONS));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::History => {
            let session = open_session(data_dir, user_id)?;
            print!("{}", report::history(session.history().entries()));
        }
        Command::Stats => {
            let session = open_session(data_dir, user_id)?;
            print!("{}", report::stats(session.history().stats().as_ref()));
        }
        Command::Trends => {
            let session = open_session(data_dir, user_id)?;
            print!("{}", report::trends(session.history().trends().as_ref()));
        }
        Command::Playlist { action } => {
            let config = load_config(data_dir, user_id)?;
            run_playlist(action, &config, &Catalog::builtin())?;
        }
        Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::write_completion_script(shell, &mut cmd, &mut io::stdout())?;
        }
        Command::CompleteSongs => {
            completion::print_song_completions(&Catalog::builtin(), &mut io::stdout())?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Resolve the data directory and settings; `--user-id` wins over the file.
fn load_config(data_dir: Option<&Path>, user_id: Option<u32>) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::load(data_dir)?;
    if let Some(user_id) = user_id {
        config.settings.user_id = user_id;
    }
    info!("Musicrec starting, data directory {}", config.data_dir.display());
    Ok(config)
}

fn open_session(data_dir: Option<&Path>, user_id: Option<u32>) -> Result<Session> {
    Ok(Session::open(&load_config(data_dir, user_id)?))
}

fn run_playlist(action: PlaylistAction, config: &RuntimeConfig, catalog: &Catalog) -> Result<()> {
    let mut playlists = PlaylistStore::open(&config.data_dir);

    match action {
        PlaylistAction::List => {
            if playlists.names().is_empty() {
                println!("No playlists yet.");
            }
            for name in playlists.names() {
                println!("{name}");
            }
        }
        PlaylistAction::Create { name } => {
            let name = playlists.create(&name)?;
            println!("Created playlist '{name}'");
        }
        PlaylistAction::Add { name, songs } => {
            let total = playlists.add_songs(&name, &songs, catalog)?;
            println!("Added {} songs to '{name}' ({total} total)", songs.len());
        }
        PlaylistAction::Show { name } => {
            if !playlists.names().contains(&name) {
                return Err(musicrec::RecommendError::UnknownPlaylist(name).into());
            }
            for (i, song) in playlists.songs(&name).iter().enumerate() {
                println!("{}. {song}", i + 1);
            }
        }
        PlaylistAction::Share { name } => print!("{}", playlists.share_text(&name)?),
        PlaylistAction::Delete { name } => {
            playlists.delete(&name)?;
            println!("Deleted playlist '{name}'");
        }
    }
    Ok(())
}
