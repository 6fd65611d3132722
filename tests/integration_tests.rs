//! # Integration Tests for Musicrec
//!
//! End-to-end workflows through the library API and the built binary, each
//! against its own temporary data directory.

use anyhow::Result;
use musicrec::config::RuntimeConfig;
use musicrec::history::HistoryStore;
use musicrec::playlist::PlaylistStore;
use musicrec::recommend::{Method, RecommendationRequest};
use musicrec::session::Session;
use musicrec::RecommendError;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test helper: a session over a fresh data directory with a fixed seed.
fn open_session(dir: &Path) -> Session {
    let mut config = RuntimeConfig::with_data_dir(dir);
    config.settings.factorization.seed = Some(2024);
    Session::open(&config)
}

/// Rate the first `ratings.len()` catalog songs in catalog order.
fn rate_in_order(session: &mut Session, ratings: &[f64]) -> Result<()> {
    let picks: Vec<(String, String)> = session
        .catalog()
        .iter()
        .take(ratings.len())
        .map(|(_, song)| (song.genre.clone(), song.label()))
        .collect();
    for ((genre, label), &rating) in picks.iter().zip(ratings) {
        session.submit_rating(genre, label, rating)?;
    }
    Ok(())
}

#[cfg(test)]
mod workflow_tests {
    use super::*;

    #[test]
    fn test_rate_then_recommend_every_method() -> Result<()> {
        let dir = TempDir::new()?;
        let mut session = open_session(dir.path());
        rate_in_order(&mut session, &[5.0, 4.0, 4.0, 5.0, 3.0, 2.0])?;

        for method in Method::ALL {
            let request = RecommendationRequest { method, count: 7, min_score: 1.0 };
            let results = session.recommend(&request)?;
            assert!(!results.is_empty(), "{method} returned nothing");
            assert!(results.len() <= 7);
            assert!(results.iter().all(|r| r.score >= 1.0));
            assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        }
        Ok(())
    }

    #[test]
    fn test_collaborative_never_recommends_rated_songs() -> Result<()> {
        let dir = TempDir::new()?;
        let mut session = open_session(dir.path());
        rate_in_order(&mut session, &[5.0, 1.0, 4.0, 2.0, 3.0, 5.0, 4.0])?;

        let rated: Vec<String> = session.catalog().iter().take(7).map(|(_, s)| s.label()).collect();
        let request = RecommendationRequest { method: Method::Collaborative, count: 100, min_score: 0.0 };
        let results = session.recommend(&request)?;

        assert_eq!(results.len(), 18);
        assert!(results.iter().all(|r| !rated.contains(&r.label)));
        Ok(())
    }

    #[test]
    fn test_insufficient_data_survives_restart() -> Result<()> {
        let dir = TempDir::new()?;
        {
            let mut session = open_session(dir.path());
            rate_in_order(&mut session, &[5.0, 5.0, 5.0, 5.0])?;
        }

        let mut session = open_session(dir.path());
        let request = RecommendationRequest { method: Method::Artist, count: 5, min_score: 0.0 };
        assert!(matches!(
            session.recommend(&request),
            Err(RecommendError::InsufficientData { have: 4, need: 5 })
        ));

        session.submit_rating("POP", "Starboy - The Weeknd", 5.0)?;
        let results = session.recommend(&request)?;
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.score == 5.0));
        Ok(())
    }

    #[test]
    fn test_history_file_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let mut session = open_session(dir.path());
        rate_in_order(&mut session, &[3.0, 4.5])?;

        let reloaded = HistoryStore::load(dir.path().join("rating_history.json"));
        assert_eq!(reloaded.entries(), session.history().entries());
        Ok(())
    }

    #[test]
    fn test_playlist_lifecycle() -> Result<()> {
        let dir = TempDir::new()?;
        let session = open_session(dir.path());
        let mut playlists = PlaylistStore::open(dir.path());

        playlists.create("Late Night")?;
        playlists.add_songs("Late Night", &["Kill Bill - SZA".to_string()], session.catalog())?;
        assert_eq!(PlaylistStore::open(dir.path()).songs("Late Night"), ["Kill Bill - SZA"]);

        playlists.delete("Late Night")?;
        assert!(PlaylistStore::open(dir.path()).names().is_empty());
        assert!(!dir.path().join("playlist_Late Night.json").exists());
        Ok(())
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    fn musicrec(dir: &TempDir, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_musicrec"))
            .args(args)
            .arg("--data-dir")
            .arg(dir.path())
            .env_remove("MUSICREC_USER_ID")
            .output()
            .expect("Failed to run musicrec")
    }

    #[test]
    fn test_cli_help_displays_correctly() {
        let dir = TempDir::new().unwrap();
        let output = musicrec(&dir, &["--help"]);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("musicrec"));
        assert!(stdout.contains("recommend"));
        assert!(stdout.contains("playlist"));
    }

    #[test]
    fn test_cli_rate_and_recommend() {
        let dir = TempDir::new().unwrap();
        let songs = [
            ("K-POP", "Dynamite - BTS"),
            ("K-POP", "Ditto - NewJeans"),
            ("POP", "Starboy - The Weeknd"),
            ("Rock", "Thunder - Imagine Dragons"),
        ];
        for (genre, song) in songs {
            assert!(musicrec(&dir, &["rate", genre, song, "5"]).status.success());
        }

        let output = musicrec(&dir, &["recommend", "--method", "genre"]);
        assert_eq!(output.status.code(), Some(2));
        assert!(String::from_utf8_lossy(&output.stdout).contains("Songs rated so far: 4"));

        assert!(musicrec(&dir, &["rate", "R&B", "Kill Bill - SZA", "5"]).status.success());
        let output = musicrec(&dir, &["recommend", "--method", "genre", "--count", "3"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("=== genre recommendations ==="));
        assert!(stdout.contains("3. 🎵"));
        assert!(!stdout.contains("4. 🎵"));
    }

    #[test]
    fn test_cli_rejects_song_from_wrong_genre() {
        let dir = TempDir::new().unwrap();
        let output = musicrec(&dir, &["rate", "Rock", "Dynamite - BTS", "4"]);
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("not a Rock song"));
    }

    #[test]
    fn test_completion_generation() {
        let dir = TempDir::new().unwrap();
        let output = musicrec(&dir, &["completion", "bash"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("_musicrec"));
        assert!(stdout.contains("complete"));
    }

    #[test]
    fn test_fish_completion_lists_catalog_songs() {
        let dir = TempDir::new().unwrap();
        let output = musicrec(&dir, &["completion", "fish"]);
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("musicrec complete-songs"));

        let output = musicrec(&dir, &["complete-songs"]);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.lines().any(|l| l == "Kill Bill - SZA"));
        assert!(stdout.lines().any(|l| l == "Hip-Hop"));
    }
}
