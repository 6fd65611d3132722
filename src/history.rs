//! Persisted rating history.
//!
//! Every accepted rating is also appended to a JSON array on disk. The file
//! is rewritten in full on each submission (read, append, write) and loaded
//! once at start-up. The history feeds the history/stats/trends views and is
//! replayed into the rating store when a session starts.

use crate::error::Result;
use crate::persist;
use chrono::{DateTime, Local, NaiveDateTime};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Format of the `timestamp` field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredEntry")]
pub struct RatingHistoryEntry {
    pub timestamp: String,
    pub genre: String,
    /// `"title - artist"`.
    pub song_info: String,
    pub rating: f64,
}

/// On-disk shape, tolerant of missing fields and of older files that stored
/// `track` and `artist` instead of `song_info`.
#[derive(Deserialize)]
struct StoredEntry {
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    song_info: Option<String>,
    #[serde(default)]
    track: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    rating: f64,
}

impl From<StoredEntry> for RatingHistoryEntry {
    fn from(stored: StoredEntry) -> Self {
        let song_info = match (stored.song_info, stored.track, stored.artist) {
            (Some(info), _, _) => info,
            (None, Some(track), Some(artist)) => format!("{track} - {artist}"),
            _ => String::new(),
        };
        Self {
            timestamp: stored.timestamp,
            genre: stored.genre,
            song_info,
            rating: stored.rating,
        }
    }
}

impl RatingHistoryEntry {
    #[must_use]
    pub fn new(genre: &str, song_info: &str, rating: f64, at: DateTime<Local>) -> Self {
        Self {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            genre: genre.to_string(),
            song_info: song_info.to_string(),
            rating,
        }
    }

    /// The timestamp as a naive local time, if it parses.
    #[must_use]
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }
}

/// Overall and per-genre rating statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub mean: f64,
    /// First-appearance order.
    pub genres: Vec<GenreStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreStats {
    pub genre: String,
    pub count: usize,
    pub mean: f64,
}

/// Data behind the two trend charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trends {
    /// Mean rating per genre, first-appearance order.
    pub genre_averages: Vec<(String, f64)>,
    /// `(time, rating)` in history order; unparsable timestamps are left out.
    pub timeline: Vec<(NaiveDateTime, f64)>,
}

/// The history file and its in-memory copy.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<RatingHistoryEntry>,
    /// Appended in memory after a failed write; retried on the next append.
    unsaved: Vec<RatingHistoryEntry>,
}

impl HistoryStore {
    /// Load `path`; a missing or corrupt file is an empty history.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries: Vec<RatingHistoryEntry> = persist::read_json_or_default(&path);
        info!("Loaded {} rating history entries from {}", entries.len(), path.display());
        Self { path, entries, unsaved: Vec::new() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries oldest first.
    #[must_use]
    pub fn entries(&self) -> &[RatingHistoryEntry] {
        &self.entries
    }

    /// Append `entry` to the file, re-reading it first so the write never
    /// drops entries another run added. Entries whose earlier write failed
    /// are written along with it.
    ///
    /// # Errors
    ///
    /// [`crate::RecommendError::Persistence`] if the file cannot be written.
    /// The entry is still kept in memory.
    pub fn append(&mut self, entry: RatingHistoryEntry) -> Result<()> {
        let mut on_disk: Vec<RatingHistoryEntry> = persist::read_json_or_default(&self.path);
        on_disk.extend(self.unsaved.iter().cloned());
        on_disk.push(entry.clone());

        match persist::write_json(&self.path, &on_disk) {
            Ok(()) => {
                self.entries = on_disk;
                self.unsaved.clear();
                Ok(())
            }
            Err(e) => {
                self.entries.push(entry.clone());
                self.unsaved.push(entry);
                Err(e)
            }
        }
    }

    /// `None` for an empty history.
    #[must_use]
    pub fn stats(&self) -> Option<HistoryStats> {
        if self.entries.is_empty() {
            return None;
        }
        let genres = group_by_genre(&self.entries)
            .into_iter()
            .map(|(genre, ratings)| GenreStats { genre, count: ratings.len(), mean: mean(&ratings) })
            .collect();
        let all: Vec<f64> = self.entries.iter().map(|e| e.rating).collect();

        Some(HistoryStats { total: all.len(), mean: mean(&all), genres })
    }

    /// `None` for an empty history.
    #[must_use]
    pub fn trends(&self) -> Option<Trends> {
        if self.entries.is_empty() {
            return None;
        }
        let genre_averages = group_by_genre(&self.entries)
            .into_iter()
            .map(|(genre, ratings)| (genre, mean(&ratings)))
            .collect();
        let timeline = self
            .entries
            .iter()
            .filter_map(|e| e.parsed_timestamp().map(|t| (t, e.rating)))
            .collect();

        Some(Trends { genre_averages, timeline })
    }
}

fn group_by_genre(entries: &[RatingHistoryEntry]) -> Vec<(String, Vec<f64>)> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|(g, _)| *g == entry.genre) {
            Some((_, ratings)) => ratings.push(entry.rating),
            None => groups.push((entry.genre.clone(), vec![entry.rating])),
        }
    }
    groups
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_entry_timestamp_format() {
        let entry = RatingHistoryEntry::new("Rock", "Believer - Imagine Dragons", 4.0, at(9, 5));
        assert_eq!(entry.timestamp, "2024-03-01 09:05:00");
        assert!(entry.parsed_timestamp().is_some());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rating_history.json");

        let mut store = HistoryStore::load(&path);
        assert!(store.entries().is_empty());
        store.append(RatingHistoryEntry::new("K-POP", "Ditto - NewJeans", 5.0, at(10, 0))).unwrap();
        store.append(RatingHistoryEntry::new("R&B", "Kill Bill - SZA", 3.5, at(10, 1))).unwrap();

        let reloaded = HistoryStore::load(&path);
        assert_eq!(reloaded.entries(), store.entries());
        assert_eq!(reloaded.entries().len(), 2);
    }

    #[test]
    fn test_append_keeps_entries_written_by_others() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rating_history.json");
        let mut first = HistoryStore::load(&path);
        let mut second = HistoryStore::load(&path);

        first.append(RatingHistoryEntry::new("POP", "Starboy - The Weeknd", 4.0, at(8, 0))).unwrap();
        second.append(RatingHistoryEntry::new("POP", "As It Was - Harry Styles", 2.0, at(8, 1))).unwrap();

        assert_eq!(HistoryStore::load(&path).entries().len(), 2);
    }

    #[test]
    fn test_failed_write_is_retried_on_next_append() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rating_history.json");
        std::fs::create_dir(&path).unwrap();
        let mut store = HistoryStore::load(&path);

        let first = RatingHistoryEntry::new("Rock", "Thunder - Imagine Dragons", 4.0, at(7, 0));
        assert!(store.append(first).is_err());
        assert_eq!(store.entries().len(), 1);

        std::fs::remove_dir(&path).unwrap();
        store.append(RatingHistoryEntry::new("POP", "Starboy - The Weeknd", 5.0, at(7, 1))).unwrap();

        assert_eq!(store.entries().len(), 2);
        assert_eq!(store.stats().unwrap().total, 2);
        assert_eq!(HistoryStore::load(&path).entries(), store.entries());
    }

    #[test]
    fn test_legacy_track_artist_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rating_history.json");
        std::fs::write(
            &path,
            r#"[{"timestamp": "2023-01-01 00:00:00", "genre": "Rock", "track": "Thunder", "artist": "Imagine Dragons", "rating": 4}]"#,
        )
        .unwrap();

        let store = HistoryStore::load(&path);
        assert_eq!(store.entries()[0].song_info, "Thunder - Imagine Dragons");
        assert_eq!(store.entries()[0].rating, 4.0);
    }

    #[test]
    fn test_stats_per_genre() {
        let dir = TempDir::new().unwrap();
        let mut store = HistoryStore::load(dir.path().join("h.json"));
        assert!(store.stats().is_none());

        store.append(RatingHistoryEntry::new("Rock", "Thunder - Imagine Dragons", 5.0, at(1, 0))).unwrap();
        store.append(RatingHistoryEntry::new("POP", "Starboy - The Weeknd", 2.0, at(1, 1))).unwrap();
        store.append(RatingHistoryEntry::new("Rock", "Believer - Imagine Dragons", 3.0, at(1, 2))).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 3);
        assert!((stats.mean - 10.0 / 3.0).abs() < 1e-12);
        assert_eq!(
            stats.genres,
            vec![
                GenreStats { genre: "Rock".into(), count: 2, mean: 4.0 },
                GenreStats { genre: "POP".into(), count: 1, mean: 2.0 },
            ]
        );
    }

    #[test]
    fn test_trends_skip_bad_timestamps() {
        let dir = TempDir::new().unwrap();
        let mut store = HistoryStore::load(dir.path().join("h.json"));
        store.append(RatingHistoryEntry::new("Rock", "Thunder - Imagine Dragons", 5.0, at(1, 0))).unwrap();
        let mut odd = RatingHistoryEntry::new("Rock", "Believer - Imagine Dragons", 1.0, at(1, 1));
        odd.timestamp = "yesterday".into();
        store.append(odd).unwrap();

        let trends = store.trends().unwrap();
        assert_eq!(trends.genre_averages, vec![("Rock".to_string(), 3.0)]);
        assert_eq!(trends.timeline.len(), 1);
        assert_eq!(trends.timeline[0].1, 5.0);
    }
}
