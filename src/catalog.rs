//! The static song catalog.
//!
//! Songs are grouped by genre in a fixed order. Identifiers are handed out
//! once, walking genres in order and songs in their in-genre order, so two
//! runs over the same catalog agree on every [`SongId`]. Nothing is persisted
//! about the ids themselves.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Stable (per process) integer identifier of a catalog song.
pub type SongId = u32;

/// One catalog entry. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
    pub genre: String,
}

impl Song {
    /// `"title - artist"`, the key used for id lookup, history entries and
    /// playlists.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }

    /// `"title - artist (genre)"`, used by the content-based strategies.
    #[must_use]
    pub fn label_with_genre(&self) -> String {
        format!("{} - {} ({})", self.title, self.artist, self.genre)
    }
}

/// Built-in dataset: genre, then (title, artist) pairs.
const BUILTIN_SONGS: &[(&str, &[(&str, &str)])] = &[
    ("K-POP", &[
        ("Dynamite", "BTS"),
        ("How You Like That", "BLACKPINK"),
        ("Ditto", "NewJeans"),
        ("Love Dive", "IVE"),
        ("After LIKE", "IVE"),
    ]),
    ("POP", &[
        ("Shape of You", "Ed Sheeran"),
        ("Anti-Hero", "Taylor Swift"),
        ("Starboy", "The Weeknd"),
        ("As It Was", "Harry Styles"),
        ("Blinding Lights", "The Weeknd"),
    ]),
    ("Rock", &[
        ("Believer", "Imagine Dragons"),
        ("Bohemian Rhapsody", "Queen"),
        ("Do I Wanna Know?", "Arctic Monkeys"),
        ("Thunder", "Imagine Dragons"),
        ("We Will Rock You", "Queen"),
    ]),
    ("Hip-Hop", &[
        ("God's Plan", "Drake"),
        ("HUMBLE.", "Kendrick Lamar"),
        ("SICKO MODE", "Travis Scott"),
        ("Hotline Bling", "Drake"),
        ("goosebumps", "Travis Scott"),
    ]),
    ("R&B", &[
        ("Kill Bill", "SZA"),
        ("Pink + White", "Frank Ocean"),
        ("Best Part", "Daniel Caesar"),
        ("Good Days", "SZA"),
        ("Get You", "Daniel Caesar"),
    ]),
];

lazy_static::lazy_static! {
    static ref BUILTIN_CATALOG: Arc<Catalog> = Arc::new(Catalog::from_genres(
        BUILTIN_SONGS.iter().map(|(genre, songs)| {
            (genre.to_string(), songs.iter().map(|(t, a)| (t.to_string(), a.to_string())).collect())
        })
    ));
}

/// Genre → ordered songs, plus the label ↔ id mapping derived from it.
#[derive(Debug, Clone)]
pub struct Catalog {
    genres: Vec<String>,
    songs: Vec<Song>,
    by_genre: HashMap<String, Vec<SongId>>,
    ids: HashMap<String, SongId>,
}

impl Catalog {
    /// Shared handle to the built-in 25-song catalog.
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN_CATALOG)
    }

    /// Build a catalog from `(genre, [(title, artist)])` groups, assigning ids
    /// in iteration order.
    pub fn from_genres<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<(String, String)>)>,
    {
        let mut catalog = Self {
            genres: Vec::new(),
            songs: Vec::new(),
            by_genre: HashMap::new(),
            ids: HashMap::new(),
        };

        for (genre, entries) in groups {
            if !catalog.by_genre.contains_key(&genre) {
                catalog.genres.push(genre.clone());
            }
            for (title, artist) in entries {
                let id = catalog.songs.len() as SongId;
                let song = Song { title, artist, genre: genre.clone() };
                let label = song.label();
                if catalog.ids.contains_key(&label) {
                    warn!("Duplicate catalog label `{label}', keeping the first id");
                } else {
                    catalog.ids.insert(label, id);
                }
                catalog.by_genre.entry(genre.clone()).or_default().push(id);
                catalog.songs.push(song);
            }
        }

        info!("Catalog ready: {} genres, {} songs", catalog.genres.len(), catalog.songs.len());
        catalog
    }

    /// Genre names in catalog order.
    #[must_use]
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    #[must_use]
    pub fn has_genre(&self, genre: &str) -> bool {
        self.by_genre.contains_key(genre)
    }

    /// Songs of `genre` in their in-genre order; empty for unknown genres.
    pub fn songs_in(&self, genre: &str) -> impl Iterator<Item = &Song> + '_ {
        self.by_genre
            .get(genre)
            .into_iter()
            .flatten()
            .map(move |&id| &self.songs[id as usize])
    }

    /// Every song with its id, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (SongId, &Song)> + '_ {
        self.songs.iter().enumerate().map(|(i, song)| (i as SongId, song))
    }

    /// Artists in order of first appearance.
    #[must_use]
    pub fn artists(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for song in &self.songs {
            if !seen.contains(&song.artist.as_str()) {
                seen.push(song.artist.as_str());
            }
        }
        seen
    }

    #[must_use]
    pub fn id_of(&self, label: &str) -> Option<SongId> {
        self.ids.get(label).copied()
    }

    #[must_use]
    pub fn song(&self, id: SongId) -> Option<&Song> {
        self.songs.get(id as usize)
    }

    /// Look up a song by label, restricted to `genre`.
    #[must_use]
    pub fn find_in_genre(&self, genre: &str, label: &str) -> Option<(SongId, &Song)> {
        let id = self.id_of(label)?;
        let song = self.song(id)?;
        (song.genre == genre).then_some((id, song))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
