//! Playlists: an index file of names plus one JSON file per playlist.
//!
//! ```text
//! <data dir>/playlists.json           ["Morning", "Gym"]
//! <data dir>/playlist_Morning.json    ["Ditto - NewJeans", ...]
//! ```

use crate::catalog::Catalog;
use crate::error::{RecommendError, Result};
use crate::persist;
use log::info;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const INDEX_FILE: &str = "playlists.json";

#[derive(Debug, Clone)]
pub struct PlaylistStore {
    dir: PathBuf,
    names: Vec<String>,
}

impl PlaylistStore {
    /// Open the playlists kept in `dir`. A missing or corrupt index means no
    /// playlists.
    #[must_use]
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let names: Vec<String> = persist::read_json_or_default(&dir.join(INDEX_FILE));
        Self { dir, names }
    }

    /// Playlist names in creation order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Backing file of `name`.
    #[must_use]
    pub fn file_for(&self, name: &str) -> PathBuf {
        self.dir.join(playlist_file_name(name))
    }

    fn require(&self, name: &str) -> Result<()> {
        if self.names.iter().any(|n| n == name) {
            Ok(())
        } else {
            Err(RecommendError::UnknownPlaylist(name.to_string()))
        }
    }

    /// Create an empty playlist. Returns the trimmed name actually used.
    ///
    /// # Errors
    ///
    /// `InvalidSelection` for a blank name, `DuplicatePlaylist` if it exists,
    /// `Persistence` when the files cannot be written.
    pub fn create(&mut self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RecommendError::InvalidSelection("playlist name must not be empty".into()));
        }
        // Names that differ only in case share a file on case-insensitive
        // filesystems.
        let file_name = playlist_file_name(name).to_lowercase();
        if self
            .names
            .iter()
            .any(|n| n == name || playlist_file_name(n).to_lowercase() == file_name)
        {
            return Err(RecommendError::DuplicatePlaylist(name.to_string()));
        }

        self.names.push(name.to_string());
        persist::write_json(&self.index_path(), &self.names)?;
        persist::write_json(&self.file_for(name), &Vec::<String>::new())?;

        info!("Created playlist '{name}'");
        Ok(name.to_string())
    }

    /// Append catalog songs (by `"title - artist"` label) to `name`.
    ///
    /// Nothing is written unless every label is valid.
    ///
    /// # Errors
    ///
    /// `UnknownPlaylist`, `InvalidSelection` for a label not in `catalog` or
    /// an empty selection, `Persistence` on write failure.
    pub fn add_songs(&self, name: &str, songs: &[String], catalog: &Catalog) -> Result<usize> {
        self.require(name)?;
        if songs.is_empty() {
            return Err(RecommendError::InvalidSelection("no songs selected".into()));
        }
        if let Some(unknown) = songs.iter().find(|s| catalog.id_of(s).is_none()) {
            return Err(RecommendError::InvalidSelection(format!("`{unknown}' is not in the catalog")));
        }

        let mut current = self.songs(name);
        current.extend(songs.iter().cloned());
        persist::write_json(&self.file_for(name), &current)?;

        info!("Added {} songs to playlist '{name}'", songs.len());
        Ok(current.len())
    }

    /// Songs of `name`; an absent or corrupt file reads as empty.
    #[must_use]
    pub fn songs(&self, name: &str) -> Vec<String> {
        persist::read_json_or_default(&self.file_for(name))
    }

    /// Shareable plain-text rendering of a playlist.
    ///
    /// # Errors
    ///
    /// `UnknownPlaylist`, or `EmptyPlaylist` when there is nothing to share.
    pub fn share_text(&self, name: &str) -> Result<String> {
        self.require(name)?;
        let songs = self.songs(name);
        if songs.is_empty() {
            return Err(RecommendError::EmptyPlaylist(name.to_string()));
        }

        let mut text = format!("My playlist '{name}'\n\n");
        for (i, song) in songs.iter().enumerate() {
            let _ = writeln!(text, "{}. {song}", i + 1);
        }
        Ok(text)
    }

    /// Delete the playlist file and its index entry.
    ///
    /// # Errors
    ///
    /// `UnknownPlaylist`, or `Persistence` if the index cannot be rewritten.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.require(name)?;
        persist::remove_if_exists(&self.file_for(name))?;
        self.names.retain(|n| n != name);
        persist::write_json(&self.index_path(), &self.names)?;

        info!("Deleted playlist '{name}'");
        Ok(())
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// `playlist_<name>.json`. Characters that are unsafe in file names, and
/// `%` itself, are written as `%XX` per UTF-8 byte, so distinct names never
/// share a file.
#[must_use]
pub fn playlist_file_name(name: &str) -> String {
    let mut safe = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '%' => escape_char(&mut safe, c),
            c if c.is_control() => escape_char(&mut safe, c),
            c => safe.push(c),
        }
    }
    format!("playlist_{safe}.json")
}

fn escape_char(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    for byte in c.encode_utf8(&mut buf).bytes() {
        let _ = write!(out, "%{byte:02X}");
    }
}
