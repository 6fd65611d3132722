//! JSON file helpers shared by the history and playlist stores.
//!
//! Reads are forgiving: a missing or unparsable file yields the type's
//! default. Writes replace the whole file through a temporary sibling so a
//! crash mid-write never leaves half a document behind.

use crate::error::{RecommendError, Result};
use log::{trace, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Read `path` as JSON, falling back to `T::default()` when the file is
/// absent, unreadable or corrupt.
pub fn read_json_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            trace!("{} does not exist yet", path.display());
            return T::default();
        }
        Err(e) => {
            warn!("Could not read {}, treating it as empty: {e}", path.display());
            return T::default();
        }
    };

    serde_json::from_str(&contents).unwrap_or_else(|e| {
        warn!("Corrupt JSON in {}, treating it as empty: {e}", path.display());
        T::default()
    })
}

/// Serialize `value` as pretty-printed UTF-8 JSON and atomically replace
/// `path` with it. Parent directories are created as needed.
///
/// # Errors
///
/// [`RecommendError::Persistence`] on any I/O or serialization failure.
pub fn write_json<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| RecommendError::persistence(dir, e))?;

    let tmp = NamedTempFile::new_in(dir).map_err(|e| RecommendError::persistence(path, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, value)
            .map_err(|e| RecommendError::persistence(path, io::Error::from(e)))?;
        writer.write_all(b"\n").map_err(|e| RecommendError::persistence(path, e))?;
        writer.flush().map_err(|e| RecommendError::persistence(path, e))?;
    }
    tmp.persist(path).map_err(|e| RecommendError::persistence(path, e.error))?;

    trace!("Wrote {}", path.display());
    Ok(())
}

/// Remove `path`, ignoring a file that is already gone.
///
/// # Errors
///
/// [`RecommendError::Persistence`] for any other removal failure.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RecommendError::persistence(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let value: Vec<String> = read_json_or_default(&dir.path().join("nope.json"));
        assert!(value.is_empty());
    }

    #[test]
    fn test_corrupt_file_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "[\"unterminated").unwrap();
        let value: Vec<String> = read_json_or_default(&path);
        assert!(value.is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/list.json");
        let names = vec!["Drive".to_string(), "비 오는 날".to_string()];
        write_json(&path, &names).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("비 오는 날"), "non-ASCII text should be written as-is");
        assert_eq!(read_json_or_default::<Vec<String>>(&path), names);
    }

    #[test]
    fn test_remove_if_exists_tolerates_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.json");
        assert!(remove_if_exists(&path).is_ok());
        fs::write(&path, "[]").unwrap();
        remove_if_exists(&path).unwrap();
        assert!(!path.exists());
    }
}
