//! Favorites — a persisted set of quake ids.
//!
//! The poller never touches this; it exists for front-ends that let a user
//! pin events. Storage is a plain JSON array of strings. A missing or
//! corrupt file reads as an empty set.

use crate::config::FavoritesConfig;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    #[error("could not write favorites to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode favorites: {0}")]
    Encode(#[from] serde_json::Error),
}

/// File-backed key-set store. One instance per file; no global state.
#[derive(Debug, Clone)]
pub struct FavoriteStore {
    path: PathBuf,
}

impl FavoriteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the `[favorites] path` from the config.
    pub fn from_config(cfg: &FavoritesConfig) -> Self {
        Self::new(&cfg.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored ids. Never fails: unreadable, invalid or non-array
    /// content gives an empty set, and non-string items are skipped.
    pub fn load(&self) -> HashSet<String> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), error = %err, "favorites unreadable");
                }
                return HashSet::new();
            }
        };

        match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(serde_json::Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(id) => Some(id),
                    _ => None,
                })
                .collect(),
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "favorites file is not a JSON array");
                HashSet::new()
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "favorites file is corrupt");
                HashSet::new()
            }
        }
    }

    /// Write `ids` as a pretty-printed JSON array, sorted so the file is
    /// stable across saves. Creates the parent directory if needed.
    pub fn save(&self, ids: &HashSet<String>) -> Result<(), FavoritesError> {
        let mut sorted: Vec<&String> = ids.iter().collect();
        sorted.sort();
        let json = serde_json::to_string_pretty(&sorted)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| FavoritesError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, json).map_err(|source| FavoritesError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FavoriteStore::new(dir.path().join("nope.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FavoriteStore::new(dir.path().join("data").join("favorites.json"));
        let saved = ids(&["us7000abcd", "ci40123456", "nc73912345"]);

        store.save(&saved).unwrap();
        assert_eq!(store.load(), saved);

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.find("ci40123456").unwrap() < text.find("us7000abcd").unwrap());
    }

    #[test]
    fn from_config_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = FavoritesConfig {
            path: dir.path().join("pins.json"),
        };
        let store = FavoriteStore::from_config(&cfg);
        assert_eq!(store.path(), cfg.path.as_path());

        store.save(&ids(&["ev1"])).unwrap();
        assert_eq!(FavoriteStore::from_config(&cfg).load(), ids(&["ev1"]));
    }

    #[test]
    fn corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, "[\"ev1\", ").unwrap();
        assert!(FavoriteStore::new(&path).load().is_empty());

        std::fs::write(&path, r#"{"ev1": true}"#).unwrap();
        assert!(FavoriteStore::new(&path).load().is_empty());
    }

    #[test]
    fn non_string_items_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, r#"["ev1", 42, null, "ev2", ["x"]]"#).unwrap();
        assert_eq!(FavoriteStore::new(&path).load(), ids(&["ev1", "ev2"]));
    }
}
