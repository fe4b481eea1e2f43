use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use log::warn;
use serde::{de::DeserializeOwned, Serialize};

/// Store key for the serialized history log.
pub const HISTORY_KEY: &str = "nlp-history";
/// Store key for the theme preference.
pub const THEME_KEY: &str = "nlp-theme";

/// File-backed document store: one JSON document per key inside the app
/// data directory. `load` never fails; a missing or unreadable document
/// falls back to the caller-supplied default, so a corrupted store can
/// never block startup.
#[derive(Clone)]
pub struct Store {
    dir: Arc<PathBuf>,
}

impl Store {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory {}", dir.display()))?;
        Ok(Self {
            dir: Arc::new(dir),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let contents = match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => contents,
            Err(_) => return default,
        };

        match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(err) => {
                // Best-effort persistence: the previous contents are lost,
                // but the app keeps working on the default.
                warn!("Discarding corrupt document '{key}': {err}");
                default
            }
        }
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.path_for(key);
        let serialized = serde_json::to_string(value)?;
        fs::write(&path, serialized)
            .with_context(|| format!("Failed to write document to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        value: u32,
        name: String,
    }

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("store")).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_key_returns_default() {
        let (_dir, store) = store();
        let loaded: Doc = store.load("absent", Doc::default());
        assert_eq!(loaded, Doc::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = store();
        let doc = Doc {
            value: 7,
            name: "hello".into(),
        };

        store.save("doc", &doc).unwrap();
        let loaded: Doc = store.load("doc", Doc::default());
        assert_eq!(loaded, doc);
    }

    #[test]
    fn corrupt_document_falls_back_to_default() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("store").join("doc.json"), "not json {").unwrap();

        let loaded: Doc = store.load("doc", Doc::default());
        assert_eq!(loaded, Doc::default());
    }

    #[test]
    fn save_overwrites_previous_document() {
        let (_dir, store) = store();
        store
            .save(
                "doc",
                &Doc {
                    value: 1,
                    name: "first".into(),
                },
            )
            .unwrap();
        store
            .save(
                "doc",
                &Doc {
                    value: 2,
                    name: "second".into(),
                },
            )
            .unwrap();

        let loaded: Doc = store.load("doc", Doc::default());
        assert_eq!(loaded.value, 2);
        assert_eq!(loaded.name, "second");
    }
}
