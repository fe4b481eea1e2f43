use std::sync::RwLock;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::{Store, THEME_KEY};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
}

impl Default for ThemePreference {
    fn default() -> Self {
        ThemePreference::Light
    }
}

/// Persisted theme preference, independent of the history log. Writes go
/// through before the new value becomes visible.
pub struct ThemeStore {
    store: Store,
    current: RwLock<ThemePreference>,
}

impl ThemeStore {
    pub fn new(store: Store) -> Self {
        let current = store.load(THEME_KEY, ThemePreference::default());
        Self {
            store,
            current: RwLock::new(current),
        }
    }

    pub fn current(&self) -> ThemePreference {
        *self.current.read().unwrap()
    }

    pub fn toggle(&self) -> Result<ThemePreference> {
        let mut guard = self.current.write().unwrap();
        let next = match *guard {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        };
        self.store.save(THEME_KEY, &next)?;
        *guard = next;
        Ok(next)
    }

    pub fn set(&self, pref: ThemePreference) -> Result<ThemePreference> {
        let mut guard = self.current.write().unwrap();
        self.store.save(THEME_KEY, &pref)?;
        *guard = pref;
        Ok(pref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn defaults_to_light_when_absent() {
        let (_dir, store) = theme_store();
        let theme = ThemeStore::new(store);
        assert_eq!(theme.current(), ThemePreference::Light);
    }

    #[test]
    fn toggle_persists_across_reload() {
        let (_dir, store) = theme_store();

        let theme = ThemeStore::new(store.clone());
        assert_eq!(theme.toggle().unwrap(), ThemePreference::Dark);

        let reloaded = ThemeStore::new(store);
        assert_eq!(reloaded.current(), ThemePreference::Dark);
    }

    #[test]
    fn set_persists_explicit_preference() {
        let (_dir, store) = theme_store();

        let theme = ThemeStore::new(store.clone());
        assert_eq!(
            theme.set(ThemePreference::Dark).unwrap(),
            ThemePreference::Dark
        );
        // Setting the current value again is harmless.
        assert_eq!(
            theme.set(ThemePreference::Dark).unwrap(),
            ThemePreference::Dark
        );

        let reloaded = ThemeStore::new(store);
        assert_eq!(reloaded.current(), ThemePreference::Dark);
    }

    #[test]
    fn toggle_twice_returns_to_light() {
        let (_dir, store) = theme_store();
        let theme = ThemeStore::new(store);

        theme.toggle().unwrap();
        assert_eq!(theme.toggle().unwrap(), ThemePreference::Light);
    }
}
