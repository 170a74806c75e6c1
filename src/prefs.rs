//! Local preference store.
//!
//! Small JSON key/value file under the state directory. Keys follow the
//! platform's preference naming (`preference/user/<person-id>/place`) so
//! they line up with what other clients persist.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

pub struct Preferences {
    entries: BTreeMap<String, Value>,
    path: PathBuf,
}

impl Preferences {
    /// Load (or start) the preference file. A missing or unparseable
    /// file starts fresh; preferences are always recoverable state.
    pub fn load(path: PathBuf) -> Self {
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default();
        Self { entries, path }
    }

    /// Preference key for a person's last active place
    pub fn place_key(person_id: &str) -> String {
        format!("preference/user/{person_id}/place")
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.save()
    }

    /// The place this person last had active, if recorded
    pub fn last_place(&self, person_id: &str) -> Option<&str> {
        self.get_str(&Self::place_key(person_id))
    }

    pub fn set_last_place(&mut self, person_id: &str, place_id: &str) -> Result<()> {
        self.set(&Self::place_key(person_id), Value::String(place_id.into()))
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trips_last_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");

        let mut prefs = Preferences::load(path.clone());
        assert!(prefs.last_place("person-1").is_none());
        prefs.set_last_place("person-1", "place-2").unwrap();

        let reloaded = Preferences::load(path);
        assert_eq!(reloaded.last_place("person-1"), Some("place-2"));
        assert_eq!(
            reloaded.get_str("preference/user/person-1/place"),
            Some("place-2")
        );
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "not json").unwrap();

        let prefs = Preferences::load(path);
        assert!(prefs.last_place("person-1").is_none());
    }
}
