//! Progress recorder: which stages a wizard session has completed.
//!
//! Persisted as JSON under the state directory, keyed per person, so a
//! restarted console resumes the flow at the right step. The `data` map
//! is the wizard's shared state: answers recorded by earlier steps that
//! later steps read back.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::client::Attributes;

use super::stage::Stage;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProgressFile {
    /// Completed stage keys, in the order they completed
    completed: Vec<String>,
    /// Shared wizard state merged by `record_progress`
    data: Attributes,
}

/// Tracks completed stages and shared data for one wizard session
#[derive(Debug, Default)]
pub struct ProgressRecorder {
    file: ProgressFile,
    path: Option<PathBuf>,
}

impl ProgressRecorder {
    /// A recorder that never touches disk (tests, one-shot flows)
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load (or start) the persisted progress for a person. A missing
    /// file is a fresh session, not an error.
    pub fn load(path: PathBuf) -> Result<Self> {
        let file = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            ProgressFile::default()
        };
        Ok(Self {
            file,
            path: Some(path),
        })
    }

    /// Progress file path for a person under the state directory
    pub fn path_for(state_dir: &std::path::Path, person_id: &str) -> PathBuf {
        state_dir.join(format!("signup-progress-{person_id}.json"))
    }

    /// Mark a stage complete and merge its data into the shared state
    pub fn record_progress(&mut self, stage: Stage, data: Attributes) -> Result<()> {
        let key = stage.key().to_string();
        if !self.file.completed.contains(&key) {
            self.file.completed.push(key);
        }
        for (k, v) in data {
            self.file.data.insert(k, v);
        }
        self.save()
    }

    /// Unmark a stage so revisiting it is not silently bypassed
    pub fn undo_progress(&mut self, stage: Stage) -> Result<()> {
        let key = stage.key();
        self.file.completed.retain(|k| k != key);
        self.save()
    }

    /// Reset everything (starting a fresh flow)
    pub fn clear_all_progress(&mut self) -> Result<()> {
        self.file = ProgressFile::default();
        self.save()
    }

    /// Whether a stage has been recorded complete
    pub fn is_complete(&self, stage: Stage) -> bool {
        self.file.completed.iter().any(|k| k == stage.key())
    }

    /// Completed stage keys in completion order
    pub fn completed(&self) -> &[String] {
        &self.file.completed
    }

    /// The shared wizard data
    pub fn data(&self) -> &Attributes {
        &self.file.data
    }

    /// Read one shared value, deserialized
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.file
            .data
            .get(key)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }

    /// Read one shared value as a string slice
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.file.data.get(key).and_then(Value::as_str)
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(&self.file)?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(path = %path.display(), "wizard progress saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn attrs(pairs: &[(&str, Value)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_record_then_undo_membership() {
        let mut progress = ProgressRecorder::in_memory();
        assert!(!progress.is_complete(Stage::Zipcode));

        progress
            .record_progress(Stage::Zipcode, attrs(&[("zipcode", json!("97210"))]))
            .unwrap();
        assert!(progress.is_complete(Stage::Zipcode));

        progress.undo_progress(Stage::Zipcode).unwrap();
        assert!(!progress.is_complete(Stage::Zipcode));
        // Shared data survives an undo; only completion is retracted
        assert_eq!(progress.get_str("zipcode"), Some("97210"));
    }

    #[test]
    fn test_record_is_idempotent_and_ordered() {
        let mut progress = ProgressRecorder::in_memory();
        progress
            .record_progress(Stage::Zipcode, Attributes::new())
            .unwrap();
        progress
            .record_progress(Stage::Address, Attributes::new())
            .unwrap();
        progress
            .record_progress(Stage::Zipcode, Attributes::new())
            .unwrap();
        assert_eq!(progress.completed(), &["web:zipcode", "web:address"]);
    }

    #[test]
    fn test_later_data_overwrites_earlier_keys() {
        let mut progress = ProgressRecorder::in_memory();
        progress
            .record_progress(Stage::Plan, attrs(&[("plan", json!("BASIC"))]))
            .unwrap();
        progress
            .record_progress(Stage::Plan, attrs(&[("plan", json!("PREMIUM_PROMON"))]))
            .unwrap();
        assert_eq!(progress.get_str("plan"), Some("PREMIUM_PROMON"));
    }

    #[test]
    fn test_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = ProgressRecorder::path_for(dir.path(), "person-1");

        let mut progress = ProgressRecorder::load(path.clone()).unwrap();
        progress
            .record_progress(Stage::Zipcode, attrs(&[("zipcode", json!("97210"))]))
            .unwrap();
        progress
            .record_progress(Stage::Address, Attributes::new())
            .unwrap();
        drop(progress);

        let reloaded = ProgressRecorder::load(path).unwrap();
        assert!(reloaded.is_complete(Stage::Zipcode));
        assert!(reloaded.is_complete(Stage::Address));
        assert!(!reloaded.is_complete(Stage::Plan));
        assert_eq!(reloaded.get_str("zipcode"), Some("97210"));
    }

    #[test]
    fn test_clear_all_progress() {
        let dir = TempDir::new().unwrap();
        let path = ProgressRecorder::path_for(dir.path(), "person-1");

        let mut progress = ProgressRecorder::load(path.clone()).unwrap();
        progress
            .record_progress(Stage::Zipcode, attrs(&[("zipcode", json!("97210"))]))
            .unwrap();
        progress.clear_all_progress().unwrap();

        assert!(progress.completed().is_empty());
        assert!(progress.get_str("zipcode").is_none());

        let reloaded = ProgressRecorder::load(path).unwrap();
        assert!(reloaded.completed().is_empty());
    }
}
