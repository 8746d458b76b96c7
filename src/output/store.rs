//! Schedule persistence.
//!
//! Storing is an upsert keyed by schedule id: re-running a plan replaces
//! the previous document but keeps its creation time, so a retried run
//! leaves the same record behind.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::document::ScheduleDocument;
use crate::error::ScanError;

/// Storage for schedule documents.
pub trait ScheduleStore {
    /// Loads the document stored under `schedule_id`, if any.
    fn load(&self, schedule_id: &str) -> Result<Option<ScheduleDocument>, ScanError>;

    /// Writes `document`, replacing any document with the same id.
    fn save(&mut self, document: &ScheduleDocument) -> Result<(), ScanError>;

    /// Saves `document`, keeping `created_at` of an existing version.
    ///
    /// Returns the document as stored.
    fn upsert(&mut self, mut document: ScheduleDocument) -> Result<ScheduleDocument, ScanError> {
        if let Some(existing) = self.load(&document.schedule_id)? {
            document.created_at = existing.created_at;
        }
        self.save(&document)?;
        Ok(document)
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: HashMap<String, ScheduleDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ScheduleStore for MemoryStore {
    fn load(&self, schedule_id: &str) -> Result<Option<ScheduleDocument>, ScanError> {
        Ok(self.documents.get(schedule_id).cloned())
    }

    fn save(&mut self, document: &ScheduleDocument) -> Result<(), ScanError> {
        self.documents
            .insert(document.schedule_id.clone(), document.clone());
        Ok(())
    }
}

/// One pretty-printed `<id>.json` file per schedule in a directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Uses `dir`, created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `schedule_id`. Characters outside `[A-Za-z0-9._-]`
    /// become `_`.
    pub fn path_for(&self, schedule_id: &str) -> PathBuf {
        let name: String = schedule_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl ScheduleStore for JsonDirStore {
    fn load(&self, schedule_id: &str) -> Result<Option<ScheduleDocument>, ScanError> {
        let path = self.path_for(schedule_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&mut self, document: &ScheduleDocument) -> Result<(), ScanError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&document.schedule_id);
        let content = serde_json::to_string_pretty(document)?;

        // atomic replace
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;

        debug!(path = %path.display(), "stored scan schedule");
        Ok(())
    }
}
