//! Persistent request history.
//!
//! The history is a single YAML sequence stored at `.spag/history.yml`,
//! newest entry first. Appending trims the oldest entries so the file never
//! holds more than the configured limit.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::models::{HistoryEntry, HistoryError, RecordedExchange};
use crate::files;

/// Default maximum number of history entries to retain.
pub const DEFAULT_MAX_HISTORY_ENTRIES: usize = 1000;

/// A history file and its size limit.
#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
    limit: usize,
}

impl History {
    /// Creates a handle on the history file at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - The history file, created on first append
    /// * `limit` - Maximum number of entries kept
    pub fn new(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every entry, newest first.
    ///
    /// A missing file is an empty history. Entries that fail to deserialize
    /// are skipped with a warning so one corrupted record does not hide the
    /// rest.
    pub fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        if !self.path.is_file() {
            return Ok(Vec::new());
        }

        let text = files::read_file(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<serde_yaml::Value> = serde_yaml::from_str(&text)?;
        let mut entries = Vec::with_capacity(raw.len());
        for (position, value) in raw.into_iter().enumerate() {
            match serde_yaml::from_value::<HistoryEntry>(value) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(position, error = %e, "skipping corrupted history entry"),
            }
        }
        Ok(entries)
    }

    /// Records an exchange as the newest entry, trimming to the limit.
    pub fn append(&self, exchange: &RecordedExchange) -> Result<HistoryEntry, HistoryError> {
        let entry = HistoryEntry::new(exchange.clone());
        self.append_entry(entry.clone())?;
        Ok(entry)
    }

    /// Inserts a pre-stamped entry at the front of the history.
    pub fn append_entry(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut entries = self.load()?;
        entries.insert(0, entry);
        if entries.len() > self.limit {
            debug!(dropped = entries.len() - self.limit, "trimming history");
            entries.truncate(self.limit);
        }

        files::write_file(&self.path, &serde_yaml::to_string(&entries)?)?;
        Ok(())
    }

    /// Returns the entry at `raw_index` (0 is the most recent).
    ///
    /// # Errors
    ///
    /// - `HistoryError::InvalidIndex` if `raw_index` is not a non-negative integer
    /// - `HistoryError::OutOfBounds` if there is no entry at that position
    pub fn get(&self, raw_index: &str) -> Result<HistoryEntry, HistoryError> {
        let index: usize = raw_index
            .trim()
            .parse()
            .map_err(|_| HistoryError::InvalidIndex(raw_index.to_string()))?;

        let mut entries = self.load()?;
        let len = entries.len();
        if index >= len {
            return Err(HistoryError::OutOfBounds { index, len });
        }
        Ok(entries.swap_remove(index))
    }

    /// Removes every entry.
    pub fn clear(&self) -> Result<(), HistoryError> {
        let empty: Vec<HistoryEntry> = Vec::new();
        files::write_file(&self.path, &serde_yaml::to_string(&empty)?)?;
        Ok(())
    }
}
