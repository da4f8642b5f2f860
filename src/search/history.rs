//! Local search-history persistence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::warn;

/// One remembered search. Timestamps persist as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub query: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Device-local search history, flushed to a JSON file on every change.
///
/// Invariants: at most one entry per distinct query text (the most
/// recent submission wins and moves to the front), newest first, capped
/// at a maximum count.
pub struct HistoryStore {
    path: PathBuf,
    max_entries: usize,
    entries: RwLock<Vec<SearchHistoryEntry>>,
}

impl HistoryStore {
    /// Open the store, loading whatever the file currently holds.
    /// A missing or unreadable file starts the history empty.
    pub fn load(path: PathBuf, max_entries: usize) -> Self {
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<SearchHistoryEntry>>(&content) {
                Ok(mut entries) => {
                    entries.truncate(max_entries);
                    entries
                }
                Err(err) => {
                    warn!("ignoring corrupt history file {}: {}", path.display(), err);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Self {
            path,
            max_entries,
            entries: RwLock::new(entries),
        }
    }

    /// Record a submitted query, deduplicating by text and flushing
    /// before returning
    pub fn add(&self, query: &str) {
        let entry = SearchHistoryEntry {
            query: query.to_string(),
            timestamp: Utc::now(),
        };

        let snapshot = {
            let mut entries = self.entries.write().unwrap();
            entries.retain(|existing| existing.query != query);
            entries.insert(0, entry);
            entries.truncate(self.max_entries);
            entries.clone()
        };

        self.flush(&snapshot);
    }

    /// Forget everything, removing the backing file
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
        if self.path.exists() {
            if let Err(err) = std::fs::remove_file(&self.path) {
                warn!("failed to remove history file {}: {}", self.path.display(), err);
            }
        }
    }

    /// Current entries, newest first
    pub fn entries(&self) -> Vec<SearchHistoryEntry> {
        self.entries.read().unwrap().clone()
    }

    fn flush(&self, entries: &[SearchHistoryEntry]) {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string(entries)?;
            std::fs::write(&self.path, json)
        };

        if let Err(err) = write() {
            warn!("failed to persist history to {}: {}", self.path.display(), err);
        }
    }
}
