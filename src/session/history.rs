//! Recent-search history: bounded in-memory list plus an optional store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::error::{Result, SmartSearchError};

/// Default number of remembered searches
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Most-recent-first list of distinct queries with a fixed capacity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearches {
    capacity: usize,
    entries: VecDeque<String>,
}

impl Default for RecentSearches {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl RecentSearches {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Rebuild from stored entries (most recent first)
    ///
    /// Later duplicates are dropped and the list is cut to `capacity`.
    pub fn from_entries(capacity: usize, entries: impl IntoIterator<Item = String>) -> Self {
        let mut recent = Self::new(capacity);
        for entry in entries {
            let entry = entry.trim();
            if entry.is_empty() || recent.entries.iter().any(|e| e == entry) {
                continue;
            }
            if recent.entries.len() == capacity {
                break;
            }
            recent.entries.push_back(entry.to_string());
        }
        recent
    }

    /// Record a query at the front
    ///
    /// An existing identical entry moves to the front instead of being
    /// duplicated. Blank queries are ignored; returns whether anything changed.
    pub fn push(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() || self.capacity == 0 {
            return false;
        }
        if let Some(pos) = self.entries.iter().position(|e| e == query) {
            if let Some(existing) = self.entries.remove(pos) {
                self.entries.push_front(existing);
            }
        } else {
            self.entries.push_front(query.to_string());
            self.entries.truncate(self.capacity);
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn front(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Persistence for recent searches across sessions
pub trait HistoryStore: Send + Sync {
    /// Stored queries, most recent first
    fn load(&self) -> Result<Vec<String>>;

    /// Record one query
    fn save(&self, query: &str) -> Result<()>;

    /// Forget everything
    fn clear(&self) -> Result<()>;
}

/// On-disk history file layout
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryFile {
    updated_at: DateTime<Utc>,
    searches: Vec<String>,
}

/// JSON file backed history store
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
    capacity: usize,
}

impl FileHistoryStore {
    pub fn new(path: PathBuf, capacity: usize) -> Self {
        Self { path, capacity }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, recent: &RecentSearches) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SmartSearchError::Io {
                source: e,
                context: format!("Failed to create history directory: {}", parent.display()),
            })?;
        }

        let file = HistoryFile {
            updated_at: Utc::now(),
            searches: recent.to_vec(),
        };
        let content = serde_json::to_string_pretty(&file).map_err(|e| SmartSearchError::Json {
            source: e,
            context: "Failed to serialize search history".to_string(),
        })?;
        std::fs::write(&self.path, content).map_err(|e| SmartSearchError::Io {
            source: e,
            context: format!("Failed to write history file: {}", self.path.display()),
        })?;

        Ok(())
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| SmartSearchError::Io {
            source: e,
            context: format!("Failed to read history file: {}", self.path.display()),
        })?;
        let file: HistoryFile = serde_json::from_str(&content).map_err(|e| {
            SmartSearchError::History(format!(
                "Corrupt history file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(RecentSearches::from_entries(self.capacity, file.searches).to_vec())
    }

    fn save(&self, query: &str) -> Result<()> {
        let mut recent = RecentSearches::from_entries(self.capacity, self.load()?);
        if recent.push(query) {
            self.write(&recent)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.write(&RecentSearches::new(self.capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_push_moves_duplicate_to_front() {
        let mut recent = RecentSearches::new(10);
        recent.push("budget report");
        recent.push("launch");
        recent.push("budget report");

        assert_eq!(recent.to_vec(), vec!["budget report", "launch"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut recent = RecentSearches::new(3);
        for q in ["a", "b", "c", "d"] {
            recent.push(q);
        }
        assert_eq!(recent.to_vec(), vec!["d", "c", "b"]);
        assert_eq!(recent.capacity(), 3);
    }

    #[test]
    fn test_blank_queries_ignored() {
        let mut recent = RecentSearches::default();
        assert!(!recent.push("   "));
        assert!(recent.is_empty());
    }

    #[test]
    fn test_from_entries_dedups_and_caps() {
        let recent = RecentSearches::from_entries(
            2,
            vec!["x".to_string(), "x".to_string(), "y".to_string(), "z".to_string()],
        );
        assert_eq!(recent.to_vec(), vec!["x", "y"]);
    }

    #[test]
    fn test_file_store_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("history.json");
        let store = FileHistoryStore::new(path.clone(), 10);

        assert!(store.load().unwrap().is_empty());
        store.save("alpha").unwrap();
        store.save("beta").unwrap();
        store.save("alpha").unwrap();

        let reopened = FileHistoryStore::new(path, 10);
        assert_eq!(reopened.load().unwrap(), vec!["alpha", "beta"]);

        reopened.clear().unwrap();
        assert!(reopened.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileHistoryStore::new(path, 10);
        assert!(matches!(store.load(), Err(SmartSearchError::History(_))));
    }
}
