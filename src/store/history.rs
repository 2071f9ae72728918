//! Terminal command history
//!
//! Bounded list of submitted commands. A command equal to the last entry is not
//! recorded again; beyond capacity the oldest entry is dropped.

use crate::error::StorageError;
use crate::store::{KeyValueStore, FILE_TREE_HISTORY_KEY};
use std::collections::VecDeque;
use tracing::warn;

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record a command. Returns false when it repeated the last entry.
    pub fn push(&mut self, command: &str) -> bool {
        if self.entries.back().map(String::as_str) == Some(command) {
            return false;
        }
        self.entries.push_back(command.to_string());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Load from the store. A missing or unreadable value yields an empty history.
    pub fn load<S: KeyValueStore>(store: &S, capacity: usize) -> Result<Self, StorageError> {
        let mut history = Self::new(capacity);
        let Some(text) = store.get(FILE_TREE_HISTORY_KEY)? else {
            return Ok(history);
        };
        match serde_json::from_str::<Vec<String>>(&text) {
            Ok(list) => {
                let skip = list.len().saturating_sub(history.capacity);
                history.entries = list.into_iter().skip(skip).collect();
            }
            Err(e) => warn!(error = %e, "Failed to parse command history"),
        }
        Ok(history)
    }

    pub fn save<S: KeyValueStore>(&self, store: &S) -> Result<(), StorageError> {
        let list: Vec<&String> = self.entries.iter().collect();
        store.set(FILE_TREE_HISTORY_KEY, &serde_json::to_string(&list)?)
    }
}
