//! Command history ring buffer.
//!
//! Holds the queries committed through the palette, most recent first. The
//! buffer lives as long as the palette value, across open/close cycles.
//! Persisting it is the host's job; `to_json`/`from_json` are provided for that.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::mode::Mode;
use crate::error::PaletteResult;

/// Default number of entries kept.
pub const DEFAULT_CAPACITY: usize = 50;

/// A committed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub query: String,
    pub mode_at_commit: Mode,
    /// Unix timestamp of the commit.
    pub timestamp: u64,
    pub result_count: usize,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time.
    pub fn now(query: impl Into<String>, mode_at_commit: Mode, result_count: usize) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Self {
            query: query.into(),
            mode_at_commit,
            timestamp,
            result_count,
        }
    }
}

/// Bounded history, most recent first.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    items: VecDeque<HistoryEntry>,
    max_items: usize,
}

impl CommandHistory {
    /// Create a new history with max items limit
    pub fn new(max_items: usize) -> Self {
        let max_items = max_items.max(1);
        Self {
            items: VecDeque::with_capacity(max_items),
            max_items,
        }
    }

    /// Prepend an entry, evicting the oldest past capacity.
    /// Entries with a blank query are ignored.
    pub fn record(&mut self, entry: HistoryEntry) -> bool {
        if entry.query.trim().is_empty() {
            return false;
        }

        self.items.push_front(entry);
        while self.items.len() > self.max_items {
            self.items.pop_back();
        }
        true
    }

    /// Entries whose query contains `filter` (case-insensitive), most recent first
    pub fn search(&self, filter: &str) -> Vec<&HistoryEntry> {
        let filter_lower = filter.to_lowercase();
        self.items
            .iter()
            .filter(|entry| entry.query.to_lowercase().contains(&filter_lower))
            .collect()
    }

    /// Get all entries (most recent first)
    pub fn all(&self) -> Vec<&HistoryEntry> {
        self.items.iter().collect()
    }

    /// Get entry by recency index (0 = most recent)
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Serialize entries for host-side persistence
    pub fn to_json(&self) -> PaletteResult<String> {
        Ok(serde_json::to_string(&self.items)?)
    }

    /// Restore entries previously produced by [`CommandHistory::to_json`]
    pub fn from_json(json: &str, max_items: usize) -> PaletteResult<Self> {
        let entries: Vec<HistoryEntry> = serde_json::from_str(json)?;
        let mut history = Self::new(max_items);
        // Stored most recent first; replay oldest first so order is preserved
        for entry in entries.into_iter().rev() {
            history.record(entry);
        }
        Ok(history)
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Cursor used while recalling history into the query field.
///
/// `None` means the user is editing their own text; `Some(i)` means the query
/// currently shows history entry `i`. Only ArrowUp on the top row steps it;
/// any edit or a move off the top row resets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecallCursor(Option<usize>);

impl RecallCursor {
    /// Step to the next older entry. Returns the entry index to show, if any.
    pub fn older(&mut self, history: &CommandHistory) -> Option<usize> {
        let next = match self.0 {
            None => 0,
            Some(i) => i + 1,
        };
        if next < history.len() {
            self.0 = Some(next);
            self.0
        } else {
            None
        }
    }

    pub fn is_active(&self) -> bool {
        self.0.is_some()
    }

    pub fn reset(&mut self) {
        self.0 = None;
    }
}
