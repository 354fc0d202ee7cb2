//! Navigation history: an ordered entry list with a movable cursor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default cap on the number of retained entries
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// One committed navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationEntry {
    /// Normalized path, without query or fragment
    pub path: String,
    /// Name of the route the path resolved to
    pub name: String,
    /// Query string, if the location carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Logical sequence number; strictly increasing in commit order
    pub timestamp: u64,
    /// Opaque payload supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
    /// Wall-clock commit time, informational only
    pub recorded_at: DateTime<Utc>,
}

/// Serializable copy of the history stack
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub entries: Vec<NavigationEntry>,
    pub cursor: Option<usize>,
}

/// Errors restoring a snapshot
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("history cursor {cursor} is out of range for {len} entries")]
    CursorOutOfRange { cursor: usize, len: usize },

    #[error("history snapshot has entries but no cursor")]
    MissingCursor,
}

/// Fields of an entry about to be committed
#[derive(Debug, Clone, Default)]
pub struct PendingEntry {
    pub path: String,
    pub name: String,
    pub query: Option<String>,
    pub state: Option<serde_json::Value>,
}

/// The history stack
///
/// Invariant: `cursor` is `None` exactly when `entries` is empty, and
/// otherwise indexes a valid entry.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: Vec<NavigationEntry>,
    cursor: Option<usize>,
    next_seq: u64,
    max_entries: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl HistoryStack {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            next_seq: 1,
            max_entries: max_entries.max(1),
        }
    }

    fn stamp(&mut self, pending: PendingEntry) -> NavigationEntry {
        let timestamp = self.next_seq;
        self.next_seq += 1;
        NavigationEntry {
            path: pending.path,
            name: pending.name,
            query: pending.query,
            timestamp,
            state: pending.state,
            recorded_at: Utc::now(),
        }
    }

    /// Appends an entry after the cursor, discarding any forward entries
    pub fn push(&mut self, pending: PendingEntry) -> &NavigationEntry {
        let entry = self.stamp(pending);

        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
        self.entries.push(entry);

        let overflow = self.entries.len().saturating_sub(self.max_entries);
        if overflow > 0 {
            self.entries.drain(..overflow);
        }

        let last = self.entries.len() - 1;
        self.cursor = Some(last);
        &self.entries[last]
    }

    /// Replaces the entry under the cursor, or pushes when history is empty
    ///
    /// Forward entries are kept.
    pub fn replace(&mut self, pending: PendingEntry) -> &NavigationEntry {
        match self.cursor {
            Some(cursor) => {
                let entry = self.stamp(pending);
                self.entries[cursor] = entry;
                &self.entries[cursor]
            }
            None => self.push(pending),
        }
    }

    /// Index of the entry one step back, if any
    pub fn back_index(&self) -> Option<usize> {
        self.cursor.and_then(|c| c.checked_sub(1))
    }

    /// Index of the entry one step forward, if any
    pub fn forward_index(&self) -> Option<usize> {
        self.cursor
            .map(|c| c + 1)
            .filter(|&next| next < self.entries.len())
    }

    /// Moves the cursor without touching the entries
    ///
    /// Returns `None` if the index is out of range.
    pub fn move_to(&mut self, index: usize) -> Option<&NavigationEntry> {
        if index >= self.entries.len() {
            return None;
        }
        self.cursor = Some(index);
        self.entries.get(index)
    }

    pub fn get(&self, index: usize) -> Option<&NavigationEntry> {
        self.entries.get(index)
    }

    /// Entry under the cursor
    pub fn current(&self) -> Option<&NavigationEntry> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.back_index().is_some()
    }

    pub fn can_go_forward(&self) -> bool {
        self.forward_index().is_some()
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            entries: self.entries.clone(),
            cursor: self.cursor,
        }
    }

    /// Replaces the whole stack with a persisted snapshot
    ///
    /// Entries beyond the cap are dropped from the front, but never past the
    /// cursor: if the cursor sits in the oldest part, the newest forward
    /// entries are dropped instead so the cursor keeps its entry.
    pub fn restore(&mut self, snapshot: HistorySnapshot) -> Result<(), SnapshotError> {
        let HistorySnapshot {
            mut entries,
            cursor,
        } = snapshot;

        let cursor = match (entries.is_empty(), cursor) {
            (true, _) => None,
            (false, None) => return Err(SnapshotError::MissingCursor),
            (false, Some(c)) if c >= entries.len() => {
                return Err(SnapshotError::CursorOutOfRange {
                    cursor: c,
                    len: entries.len(),
                })
            }
            (false, Some(c)) => Some(c),
        };

        let overflow = entries.len().saturating_sub(self.max_entries);
        let start = cursor.map_or(overflow, |c| overflow.min(c));
        entries.drain(..start);
        entries.truncate(self.max_entries);
        let cursor = cursor.map(|c| c - start);

        self.next_seq = entries.iter().map(|e| e.timestamp).max().unwrap_or(0) + 1;
        self.entries = entries;
        self.cursor = cursor;
        Ok(())
    }
}
