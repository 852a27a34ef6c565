//! Command history with Up/Down navigation.
//!
//! A bounded log of submitted lines plus a cursor in `[0, len]`. The cursor
//! sits at `len` ("past the end", a fresh prompt) except while the user is
//! browsing with the arrow keys.

use crate::core::storage::{NullStorage, Storage};
use crate::utils::RingBuffer;

pub struct HistoryManager {
    entries: RingBuffer<String>,
    cursor: usize,
    storage: Box<dyn Storage>,
}

impl HistoryManager {
    pub fn new(capacity: usize, storage: Box<dyn Storage>) -> Self {
        Self {
            entries: RingBuffer::new(capacity),
            cursor: 0,
            storage,
        }
    }

    /// History kept only in memory.
    pub fn in_memory(capacity: usize) -> Self {
        Self::new(capacity, Box::new(NullStorage))
    }

    /// Restore the saved log. Missing or unreadable data gives an empty
    /// history; a log longer than `capacity` keeps its newest entries.
    pub fn load(capacity: usize, storage: Box<dyn Storage>) -> Self {
        let saved: Vec<String> = match storage.load() {
            Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|err| {
                log::warn!("discarding saved history: {err}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                log::warn!("history storage unreadable: {err}");
                Vec::new()
            }
        };

        let entries = RingBuffer::from_iter_capped(
            capacity,
            saved.into_iter().filter(|line| !line.trim().is_empty()),
        );
        Self {
            cursor: entries.len(),
            entries,
            storage,
        }
    }

    /// Record a submitted line.
    ///
    /// Blank lines are ignored. Repeating the newest entry stores nothing
    /// but still resets the cursor, so Up brings that command back.
    pub fn add(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        if self.entries.last().is_none_or(|last| last != line) {
            self.entries.push(line.to_string());
            self.persist();
        }
        self.reset_index();
    }

    /// Step back to an older entry. Stays on the oldest once reached.
    pub fn previous(&mut self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        self.cursor = self.cursor.saturating_sub(1);
        self.entries.get(self.cursor).cloned()
    }

    /// Step forward to a newer entry. Past the newest this yields an empty
    /// line, as if the prompt were fresh.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> String {
        self.cursor = (self.cursor + 1).min(self.entries.len());
        self.entries.get(self.cursor).cloned().unwrap_or_default()
    }

    /// Stop browsing: move the cursor past the newest entry.
    pub fn reset_index(&mut self) {
        self.cursor = self.entries.len();
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.to_vec()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.persist();
    }

    fn persist(&self) {
        let blob = match serde_json::to_string(&self.entries.to_vec()) {
            Ok(blob) => blob,
            Err(err) => {
                log::error!("failed to serialize history: {err}");
                return;
            }
        };
        if let Err(err) = self.storage.save(&blob) {
            log::warn!("history not saved: {err}");
        }
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::in_memory(crate::config::MAX_COMMAND_HISTORY)
    }
}
