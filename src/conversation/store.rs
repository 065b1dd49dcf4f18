//! Append-only message log

use super::ConversationEntry;

/// Ordered log of conversation entries.
///
/// Insertion order is display order. The store hands out shared slices only,
/// so an entry cannot change once appended.
#[derive(Debug, Default, Clone)]
pub struct MessageStore {
    entries: Vec<ConversationEntry>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry to the end of the log and return a view of it
    pub fn append(&mut self, entry: ConversationEntry) -> &ConversationEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Current entries in display order
    pub fn snapshot(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
