//! Ordered list of finished generations, newest first.

use std::collections::VecDeque;
use std::fmt;

use cue_types::GenerationResult;
use uuid::Uuid;

/// Identifies one history entry. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(Uuid);

impl EntryId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A prompt and its generated text, as shown in the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    id: EntryId,
    result: GenerationResult,
}

impl Entry {
    /// Identifier used to remove or copy this entry.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// The finished generation.
    pub fn result(&self) -> &GenerationResult {
        &self.result
    }

    /// Shorthand for `result().prompt()`.
    pub fn prompt(&self) -> &str {
        self.result.prompt()
    }

    /// Shorthand for `result().generated_text()`.
    pub fn generated_text(&self) -> &str {
        self.result.generated_text()
    }
}

/// Result list with insert-at-front and remove-by-id.
#[derive(Debug, Default)]
pub struct History {
    entries: VecDeque<Entry>,
}

impl History {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `result` at the front and return its id.
    pub fn push_front(&mut self, result: GenerationResult) -> EntryId {
        let id = EntryId::new();
        self.entries.push_front(Entry { id, result });
        id
    }

    /// Remove the entry with `id`, if present. Order of the rest is unchanged.
    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(index)
    }

    /// Look up an entry by id.
    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entry at `index`, counting from the newest (0).
    pub fn nth(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
