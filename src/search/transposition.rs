//! [Transposition Table] scoped to a single search: created empty when the
//! search starts and dropped when it returns, so no synchronization is
//! needed.
//!
//! [Transposition Table]: https://www.chessprogramming.org/Transposition_Table

use std::collections::HashMap;

use crate::chess::zobrist::Key;
use crate::search::Depth;

/// Result of a finished sub-search.
pub(super) struct Entry {
    pub(super) score: i32,
    /// Remaining depth the score was computed with. An entry only answers
    /// probes for the same or smaller remaining depth.
    pub(super) depth: Depth,
}

pub(super) struct TranspositionTable {
    table: HashMap<Key, Entry>,
}

impl TranspositionTable {
    #[must_use]
    pub(super) fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    #[must_use]
    pub(super) fn probe(&self, key: Key, depth: Depth) -> Option<&Entry> {
        self.table.get(&key).filter(|entry| entry.depth >= depth)
    }

    pub(super) fn store(&mut self, key: Key, score: i32, depth: Depth) {
        let _ = self.table.insert(key, Entry { score, depth });
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.table.len()
    }
}
