use std::sync::Arc;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// An encoded image of the full surface at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Arc<[u8]>);

impl Snapshot {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Ordered log of surface states with a cursor.
///
/// Entries after the cursor are redo-able futures. Committing after an undo
/// truncates them. When the log grows beyond its capacity the oldest entry is
/// dropped and the cursor shifts down so it keeps naming the same state.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawHistory<T = Snapshot> {
    entries: Vec<T>,
    index: usize,
    capacity: usize,
}

impl<T: Clone> DrawHistory<T> {
    /// Start a history whose entry 0 is `initial`.
    pub fn new(initial: T, capacity: usize) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn commit(&mut self, entry: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push(entry);
        self.index += 1;
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
            self.index -= 1;
        }
        tracing::debug!(len = self.entries.len(), index = self.index, "history commit");
    }

    /// Step back one entry and return the state to restore.
    pub fn undo(&mut self) -> Option<&T> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    pub fn redo(&mut self) -> Option<&T> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    pub fn current(&self) -> &T {
        &self.entries[self.index]
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn index(&self) -> usize {
        self.index
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

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }
}
