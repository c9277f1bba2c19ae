//! Bounded short-term conversation memory.
//!
//! A fixed-capacity ordered log of turns with drop-oldest eviction. Memory
//! lives for the process lifetime only and is mutated by exactly one
//! negotiation turn at a time, so there is no interior locking — the borrow
//! checker enforces the single-caller model.

use std::collections::VecDeque;

use palaver_core::{Role, Turn};
use tracing::trace;

/// Default number of turns retained when the config does not say otherwise.
pub const DEFAULT_CAPACITY: usize = 10;

/// A fixed-capacity FIFO log of conversation turns.
#[derive(Debug, Clone)]
pub struct BoundedMemory {
    turns: VecDeque<Turn>,
    capacity: usize,
    enabled: bool,
}

impl BoundedMemory {
    /// Create a memory holding at most `capacity` turns.
    pub fn new(capacity: usize, enabled: bool) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
            enabled,
        }
    }

    /// Append a turn, evicting the oldest entries once over capacity.
    /// No-op while disabled.
    pub fn add(&mut self, role: Role, content: impl Into<String>) {
        if !self.enabled {
            return;
        }

        self.turns.push_back(Turn {
            role,
            content: content.into(),
        });

        while self.turns.len() > self.capacity {
            let dropped = self.turns.pop_front();
            trace!(role = ?dropped.map(|t| t.role), "evicted oldest turn");
        }
    }

    /// Current contents in chronological order (oldest first).
    /// Empty while disabled, regardless of what is stored.
    pub fn turns(&self) -> Vec<Turn> {
        if !self.enabled {
            return Vec::new();
        }
        self.turns.iter().cloned().collect()
    }

    /// Number of retained turns (independent of the enabled flag).
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Empty the log. Capacity and the enabled flag are untouched.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Toggle accumulation. Disabling does not clear existing history;
    /// re-enabling resumes from the current state.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for BoundedMemory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, true)
    }
}
