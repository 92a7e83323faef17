//! Card instance identification.
//!
//! Every physical card occurrence in a duel has a unique `InstanceId`.
//! Instance ids are allocated when a snapshot is loaded (or when a test
//! builds a state by hand) and stay stable while the card moves between
//! zones.
//!
//! Instance ids are **not** part of the structural state hash: two states
//! whose cards were allocated in a different order are the same position.
//! They exist so that relations between cards (an equip spell and the
//! monster it is attached to) can be expressed without owning links.
//!
//! ## Usage
//!
//! ```
//! use combo_search::core::{InstanceAllocator, InstanceId};
//!
//! let mut alloc = InstanceAllocator::default();
//! let a = alloc.next();
//! let b = alloc.next();
//!
//! assert_ne!(a, b);
//! assert_eq!(a, InstanceId(0));
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for one card occurrence within a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic allocator for instance ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceAllocator {
    next: u32,
}

impl InstanceAllocator {
    /// Allocator whose first id is `start`.
    #[must_use]
    pub const fn starting_at(start: u32) -> Self {
        Self { next: start }
    }

    /// Allocate the next id.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        id
    }

    /// Make sure future ids never collide with `seen`.
    pub fn reserve(&mut self, seen: InstanceId) {
        self.next = self.next.max(seen.0 + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_allocation() {
        let mut alloc = InstanceAllocator::default();
        assert_eq!(alloc.next(), InstanceId(0));
        assert_eq!(alloc.next(), InstanceId(1));
        assert_eq!(alloc.next(), InstanceId(2));
    }

    #[test]
    fn test_reserve_skips_explicit_ids() {
        let mut alloc = InstanceAllocator::default();
        alloc.reserve(InstanceId(10));
        assert_eq!(alloc.next(), InstanceId(11));

        // Reserving a lower id never moves the cursor backwards
        alloc.reserve(InstanceId(3));
        assert_eq!(alloc.next(), InstanceId(12));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", InstanceId(5)), "#5");
    }
}
