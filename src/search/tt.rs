//! Transposition table.
//!
//! Maps an intermediate state's hash to the best terminal found reachable
//! from it. Bounded: when full, the oldest ~10% of entries (by insertion
//! order) are evicted. Eviction ignores entry values.

use std::collections::VecDeque;

use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::hash::StateHash;
use crate::eval::RankKey;

/// Best known outcome below one state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtEntry {
    /// Hash of the best terminal reached from this state.
    pub best_terminal: StateHash,
    /// That terminal's rank key.
    pub value: RankKey,
    /// Actions from this state to the terminal.
    pub depth: u32,
    /// Lookup hits on this entry.
    pub visits: u32,
}

impl TtEntry {
    #[must_use]
    pub fn new(best_terminal: StateHash, value: RankKey, depth: u32) -> Self {
        Self {
            best_terminal,
            value,
            depth,
            visits: 0,
        }
    }

    /// Higher value wins; equal values prefer the shorter line.
    fn improves_on(&self, other: &TtEntry) -> bool {
        (self.value, std::cmp::Reverse(self.depth)) > (other.value, std::cmp::Reverse(other.depth))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub evictions: u64,
}

impl TtStats {
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded insertion-ordered cache.
#[derive(Debug)]
pub struct TranspositionTable {
    map: FxHashMap<StateHash, TtEntry>,
    order: VecDeque<StateHash>,
    capacity: usize,
    stats: TtStats,
}

impl TranspositionTable {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            map: FxHashMap::default(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            stats: TtStats::default(),
        }
    }

    /// Look up `key`, counting a hit or a miss and bumping `visits` on a hit.
    pub fn probe(&mut self, key: StateHash) -> Option<TtEntry> {
        match self.map.get_mut(&key) {
            Some(entry) => {
                entry.visits = entry.visits.saturating_add(1);
                self.stats.hits += 1;
                Some(*entry)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Look up without touching statistics.
    #[must_use]
    pub fn get(&self, key: StateHash) -> Option<&TtEntry> {
        self.map.get(&key)
    }

    /// Record `entry` for `key` if it beats what is already stored.
    ///
    /// Returns true if the table changed.
    pub fn store(&mut self, key: StateHash, entry: TtEntry) -> bool {
        if let Some(existing) = self.map.get_mut(&key) {
            if !entry.improves_on(existing) {
                return false;
            }
            let visits = existing.visits;
            *existing = TtEntry { visits, ..entry };
            self.stats.stores += 1;
            return true;
        }

        if self.map.len() >= self.capacity {
            self.evict();
        }
        self.map.insert(key, entry);
        self.order.push_back(key);
        self.stats.stores += 1;
        true
    }

    /// Drop the oldest tenth of the table.
    fn evict(&mut self) {
        let count = (self.capacity / 10).max(1);
        for _ in 0..count {
            match self.order.pop_front() {
                Some(old) => {
                    self.map.remove(&old);
                    self.stats.evictions += 1;
                }
                None => break,
            }
        }
        debug!("tt: evicted {count} entries, {} remain", self.map.len());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn stats(&self) -> TtStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
        self.stats = TtStats::default();
    }
}
