//! Search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Why a search stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Beam emptied or depth limit reached.
    #[default]
    Completed,
    Cancelled,
    ExpansionLimit,
    TimeLimit,
}

/// Statistics collected during one search.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// States whose actions were enumerated.
    pub expansions: u64,

    /// Successor states produced.
    pub candidates: u64,

    /// Actions rejected as illegal on application.
    pub illegal: u64,

    /// Actions filtered by the allow-list.
    pub disallowed: u64,

    /// Successors dropped as already seen.
    pub duplicates: u64,

    /// Successors answered from the transposition table.
    pub tt_hits: u64,

    /// Terminal lines collected.
    pub terminals: u64,

    /// Deepest depth expanded.
    pub max_depth: u32,

    /// Total time spent searching (microseconds).
    pub time_us: u64,

    pub stop: StopReason,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expansions per second.
    #[must_use]
    pub fn expansions_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.expansions as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }

    /// Accumulate another run (parallel workers).
    pub fn merge(&mut self, other: &SearchStats) {
        self.expansions += other.expansions;
        self.candidates += other.candidates;
        self.illegal += other.illegal;
        self.disallowed += other.disallowed;
        self.duplicates += other.duplicates;
        self.tt_hits += other.tt_hits;
        self.terminals += other.terminals;
        self.max_depth = self.max_depth.max(other.max_depth);
        self.time_us = self.time_us.max(other.time_us);
        if self.stop == StopReason::Completed {
            self.stop = other.stop;
        }
    }
}
