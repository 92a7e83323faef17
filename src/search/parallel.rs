//! Independent searches on rayon workers.
//!
//! Each root (typically one sampled opening hand) gets its own
//! `SearchEngine` and therefore its own transposition table. Nothing
//! mutable is shared while the workers run; results are merged by rank
//! once all of them have finished.

use rayon::prelude::*;

use super::cancel::CancelToken;
use super::config::SearchConfig;
use super::engine::{Line, SearchEngine, SearchResult};
use super::stats::SearchStats;
use crate::core::error::ModelError;
use crate::core::GameState;
use crate::eval::Evaluator;
use crate::rules::RulesEngine;

/// Search every root in parallel. Results are in `roots` order.
pub fn search_all<R>(
    rules: &R,
    evaluator: &Evaluator,
    config: &SearchConfig,
    roots: &[GameState],
    cancel: &CancelToken,
) -> Result<Vec<SearchResult>, ModelError>
where
    R: RulesEngine + Sync,
{
    roots
        .par_iter()
        .map(|root| {
            SearchEngine::new(rules, evaluator, config.clone())
                .with_cancel(cancel.clone())
                .search(root)
        })
        .collect()
}

/// A line tagged with the root it was found from.
#[derive(Clone, Debug)]
pub struct RankedLine {
    pub root: usize,
    pub line: Line,
}

/// Merge per-root results into one ranking, best first.
///
/// Ties keep the shorter line, then the lower root index.
#[must_use]
pub fn merge_results(results: &[SearchResult], limit: usize) -> (Vec<RankedLine>, SearchStats) {
    let mut stats = SearchStats::new();
    let mut lines = Vec::new();
    for (root, result) in results.iter().enumerate() {
        stats.merge(&result.stats);
        lines.extend(result.lines.iter().cloned().map(|line| RankedLine { root, line }));
    }
    lines.sort_by(|a, b| {
        b.line
            .rank_key()
            .cmp(&a.line.rank_key())
            .then(a.line.actions.len().cmp(&b.line.actions.len()))
            .then(a.root.cmp(&b.root))
    });
    lines.truncate(limit);
    (lines, stats)
}
