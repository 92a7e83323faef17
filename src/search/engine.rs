//! Beam search over combo lines.
//!
//! ## Algorithm
//!
//! 1. The beam starts as the root state with an empty history.
//! 2. Every beam member is expanded: all legal actions (filtered by the
//!    allow-list) are applied, each producing a successor.
//! 3. A pass, or a successor in which no further action can be taken,
//!    ends the line: it is evaluated and collected as a terminal.
//! 4. Other successors are hashed. Hashes already seen in this run are
//!    dropped. A hash known to the transposition table is short-circuited
//!    to the archived best continuation from it instead of being expanded.
//! 5. The survivors are evaluated and the next beam is selected with
//!    `select_beam`.
//! 6. Members still in the beam after `max_depth` actions are terminal.
//!
//! Every collected terminal is backed up along its path into the
//! transposition table, and each state on the path archives the actions
//! that lead from it to that terminal. A hit replays the archived actions
//! from the hit state and is only taken if they are all still legal and
//! end on the recorded terminal. The table and the archive outlive a
//! single `search` call, so one engine searching several related roots
//! reuses earlier work.
//!
//! ## Stopping
//!
//! Cancellation, `max_expansions` and `time_limit_ms` are checked before
//! each expansion. When one trips, the search returns the terminals
//! collected so far.

use std::time::Instant;

use log::{debug, info, trace};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::beam::{select_beam, Ranked};
use super::cancel::CancelToken;
use super::config::SearchConfig;
use super::hash::{hash_state, StateHash};
use super::stats::{SearchStats, StopReason};
use super::tt::{TranspositionTable, TtEntry};
use crate::core::error::{ActionError, ModelError};
use crate::core::{Action, ActionRecord, GameState};
use crate::eval::{Evaluation, Evaluator, RankKey};
use crate::rules::RulesEngine;

/// A finished line: the actions taken and the board they end on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub actions: Vec<ActionRecord>,
    pub state: GameState,
    pub hash: StateHash,
    pub evaluation: Evaluation,
}

impl Line {
    #[must_use]
    pub fn rank_key(&self) -> RankKey {
        self.evaluation.rank_key
    }
}

/// Ranked search output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResult {
    /// Best lines first.
    pub lines: Vec<Line>,
    pub stats: SearchStats,
}

impl SearchResult {
    #[must_use]
    pub fn best(&self) -> Option<&Line> {
        self.lines.first()
    }
}

/// An in-progress line.
#[derive(Clone)]
struct Node {
    state: GameState,
    hash: StateHash,
    evaluation: Evaluation,
    history: Vec<ActionRecord>,
    /// Hashes of the states along `history`, root first, excluding `hash`.
    path: Vec<StateHash>,
}

impl Ranked for Node {
    fn rank_key(&self) -> RankKey {
        self.evaluation.rank_key
    }

    fn state_hash(&self) -> StateHash {
        self.hash
    }
}

/// Beam search engine.
pub struct SearchEngine<'a, R: RulesEngine> {
    rules: &'a R,
    evaluator: &'a Evaluator,
    config: SearchConfig,
    tt: TranspositionTable,
    /// Best known continuation from each intermediate state.
    archive: FxHashMap<StateHash, Vec<Action>>,
    cancel: CancelToken,
}

impl<'a, R: RulesEngine> SearchEngine<'a, R> {
    pub fn new(rules: &'a R, evaluator: &'a Evaluator, config: SearchConfig) -> Self {
        Self {
            tt: TranspositionTable::new(config.tt_capacity),
            rules,
            evaluator,
            config,
            archive: FxHashMap::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Use `token` to request a graceful stop.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Forget everything learned by earlier searches.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.archive.clear();
    }

    /// Search from `root`.
    ///
    /// Illegal actions are skipped. Model errors abort the search.
    pub fn search(&mut self, root: &GameState) -> Result<SearchResult, ModelError> {
        let start = Instant::now();
        let mut stats = SearchStats::new();
        let mut terminals: FxHashMap<StateHash, Line> = FxHashMap::default();
        let mut seen: FxHashSet<StateHash> = FxHashSet::default();

        let root_hash = hash_state(root);
        seen.insert(root_hash);
        let mut beam = vec![Node {
            evaluation: self.evaluator.evaluate(root),
            state: root.clone(),
            hash: root_hash,
            history: Vec::new(),
            path: Vec::new(),
        }];

        info!(
            "search: depth {} beam {} setup {} root {}",
            self.config.max_depth, self.config.beam_width, self.config.setup_width, root_hash
        );

        'depths: for depth in 0..self.config.max_depth {
            if beam.is_empty() {
                break;
            }
            let mut candidates = Vec::new();

            for node in &beam {
                if let Some(reason) = self.should_stop(&stats, start) {
                    stats.stop = reason;
                    break 'depths;
                }
                stats.expansions += 1;
                stats.max_depth = depth + 1;
                self.expand(node, &mut stats, &mut seen, &mut terminals, &mut candidates)?;
            }

            let count = candidates.len();
            beam = select_beam(candidates, self.config.beam_width, self.config.setup_width);
            debug!(
                "depth {}: {} candidates, beam {}, best {}, terminals {}",
                depth + 1,
                count,
                beam.len(),
                beam.first().map_or_else(RankKey::default, |n| n.evaluation.rank_key),
                terminals.len()
            );
        }

        // Lines cut off by the depth limit
        if stats.stop == StopReason::Completed {
            for node in beam {
                let line = Line {
                    actions: node.history,
                    state: node.state,
                    hash: node.hash,
                    evaluation: node.evaluation,
                };
                self.collect(line, &node.path, &mut stats, &mut terminals);
            }
        }

        let mut lines: Vec<Line> = terminals.into_values().collect();
        lines.sort_by(|a, b| {
            b.rank_key()
                .cmp(&a.rank_key())
                .then(a.actions.len().cmp(&b.actions.len()))
                .then(a.hash.cmp(&b.hash))
        });
        lines.truncate(self.config.max_results);

        stats.time_us = start.elapsed().as_micros() as u64;
        let tt_stats = self.tt.stats();
        info!(
            "search done ({:?}): {} expansions, {} terminals, best {}, tt {} entries ({:.1}% hits)",
            stats.stop,
            stats.expansions,
            stats.terminals,
            lines.first().map_or_else(RankKey::default, Line::rank_key),
            self.tt.len(),
            tt_stats.hit_rate() * 100.0
        );

        Ok(SearchResult { lines, stats })
    }

    fn should_stop(&self, stats: &SearchStats, start: Instant) -> Option<StopReason> {
        if self.cancel.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        if let Some(limit) = self.config.max_expansions {
            if stats.expansions >= limit {
                return Some(StopReason::ExpansionLimit);
            }
        }
        if let Some(ms) = self.config.time_limit_ms {
            if start.elapsed().as_millis() >= u128::from(ms) {
                return Some(StopReason::TimeLimit);
            }
        }
        None
    }

    fn expand(
        &mut self,
        node: &Node,
        stats: &mut SearchStats,
        seen: &mut FxHashSet<StateHash>,
        terminals: &mut FxHashMap<StateHash, Line>,
        candidates: &mut Vec<Node>,
    ) -> Result<(), ModelError> {
        let step = node.history.len() as u32 + 1;
        let mut path = node.path.clone();
        path.push(node.hash);

        for action in self.rules.legal_actions(&node.state)? {
            if !self.config.allows(action.kind()) {
                stats.disallowed += 1;
                continue;
            }
            let next = match self.rules.apply_action(&node.state, &action) {
                Ok(next) => next,
                Err(ActionError::Illegal(reason)) => {
                    trace!("skip {}: {}", action.describe(&node.state), reason);
                    stats.illegal += 1;
                    continue;
                }
                Err(ActionError::Model(err)) => return Err(err),
            };
            stats.candidates += 1;

            let mut history = node.history.clone();
            history.push(ActionRecord::new(step, &action, &node.state));
            let hash = hash_state(&next);

            if action.is_pass() || self.rules.is_terminal(&next) {
                let line = Line {
                    evaluation: self.evaluator.evaluate(&next),
                    actions: history,
                    state: next,
                    hash,
                };
                self.collect(line, &path, stats, terminals);
                continue;
            }

            if !seen.insert(hash) {
                stats.duplicates += 1;
                continue;
            }

            if let Some(line) = self.cached_line(hash, &next, &history)? {
                trace!("tt hit {hash}: {}", line.rank_key());
                stats.tt_hits += 1;
                self.collect(line, &path, stats, terminals);
                continue;
            }

            candidates.push(Node {
                evaluation: self.evaluator.evaluate(&next),
                state: next,
                hash,
                history,
                path: path.clone(),
            });
        }
        Ok(())
    }

    /// The archived continuation from `state`, replayed after `prefix`.
    ///
    /// `None` if nothing is archived, or if the replay hits an illegal or
    /// disallowed action or ends away from the recorded terminal.
    fn cached_line(
        &mut self,
        hash: StateHash,
        state: &GameState,
        prefix: &[ActionRecord],
    ) -> Result<Option<Line>, ModelError> {
        let Some(entry) = self.tt.probe(hash) else {
            return Ok(None);
        };
        let Some(suffix) = self.archive.get(&hash) else {
            return Ok(None);
        };
        if suffix.len() != entry.depth as usize
            || prefix.len() + suffix.len() > self.config.max_depth as usize
        {
            return Ok(None);
        }

        let mut actions = prefix.to_vec();
        let mut current = state.clone();
        for action in suffix {
            if !self.config.allows(action.kind()) {
                return Ok(None);
            }
            let next = match self.rules.apply_action(&current, action) {
                Ok(next) => next,
                Err(ActionError::Illegal(reason)) => {
                    debug!("tt continuation from {hash} no longer applies: {reason}");
                    return Ok(None);
                }
                Err(ActionError::Model(err)) => return Err(err),
            };
            actions.push(ActionRecord::new(actions.len() as u32 + 1, action, &current));
            current = next;
        }

        let end = hash_state(&current);
        if end != entry.best_terminal {
            debug!("tt continuation from {hash} ends on {end}, expected {}", entry.best_terminal);
            return Ok(None);
        }
        Ok(Some(Line {
            evaluation: self.evaluator.evaluate(&current),
            actions,
            state: current,
            hash: end,
        }))
    }

    /// Record a terminal and back it up along `path`.
    ///
    /// `path[i]` is the hash of the state before action `i` of the line,
    /// so `actions[i..]` is its continuation. Spliced lines have a longer
    /// tail than their path; the offsets still hold.
    fn collect(
        &mut self,
        line: Line,
        path: &[StateHash],
        stats: &mut SearchStats,
        terminals: &mut FxHashMap<StateHash, Line>,
    ) {
        stats.terminals += 1;
        let len = line.actions.len();
        let value = line.rank_key();

        for (i, &hash) in path.iter().enumerate() {
            let depth = (len - i) as u32;
            if self.tt.store(hash, TtEntry::new(line.hash, value, depth)) {
                let suffix = line.actions[i..].iter().map(|r| r.action.clone()).collect();
                self.archive.insert(hash, suffix);
            }
        }
        // Evicted states keep no continuation
        if self.archive.len() > 2 * self.tt.capacity() {
            let tt = &self.tt;
            self.archive.retain(|hash, _| tt.get(*hash).is_some());
        }

        let better = |old: &Line| (value, std::cmp::Reverse(len)) > (old.rank_key(), std::cmp::Reverse(old.actions.len()));
        match terminals.get(&line.hash) {
            Some(old) if !better(old) => {}
            _ => {
                terminals.insert(line.hash, line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardId;
    use crate::core::error::Illegal;
    use crate::core::{Action, CoreAction, OptKey, OptScope};
    use crate::eval::{BoardZone, BucketDef, Tier};

    /// Counter game: each step bumps a named counter in the OPT map.
    /// "up" may be taken three times, "side" once.
    struct Counter;

    fn effect(name: &str) -> Action {
        Action::Effect(crate::effects::EffectAction::new(
            CardId::new(1),
            "Counter",
            crate::zones::CardLoc::new(crate::core::Zone::Hand, 0),
            name.to_string(),
            crate::effects::EffectParams::none(),
        ))
    }

    impl RulesEngine for Counter {
        fn legal_actions(&self, state: &GameState) -> Result<Vec<Action>, ModelError> {
            if !state.is_main_phase() {
                return Ok(Vec::new());
            }
            Ok(vec![effect("up"), effect("side"), Action::pass()])
        }

        fn apply_action(&self, state: &GameState, action: &Action) -> Result<GameState, ActionError> {
            let mut next = state.clone();
            match action {
                Action::Core(CoreAction::Pass) => next.end_turn(),
                Action::Effect(e) => {
                    let key = OptKey::new(CardId::new(1), e.effect.clone(), OptScope::Turn);
                    let limit = if e.effect == "up" { 3 } else { 1 };
                    if next.opt_count(&key) >= limit {
                        return Err(Illegal::OnceUsed {
                            card: CardId::new(1),
                            effect: e.effect.clone(),
                        }
                        .into());
                    }
                    next.mark_opt(key);
                }
                _ => unreachable!(),
            }
            Ok(next)
        }
    }

    /// No card ever matches: every board ranks (0, 0, 0).
    fn evaluator() -> Evaluator {
        Evaluator::new(vec![BucketDef::card("unused", Tier::S, "nothing", BoardZone::Field)])
    }

    #[test]
    fn test_search_collects_terminals() {
        let rules = Counter;
        let eval = evaluator();
        let mut engine = SearchEngine::new(&rules, &eval, SearchConfig::default().with_max_depth(5));
        let result = engine.search(&GameState::default()).unwrap();

        assert!(!result.lines.is_empty());
        assert!(result.stats.illegal > 0);
        // Every line ends with a pass or at the depth limit
        for line in &result.lines {
            assert!(line.actions.len() <= 5);
            let last = &line.actions.last().unwrap().action;
            assert!(last.is_pass() || line.actions.len() == 5);
        }
        // Shortest line first among equal ranks: pass immediately
        assert_eq!(result.lines[0].actions.len(), 1);
    }

    #[test]
    fn test_transpositions_deduplicated() {
        let rules = Counter;
        let eval = evaluator();
        let mut engine = SearchEngine::new(&rules, &eval, SearchConfig::default().with_max_depth(3));
        let result = engine.search(&GameState::default()).unwrap();

        // up+side and side+up reach the same state
        assert!(result.stats.duplicates > 0);
    }

    #[test]
    fn test_expansion_limit_returns_partial() {
        let rules = Counter;
        let eval = evaluator();
        let config = SearchConfig::default().with_max_expansions(1);
        let mut engine = SearchEngine::new(&rules, &eval, config);
        let result = engine.search(&GameState::default()).unwrap();

        assert_eq!(result.stats.stop, StopReason::ExpansionLimit);
        assert_eq!(result.stats.expansions, 1);
        // The root's pass was still collected
        assert_eq!(result.lines.len(), 1);
    }

    #[test]
    fn test_cancelled_before_start() {
        let rules = Counter;
        let eval = evaluator();
        let token = CancelToken::new();
        token.cancel();
        let mut engine = SearchEngine::new(&rules, &eval, SearchConfig::default()).with_cancel(token);
        let result = engine.search(&GameState::default()).unwrap();

        assert_eq!(result.stats.stop, StopReason::Cancelled);
        assert!(result.lines.is_empty());
    }

    #[test]
    fn test_reuse_hits_transposition_table() {
        let rules = Counter;
        let eval = evaluator();
        let mut engine = SearchEngine::new(&rules, &eval, SearchConfig::default().with_max_depth(4));
        let first = engine.search(&GameState::default()).unwrap();
        assert!(!engine.tt().is_empty());

        let second = engine.search(&GameState::default()).unwrap();
        assert!(second.stats.tt_hits > 0);
        assert!(second.stats.expansions < first.stats.expansions);
        assert_eq!(
            first.best().unwrap().rank_key(),
            second.best().unwrap().rank_key()
        );
        for line in first.lines.iter().chain(&second.lines) {
            replay(&rules, &GameState::default(), line);
        }
    }

    /// Apply every action of `line` from `root` and check where it ends.
    fn replay<R: RulesEngine>(rules: &R, root: &GameState, line: &Line) {
        let mut state = root.clone();
        for record in &line.actions {
            state = rules.apply_action(&state, &record.action).unwrap();
        }
        assert_eq!(hash_state(&state), line.hash);
    }

    /// Two branches ending on the same board: `x` then `fx`, or `y` then
    /// `fy`. A locked root reaches only the `y` branch, through `open`.
    struct Fork;

    fn mark(name: &str) -> OptKey {
        OptKey::new(CardId::new(1), name, OptScope::Turn)
    }

    impl RulesEngine for Fork {
        fn legal_actions(&self, state: &GameState) -> Result<Vec<Action>, ModelError> {
            if !state.is_main_phase() {
                return Ok(Vec::new());
            }
            Ok(["x", "y", "open", "fx", "fy"].into_iter().map(effect).collect())
        }

        fn apply_action(&self, state: &GameState, action: &Action) -> Result<GameState, ActionError> {
            let Action::Effect(e) = action else { unreachable!() };
            let has = |name: &str| state.is_opt_used(&mark(name));
            let fresh = !has("lock") && !has("x") && !has("y");
            let mut next = state.clone();
            match e.effect.as_str() {
                "x" | "y" if fresh => next.mark_opt(mark(&e.effect)),
                "open" if has("lock") => {
                    next.opt_used.remove(&mark("lock"));
                    next.mark_opt(mark("y"));
                }
                "fx" if has("x") => {
                    next.opt_used = Default::default();
                    next.end_turn();
                }
                "fy" if has("y") => {
                    next.opt_used = Default::default();
                    next.end_turn();
                }
                _ => return Err(Illegal::StaleAction.into()),
            }
            Ok(next)
        }
    }

    #[test]
    fn test_reused_continuation_starts_at_the_hit_state() {
        let rules = Fork;
        let eval = evaluator();
        let mut engine = SearchEngine::new(&rules, &eval, SearchConfig::default());

        let open = GameState::default();
        let first = engine.search(&open).unwrap();
        assert_eq!(first.lines.len(), 1);
        assert_eq!(first.stats.terminals, 2);

        // The locked root joins the `y` branch after one action
        let mut locked = GameState::default();
        locked.mark_opt(mark("lock"));
        let second = engine.search(&locked).unwrap();
        assert_eq!(second.stats.tt_hits, 1);

        let best = second.best().unwrap();
        let taken: Vec<&Action> = best.actions.iter().map(|r| &r.action).collect();
        assert_eq!(taken, vec![&effect("open"), &effect("fy")]);
        assert_eq!(best.actions[1].step, 2);

        for line in &first.lines {
            replay(&rules, &open, line);
        }
        for line in &second.lines {
            replay(&rules, &locked, line);
        }
    }

    #[test]
    fn test_stale_continuation_is_expanded() {
        let rules = Fork;
        let eval = evaluator();
        let mut engine = SearchEngine::new(&rules, &eval, SearchConfig::default());
        engine.search(&GameState::default()).unwrap();

        // A continuation that does not apply from the `y` state
        let mut y = GameState::default();
        y.mark_opt(mark("y"));
        engine.archive.insert(hash_state(&y), vec![effect("fx")]);

        let mut locked = GameState::default();
        locked.mark_opt(mark("lock"));
        let result = engine.search(&locked).unwrap();
        assert_eq!(result.stats.tt_hits, 0);

        let best = result.best().unwrap();
        assert_eq!(best.actions.last().unwrap().action, effect("fy"));
        replay(&rules, &locked, best);
    }

    #[test]
    fn test_allow_list_filters() {
        let rules = Counter;
        let eval = evaluator();
        let config = SearchConfig::default()
            .with_max_depth(3)
            .with_allowed_actions(vec![crate::core::ActionKind::NormalSummon]);
        let mut engine = SearchEngine::new(&rules, &eval, config);
        let result = engine.search(&GameState::default()).unwrap();

        assert_eq!(result.stats.disallowed, 2);
        assert_eq!(result.lines.len(), 1);
        assert!(result.lines[0].actions[0].action.is_pass());
    }
}
