//! Search configuration parameters.

use serde::{Deserialize, Serialize};

use crate::core::ActionKind;

/// Search configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum actions in one line. Branches reaching it are terminal.
    pub max_depth: u32,

    /// States kept between depths.
    pub beam_width: usize,

    /// Beam slots reserved for states that have not reached an S or A
    /// bucket yet, so the beam does not collapse onto one greedy line.
    pub setup_width: usize,

    /// Action types the search may take. `None` allows everything.
    /// Pass is always allowed.
    pub allowed_actions: Option<Vec<ActionKind>>,

    /// Stop after this many state expansions.
    pub max_expansions: Option<u64>,

    /// Stop after this much wall time (milliseconds).
    pub time_limit_ms: Option<u64>,

    /// Transposition table entries before eviction.
    pub tt_capacity: usize,

    /// Ranked lines returned.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 12,
            beam_width: 32,
            setup_width: 8,
            allowed_actions: None,
            max_expansions: None,
            time_limit_ms: None,
            tt_capacity: 100_000,
            max_results: 10,
        }
    }
}

impl SearchConfig {
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_beam_width(mut self, width: usize) -> Self {
        self.beam_width = width;
        self
    }

    pub fn with_setup_width(mut self, width: usize) -> Self {
        self.setup_width = width;
        self
    }

    pub fn with_allowed_actions(mut self, kinds: Vec<ActionKind>) -> Self {
        self.allowed_actions = Some(kinds);
        self
    }

    pub fn with_max_expansions(mut self, limit: u64) -> Self {
        self.max_expansions = Some(limit);
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_tt_capacity(mut self, capacity: usize) -> Self {
        self.tt_capacity = capacity;
        self
    }

    pub fn with_max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }

    /// Whether the allow-list permits `kind`.
    #[must_use]
    pub fn allows(&self, kind: ActionKind) -> bool {
        kind == ActionKind::Pass
            || self
                .allowed_actions
                .as_ref()
                .map_or(true, |list| list.contains(&kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.max_depth, 12);
        assert_eq!(config.beam_width, 32);
        assert_eq!(config.setup_width, 8);
        assert!(config.allows(ActionKind::Effect));
    }

    #[test]
    fn test_builder_pattern() {
        let config = SearchConfig::default()
            .with_max_depth(4)
            .with_beam_width(3)
            .with_setup_width(1)
            .with_max_expansions(50);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.beam_width, 3);
        assert_eq!(config.setup_width, 1);
        assert_eq!(config.max_expansions, Some(50));
    }

    #[test]
    fn test_allow_list_keeps_pass() {
        let config = SearchConfig::default().with_allowed_actions(vec![ActionKind::Effect]);
        assert!(config.allows(ActionKind::Effect));
        assert!(config.allows(ActionKind::Pass));
        assert!(!config.allows(ActionKind::NormalSummon));
    }

    #[test]
    fn test_partial_json() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"max_depth": 6, "allowed_actions": ["link_summon"]}"#).unwrap();
        assert_eq!(config.max_depth, 6);
        assert_eq!(config.beam_width, 32);
        assert_eq!(config.allowed_actions, Some(vec![ActionKind::LinkSummon]));
    }
}
