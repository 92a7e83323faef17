//! Card effect handlers and the actions they produce.
//!
//! A `CardEffect` is one activatable effect of one card. The registry
//! asks it for `choices` (every meaningfully distinct set of targets that
//! is currently legal) and, once a choice is picked, asks it to `resolve`
//! that choice into `Effect` atoms.
//!
//! Location, phase and once-per-turn checks are done by the registry
//! from `locations()` and `once()`. A handler only checks what is
//! specific to its text: costs, targets, triggering events, summon flags.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::effect::Effect;
use super::registry::EffectRegistry;
use crate::cards::CardId;
use crate::core::error::ActionError;
use crate::core::state::{GameState, OptScope};
use crate::core::Zone;
use crate::zones::CardLoc;

/// Choice payload for one activation.
///
/// `targets` are locations in the state the choice was computed from.
/// Their meaning is defined by the handler (for example: the card to
/// summon first, then its materials).
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectParams {
    pub targets: SmallVec<[CardLoc; 4]>,
}

impl EffectParams {
    /// No choices to make.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A single target.
    #[must_use]
    pub fn target(loc: CardLoc) -> Self {
        Self {
            targets: SmallVec::from_slice(&[loc]),
        }
    }

    /// Several targets, in handler-defined order.
    #[must_use]
    pub fn targets(locs: impl IntoIterator<Item = CardLoc>) -> Self {
        Self {
            targets: locs.into_iter().collect(),
        }
    }

    /// Compact deterministic encoding used inside sort keys.
    #[must_use]
    pub fn key(&self) -> String {
        self.targets
            .iter()
            .map(|t| format!("{}{:03}", t.zone.ordinal(), t.index))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One activatable effect.
pub trait CardEffect: Send + Sync {
    /// Identifier, unique among the effects of one card.
    fn id(&self) -> &'static str;

    /// Zones this effect can be activated from.
    fn locations(&self) -> &'static [Zone];

    /// Usage limit. `None` for unlimited effects.
    fn once(&self) -> Option<OptScope> {
        Some(OptScope::Turn)
    }

    /// Every currently legal choice when activated from `source`.
    ///
    /// Empty means the effect cannot be activated.
    fn choices(
        &self,
        registry: &EffectRegistry,
        state: &GameState,
        source: CardLoc,
    ) -> Vec<EffectParams>;

    /// Effect atoms for a validated choice, computed against `state`.
    fn resolve(
        &self,
        registry: &EffectRegistry,
        state: &GameState,
        source: CardLoc,
        params: &EffectParams,
    ) -> Result<Effect, ActionError>;
}

/// A candidate or chosen effect activation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectAction {
    pub card: CardId,
    pub name: String,
    pub source: CardLoc,
    pub effect: String,
    pub params: EffectParams,
    /// Total order key that makes enumeration reproducible.
    pub sort_key: String,
}

impl EffectAction {
    /// Build an action and its sort key.
    #[must_use]
    pub fn new(
        card: CardId,
        name: impl Into<String>,
        source: CardLoc,
        effect: impl Into<String>,
        params: EffectParams,
    ) -> Self {
        let effect = effect.into();
        let sort_key = format!(
            "{}{:03}|{:08}|{}|{}",
            source.zone.ordinal(),
            source.index,
            card.raw(),
            effect,
            params.key()
        );
        Self {
            card,
            name: name.into(),
            source,
            effect,
            params,
            sort_key,
        }
    }
}

impl std::fmt::Display for EffectAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] from {}", self.name, self.effect, self.source)?;
        if !self.params.targets.is_empty() {
            write!(f, " -> {}", self.params.key())?;
        }
        Ok(())
    }
}
