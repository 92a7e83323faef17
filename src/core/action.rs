//! Action representation.
//!
//! An `Action` is either a core game action (normal summon, set, extra
//! deck summon, pass) handled by the rules layer, or an `EffectAction`
//! produced by the effect registry.
//!
//! Core actions refer to cards by location and carry the expected card id
//! so that applying them to a state they were not computed from is
//! detected as stale instead of acting on the wrong card.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::config::Zone;
use super::state::GameState;
use crate::cards::{CardId, SummonCategory};
use crate::effects::EffectAction;
use crate::zones::CardLoc;

/// Mechanical actions every card interacts with.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoreAction {
    /// Normal summon a monster from hand into the first free main monster zone.
    NormalSummon { hand: usize, card: CardId },

    /// Set a spell or trap from hand face-down.
    Set { hand: usize, card: CardId },

    /// Summon from the extra deck using field materials.
    ExtraDeckSummon {
        extra: usize,
        card: CardId,
        category: SummonCategory,
        materials: SmallVec<[CardLoc; 4]>,
        zone: Zone,
    },

    /// End the turn.
    Pass,
}

/// Action type, used by the search allow-list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    NormalSummon,
    Set,
    LinkSummon,
    SynchroSummon,
    XyzSummon,
    Effect,
    Pass,
}

/// A complete action.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Core(CoreAction),
    Effect(EffectAction),
}

impl Action {
    /// The pass action.
    #[must_use]
    pub fn pass() -> Self {
        Action::Core(CoreAction::Pass)
    }

    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Action::Core(CoreAction::Pass))
    }

    /// Classify for the allow-list.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Core(CoreAction::NormalSummon { .. }) => ActionKind::NormalSummon,
            Action::Core(CoreAction::Set { .. }) => ActionKind::Set,
            Action::Core(CoreAction::ExtraDeckSummon { category, .. }) => match category {
                SummonCategory::Synchro => ActionKind::SynchroSummon,
                SummonCategory::Xyz => ActionKind::XyzSummon,
                _ => ActionKind::LinkSummon,
            },
            Action::Core(CoreAction::Pass) => ActionKind::Pass,
            Action::Effect(_) => ActionKind::Effect,
        }
    }

    /// Human-readable description against the state the action applies to.
    #[must_use]
    pub fn describe(&self, state: &GameState) -> String {
        let name_at = |loc: CardLoc| {
            state
                .card_at(loc)
                .map_or_else(|| loc.to_string(), |c| c.name.clone())
        };
        match self {
            Action::Core(CoreAction::NormalSummon { hand, .. }) => {
                format!("Normal Summon {}", name_at(CardLoc::new(Zone::Hand, *hand)))
            }
            Action::Core(CoreAction::Set { hand, .. }) => {
                format!("Set {}", name_at(CardLoc::new(Zone::Hand, *hand)))
            }
            Action::Core(CoreAction::ExtraDeckSummon {
                extra,
                category,
                materials,
                ..
            }) => {
                let mats: Vec<String> = materials.iter().map(|&m| name_at(m)).collect();
                format!(
                    "{} Summon {} using {}",
                    capitalize(category.label()),
                    name_at(CardLoc::new(Zone::Extra, *extra)),
                    mats.join(" + ")
                )
            }
            Action::Core(CoreAction::Pass) => "Pass".to_string(),
            Action::Effect(effect) => {
                let mut text = format!("Activate {} ({})", effect.name, effect.effect);
                if !effect.params.targets.is_empty() {
                    let targets: Vec<String> =
                        effect.params.targets.iter().map(|&t| name_at(t)).collect();
                    text.push_str(&format!(" targeting {}", targets.join(", ")));
                }
                text
            }
        }
    }

    /// Deterministic order key among the actions of one state.
    #[must_use]
    pub fn order_key(&self) -> String {
        match self {
            Action::Core(core) => format!("0|{core:?}"),
            Action::Effect(effect) => format!("1|{}", effect.sort_key),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A recorded action with metadata for history tracking and reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Step number within the line (1-based).
    pub step: u32,

    pub kind: ActionKind,

    pub description: String,

    /// The action taken.
    pub action: Action,
}

impl ActionRecord {
    /// Record `action` as step `step`, described against its source state.
    #[must_use]
    pub fn new(step: u32, action: &Action, state: &GameState) -> Self {
        Self {
            step,
            kind: action.kind(),
            description: action.describe(state),
            action: action.clone(),
        }
    }
}
