//! Semantic duel events.
//!
//! The event log is an ordered record of what happened during the turn.
//! Most entries are informational (they make reports readable). Marker
//! events such as `OpponentTurnStarted` are conditions that effects
//! query, so they take part in legality and in the structural hash.

use serde::{Deserialize, Serialize};

use super::entity::InstanceId;
use crate::cards::{CardId, SummonCategory};

/// One entry in the duel event log.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DuelEvent {
    TurnStarted { turn: u32 },
    OpponentTurnStarted,
    Activated { card: CardId, effect: String },
    Summoned { card: CardId, category: SummonCategory },
    SentToGraveyard { card: CardId },
    Banished { card: CardId },
    AddedToHand { card: CardId },
    /// Free-form condition token.
    Marker { name: String },
}

impl DuelEvent {
    /// True for events that effect conditions can observe.
    #[must_use]
    pub fn is_marker(&self) -> bool {
        matches!(
            self,
            DuelEvent::TurnStarted { .. } | DuelEvent::OpponentTurnStarted | DuelEvent::Marker { .. }
        )
    }
}

/// Why a card went to the graveyard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GyReason {
    Cost,
    Effect,
    Material,
    /// Equip spell whose target left the field.
    Unequipped,
    /// Activated spell or trap that finished resolving.
    Resolved,
}

/// One arrival in the graveyard during the last applied action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MovedToGy {
    pub card: CardId,
    pub instance: InstanceId,
    pub reason: GyReason,
}
