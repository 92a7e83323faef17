//! Atomic effect steps.
//!
//! Card handlers never mutate state directly. They describe what happens
//! as a sequence of `Effect` atoms addressed by instance id, and the
//! `EffectResolver` executes them. Addressing by instance id keeps a
//! batch valid while earlier steps shift pile indices.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::entity::InstanceId;
use crate::core::event::GyReason;
use crate::core::state::Restriction;
use crate::core::Zone;

/// An atomic game effect.
///
/// ## Card Movement
///
/// - `SendToGy`, `Banish`, `AddToHand`: move a card to a pile
/// - `SpecialSummon`: generic special summon (not a proper summon)
/// - `ProcedureSummon`: extra deck summon with materials (proper summon)
/// - `Equip`: attach a card to a monster on the field
/// - `ActivateFieldSpell`: place into the field spell zone
///
/// ## State
///
/// - `Restrict`: add a restriction token
/// - `Mark`: append a marker event
///
/// ## Composite
///
/// - `Batch`: execute several effects in order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Effect {
    // === Card Movement ===
    SendToGy {
        card: InstanceId,
        reason: GyReason,
    },
    Banish {
        card: InstanceId,
    },
    AddToHand {
        card: InstanceId,
    },
    SpecialSummon {
        card: InstanceId,
        zone: Zone,
    },
    ProcedureSummon {
        card: InstanceId,
        materials: SmallVec<[InstanceId; 4]>,
        zone: Zone,
    },
    Equip {
        card: InstanceId,
        target: InstanceId,
    },
    ActivateFieldSpell {
        card: InstanceId,
    },

    // === State ===
    Restrict(Restriction),
    Mark {
        name: String,
    },

    // === Composite ===
    Batch(Vec<Effect>),
}

impl Effect {
    /// Pay a cost by sending a card to the graveyard.
    #[must_use]
    pub fn cost_to_gy(card: InstanceId) -> Self {
        Self::SendToGy {
            card,
            reason: GyReason::Cost,
        }
    }

    /// Search or salvage a card to the hand.
    #[must_use]
    pub fn add_to_hand(card: InstanceId) -> Self {
        Self::AddToHand { card }
    }

    /// Generic special summon into the main monster zones.
    #[must_use]
    pub fn special_summon(card: InstanceId) -> Self {
        Self::SpecialSummon {
            card,
            zone: Zone::MainMonster,
        }
    }

    /// Combine effects into one batch.
    #[must_use]
    pub fn batch(effects: impl IntoIterator<Item = Effect>) -> Self {
        Self::Batch(effects.into_iter().collect())
    }

    /// Append another effect, flattening batches.
    #[must_use]
    pub fn then(self, next: Effect) -> Self {
        match self {
            Effect::Batch(mut steps) => {
                steps.push(next);
                Effect::Batch(steps)
            }
            single => Effect::Batch(vec![single, next]),
        }
    }

    /// Number of atomic steps.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Effect::Batch(steps) => steps.iter().map(Effect::len).sum(),
            _ => 1,
        }
    }

    /// True for an empty batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
