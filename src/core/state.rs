//! Duel state.
//!
//! ## GameState
//!
//! Everything that can influence which actions are legal:
//! - Pile zones: deck, hand, graveyard, banished, extra deck
//! - Field slots (`FieldZones`): main monster, spell/trap, field spell,
//!   extra monster
//! - Turn metadata: number, phase, normal summon budget
//! - `opt_used`: once-per-turn / once-per-duel bookkeeping
//! - `restrictions`: active restriction tokens
//! - `events`: ordered semantic event log
//! - `last_moved_to_gy`: graveyard arrivals caused by the last action
//!
//! Uses `im` persistent data structures so that cloning a state for a new
//! search branch is O(1) and never aliases mutable contents: a write to
//! the clone copies only the touched path.

use im::{OrdMap, OrdSet, Vector};
use serde::{Deserialize, Serialize};

use super::config::{FieldCapacity, Phase, Zone};
use super::entity::{InstanceAllocator, InstanceId};
use super::error::Illegal;
use super::event::{DuelEvent, MovedToGy};
use crate::cards::{CardId, CardInstance, Race, ResolvedCard};
use crate::zones::{CardLoc, FieldZones};

/// Turn bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnInfo {
    pub number: u32,
    pub phase: Phase,
    pub normal_summon_used: bool,
}

impl Default for TurnInfo {
    fn default() -> Self {
        Self {
            number: 1,
            phase: Phase::Main,
            normal_summon_used: false,
        }
    }
}

/// How long a usage restriction lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptScope {
    Turn,
    Duel,
}

/// Key for `opt_used`: which effect of which card, and for how long.
///
/// Keyed by card id, not instance: a "once per turn" effect is spent for
/// every copy of the card.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OptKey {
    pub card: CardId,
    pub effect: String,
    pub scope: OptScope,
}

impl OptKey {
    #[must_use]
    pub fn new(card: CardId, effect: impl Into<String>, scope: OptScope) -> Self {
        Self {
            card,
            effect: effect.into(),
            scope,
        }
    }
}

/// Active restriction token.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Restriction {
    /// Only monsters of `race` may be summoned from the extra deck.
    ExtraDeckOnly { race: Race },
    /// Opaque token. Part of the state identity, not interpreted.
    Named { name: String },
}

impl std::fmt::Display for Restriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Restriction::ExtraDeckOnly { race } => write!(f, "extra deck: {race:?} only"),
            Restriction::Named { name } => f.write_str(name),
        }
    }
}

/// Complete duel state for the combo player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    // === Piles ===
    pub deck: Vector<CardInstance>,
    pub hand: Vector<CardInstance>,
    pub gy: Vector<CardInstance>,
    pub banished: Vector<CardInstance>,
    pub extra: Vector<CardInstance>,

    // === Field ===
    pub field: FieldZones,

    // === Turn ===
    pub turn: TurnInfo,
    pub opt_used: OrdMap<OptKey, u32>,
    pub restrictions: OrdSet<Restriction>,
    pub events: Vector<DuelEvent>,
    pub last_moved_to_gy: Vector<MovedToGy>,

    alloc: InstanceAllocator,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(FieldCapacity::default())
    }
}

impl GameState {
    /// Create an empty state in the main phase of turn 1.
    #[must_use]
    pub fn new(capacity: FieldCapacity) -> Self {
        Self {
            deck: Vector::new(),
            hand: Vector::new(),
            gy: Vector::new(),
            banished: Vector::new(),
            extra: Vector::new(),
            field: FieldZones::new(capacity),
            turn: TurnInfo::default(),
            opt_used: OrdMap::new(),
            restrictions: OrdSet::new(),
            events: Vector::new(),
            last_moved_to_gy: Vector::new(),
            alloc: InstanceAllocator::default(),
        }
    }

    /// Field capacities.
    #[must_use]
    pub fn capacity(&self) -> FieldCapacity {
        self.field.capacity()
    }

    // === Instances ===

    /// Allocate a fresh instance id.
    pub fn next_uid(&mut self) -> InstanceId {
        self.alloc.next()
    }

    /// Make sure future ids skip `uid`.
    pub(crate) fn reserve_uid(&mut self, uid: InstanceId) {
        self.alloc.reserve(uid);
    }

    /// Create a new card from resolved metadata and put it in `zone`.
    ///
    /// Piles append at the end; field zones use the first empty slot.
    pub fn spawn(&mut self, zone: Zone, resolved: &ResolvedCard) -> Result<CardLoc, Illegal> {
        let uid = self.next_uid();
        let card = CardInstance::new(uid, resolved);
        self.put(zone, card)
    }

    // === Turn ===

    /// True while actions may be taken.
    #[must_use]
    pub fn is_main_phase(&self) -> bool {
        self.turn.phase == Phase::Main
    }

    /// End the turn (the explicit pass).
    pub fn end_turn(&mut self) {
        self.turn.phase = Phase::End;
    }

    // === Once Per Turn ===

    /// Times the keyed effect was used.
    #[must_use]
    pub fn opt_count(&self, key: &OptKey) -> u32 {
        self.opt_used.get(key).copied().unwrap_or(0)
    }

    /// True if the keyed effect has been used at least once.
    #[must_use]
    pub fn is_opt_used(&self, key: &OptKey) -> bool {
        self.opt_count(key) > 0
    }

    /// Record one use of the keyed effect.
    pub fn mark_opt(&mut self, key: OptKey) {
        let count = self.opt_count(&key);
        self.opt_used.insert(key, count + 1);
    }

    // === Restrictions ===

    pub fn add_restriction(&mut self, restriction: Restriction) {
        self.restrictions.insert(restriction);
    }

    #[must_use]
    pub fn has_restriction(&self, restriction: &Restriction) -> bool {
        self.restrictions.contains(restriction)
    }

    // === Events ===

    pub fn push_event(&mut self, event: DuelEvent) {
        self.events.push_back(event);
    }

    /// True if `event` is anywhere in the log.
    #[must_use]
    pub fn has_event(&self, event: &DuelEvent) -> bool {
        self.events.iter().any(|e| e == event)
    }

    /// Events that take part in legality.
    pub fn marker_events(&self) -> impl Iterator<Item = &DuelEvent> {
        self.events.iter().filter(|e| e.is_marker())
    }

    /// True if `uid` arrived in the graveyard during the last action.
    #[must_use]
    pub fn just_sent_to_gy(&self, uid: InstanceId) -> bool {
        self.last_moved_to_gy.iter().any(|m| m.instance == uid)
    }

    /// Forget the previous action's graveyard arrivals.
    pub fn begin_action(&mut self) {
        self.last_moved_to_gy.clear();
    }
}
