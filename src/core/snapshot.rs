//! External state snapshots.
//!
//! A `Snapshot` is the structured payload a scenario file carries and a
//! report embeds. Card entries may be bare ids or records with flags:
//!
//! ```json
//! {
//!   "zones": {
//!     "hand": [1001, 900001],
//!     "field": {"monsters": [null, {"cid": 2002, "properly_summoned": true}]}
//!   },
//!   "turn": {"number": 1, "phase": "main"}
//! }
//! ```
//!
//! Loading goes through the `MetadataResolver`. An id it cannot resolve
//! fails the whole load with a `ModelError`; nothing is defaulted.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::config::{FieldCapacity, Zone};
use super::entity::InstanceId;
use super::error::ModelError;
use super::event::{DuelEvent, MovedToGy};
use super::state::{GameState, OptKey, OptScope, Restriction, TurnInfo};
use crate::cards::{CardId, CardInstance, CardKind, MetadataResolver};
use crate::zones::CardLoc;

/// A card reference inside a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardEntry {
    Id(CardId),
    Record(CardRecord),
}

impl CardEntry {
    #[must_use]
    pub fn cid(&self) -> CardId {
        match self {
            CardEntry::Id(id) => *id,
            CardEntry::Record(r) => r.cid,
        }
    }

    fn uid(&self) -> Option<InstanceId> {
        match self {
            CardEntry::Id(_) => None,
            CardEntry::Record(r) => r.uid,
        }
    }
}

/// Card entry with per-instance flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub cid: CardId,
    /// Display name. Informational only: the resolver's name wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub properly_summoned: bool,
    #[serde(default)]
    pub face_down: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<InstanceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipped_to: Option<InstanceId>,
}

/// Field slots. Shorter lists are padded with empty slots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSnapshot {
    pub monsters: Vec<Option<CardEntry>>,
    pub spell_traps: Vec<Option<CardEntry>>,
    pub field_spell: Option<CardEntry>,
    pub extra_monsters: Vec<Option<CardEntry>>,
}

/// Every zone's contents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonesSnapshot {
    pub deck: Vec<CardEntry>,
    pub hand: Vec<CardEntry>,
    pub gy: Vec<CardEntry>,
    pub banished: Vec<CardEntry>,
    pub extra: Vec<CardEntry>,
    pub field: FieldSnapshot,
}

/// One `opt_used` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptUsedEntry {
    pub card: CardId,
    pub effect: String,
    #[serde(default = "default_scope")]
    pub scope: OptScope,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_scope() -> OptScope {
    OptScope::Turn
}

fn default_count() -> u32 {
    1
}

/// Full state snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub zones: ZonesSnapshot,
    pub capacities: FieldCapacity,
    pub turn: TurnInfo,
    pub opt_used: Vec<OptUsedEntry>,
    pub restrictions: Vec<Restriction>,
    pub events: Vec<DuelEvent>,
    pub last_moved_to_gy: Vec<MovedToGy>,
}

impl Snapshot {
    fn piles(&self) -> [(Zone, &Vec<CardEntry>); 5] {
        [
            (Zone::Deck, &self.zones.deck),
            (Zone::Hand, &self.zones.hand),
            (Zone::Gy, &self.zones.gy),
            (Zone::Banished, &self.zones.banished),
            (Zone::Extra, &self.zones.extra),
        ]
    }

    fn slots(&self) -> Vec<(Zone, Vec<&Option<CardEntry>>)> {
        let f = &self.zones.field;
        vec![
            (Zone::MainMonster, f.monsters.iter().collect()),
            (Zone::SpellTrap, f.spell_traps.iter().collect()),
            (Zone::FieldSpell, vec![&f.field_spell]),
            (Zone::ExtraMonster, f.extra_monsters.iter().collect()),
        ]
    }

    fn entries(&self) -> impl Iterator<Item = &CardEntry> {
        let piles = self.piles().into_iter().flat_map(|(_, v)| v.iter());
        let f = &self.zones.field;
        let slots = f
            .monsters
            .iter()
            .chain(f.spell_traps.iter())
            .chain(std::iter::once(&f.field_spell))
            .chain(f.extra_monsters.iter())
            .flatten();
        piles.chain(slots)
    }
}

impl GameState {
    /// Build a state from a snapshot, resolving every card id.
    pub fn from_snapshot(
        snapshot: &Snapshot,
        resolver: &dyn MetadataResolver,
    ) -> Result<Self, ModelError> {
        let mut state = GameState::new(snapshot.capacities);

        // Explicit uids first, so fresh ones never collide
        let mut seen = FxHashSet::default();
        for uid in snapshot.entries().filter_map(CardEntry::uid) {
            if !seen.insert(uid) {
                return Err(ModelError::DuplicateInstance(uid.raw()));
            }
            state.reserve_uid(uid);
        }

        for (zone, entries) in snapshot.piles() {
            for entry in entries {
                let mut card = instantiate(&mut state, entry, resolver)?;
                card.reset_on_leave();
                state
                    .put(zone, card)
                    .map_err(|e| ModelError::MalformedSnapshot(e.to_string()))?;
            }
        }

        for (zone, slots) in snapshot.slots() {
            let capacity = snapshot.capacities.of(zone).unwrap_or(0);
            if slots.len() > capacity {
                return Err(ModelError::MalformedSnapshot(format!(
                    "{} entries in {zone} (capacity {capacity})",
                    slots.len()
                )));
            }
            for (index, slot) in slots.into_iter().enumerate() {
                let Some(entry) = slot else { continue };
                let card = instantiate(&mut state, entry, resolver)?;
                check_slot_kind(zone, &card)?;
                state
                    .place(CardLoc::new(zone, index), card)
                    .map_err(|e| ModelError::MalformedSnapshot(e.to_string()))?;
            }
        }

        // Equip links must point at a monster on the field
        for (loc, card) in state.all_cards() {
            if let Some(target) = card.equipped_to {
                let ok = state
                    .locate(target)
                    .map_or(false, |t| t.zone.is_monster_zone());
                if !ok || !loc.zone.is_field() {
                    return Err(ModelError::MalformedSnapshot(format!(
                        "{} at {loc} is equipped to missing monster {target}",
                        card.name
                    )));
                }
            }
        }

        state.turn = snapshot.turn;
        for entry in &snapshot.opt_used {
            let key = OptKey::new(entry.card, entry.effect.clone(), entry.scope);
            state.opt_used.insert(key, entry.count);
        }
        for restriction in &snapshot.restrictions {
            state.add_restriction(restriction.clone());
        }
        for event in &snapshot.events {
            state.push_event(event.clone());
        }
        for moved in &snapshot.last_moved_to_gy {
            state.last_moved_to_gy.push_back(*moved);
        }

        Ok(state)
    }

    /// Project the state back into a snapshot (records with names).
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        let pile = |zone: Zone| -> Vec<CardEntry> {
            self.pile(zone)
                .map(|p| p.iter().map(record).collect())
                .unwrap_or_default()
        };
        let slots = |zone: Zone| -> Vec<Option<CardEntry>> {
            self.field
                .slots(zone)
                .iter()
                .map(|s| s.as_ref().map(record))
                .collect()
        };

        Snapshot {
            zones: ZonesSnapshot {
                deck: pile(Zone::Deck),
                hand: pile(Zone::Hand),
                gy: pile(Zone::Gy),
                banished: pile(Zone::Banished),
                extra: pile(Zone::Extra),
                field: FieldSnapshot {
                    monsters: slots(Zone::MainMonster),
                    spell_traps: slots(Zone::SpellTrap),
                    field_spell: slots(Zone::FieldSpell).into_iter().flatten().next(),
                    extra_monsters: slots(Zone::ExtraMonster),
                },
            },
            capacities: self.capacity(),
            turn: self.turn,
            opt_used: self
                .opt_used
                .iter()
                .map(|(k, &count)| OptUsedEntry {
                    card: k.card,
                    effect: k.effect.clone(),
                    scope: k.scope,
                    count,
                })
                .collect(),
            restrictions: self.restrictions.iter().cloned().collect(),
            events: self.events.iter().cloned().collect(),
            last_moved_to_gy: self.last_moved_to_gy.iter().copied().collect(),
        }
    }
}

fn instantiate(
    state: &mut GameState,
    entry: &CardEntry,
    resolver: &dyn MetadataResolver,
) -> Result<CardInstance, ModelError> {
    let resolved = resolver.resolve(entry.cid())?;
    let uid = match entry.uid() {
        Some(uid) => uid,
        None => state.next_uid(),
    };
    let mut card = CardInstance::new(uid, &resolved);
    if let CardEntry::Record(r) = entry {
        card.properly_summoned = r.properly_summoned;
        card.face_down = r.face_down;
        card.equipped_to = r.equipped_to;
    }
    Ok(card)
}

fn check_slot_kind(zone: Zone, card: &CardInstance) -> Result<(), ModelError> {
    let ok = match zone {
        Zone::MainMonster => card.meta.is_monster(),
        Zone::ExtraMonster => card.meta.is_monster() && card.meta.from_extra,
        Zone::FieldSpell => card.meta.kind == CardKind::FieldSpell,
        // Spell/trap slots also hold monsters used as equips
        Zone::SpellTrap => !card.meta.is_placeholder() && card.meta.kind != CardKind::FieldSpell,
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(ModelError::MalformedSnapshot(format!(
            "{} cannot occupy {zone}",
            card.name
        )))
    }
}

fn record(card: &CardInstance) -> CardEntry {
    CardEntry::Record(CardRecord {
        cid: card.cid,
        name: Some(card.name.clone()),
        properly_summoned: card.properly_summoned,
        face_down: card.face_down,
        uid: Some(card.uid),
        equipped_to: card.equipped_to,
    })
}
