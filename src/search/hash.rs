//! Structural state hashing.
//!
//! The hash covers everything that can change which actions are legal
//! later on, and nothing else:
//!
//! - every zone's contents as a sorted multiset of card keys
//!   (card id, `from_extra`, `properly_summoned`, `face_down`, and for
//!   equips the key of the card they are attached to)
//! - field capacities and turn metadata
//! - `opt_used` counts, restrictions, marker-class events
//! - the cards that just reached the graveyard (arrival triggers)
//!
//! Instance ids, slot indices, pile order and the non-marker event log
//! are left out. No effect in this model reads them, so two states that
//! only differ there are legality-equivalent and hash the same no matter
//! which action order produced them.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CardInstance};
use crate::core::{GameState, Zone};

/// 64-bit structural state hash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateHash(pub u64);

impl std::fmt::Display for StateHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Per-card identity, without the instance id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct CardKey {
    cid: CardId,
    from_extra: bool,
    properly_summoned: bool,
    face_down: bool,
    equipped_to: Option<(Zone, CardId, bool)>,
}

fn card_key(state: &GameState, card: &CardInstance) -> CardKey {
    let equipped_to = card.equipped_to.and_then(|target| {
        let loc = state.locate(target)?;
        let t = state.card_at(loc)?;
        Some((loc.zone, t.cid, t.properly_summoned))
    });
    CardKey {
        cid: card.cid,
        from_extra: card.meta.from_extra,
        properly_summoned: card.properly_summoned,
        face_down: card.face_down,
        equipped_to,
    }
}

/// Compute the structural hash of `state`.
#[must_use]
pub fn hash_state(state: &GameState) -> StateHash {
    let mut h = FxHasher::default();

    for zone in Zone::ALL {
        let mut keys: Vec<CardKey> = state
            .cards_in(zone)
            .into_iter()
            .map(|(_, c)| card_key(state, c))
            .collect();
        keys.sort_unstable();
        zone.hash(&mut h);
        keys.hash(&mut h);
    }

    state.capacity().hash(&mut h);
    state.turn.hash(&mut h);

    // OrdMap / OrdSet iterate in key order
    state.opt_used.len().hash(&mut h);
    for (key, count) in state.opt_used.iter() {
        key.hash(&mut h);
        count.hash(&mut h);
    }
    state.restrictions.len().hash(&mut h);
    for restriction in state.restrictions.iter() {
        restriction.hash(&mut h);
    }

    let mut markers: Vec<_> = state.marker_events().collect();
    markers.sort_unstable();
    markers.dedup();
    markers.hash(&mut h);

    let mut arrivals: Vec<_> = state
        .last_moved_to_gy
        .iter()
        .map(|m| (m.card, m.reason))
        .collect();
    arrivals.sort_unstable();
    arrivals.hash(&mut h);

    StateHash(h.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Attribute, CardMeta, Provenance, Race, ResolvedCard, SummonCategory};
    use crate::core::{DuelEvent, OptKey, OptScope};

    fn card(id: u32) -> ResolvedCard {
        ResolvedCard {
            cid: CardId::new(id),
            name: format!("Card {id}"),
            meta: CardMeta::monster(Attribute::Dark, Race::Fiend, 4),
            provenance: Provenance::Direct,
        }
    }

    #[test]
    fn test_hand_order_irrelevant() {
        let mut a = GameState::default();
        a.spawn(Zone::Hand, &card(1)).unwrap();
        a.spawn(Zone::Hand, &card(2)).unwrap();

        let mut b = GameState::default();
        b.spawn(Zone::Hand, &card(2)).unwrap();
        b.spawn(Zone::Hand, &card(1)).unwrap();

        assert_eq!(hash_state(&a), hash_state(&b));
    }

    #[test]
    fn test_slot_index_irrelevant() {
        let mut a = GameState::default();
        a.spawn(Zone::MainMonster, &card(1)).unwrap();

        let mut b = GameState::default();
        let first = b.spawn(Zone::MainMonster, &card(9)).unwrap();
        b.spawn(Zone::MainMonster, &card(1)).unwrap();
        let uid = b.card_at(first).unwrap().uid;
        b.detach(first).unwrap();
        assert!(b.locate(uid).is_none());

        assert_eq!(hash_state(&a), hash_state(&b));
    }

    #[test]
    fn test_properly_summoned_changes_hash() {
        let mut a = GameState::default();
        let loc = a.spawn(Zone::MainMonster, &card(1)).unwrap();
        let mut b = a.clone();
        b.field.slots_mut(Zone::MainMonster)[loc.index]
            .as_mut()
            .unwrap()
            .properly_summoned = true;

        assert_ne!(hash_state(&a), hash_state(&b));
    }

    #[test]
    fn test_from_extra_changes_hash() {
        let mut a = GameState::default();
        a.spawn(Zone::Gy, &card(1)).unwrap();

        let mut b = GameState::default();
        let mut fusion = card(1);
        fusion.meta = CardMeta::extra(SummonCategory::Fusion, Attribute::Dark, Race::Fiend, 4);
        b.spawn(Zone::Gy, &fusion).unwrap();

        assert_ne!(hash_state(&a), hash_state(&b));
    }

    #[test]
    fn test_turn_state_changes_hash() {
        let base = GameState::default();

        let mut ns = base.clone();
        ns.turn.normal_summon_used = true;
        assert_ne!(hash_state(&base), hash_state(&ns));

        let mut opt = base.clone();
        opt.mark_opt(OptKey::new(CardId::new(1), "search", OptScope::Turn));
        assert_ne!(hash_state(&base), hash_state(&opt));

        let mut marker = base.clone();
        marker.push_event(DuelEvent::OpponentTurnStarted);
        assert_ne!(hash_state(&base), hash_state(&marker));
    }

    #[test]
    fn test_non_marker_events_ignored() {
        let base = GameState::default();
        let mut logged = base.clone();
        logged.push_event(DuelEvent::Activated {
            card: CardId::new(1),
            effect: "search".into(),
        });
        assert_eq!(hash_state(&base), hash_state(&logged));
    }
}
