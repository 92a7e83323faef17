//! Field slots and card movement.
//!
//! `FieldZones` holds the fixed-capacity slot arrays. The `impl GameState`
//! block below is the only code that moves cards between zones, so the
//! zone invariants live here:
//!
//! - a field zone never holds more cards than its capacity; placing into
//!   a full zone or an occupied slot is `Illegal`, never truncated
//! - a card leaving the field loses `properly_summoned`, `face_down` and
//!   its equip link, and anything equipped to it goes to the graveyard
//! - every graveyard arrival is recorded in `last_moved_to_gy`
//!
//! Movement by instance id (`send_to_gy`, `banish`, ...) is the API used
//! by effect resolution, because pile indices shift as cards leave.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{CardInstance, SummonCategory};
use crate::core::config::{FieldCapacity, Zone};
use crate::core::entity::InstanceId;
use crate::core::error::Illegal;
use crate::core::event::{DuelEvent, GyReason, MovedToGy};
use crate::core::state::GameState;

/// A position in a zone: pile index or slot index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardLoc {
    pub zone: Zone,
    pub index: usize,
}

impl CardLoc {
    #[must_use]
    pub const fn new(zone: Zone, index: usize) -> Self {
        Self { zone, index }
    }
}

impl std::fmt::Display for CardLoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.zone.label(), self.index)
    }
}

/// One field slot.
pub type Slot = Option<CardInstance>;

/// Fixed-capacity field zones.
///
/// Each slot group is a `SmallVec` whose length equals the capacity;
/// empty slots are `None`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldZones {
    capacity: FieldCapacity,
    main_monsters: SmallVec<[Slot; 5]>,
    spell_traps: SmallVec<[Slot; 5]>,
    field_spell: SmallVec<[Slot; 1]>,
    extra_monsters: SmallVec<[Slot; 2]>,
}

impl FieldZones {
    /// Empty field with the given capacities.
    #[must_use]
    pub fn new(capacity: FieldCapacity) -> Self {
        Self {
            capacity,
            main_monsters: SmallVec::from_elem(None, capacity.main_monsters),
            spell_traps: SmallVec::from_elem(None, capacity.spell_traps),
            field_spell: SmallVec::from_elem(None, 1),
            extra_monsters: SmallVec::from_elem(None, capacity.extra_monsters),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> FieldCapacity {
        self.capacity
    }

    /// Slots of a field zone. Pile zones have no slots.
    #[must_use]
    pub fn slots(&self, zone: Zone) -> &[Slot] {
        match zone {
            Zone::MainMonster => &self.main_monsters,
            Zone::SpellTrap => &self.spell_traps,
            Zone::FieldSpell => &self.field_spell,
            Zone::ExtraMonster => &self.extra_monsters,
            _ => &[],
        }
    }

    /// Mutable slots of a field zone.
    pub fn slots_mut(&mut self, zone: Zone) -> &mut [Slot] {
        match zone {
            Zone::MainMonster => &mut self.main_monsters,
            Zone::SpellTrap => &mut self.spell_traps,
            Zone::FieldSpell => &mut self.field_spell,
            Zone::ExtraMonster => &mut self.extra_monsters,
            _ => &mut [],
        }
    }

    /// Lowest empty slot index.
    #[must_use]
    pub fn first_empty(&self, zone: Zone) -> Option<usize> {
        self.slots(zone).iter().position(Option::is_none)
    }

    /// Occupied slots with their index.
    pub fn occupied(&self, zone: Zone) -> impl Iterator<Item = (usize, &CardInstance)> {
        self.slots(zone)
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|c| (i, c)))
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn count(&self, zone: Zone) -> usize {
        self.occupied(zone).count()
    }

    /// Monsters on the field (main zones first, then extra monster zones).
    pub fn monsters(&self) -> impl Iterator<Item = (CardLoc, &CardInstance)> {
        Zone::MONSTERS.into_iter().flat_map(move |zone| {
            self.occupied(zone)
                .map(move |(i, c)| (CardLoc::new(zone, i), c))
        })
    }
}

impl GameState {
    // === Lookup ===

    /// Pile contents, or `None` for field zones.
    #[must_use]
    pub fn pile(&self, zone: Zone) -> Option<&im::Vector<CardInstance>> {
        match zone {
            Zone::Deck => Some(&self.deck),
            Zone::Hand => Some(&self.hand),
            Zone::Gy => Some(&self.gy),
            Zone::Banished => Some(&self.banished),
            Zone::Extra => Some(&self.extra),
            _ => None,
        }
    }

    fn pile_mut(&mut self, zone: Zone) -> Option<&mut im::Vector<CardInstance>> {
        match zone {
            Zone::Deck => Some(&mut self.deck),
            Zone::Hand => Some(&mut self.hand),
            Zone::Gy => Some(&mut self.gy),
            Zone::Banished => Some(&mut self.banished),
            Zone::Extra => Some(&mut self.extra),
            _ => None,
        }
    }

    /// Card at a location.
    #[must_use]
    pub fn card_at(&self, loc: CardLoc) -> Option<&CardInstance> {
        match self.pile(loc.zone) {
            Some(pile) => pile.get(loc.index),
            None => self.field.slots(loc.zone).get(loc.index)?.as_ref(),
        }
    }

    /// Cards in one zone with their locations, in index order.
    #[must_use]
    pub fn cards_in(&self, zone: Zone) -> Vec<(CardLoc, &CardInstance)> {
        match self.pile(zone) {
            Some(pile) => pile
                .iter()
                .enumerate()
                .map(|(i, c)| (CardLoc::new(zone, i), c))
                .collect(),
            None => self
                .field
                .occupied(zone)
                .map(|(i, c)| (CardLoc::new(zone, i), c))
                .collect(),
        }
    }

    /// Every card, zones in canonical order.
    #[must_use]
    pub fn all_cards(&self) -> Vec<(CardLoc, &CardInstance)> {
        Zone::ALL.iter().flat_map(|&z| self.cards_in(z)).collect()
    }

    /// Where an instance currently is.
    #[must_use]
    pub fn locate(&self, uid: InstanceId) -> Option<CardLoc> {
        self.all_cards()
            .into_iter()
            .find(|(_, c)| c.uid == uid)
            .map(|(loc, _)| loc)
    }

    /// Card with the given instance id.
    #[must_use]
    pub fn instance(&self, uid: InstanceId) -> Option<&CardInstance> {
        self.locate(uid).and_then(|loc| self.card_at(loc))
    }

    /// Number of cards in a zone.
    #[must_use]
    pub fn count(&self, zone: Zone) -> usize {
        match self.pile(zone) {
            Some(pile) => pile.len(),
            None => self.field.count(zone),
        }
    }

    // === Raw placement ===

    /// Put a card into a zone: end of a pile, or first empty field slot.
    pub fn put(&mut self, zone: Zone, card: CardInstance) -> Result<CardLoc, Illegal> {
        if let Some(pile) = self.pile_mut(zone) {
            pile.push_back(card);
            return Ok(CardLoc::new(zone, pile.len() - 1));
        }
        let index = self.field.first_empty(zone).ok_or(Illegal::ZoneFull(zone))?;
        self.place(CardLoc::new(zone, index), card)?;
        Ok(CardLoc::new(zone, index))
    }

    /// Put a card into a specific field slot.
    pub fn place(&mut self, loc: CardLoc, card: CardInstance) -> Result<(), Illegal> {
        if !loc.zone.is_field() {
            self.put(loc.zone, card)?;
            return Ok(());
        }
        let slot = self
            .field
            .slots_mut(loc.zone)
            .get_mut(loc.index)
            .ok_or(Illegal::ZoneFull(loc.zone))?;
        if slot.is_some() {
            return Err(Illegal::SlotOccupied {
                zone: loc.zone,
                index: loc.index,
            });
        }
        *slot = Some(card);
        Ok(())
    }

    /// Remove a card without any leave-the-field bookkeeping.
    fn take(&mut self, loc: CardLoc) -> Result<CardInstance, Illegal> {
        let missing = Illegal::NotInZone {
            zone: loc.zone,
            index: loc.index,
        };
        match self.pile_mut(loc.zone) {
            Some(pile) => {
                if loc.index >= pile.len() {
                    return Err(missing);
                }
                Ok(pile.remove(loc.index))
            }
            None => self
                .field
                .slots_mut(loc.zone)
                .get_mut(loc.index)
                .and_then(Option::take)
                .ok_or(missing),
        }
    }

    /// Remove a card from wherever it is.
    ///
    /// Leaving the field resets the card's flags and sends every card
    /// equipped to it to the graveyard.
    pub fn detach(&mut self, loc: CardLoc) -> Result<CardInstance, Illegal> {
        let mut card = self.take(loc)?;
        if loc.zone.is_field() {
            card.reset_on_leave();
            let orphans: Vec<InstanceId> = Zone::FIELD
                .iter()
                .flat_map(|&z| self.field.occupied(z))
                .filter(|(_, c)| c.equipped_to == Some(card.uid))
                .map(|(_, c)| c.uid)
                .collect();
            for uid in orphans {
                self.send_to_gy(uid, GyReason::Unequipped)?;
            }
        }
        Ok(card)
    }

    fn detach_uid(&mut self, uid: InstanceId) -> Result<(CardLoc, CardInstance), Illegal> {
        let loc = self.locate(uid).ok_or(Illegal::StaleAction)?;
        let card = self.detach(loc)?;
        Ok((loc, card))
    }

    // === Movement by instance ===

    /// Send a card to the graveyard and record the arrival.
    pub fn send_to_gy(&mut self, uid: InstanceId, reason: GyReason) -> Result<(), Illegal> {
        let (_, card) = self.detach_uid(uid)?;
        self.last_moved_to_gy.push_back(MovedToGy {
            card: card.cid,
            instance: card.uid,
            reason,
        });
        self.push_event(DuelEvent::SentToGraveyard { card: card.cid });
        self.gy.push_back(card);
        Ok(())
    }

    /// Banish a card.
    pub fn banish(&mut self, uid: InstanceId) -> Result<(), Illegal> {
        let (_, card) = self.detach_uid(uid)?;
        self.push_event(DuelEvent::Banished { card: card.cid });
        self.banished.push_back(card);
        Ok(())
    }

    /// Add a card to the hand.
    pub fn add_to_hand(&mut self, uid: InstanceId) -> Result<(), Illegal> {
        let (_, card) = self.detach_uid(uid)?;
        self.push_event(DuelEvent::AddedToHand { card: card.cid });
        self.hand.push_back(card);
        Ok(())
    }

    /// Move a card into the first empty slot of a field zone.
    ///
    /// The zone is checked for space before the card is removed from its
    /// current location, so a failure leaves the state untouched.
    pub fn move_to_field(&mut self, uid: InstanceId, zone: Zone) -> Result<CardLoc, Illegal> {
        if self.field.first_empty(zone).is_none() {
            return Err(Illegal::ZoneFull(zone));
        }
        let (_, card) = self.detach_uid(uid)?;
        self.put(zone, card)
    }

    /// Special summon a monster into the first free slot of `zone`.
    ///
    /// Main deck monsters may only use main monster zones. Extra deck
    /// monsters may use either monster zone group.
    pub fn special_summon(
        &mut self,
        uid: InstanceId,
        zone: Zone,
        proper: bool,
        category: SummonCategory,
    ) -> Result<CardLoc, Illegal> {
        let card = self.instance(uid).ok_or(Illegal::StaleAction)?;
        if !card.meta.is_monster() {
            return Err(Illegal::NotSummonable(card.cid));
        }
        if !zone.is_monster_zone() || (zone == Zone::ExtraMonster && !card.meta.from_extra) {
            return Err(Illegal::WrongCategory(card.cid));
        }
        let cid = card.cid;
        let loc = self.move_to_field(uid, zone)?;
        if let Some(Some(placed)) = self.field.slots_mut(zone).get_mut(loc.index) {
            placed.properly_summoned = proper;
        }
        self.push_event(DuelEvent::Summoned { card: cid, category });
        Ok(loc)
    }

    /// Attach a card to a monster on the field as an equip.
    pub fn equip(&mut self, uid: InstanceId, target: InstanceId) -> Result<CardLoc, Illegal> {
        let target_loc = self.locate(target).ok_or(Illegal::StaleAction)?;
        if !target_loc.zone.is_monster_zone() {
            return Err(Illegal::StaleAction);
        }
        let loc = self.move_to_field(uid, Zone::SpellTrap)?;
        if let Some(Some(placed)) = self.field.slots_mut(Zone::SpellTrap).get_mut(loc.index) {
            placed.equipped_to = Some(target);
        }
        Ok(loc)
    }

    /// Set a spell or trap face-down.
    pub fn set_face_down(&mut self, uid: InstanceId) -> Result<CardLoc, Illegal> {
        let loc = self.move_to_field(uid, Zone::SpellTrap)?;
        if let Some(Some(placed)) = self.field.slots_mut(Zone::SpellTrap).get_mut(loc.index) {
            placed.face_down = true;
        }
        Ok(loc)
    }

    /// Activate a field spell, replacing any existing one.
    pub fn activate_field_spell(&mut self, uid: InstanceId) -> Result<CardLoc, Illegal> {
        let existing: Vec<InstanceId> = self
            .field
            .occupied(Zone::FieldSpell)
            .map(|(_, c)| c.uid)
            .filter(|&u| u != uid)
            .collect();
        for old in existing {
            self.send_to_gy(old, GyReason::Effect)?;
        }
        self.move_to_field(uid, Zone::FieldSpell)
    }

    /// Cards equipped to `target`.
    #[must_use]
    pub fn equipped_to(&self, target: InstanceId) -> Vec<&CardInstance> {
        self.field
            .occupied(Zone::SpellTrap)
            .map(|(_, c)| c)
            .filter(|c| c.equipped_to == Some(target))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Attribute, CardId, CardMeta, Provenance, Race, ResolvedCard};

    fn monster(id: u32) -> ResolvedCard {
        ResolvedCard {
            cid: CardId::new(id),
            name: format!("Monster {id}"),
            meta: CardMeta::monster(Attribute::Light, Race::Fiend, 4),
            provenance: Provenance::Direct,
        }
    }

    fn link(id: u32) -> ResolvedCard {
        ResolvedCard {
            cid: CardId::new(id),
            name: format!("Link {id}"),
            meta: CardMeta::extra(SummonCategory::Link, Attribute::Light, Race::Fiend, 1),
            provenance: Provenance::Direct,
        }
    }

    fn small_field() -> GameState {
        GameState::new(FieldCapacity::default().with_main_monsters(2))
    }

    #[test]
    fn test_put_respects_capacity() {
        let mut state = small_field();
        state.spawn(Zone::MainMonster, &monster(1)).unwrap();
        state.spawn(Zone::MainMonster, &monster(2)).unwrap();
        assert_eq!(
            state.spawn(Zone::MainMonster, &monster(3)),
            Err(Illegal::ZoneFull(Zone::MainMonster))
        );
        assert_eq!(state.count(Zone::MainMonster), 2);
    }

    #[test]
    fn test_place_occupied_slot() {
        let mut state = small_field();
        let loc = state.spawn(Zone::MainMonster, &monster(1)).unwrap();
        let uid = state.next_uid();
        let card = CardInstance::new(uid, &monster(2));
        assert_eq!(
            state.place(loc, card),
            Err(Illegal::SlotOccupied {
                zone: Zone::MainMonster,
                index: 0
            })
        );
    }

    #[test]
    fn test_send_to_gy_records_arrival() {
        let mut state = small_field();
        let loc = state.spawn(Zone::Hand, &monster(1)).unwrap();
        let uid = state.card_at(loc).unwrap().uid;

        state.send_to_gy(uid, GyReason::Cost).unwrap();

        assert!(state.hand.is_empty());
        assert_eq!(state.gy.len(), 1);
        assert!(state.just_sent_to_gy(uid));
        assert_eq!(state.last_moved_to_gy[0].reason, GyReason::Cost);
    }

    #[test]
    fn test_leaving_field_resets_flags_and_drops_equips() {
        let mut state = small_field();
        let host_loc = state.spawn(Zone::Gy, &monster(1)).unwrap();
        let host = state.card_at(host_loc).unwrap().uid;
        state
            .special_summon(host, Zone::MainMonster, true, SummonCategory::Normal)
            .unwrap();
        assert!(state.instance(host).unwrap().properly_summoned);

        let eq_loc = state.spawn(Zone::Gy, &link(2)).unwrap();
        let equip = state.card_at(eq_loc).unwrap().uid;
        state.equip(equip, host).unwrap();
        assert_eq!(state.equipped_to(host).len(), 1);

        state.banish(host).unwrap();

        let banished = state.instance(host).unwrap();
        assert!(!banished.properly_summoned);
        assert_eq!(state.locate(equip).unwrap().zone, Zone::Gy);
        assert!(state.instance(equip).unwrap().equipped_to.is_none());
        assert!(state.just_sent_to_gy(equip));
    }

    #[test]
    fn test_special_summon_zone_rules() {
        let mut state = small_field();
        let loc = state.spawn(Zone::Gy, &monster(1)).unwrap();
        let uid = state.card_at(loc).unwrap().uid;

        // Main deck monsters cannot use the extra monster zone
        let err = state
            .special_summon(uid, Zone::ExtraMonster, false, SummonCategory::Normal)
            .unwrap_err();
        assert_eq!(err, Illegal::WrongCategory(CardId::new(1)));
        // Failure left the card where it was
        assert_eq!(state.locate(uid), Some(loc));
    }

    #[test]
    fn test_move_to_full_zone_leaves_state_untouched() {
        let mut state = small_field();
        state.spawn(Zone::MainMonster, &monster(1)).unwrap();
        state.spawn(Zone::MainMonster, &monster(2)).unwrap();
        let loc = state.spawn(Zone::Gy, &monster(3)).unwrap();
        let uid = state.card_at(loc).unwrap().uid;

        let before = state.clone();
        assert!(state.move_to_field(uid, Zone::MainMonster).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_field_spell_replacement() {
        let spell = |id: u32| ResolvedCard {
            cid: CardId::new(id),
            name: format!("Field {id}"),
            meta: CardMeta::non_monster(crate::cards::CardKind::FieldSpell),
            provenance: Provenance::Direct,
        };
        let mut state = small_field();
        let a = state.spawn(Zone::Hand, &spell(1)).unwrap();
        let a = state.card_at(a).unwrap().uid;
        state.activate_field_spell(a).unwrap();

        let b = state.spawn(Zone::Hand, &spell(2)).unwrap();
        let b = state.card_at(b).unwrap().uid;
        state.activate_field_spell(b).unwrap();

        assert_eq!(state.locate(a).unwrap().zone, Zone::Gy);
        assert_eq!(state.locate(b).unwrap().zone, Zone::FieldSpell);
    }

    #[test]
    fn test_locate_after_pile_shift() {
        let mut state = small_field();
        let first = state.spawn(Zone::Hand, &monster(1)).unwrap();
        let first = state.card_at(first).unwrap().uid;
        let second = state.spawn(Zone::Hand, &monster(2)).unwrap();
        let second = state.card_at(second).unwrap().uid;

        state.send_to_gy(first, GyReason::Cost).unwrap();

        assert_eq!(state.locate(second), Some(CardLoc::new(Zone::Hand, 0)));
    }
}
