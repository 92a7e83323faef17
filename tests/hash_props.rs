//! Determinism and structural-hash properties.

use proptest::prelude::*;

use combo_search::cards::{CardId, MetadataResolver};
use combo_search::core::{Action, CardEntry, CardRecord, CoreAction, GameState, Snapshot, Zone};
use combo_search::games::cinder;
use combo_search::rules::RulesEngine;
use combo_search::search::hash_state;

/// Main deck pool plus one placeholder.
const POOL: [CardId; 7] = [
    cinder::ACOLYTE,
    cinder::HERALD,
    cinder::RITE,
    cinder::SANCTUM,
    cinder::VIGIL,
    cinder::ZEALOT,
    CardId(900_001),
];

fn snapshot(hand: &[CardId], deck: &[CardId], gy: &[CardId]) -> Snapshot {
    let mut s = Snapshot::default();
    s.zones.hand = hand.iter().copied().map(CardEntry::Id).collect();
    s.zones.deck = deck.iter().copied().map(CardEntry::Id).collect();
    s.zones.gy = gy.iter().copied().map(CardEntry::Id).collect();
    s.zones.extra = vec![
        CardEntry::Id(cinder::REQUIEM),
        CardEntry::Id(cinder::SOVEREIGN),
    ];
    s
}

fn load(s: &Snapshot) -> GameState {
    GameState::from_snapshot(s, &cinder::database().unwrap()).unwrap()
}

fn cards(max: usize) -> impl Strategy<Value = Vec<CardId>> {
    prop::collection::vec(prop::sample::select(POOL.to_vec()), 0..max)
}

fn keys(state: &GameState) -> Vec<String> {
    cinder::registry()
        .legal_actions(state)
        .unwrap()
        .iter()
        .map(Action::order_key)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_enumeration_is_deterministic(
        hand in cards(5),
        deck in cards(6),
        gy in cards(3),
    ) {
        let state = load(&snapshot(&hand, &deck, &gy));
        prop_assert_eq!(keys(&state), keys(&state.clone()));

        // A state rebuilt from the same snapshot enumerates identically
        let again = load(&snapshot(&hand, &deck, &gy));
        prop_assert_eq!(keys(&state), keys(&again));
    }

    #[test]
    fn test_hash_ignores_pile_order(
        (hand, shuffled) in cards(6).prop_flat_map(|h| (Just(h.clone()), Just(h).prop_shuffle())),
        deck in cards(6),
    ) {
        let a = load(&snapshot(&hand, &deck, &[]));
        let b = load(&snapshot(&shuffled, &deck, &[]));
        prop_assert_eq!(hash_state(&a), hash_state(&b));
    }

    #[test]
    fn test_hash_changes_with_zone(hand in cards(4), card in prop::sample::select(POOL.to_vec())) {
        let in_hand = load(&snapshot(&[hand.clone(), vec![card]].concat(), &[], &[]));
        let in_gy = load(&snapshot(&hand, &[], &[card]));
        prop_assert_ne!(hash_state(&in_hand), hash_state(&in_gy));
    }
}

#[test]
fn test_hash_distinguishes_properly_summoned() {
    let mut proper = Snapshot::default();
    proper.zones.field.monsters = vec![Some(CardEntry::Record(CardRecord {
        cid: cinder::SOVEREIGN,
        name: None,
        properly_summoned: true,
        face_down: false,
        uid: None,
        equipped_to: None,
    }))];
    let mut revived = proper.clone();
    if let Some(Some(CardEntry::Record(r))) = revived.zones.field.monsters.first_mut() {
        r.properly_summoned = false;
    }
    assert_ne!(hash_state(&load(&proper)), hash_state(&load(&revived)));
}

#[test]
fn test_hash_distinguishes_from_extra() {
    // Same name and stats, one from the extra deck
    let db = cinder::database().unwrap();
    let mut a = GameState::default();
    a.spawn(Zone::Gy, &db.resolve(cinder::ZEALOT).unwrap()).unwrap();
    let mut b = GameState::default();
    let mut fake = db.resolve(cinder::ZEALOT).unwrap();
    fake.meta.from_extra = true;
    b.spawn(Zone::Gy, &fake).unwrap();
    assert_ne!(hash_state(&a), hash_state(&b));
}

#[test]
fn test_hash_is_path_independent() {
    let r = cinder::registry();
    let state = load(&snapshot(&[cinder::RITE, cinder::VIGIL], &[], &[]));
    let set = |s: &GameState, card: CardId| {
        let hand = s
            .cards_in(Zone::Hand)
            .iter()
            .position(|(_, c)| c.cid == card)
            .unwrap();
        r.apply_action(s, &Action::Core(CoreAction::Set { hand, card }))
            .unwrap()
    };

    let rite_first = set(&set(&state, cinder::RITE), cinder::VIGIL);
    let vigil_first = set(&set(&state, cinder::VIGIL), cinder::RITE);

    // Different slots, same legal future
    assert_ne!(
        rite_first.card_at(combo_search::zones::CardLoc::new(Zone::SpellTrap, 0)).unwrap().cid,
        vigil_first.card_at(combo_search::zones::CardLoc::new(Zone::SpellTrap, 0)).unwrap().cid,
    );
    assert_eq!(hash_state(&rite_first), hash_state(&vigil_first));
}
