//! Cinder: a small demonstration archetype.
//!
//! The pool is built to touch every mechanic the engine models:
//!
//! - a discard/search starter that sets an extra deck restriction
//! - a graveyard arrival trigger
//! - a revival spell with a second, graveyard fusion effect
//! - a field spell with an activation search
//! - a trap gated on the opponent's turn
//! - a link-1 with a tribute/summon effect and a graveyard equip effect
//! - a fusion boss whose retrieval effect needs a proper summon
//! - a link-2 and a rank 4 xyz with no effects
//!
//! The known best line from Acolyte alone (deck: Herald, Rite, Zealot):
//! Acolyte searches Herald, normal summon Herald, link into Requiem,
//! Herald adds Rite, Rite revives Acolyte, Rite fuses Acolyte and Requiem
//! into Sovereign, Requiem equips itself to Sovereign.

mod cards;
mod effects;

pub use cards::{
    database, definitions, procedures, ACOLYTE, ACOLYTE_ALT, ARCHETYPE, BELLWARDEN, HERALD, REQUIEM,
    RITE, SANCTUM, SEQUENCE, SOVEREIGN, VIGIL, ZEALOT,
};
pub use effects::{
    AcolyteSearch, HeraldArrival, RequiemEquip, RequiemRelease, RiteFusion, RiteRevive,
    SanctumActivate, SovereignReclaim, VigilRevive,
};

use crate::effects::EffectRegistry;
use crate::eval::{BoardZone, BucketDef, BucketError, Tier};

/// Effect registry with every Cinder card and procedure.
#[must_use]
pub fn registry() -> EffectRegistry {
    let mut r = EffectRegistry::new();
    r.register(ACOLYTE, AcolyteSearch);
    r.register(HERALD, HeraldArrival);
    r.register(RITE, RiteRevive);
    r.register(RITE, RiteFusion);
    r.register(SANCTUM, SanctumActivate);
    r.register(VIGIL, VigilRevive);
    r.register_vanilla(ZEALOT);
    r.register(REQUIEM, RequiemRelease);
    r.register(REQUIEM, RequiemEquip);
    r.register(SOVEREIGN, SovereignReclaim);
    for procedure in procedures() {
        r.register_procedure(procedure);
    }
    r
}

/// Default endboard buckets for Cinder lines.
pub fn buckets() -> Result<Vec<BucketDef>, BucketError> {
    Ok(vec![
        BucketDef::card("Sovereign on board", Tier::S, "Cinder Sovereign", BoardZone::Field),
        BucketDef::condition(
            "Sovereign equipped",
            Tier::A,
            "Cinder Sovereign equipped link >= 1",
        )?,
        BucketDef::condition("Herald in GY", Tier::B, "Cinder Herald in gy")?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardId, MetadataResolver};
    use crate::core::{Action, DuelEvent, GameState, Zone};
    use crate::eval::{Evaluator, RankKey};
    use crate::rules::RulesEngine;

    fn state(hand: &[CardId], deck: &[CardId], extra: &[CardId]) -> GameState {
        let db = database().unwrap();
        let mut state = GameState::default();
        for (zone, ids) in [(Zone::Hand, hand), (Zone::Deck, deck), (Zone::Extra, extra)] {
            for &id in ids {
                state.spawn(zone, &db.resolve(id).unwrap()).unwrap();
            }
        }
        state
    }

    /// Apply the first legal action whose description starts with `prefix`.
    fn play(r: &EffectRegistry, state: &GameState, prefix: &str) -> GameState {
        let actions = r.legal_actions(state).unwrap();
        let action = actions
            .iter()
            .find(|a| a.describe(state).starts_with(prefix))
            .unwrap_or_else(|| {
                let all: Vec<String> = actions.iter().map(|a| a.describe(state)).collect();
                panic!("no action {prefix:?} in {all:#?}")
            });
        r.apply_action(state, action).unwrap()
    }

    fn names(state: &GameState, zone: Zone) -> Vec<String> {
        state.cards_in(zone).into_iter().map(|(_, c)| c.name.clone()).collect()
    }

    #[test]
    fn test_known_line() {
        let r = registry();
        let s = state(&[ACOLYTE], &[HERALD, RITE, ZEALOT], &[REQUIEM, SOVEREIGN]);

        let s = play(&r, &s, "Activate Cinder Acolyte (search) targeting Cinder Herald");
        let s = play(&r, &s, "Normal Summon Cinder Herald");
        let s = play(&r, &s, "Link Summon Cinder Requiem using Cinder Herald");
        let s = play(&r, &s, "Activate Cinder Herald (arrival)");
        let s = play(&r, &s, "Activate Cinder Rite (revive) targeting Cinder Acolyte");
        let s = play(&r, &s, "Activate Cinder Rite (fusion)");
        let s = play(&r, &s, "Activate Cinder Requiem (equip)");

        assert_eq!(names(&s, Zone::MainMonster), vec!["Cinder Sovereign"]);
        assert_eq!(names(&s, Zone::SpellTrap), vec!["Cinder Requiem"]);
        assert_eq!(names(&s, Zone::Banished), vec!["Cinder Rite"]);
        let mut gy = names(&s, Zone::Gy);
        gy.sort();
        assert_eq!(gy, vec!["Cinder Acolyte", "Cinder Herald"]);

        let evaluator = Evaluator::new(buckets().unwrap());
        assert_eq!(evaluator.evaluate(&s).rank_key, RankKey(1, 1, 1));
    }

    #[test]
    fn test_herald_trigger_only_right_after_arrival() {
        let r = registry();
        let s = state(&[ACOLYTE, HERALD], &[RITE, ZEALOT], &[REQUIEM]);
        let s = play(&r, &s, "Normal Summon Cinder Herald");
        let s = play(&r, &s, "Link Summon Cinder Requiem");
        assert!(r
            .legal_actions(&s)
            .unwrap()
            .iter()
            .any(|a| a.describe(&s).starts_with("Activate Cinder Herald (arrival)")));

        // Any other action first and the window is gone
        let s = play(&r, &s, "Activate Cinder Acolyte (search)");
        assert!(!r
            .legal_actions(&s)
            .unwrap()
            .iter()
            .any(|a| a.describe(&s).starts_with("Activate Cinder Herald")));
    }

    #[test]
    fn test_acolyte_restricts_extra_deck() {
        let r = registry();
        let s = state(&[ACOLYTE], &[HERALD], &[]);
        let s = play(&r, &s, "Activate Cinder Acolyte");
        assert!(s.has_restriction(&crate::core::Restriction::ExtraDeckOnly {
            race: crate::cards::Race::Fiend
        }));
    }

    #[test]
    fn test_reclaim_needs_proper_summon() {
        let r = registry();
        let db = database().unwrap();
        let mut s = state(&[], &[], &[]);
        s.spawn(Zone::Gy, &db.resolve(HERALD).unwrap()).unwrap();
        let loc = s.spawn(Zone::Extra, &db.resolve(SOVEREIGN).unwrap()).unwrap();
        let uid = s.card_at(loc).unwrap().uid;

        // Revived by a generic special summon: no retrieval
        let mut revived = s.clone();
        revived
            .special_summon(uid, Zone::MainMonster, false, crate::cards::SummonCategory::Fusion)
            .unwrap();
        let has_reclaim = |st: &GameState| {
            r.legal_actions(st)
                .unwrap()
                .iter()
                .any(|a| a.describe(st).starts_with("Activate Cinder Sovereign (reclaim)"))
        };
        assert!(!has_reclaim(&revived));

        let mut proper = s.clone();
        proper
            .special_summon(uid, Zone::MainMonster, true, crate::cards::SummonCategory::Fusion)
            .unwrap();
        assert!(has_reclaim(&proper));
    }

    #[test]
    fn test_vigil_needs_opponent_turn() {
        let r = registry();
        let s = state(&[VIGIL], &[], &[]);
        let mut s = play(&r, &s, "Set Cinder Vigil");
        let db = database().unwrap();
        s.spawn(Zone::Gy, &db.resolve(ZEALOT).unwrap()).unwrap();

        let vigil = |st: &GameState| {
            r.legal_actions(st)
                .unwrap()
                .into_iter()
                .filter(|a| matches!(a, Action::Effect(e) if e.card == VIGIL))
                .count()
        };
        assert_eq!(vigil(&s), 0);

        s.push_event(DuelEvent::OpponentTurnStarted);
        assert_eq!(vigil(&s), 1);
        let s = play(&r, &s, "Activate Cinder Vigil");
        assert_eq!(names(&s, Zone::MainMonster), vec!["Cinder Zealot"]);
        assert_eq!(names(&s, Zone::Gy), vec!["Cinder Vigil"]);
    }

    #[test]
    fn test_sanctum_replaces_field_spell() {
        let r = registry();
        let s = state(&[SANCTUM, SANCTUM], &[HERALD, ZEALOT], &[]);
        let s = play(&r, &s, "Activate Cinder Sanctum (activate) targeting Cinder Herald");
        assert_eq!(names(&s, Zone::FieldSpell), vec!["Cinder Sanctum"]);
        assert!(names(&s, Zone::Hand).contains(&"Cinder Herald".to_string()));

        // Once per turn: the second copy cannot activate
        assert!(!r
            .legal_actions(&s)
            .unwrap()
            .iter()
            .any(|a| matches!(a, Action::Effect(e) if e.card == SANCTUM)));
    }

    #[test]
    fn test_requiem_release_and_xyz() {
        let r = registry();
        let s = state(&[HERALD], &[ZEALOT], &[REQUIEM, BELLWARDEN]);
        let s = play(&r, &s, "Normal Summon Cinder Herald");
        let s = play(&r, &s, "Link Summon Cinder Requiem");
        let s = play(&r, &s, "Activate Cinder Requiem (release) targeting Cinder Zealot");
        assert_eq!(names(&s, Zone::MainMonster), vec!["Cinder Zealot"]);
        assert_eq!(names(&s, Zone::ExtraMonster), Vec::<String>::new());

        // One level 4 is not enough for the rank 4 xyz
        assert!(!r
            .legal_actions(&s)
            .unwrap()
            .iter()
            .any(|a| a.kind() == crate::core::ActionKind::XyzSummon));
    }

    #[test]
    fn test_unregistered_card_is_model_error() {
        let r = registry();
        let mut s = state(&[], &[], &[]);
        s.spawn(
            Zone::Hand,
            &crate::cards::ResolvedCard {
                cid: CardId(5555),
                name: "Stranger".into(),
                meta: crate::cards::CardMeta::monster(
                    crate::cards::Attribute::Dark,
                    crate::cards::Race::Dragon,
                    4,
                ),
                provenance: crate::cards::Provenance::Direct,
            },
        )
        .unwrap();
        assert!(r.legal_actions(&s).is_err());
    }
}
