//! Cinder card effects.
//!
//! | Card | Effect | From | Text |
//! |---|---|---|---|
//! | Acolyte | `search` | hand | Discard this card: add 1 other Cinder card from the deck to the hand. Only Fiends may be summoned from the extra deck for the rest of the turn. |
//! | Herald | `arrival` | gy | If this card was just sent to the GY: add 1 Cinder Rite from the deck to the hand. |
//! | Rite | `revive` | hand | Special summon 1 Cinder monster from the GY. |
//! | Rite | `fusion` | gy | Banish this card: fusion summon 1 Cinder fusion monster using monsters you control. |
//! | Sanctum | `activate` | hand | Activate this field spell and add 1 Cinder monster from the deck to the hand. |
//! | Vigil | `revive` | set | During the opponent's turn: special summon 1 Cinder monster from the GY. |
//! | Requiem | `release` | field | Send this card to the GY: special summon 1 level 4 or lower Cinder monster from the deck. |
//! | Requiem | `equip` | gy | Equip this card to a Cinder fusion monster you control. |
//! | Sovereign | `reclaim` | field | If this card was fusion summoned: add 1 Cinder monster from the GY to the hand. |

use smallvec::SmallVec;

use super::cards::{ACOLYTE, ARCHETYPE, RITE};
use crate::cards::{CardInstance, Race, SummonCategory};
use crate::core::error::{ActionError, Illegal};
use crate::core::event::{DuelEvent, GyReason};
use crate::core::state::{GameState, Restriction};
use crate::core::Zone;
use crate::effects::targeting::{combinations, distinct, find};
use crate::effects::{CardEffect, CardFilter, Effect, EffectParams, EffectRegistry};
use crate::rules::{check_restrictions, free_after};
use crate::zones::CardLoc;

const FIELD_MONSTERS: &[Zone] = &[Zone::MainMonster, Zone::ExtraMonster];

fn source_card(state: &GameState, source: CardLoc) -> Result<&CardInstance, Illegal> {
    state.card_at(source).ok_or(Illegal::StaleAction)
}

fn target_card<'a>(
    state: &'a GameState,
    params: &EffectParams,
    i: usize,
) -> Result<&'a CardInstance, Illegal> {
    let loc = params.targets.get(i).ok_or(Illegal::StaleAction)?;
    state.card_at(*loc).ok_or(Illegal::StaleAction)
}

/// Cinder main deck monsters in `zones`, one choice per distinct card.
fn cinder_monsters(state: &GameState, zones: &[Zone]) -> Vec<CardLoc> {
    let filter = CardFilter::any().archetype(ARCHETYPE).monster().main_deck();
    distinct(state, &find(state, zones, &filter))
}

fn one_target_each(locs: Vec<CardLoc>) -> Vec<EffectParams> {
    locs.into_iter().map(EffectParams::target).collect()
}

// === Cinder Acolyte ===

pub struct AcolyteSearch;

impl CardEffect for AcolyteSearch {
    fn id(&self) -> &'static str {
        "search"
    }

    fn locations(&self) -> &'static [Zone] {
        &[Zone::Hand]
    }

    fn choices(&self, _: &EffectRegistry, state: &GameState, _: CardLoc) -> Vec<EffectParams> {
        let found: Vec<CardLoc> = find(state, &[Zone::Deck], &CardFilter::any().archetype(ARCHETYPE))
            .into_iter()
            .filter(|&loc| state.card_at(loc).is_some_and(|c| c.cid != ACOLYTE))
            .collect();
        one_target_each(distinct(state, &found))
    }

    fn resolve(
        &self,
        _: &EffectRegistry,
        state: &GameState,
        source: CardLoc,
        params: &EffectParams,
    ) -> Result<Effect, ActionError> {
        let me = source_card(state, source)?.uid;
        let target = target_card(state, params, 0)?.uid;
        Ok(Effect::batch([
            Effect::cost_to_gy(me),
            Effect::add_to_hand(target),
            Effect::Restrict(Restriction::ExtraDeckOnly { race: Race::Fiend }),
        ]))
    }
}

// === Cinder Herald ===

pub struct HeraldArrival;

impl CardEffect for HeraldArrival {
    fn id(&self) -> &'static str {
        "arrival"
    }

    fn locations(&self) -> &'static [Zone] {
        &[Zone::Gy]
    }

    fn choices(&self, _: &EffectRegistry, state: &GameState, source: CardLoc) -> Vec<EffectParams> {
        let Some(me) = state.card_at(source) else {
            return Vec::new();
        };
        if !state.just_sent_to_gy(me.uid) {
            return Vec::new();
        }
        let rites = find(state, &[Zone::Deck], &CardFilter::any().card(RITE));
        one_target_each(rites.into_iter().take(1).collect())
    }

    fn resolve(
        &self,
        _: &EffectRegistry,
        state: &GameState,
        _: CardLoc,
        params: &EffectParams,
    ) -> Result<Effect, ActionError> {
        Ok(Effect::add_to_hand(target_card(state, params, 0)?.uid))
    }
}

// === Cinder Rite ===

pub struct RiteRevive;

impl CardEffect for RiteRevive {
    fn id(&self) -> &'static str {
        "revive"
    }

    fn locations(&self) -> &'static [Zone] {
        &[Zone::Hand]
    }

    fn choices(&self, _: &EffectRegistry, state: &GameState, _: CardLoc) -> Vec<EffectParams> {
        if state.field.first_empty(Zone::MainMonster).is_none() {
            return Vec::new();
        }
        one_target_each(cinder_monsters(state, &[Zone::Gy]))
    }

    fn resolve(
        &self,
        _: &EffectRegistry,
        state: &GameState,
        source: CardLoc,
        params: &EffectParams,
    ) -> Result<Effect, ActionError> {
        let me = source_card(state, source)?.uid;
        let target = target_card(state, params, 0)?.uid;
        Ok(Effect::special_summon(target).then(Effect::SendToGy {
            card: me,
            reason: GyReason::Resolved,
        }))
    }
}

/// Targets: the fusion monster in the extra deck, then its materials.
pub struct RiteFusion;

impl RiteFusion {
    fn landing_zone(state: &GameState, materials: &[CardLoc]) -> Option<Zone> {
        FIELD_MONSTERS
            .iter()
            .copied()
            .find(|&z| free_after(state, z, materials) > 0)
    }
}

impl CardEffect for RiteFusion {
    fn id(&self) -> &'static str {
        "fusion"
    }

    fn locations(&self) -> &'static [Zone] {
        &[Zone::Gy]
    }

    fn choices(&self, registry: &EffectRegistry, state: &GameState, _: CardLoc) -> Vec<EffectParams> {
        let fusions = find(
            state,
            &[Zone::Extra],
            &CardFilter::any()
                .archetype(ARCHETYPE)
                .category(SummonCategory::Fusion),
        );
        let field: Vec<(CardLoc, &CardInstance)> = state
            .field
            .monsters()
            .filter(|(_, c)| !c.face_down)
            .collect();

        let mut out = Vec::new();
        for extra in distinct(state, &fusions) {
            let Some(card) = state.card_at(extra) else {
                continue;
            };
            let Some(procedure) = registry.procedure(card.cid) else {
                continue;
            };
            if check_restrictions(state, card).is_err() {
                continue;
            }
            let spec = &procedure.materials;
            for k in usize::from(spec.min)..=usize::from(spec.max) {
                for subset in combinations(&field, k) {
                    let mats: Vec<&CardInstance> = subset.iter().map(|(_, c)| *c).collect();
                    if procedure.check(&card.meta, &mats).is_err() {
                        continue;
                    }
                    let locs: Vec<CardLoc> = subset.iter().map(|(l, _)| *l).collect();
                    if Self::landing_zone(state, &locs).is_some() {
                        out.push(EffectParams::targets(std::iter::once(extra).chain(locs)));
                    }
                }
            }
        }
        out
    }

    fn resolve(
        &self,
        _: &EffectRegistry,
        state: &GameState,
        source: CardLoc,
        params: &EffectParams,
    ) -> Result<Effect, ActionError> {
        let me = source_card(state, source)?.uid;
        let fusion = target_card(state, params, 0)?.uid;
        let mut materials: SmallVec<[_; 4]> = SmallVec::new();
        for i in 1..params.targets.len() {
            materials.push(target_card(state, params, i)?.uid);
        }
        let zone = Self::landing_zone(state, &params.targets[1..]).ok_or(Illegal::ZoneFull(Zone::MainMonster))?;
        Ok(Effect::batch([
            Effect::Banish { card: me },
            Effect::ProcedureSummon {
                card: fusion,
                materials,
                zone,
            },
        ]))
    }
}

// === Cinder Sanctum ===

pub struct SanctumActivate;

impl CardEffect for SanctumActivate {
    fn id(&self) -> &'static str {
        "activate"
    }

    fn locations(&self) -> &'static [Zone] {
        &[Zone::Hand]
    }

    fn choices(&self, _: &EffectRegistry, state: &GameState, _: CardLoc) -> Vec<EffectParams> {
        one_target_each(cinder_monsters(state, &[Zone::Deck]))
    }

    fn resolve(
        &self,
        _: &EffectRegistry,
        state: &GameState,
        source: CardLoc,
        params: &EffectParams,
    ) -> Result<Effect, ActionError> {
        let me = source_card(state, source)?.uid;
        let target = target_card(state, params, 0)?.uid;
        Ok(Effect::ActivateFieldSpell { card: me }.then(Effect::add_to_hand(target)))
    }
}

// === Cinder Vigil ===

pub struct VigilRevive;

impl CardEffect for VigilRevive {
    fn id(&self) -> &'static str {
        "revive"
    }

    fn locations(&self) -> &'static [Zone] {
        &[Zone::SpellTrap]
    }

    fn choices(&self, _: &EffectRegistry, state: &GameState, source: CardLoc) -> Vec<EffectParams> {
        let set = state.card_at(source).is_some_and(|c| c.face_down);
        if !set
            || !state.has_event(&DuelEvent::OpponentTurnStarted)
            || state.field.first_empty(Zone::MainMonster).is_none()
        {
            return Vec::new();
        }
        one_target_each(cinder_monsters(state, &[Zone::Gy]))
    }

    fn resolve(
        &self,
        _: &EffectRegistry,
        state: &GameState,
        source: CardLoc,
        params: &EffectParams,
    ) -> Result<Effect, ActionError> {
        let me = source_card(state, source)?.uid;
        let target = target_card(state, params, 0)?.uid;
        Ok(Effect::special_summon(target).then(Effect::SendToGy {
            card: me,
            reason: GyReason::Resolved,
        }))
    }
}

// === Cinder Requiem ===

pub struct RequiemRelease;

impl CardEffect for RequiemRelease {
    fn id(&self) -> &'static str {
        "release"
    }

    fn locations(&self) -> &'static [Zone] {
        FIELD_MONSTERS
    }

    fn choices(&self, _: &EffectRegistry, state: &GameState, source: CardLoc) -> Vec<EffectParams> {
        if free_after(state, Zone::MainMonster, &[source]) == 0 {
            return Vec::new();
        }
        let low: Vec<CardLoc> = cinder_monsters(state, &[Zone::Deck])
            .into_iter()
            .filter(|&loc| state.card_at(loc).is_some_and(|c| c.meta.level <= 4))
            .collect();
        one_target_each(low)
    }

    fn resolve(
        &self,
        _: &EffectRegistry,
        state: &GameState,
        source: CardLoc,
        params: &EffectParams,
    ) -> Result<Effect, ActionError> {
        let me = source_card(state, source)?.uid;
        let target = target_card(state, params, 0)?.uid;
        Ok(Effect::cost_to_gy(me).then(Effect::special_summon(target)))
    }
}

pub struct RequiemEquip;

impl CardEffect for RequiemEquip {
    fn id(&self) -> &'static str {
        "equip"
    }

    fn locations(&self) -> &'static [Zone] {
        &[Zone::Gy]
    }

    fn choices(&self, _: &EffectRegistry, state: &GameState, _: CardLoc) -> Vec<EffectParams> {
        if state.field.first_empty(Zone::SpellTrap).is_none() {
            return Vec::new();
        }
        let filter = CardFilter::any()
            .archetype(ARCHETYPE)
            .category(SummonCategory::Fusion);
        let targets: Vec<CardLoc> = find(state, FIELD_MONSTERS, &filter)
            .into_iter()
            .filter(|&loc| state.card_at(loc).is_some_and(|c| !c.face_down))
            .collect();
        one_target_each(targets)
    }

    fn resolve(
        &self,
        _: &EffectRegistry,
        state: &GameState,
        source: CardLoc,
        params: &EffectParams,
    ) -> Result<Effect, ActionError> {
        Ok(Effect::Equip {
            card: source_card(state, source)?.uid,
            target: target_card(state, params, 0)?.uid,
        })
    }
}

// === Cinder Sovereign ===

pub struct SovereignReclaim;

impl CardEffect for SovereignReclaim {
    fn id(&self) -> &'static str {
        "reclaim"
    }

    fn locations(&self) -> &'static [Zone] {
        FIELD_MONSTERS
    }

    fn choices(&self, _: &EffectRegistry, state: &GameState, source: CardLoc) -> Vec<EffectParams> {
        if !state.card_at(source).is_some_and(|c| c.properly_summoned) {
            return Vec::new();
        }
        one_target_each(cinder_monsters(state, &[Zone::Gy]))
    }

    fn resolve(
        &self,
        _: &EffectRegistry,
        state: &GameState,
        _: CardLoc,
        params: &EffectParams,
    ) -> Result<Effect, ActionError> {
        Ok(Effect::add_to_hand(target_card(state, params, 0)?.uid))
    }
}
