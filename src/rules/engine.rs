//! Core legality layer.
//!
//! Enforces the mechanical actions every card interacts with regardless
//! of its text:
//!
//! - Normal summon: once per turn, from hand, main deck monsters only
//! - Set: spells and traps from hand into a spell/trap slot
//! - Special summon: empty slot required, no budget consumed
//!   (`GameState::special_summon`)
//! - Extra deck summon: fusion/synchro/xyz/link with material checks and
//!   zone placement rules (`extra_deck_summon`)
//!
//! `RulesEngine` is the seam the search drives: legal actions for a state
//! and the successor state for an action. `EffectRegistry` implements it
//! by combining the core actions here with its own effect actions.

use log::trace;
use smallvec::SmallVec;

use super::materials::SummonProcedure;
use crate::cards::{CardId, CardInstance, SummonCategory};
use crate::core::action::{Action, CoreAction};
use crate::core::config::Zone;
use crate::core::entity::InstanceId;
use crate::core::error::{ActionError, Illegal, ModelError};
use crate::core::event::GyReason;
use crate::core::state::{GameState, Restriction};
use crate::effects::targeting::combinations;
use crate::effects::EffectRegistry;
use crate::zones::CardLoc;

/// Largest material set tried when enumerating extra deck summons.
const MAX_MATERIALS: usize = 5;

/// Rules engine trait.
///
/// The search calls these methods for every expanded state.
///
/// ## Implementation Notes
///
/// - `legal_actions`: must be deterministic (same state, same order)
/// - `apply_action`: returns a new state and never mutates the input;
///   `Illegal` errors are expected, `Model` errors are fatal
pub trait RulesEngine {
    /// Every legal action in `state`.
    fn legal_actions(&self, state: &GameState) -> Result<Vec<Action>, ModelError>;

    /// Successor of `state` after `action`.
    fn apply_action(&self, state: &GameState, action: &Action) -> Result<GameState, ActionError>;

    /// True once no further actions will be taken.
    fn is_terminal(&self, state: &GameState) -> bool {
        !state.is_main_phase()
    }
}

impl RulesEngine for EffectRegistry {
    fn legal_actions(&self, state: &GameState) -> Result<Vec<Action>, ModelError> {
        let mut actions: Vec<Action> = enumerate_core(self, state)
            .into_iter()
            .map(Action::Core)
            .collect();
        actions.extend(self.enumerate(state)?.into_iter().map(Action::Effect));
        Ok(actions)
    }

    fn apply_action(&self, state: &GameState, action: &Action) -> Result<GameState, ActionError> {
        match action {
            Action::Core(core) => apply_core(self, state, core),
            Action::Effect(effect) => self.apply(state, effect),
        }
    }
}

// === Enumeration ===

/// Every legal core action, in a fixed order. `Pass` is always last.
#[must_use]
pub fn enumerate_core(registry: &EffectRegistry, state: &GameState) -> Vec<CoreAction> {
    let mut out = Vec::new();
    if !state.is_main_phase() {
        return out;
    }

    // Normal summon, one per distinct card
    if !state.turn.normal_summon_used && state.field.first_empty(Zone::MainMonster).is_some() {
        let mut seen = Vec::new();
        for (i, card) in state.hand.iter().enumerate() {
            if card.meta.is_monster() && !card.meta.from_extra && !seen.contains(&card.cid) {
                seen.push(card.cid);
                out.push(CoreAction::NormalSummon {
                    hand: i,
                    card: card.cid,
                });
            }
        }
    }

    // Set spells and traps
    if state.field.first_empty(Zone::SpellTrap).is_some() {
        let mut seen = Vec::new();
        for (i, card) in state.hand.iter().enumerate() {
            if card.meta.kind.is_spell_trap() && !seen.contains(&card.cid) {
                seen.push(card.cid);
                out.push(CoreAction::Set {
                    hand: i,
                    card: card.cid,
                });
            }
        }
    }

    // Link, synchro and xyz summons from field materials
    let field: Vec<(CardLoc, &CardInstance)> = state
        .field
        .monsters()
        .filter(|(_, c)| !c.face_down)
        .collect();
    let mut seen = Vec::new();
    for (extra_idx, card) in state.extra.iter().enumerate() {
        if seen.contains(&card.cid) {
            continue;
        }
        seen.push(card.cid);

        let Some(procedure) = registry.procedure(card.cid) else {
            continue;
        };
        if procedure.category == SummonCategory::Fusion || procedure.category != card.meta.category
        {
            continue;
        }
        if check_restrictions(state, card).is_err() {
            continue;
        }

        let max = field.len().min(MAX_MATERIALS);
        for k in 1..=max {
            for subset in combinations(&field, k) {
                let mats: Vec<&CardInstance> = subset.iter().map(|(_, c)| *c).collect();
                if procedure.check(&card.meta, &mats).is_err() {
                    continue;
                }
                let locs: SmallVec<[CardLoc; 4]> = subset.iter().map(|(l, _)| *l).collect();
                if let Some(zone) = landing_zone(state, procedure, &locs) {
                    out.push(CoreAction::ExtraDeckSummon {
                        extra: extra_idx,
                        card: card.cid,
                        category: procedure.category,
                        materials: locs,
                        zone,
                    });
                }
            }
        }
    }

    out.push(CoreAction::Pass);
    out
}

/// Zone the summoned monster would occupy once `materials` left the field.
fn landing_zone(state: &GameState, procedure: &SummonProcedure, materials: &[CardLoc]) -> Option<Zone> {
    let candidates: &[Zone] = match procedure.category {
        SummonCategory::Link => &[Zone::ExtraMonster],
        _ => &[Zone::MainMonster, Zone::ExtraMonster],
    };
    candidates
        .iter()
        .copied()
        .find(|&zone| free_after(state, zone, materials) > 0)
}

/// Free slots in `zone` after the cards at `leaving` are removed.
#[must_use]
pub fn free_after(state: &GameState, zone: Zone, leaving: &[CardLoc]) -> usize {
    let empty = state
        .field
        .slots(zone)
        .iter()
        .filter(|s| s.is_none())
        .count();
    empty + leaving.iter().filter(|l| l.zone == zone).count()
}

// === Application ===

/// Apply a core action to a clone of `state`.
pub fn apply_core(
    registry: &EffectRegistry,
    state: &GameState,
    action: &CoreAction,
) -> Result<GameState, ActionError> {
    if !state.is_main_phase() {
        return Err(Illegal::WrongPhase.into());
    }

    match action {
        CoreAction::Pass => {
            let mut next = state.clone();
            next.begin_action();
            next.end_turn();
            Ok(next)
        }

        CoreAction::NormalSummon { hand, card } => {
            let inst = expect_card(state, CardLoc::new(Zone::Hand, *hand), *card)?;
            if state.turn.normal_summon_used {
                return Err(Illegal::NormalSummonUsed.into());
            }
            if !inst.meta.is_monster() || inst.meta.from_extra {
                return Err(Illegal::NotSummonable(inst.cid).into());
            }
            let uid = inst.uid;
            let mut next = state.clone();
            next.begin_action();
            next.special_summon(uid, Zone::MainMonster, true, SummonCategory::Normal)?;
            next.turn.normal_summon_used = true;
            Ok(next)
        }

        CoreAction::Set { hand, card } => {
            let inst = expect_card(state, CardLoc::new(Zone::Hand, *hand), *card)?;
            if !inst.meta.kind.is_spell_trap() {
                return Err(Illegal::WrongCategory(inst.cid).into());
            }
            let uid = inst.uid;
            let mut next = state.clone();
            next.begin_action();
            next.set_face_down(uid)?;
            Ok(next)
        }

        CoreAction::ExtraDeckSummon {
            extra,
            card,
            category,
            materials,
            zone,
        } => {
            let inst = expect_card(state, CardLoc::new(Zone::Extra, *extra), *card)?;
            if inst.meta.category != *category || *category == SummonCategory::Fusion {
                return Err(Illegal::StaleAction.into());
            }
            let mut uids: SmallVec<[InstanceId; 4]> = SmallVec::new();
            for &loc in materials {
                if !loc.zone.is_monster_zone() {
                    return Err(Illegal::InvalidMaterial(inst.cid).into());
                }
                let m = state.card_at(loc).ok_or(Illegal::NotInZone {
                    zone: loc.zone,
                    index: loc.index,
                })?;
                uids.push(m.uid);
            }
            let uid = inst.uid;
            let mut next = state.clone();
            next.begin_action();
            extra_deck_summon(registry, &mut next, uid, &uids, *zone)?;
            Ok(next)
        }
    }
}

fn expect_card(
    state: &GameState,
    loc: CardLoc,
    card: CardId,
) -> Result<&CardInstance, Illegal> {
    let inst = state.card_at(loc).ok_or(Illegal::NotInZone {
        zone: loc.zone,
        index: loc.index,
    })?;
    if inst.cid != card {
        return Err(Illegal::StaleAction);
    }
    Ok(inst)
}

/// Active restrictions that forbid summoning `card` from the extra deck.
pub fn check_restrictions(state: &GameState, card: &CardInstance) -> Result<(), Illegal> {
    for restriction in state.restrictions.iter() {
        if let Restriction::ExtraDeckOnly { race } = restriction {
            if card.meta.race != *race {
                return Err(Illegal::Restricted(restriction.to_string()));
            }
        }
    }
    Ok(())
}

/// Summon `card` from the extra deck using `materials`, in place.
///
/// Everything is validated before the first mutation: card location,
/// restrictions, procedure, material sufficiency, and that `zone` has a
/// free slot once the materials have left the field. Link monsters may
/// only be placed in an extra monster zone.
///
/// Materials from the hand or field go to the graveyard; materials taken
/// from the graveyard are banished. The summoned monster is marked
/// `properly_summoned`.
pub fn extra_deck_summon(
    registry: &EffectRegistry,
    state: &mut GameState,
    card: InstanceId,
    materials: &[InstanceId],
    zone: Zone,
) -> Result<CardLoc, ActionError> {
    let loc = state.locate(card).ok_or(Illegal::StaleAction)?;
    let inst = state.card_at(loc).ok_or(Illegal::StaleAction)?;
    if loc.zone != Zone::Extra {
        return Err(Illegal::NotInZone {
            zone: Zone::Extra,
            index: loc.index,
        }
        .into());
    }
    if !inst.meta.from_extra {
        return Err(Illegal::NotSummonable(inst.cid).into());
    }
    check_restrictions(state, inst)?;
    let procedure = registry
        .procedure(inst.cid)
        .ok_or(Illegal::NoProcedure(inst.cid))?;

    let eligible = match procedure.category {
        SummonCategory::Link => zone == Zone::ExtraMonster,
        _ => zone.is_monster_zone(),
    };
    if !eligible {
        return Err(Illegal::WrongCategory(inst.cid).into());
    }

    let mut mat_locs: Vec<CardLoc> = Vec::with_capacity(materials.len());
    let mut mat_cards: Vec<&CardInstance> = Vec::with_capacity(materials.len());
    for &m in materials {
        let mloc = state.locate(m).ok_or(Illegal::StaleAction)?;
        let minst = state.card_at(mloc).ok_or(Illegal::StaleAction)?;
        let allowed = mloc.zone.is_monster_zone() || matches!(mloc.zone, Zone::Hand | Zone::Gy);
        if m == card || !allowed || mat_locs.contains(&mloc) {
            return Err(Illegal::InvalidMaterial(minst.cid).into());
        }
        mat_locs.push(mloc);
        mat_cards.push(minst);
    }
    procedure.check(&inst.meta, &mat_cards)?;

    if free_after(state, zone, &mat_locs) == 0 {
        return Err(Illegal::ZoneFull(zone).into());
    }

    let cid = inst.cid;
    let category = procedure.category;
    trace!("{} summon {} with {} materials", category.label(), cid, materials.len());

    for (&m, mloc) in materials.iter().zip(&mat_locs) {
        if mloc.zone == Zone::Gy {
            state.banish(m)?;
        } else {
            state.send_to_gy(m, GyReason::Material)?;
        }
    }
    Ok(state.special_summon(card, zone, true, category)?)
}
