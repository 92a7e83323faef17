//! Effect resolution - executing effect atoms on a state.
//!
//! `EffectResolver::apply` walks a (possibly nested) `Effect` and calls
//! the zone primitives on `GameState`, or the extra deck summon rule for
//! procedure summons. It mutates in place: callers always hand it a clone
//! they are prepared to discard on error.

use crate::core::error::ActionError;
use crate::core::event::DuelEvent;
use crate::core::state::GameState;
use crate::rules;

use super::effect::Effect;
use super::registry::EffectRegistry;

/// Resolves effects on game state.
pub struct EffectResolver;

impl EffectResolver {
    /// Execute every step of `effect` in order, stopping at the first error.
    pub fn apply(
        registry: &EffectRegistry,
        state: &mut GameState,
        effect: &Effect,
    ) -> Result<(), ActionError> {
        match effect {
            Effect::Batch(steps) => {
                for step in steps {
                    Self::apply(registry, state, step)?;
                }
            }

            Effect::SendToGy { card, reason } => state.send_to_gy(*card, *reason)?,

            Effect::Banish { card } => state.banish(*card)?,

            Effect::AddToHand { card } => state.add_to_hand(*card)?,

            Effect::SpecialSummon { card, zone } => {
                let category = state
                    .instance(*card)
                    .map(|c| c.meta.category)
                    .unwrap_or_default();
                state.special_summon(*card, *zone, false, category)?;
            }

            Effect::ProcedureSummon {
                card,
                materials,
                zone,
            } => {
                rules::extra_deck_summon(registry, state, *card, materials, *zone)?;
            }

            Effect::Equip { card, target } => {
                state.equip(*card, *target)?;
            }

            Effect::ActivateFieldSpell { card } => {
                state.activate_field_spell(*card)?;
            }

            Effect::Restrict(restriction) => state.add_restriction(restriction.clone()),

            Effect::Mark { name } => state.push_event(DuelEvent::Marker { name: name.clone() }),
        }
        Ok(())
    }
}
