//! Effect registry: card id -> effect handlers and summoning procedures.
//!
//! The registry is built once at startup and then shared read-only by
//! every search branch (and every worker thread). It is an explicit value,
//! so tests and parallel workers can hold independent registries.
//!
//! ## Enumeration
//!
//! `enumerate` walks every card in canonical zone order, asks each of its
//! effects for choices, and returns the resulting actions sorted by
//! `sort_key`. The order never depends on hash map iteration.
//!
//! ## Application
//!
//! `apply` re-validates an action against the state it is applied to,
//! then resolves it on a clone. A failure never leaves a partially
//! modified state behind.

use log::trace;
use rustc_hash::FxHashMap;

use super::handler::{CardEffect, EffectAction};
use super::resolver::EffectResolver;
use crate::cards::{CardId, CardInstance};
use crate::core::error::{ActionError, Illegal, ModelError};
use crate::core::event::DuelEvent;
use crate::core::state::{GameState, OptKey};
use crate::rules::SummonProcedure;
use crate::zones::CardLoc;

/// Registry of card effects and summoning procedures.
#[derive(Default)]
pub struct EffectRegistry {
    effects: FxHashMap<CardId, Vec<Box<dyn CardEffect>>>,
    procedures: FxHashMap<CardId, SummonProcedure>,
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("cards", &self.effects.len())
            .field("procedures", &self.procedures.len())
            .finish()
    }
}

impl EffectRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect for a card.
    ///
    /// Effects of one card are tried in registration order.
    pub fn register(&mut self, card: CardId, effect: impl CardEffect + 'static) {
        self.effects.entry(card).or_default().push(Box::new(effect));
    }

    /// Register a card that has no activatable effects.
    pub fn register_vanilla(&mut self, card: CardId) {
        self.effects.entry(card).or_default();
    }

    /// Register how an extra deck card is summoned.
    ///
    /// The card is also known to the registry afterwards.
    pub fn register_procedure(&mut self, procedure: SummonProcedure) {
        self.effects.entry(procedure.card).or_default();
        self.procedures.insert(procedure.card, procedure);
    }

    /// Summoning procedure for an extra deck card.
    #[must_use]
    pub fn procedure(&self, card: CardId) -> Option<&SummonProcedure> {
        self.procedures.get(&card)
    }

    /// Check if a card is known.
    #[must_use]
    pub fn contains(&self, card: CardId) -> bool {
        self.effects.contains_key(&card)
    }

    /// Number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Handlers for a card. Placeholders have none; other unknown cards
    /// are a model error.
    pub fn effects_for(&self, card: &CardInstance) -> Result<&[Box<dyn CardEffect>], ModelError> {
        match self.effects.get(&card.cid) {
            Some(list) => Ok(list.as_slice()),
            None if card.meta.is_placeholder() => Ok(&[]),
            None => Err(ModelError::UnregisteredCard(card.cid)),
        }
    }

    /// Every card in `state` must be known to the registry.
    pub fn validate(&self, state: &GameState) -> Result<(), ModelError> {
        for (_, card) in state.all_cards() {
            self.effects_for(card)?;
        }
        Ok(())
    }

    // === Enumeration ===

    /// Every legal effect activation, sorted by `sort_key`.
    pub fn enumerate(&self, state: &GameState) -> Result<Vec<EffectAction>, ModelError> {
        let mut actions = Vec::new();
        if !state.is_main_phase() {
            return Ok(actions);
        }

        for (loc, card) in state.all_cards() {
            for effect in self.effects_for(card)? {
                if !self.available(state, card, loc, effect.as_ref()) {
                    continue;
                }
                for params in effect.choices(self, state, loc) {
                    actions.push(EffectAction::new(
                        card.cid,
                        card.name.clone(),
                        loc,
                        effect.id(),
                        params,
                    ));
                }
            }
        }

        actions.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
        Ok(actions)
    }

    /// Location and usage checks shared by every effect.
    fn available(
        &self,
        state: &GameState,
        card: &CardInstance,
        loc: CardLoc,
        effect: &dyn CardEffect,
    ) -> bool {
        if !effect.locations().contains(&loc.zone) {
            return false;
        }
        // Face-down cards on the field only activate as set spells/traps
        if loc.zone.is_monster_zone() && card.face_down {
            return false;
        }
        match effect.once() {
            Some(scope) => !state.is_opt_used(&OptKey::new(card.cid, effect.id(), scope)),
            None => true,
        }
    }

    // === Application ===

    /// Apply an effect action to a clone of `state`.
    pub fn apply(&self, state: &GameState, action: &EffectAction) -> Result<GameState, ActionError> {
        if !state.is_main_phase() {
            return Err(Illegal::WrongPhase.into());
        }

        let card = state.card_at(action.source).ok_or(Illegal::NotInZone {
            zone: action.source.zone,
            index: action.source.index,
        })?;
        if card.cid != action.card {
            return Err(Illegal::StaleAction.into());
        }

        let effect = self
            .effects_for(card)?
            .iter()
            .find(|e| e.id() == action.effect)
            .ok_or_else(|| ModelError::UnknownEffect {
                card: action.card,
                effect: action.effect.clone(),
            })?;

        if let Some(scope) = effect.once() {
            let key = OptKey::new(card.cid, effect.id(), scope);
            if state.is_opt_used(&key) {
                return Err(Illegal::OnceUsed {
                    card: card.cid,
                    effect: action.effect.clone(),
                }
                .into());
            }
        }
        if !self.available(state, card, action.source, effect.as_ref()) {
            return Err(Illegal::StaleAction.into());
        }
        if !effect
            .choices(self, state, action.source)
            .contains(&action.params)
        {
            trace!("stale choice for {}", action);
            return Err(Illegal::StaleAction.into());
        }

        let steps = effect.resolve(self, state, action.source, &action.params)?;

        let mut next = state.clone();
        next.begin_action();
        next.push_event(DuelEvent::Activated {
            card: action.card,
            effect: action.effect.clone(),
        });
        if let Some(scope) = effect.once() {
            next.mark_opt(OptKey::new(action.card, effect.id(), scope));
        }
        EffectResolver::apply(self, &mut next, &steps)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Attribute, CardMeta, Provenance, Race, ResolvedCard};
    use crate::core::state::OptScope;
    use crate::core::Zone;
    use crate::effects::{Effect, EffectParams};

    /// Discard this card to add the first deck card to hand.
    struct DiscardDraw;

    impl CardEffect for DiscardDraw {
        fn id(&self) -> &'static str {
            "discard_draw"
        }

        fn locations(&self) -> &'static [Zone] {
            &[Zone::Hand]
        }

        fn choices(&self, _: &EffectRegistry, state: &GameState, _: CardLoc) -> Vec<EffectParams> {
            if state.deck.is_empty() {
                return Vec::new();
            }
            vec![EffectParams::target(CardLoc::new(Zone::Deck, 0))]
        }

        fn resolve(
            &self,
            _: &EffectRegistry,
            state: &GameState,
            source: CardLoc,
            params: &EffectParams,
        ) -> Result<Effect, ActionError> {
            let me = state.card_at(source).ok_or(Illegal::StaleAction)?.uid;
            let target = state.card_at(params.targets[0]).ok_or(Illegal::StaleAction)?.uid;
            Ok(Effect::cost_to_gy(me).then(Effect::add_to_hand(target)))
        }
    }

    fn card(id: u32) -> ResolvedCard {
        ResolvedCard {
            cid: CardId::new(id),
            name: format!("Card {id}"),
            meta: CardMeta::monster(Attribute::Light, Race::Fiend, 4),
            provenance: Provenance::Direct,
        }
    }

    fn setup() -> (EffectRegistry, GameState) {
        let mut registry = EffectRegistry::new();
        registry.register(CardId::new(1), DiscardDraw);
        registry.register_vanilla(CardId::new(2));

        let mut state = GameState::default();
        state.spawn(Zone::Hand, &card(1)).unwrap();
        state.spawn(Zone::Deck, &card(2)).unwrap();
        (registry, state)
    }

    #[test]
    fn test_enumerate_and_apply() {
        let (registry, state) = setup();
        let actions = registry.enumerate(&state).unwrap();
        assert_eq!(actions.len(), 1);

        let next = registry.apply(&state, &actions[0]).unwrap();
        assert_eq!(next.gy.len(), 1);
        assert_eq!(next.hand[0].cid, CardId::new(2));
        assert!(next.is_opt_used(&OptKey::new(CardId::new(1), "discard_draw", OptScope::Turn)));

        // Original untouched
        assert_eq!(state.hand[0].cid, CardId::new(1));
        assert!(state.opt_used.is_empty());
    }

    #[test]
    fn test_opt_blocks_second_use() {
        let (registry, mut state) = setup();
        state.mark_opt(OptKey::new(CardId::new(1), "discard_draw", OptScope::Turn));

        assert!(registry.enumerate(&state).unwrap().is_empty());

        let action = EffectAction::new(
            CardId::new(1),
            "Card 1",
            CardLoc::new(Zone::Hand, 0),
            "discard_draw",
            EffectParams::target(CardLoc::new(Zone::Deck, 0)),
        );
        let err = registry.apply(&state, &action).unwrap_err();
        assert!(matches!(err, ActionError::Illegal(Illegal::OnceUsed { .. })));
    }

    #[test]
    fn test_stale_action_rejected() {
        let (registry, state) = setup();
        let action = registry.enumerate(&state).unwrap().remove(0);

        let mut moved = state.clone();
        let uid = moved.hand[0].uid;
        moved
            .send_to_gy(uid, crate::core::event::GyReason::Cost)
            .unwrap();

        let err = registry.apply(&moved, &action).unwrap_err();
        assert!(err.is_illegal());
    }

    #[test]
    fn test_unregistered_card_is_model_error() {
        let (registry, mut state) = setup();
        state.spawn(Zone::Hand, &card(99)).unwrap();

        assert_eq!(
            registry.enumerate(&state).unwrap_err(),
            ModelError::UnregisteredCard(CardId::new(99))
        );
    }

    #[test]
    fn test_unknown_effect_is_model_error() {
        let (registry, state) = setup();
        let action = EffectAction::new(
            CardId::new(1),
            "Card 1",
            CardLoc::new(Zone::Hand, 0),
            "no_such_effect",
            EffectParams::none(),
        );
        let err = registry.apply(&state, &action).unwrap_err();
        assert!(matches!(err, ActionError::Model(ModelError::UnknownEffect { .. })));
    }

    #[test]
    fn test_placeholders_need_no_registration() {
        let (registry, mut state) = setup();
        state
            .spawn(
                Zone::Hand,
                &ResolvedCard {
                    cid: CardId::new(900_001),
                    name: "Placeholder".into(),
                    meta: CardMeta::placeholder(),
                    provenance: Provenance::Inert,
                },
            )
            .unwrap();
        assert!(registry.validate(&state).is_ok());
        assert_eq!(registry.enumerate(&state).unwrap().len(), 1);
    }
}
