//! Card instances - runtime card state.
//!
//! `CardInstance` represents one physical card in a duel. It carries the
//! resolved metadata (copied once from the resolver and never recomputed)
//! and the few flags that affect future legality:
//!
//! - `properly_summoned`: reached the field through its own summoning
//!   procedure, not through a generic special summon
//! - `face_down`: set spell/trap
//! - `equipped_to`: non-owning link to the monster this card equips
//!
//! Every flag is cleared when the card leaves the field.

use serde::{Deserialize, Serialize};

use super::definition::{CardId, CardMeta};
use super::registry::ResolvedCard;
use crate::core::entity::InstanceId;

/// A card instance in a duel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique id for this occurrence. Not hashed.
    pub uid: InstanceId,

    /// Reference to the card definition (canonical id, aliases resolved).
    pub cid: CardId,

    /// Display name.
    pub name: String,

    /// Resolved static metadata.
    pub meta: CardMeta,

    pub properly_summoned: bool,

    pub face_down: bool,

    pub equipped_to: Option<InstanceId>,
}

impl CardInstance {
    /// Create an instance from resolved metadata.
    #[must_use]
    pub fn new(uid: InstanceId, resolved: &ResolvedCard) -> Self {
        Self {
            uid,
            cid: resolved.cid,
            name: resolved.name.clone(),
            meta: resolved.meta,
            properly_summoned: false,
            face_down: false,
            equipped_to: None,
        }
    }

    /// Link rating, zero for non-link cards.
    #[must_use]
    pub fn link_rating(&self) -> u8 {
        self.meta.link_rating.unwrap_or(0)
    }

    /// Clear every on-field flag.
    pub fn reset_on_leave(&mut self) {
        self.properly_summoned = false;
        self.face_down = false;
        self.equipped_to = None;
    }

    /// Mark as properly summoned (builder pattern, used by fixtures).
    #[must_use]
    pub fn with_properly_summoned(mut self, value: bool) -> Self {
        self.properly_summoned = value;
        self
    }
}
