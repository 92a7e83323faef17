//! Error types.
//!
//! Two kinds of failure, kept apart in the type system:
//!
//! - `Illegal`: an attempted action breaks a rule (full zone, spent
//!   normal summon, used OPT, missing target). Expected and recoverable:
//!   the search simply drops the branch.
//! - `ModelError`: the state or action references data the engine cannot
//!   resolve (unknown card, unregistered effect, malformed snapshot).
//!   Fatal to the operation that raised it.
//!
//! `ActionError` is the union returned by every apply path.

use thiserror::Error;

use super::config::Zone;
use crate::cards::CardId;

/// Legality violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Illegal {
    #[error("actions are only available in the main phase")]
    WrongPhase,
    #[error("no free slot in {0}")]
    ZoneFull(Zone),
    #[error("slot {index} of {zone} is occupied")]
    SlotOccupied { zone: Zone, index: usize },
    #[error("normal summon already used this turn")]
    NormalSummonUsed,
    #[error("{card} effect '{effect}' already used")]
    OnceUsed { card: CardId, effect: String },
    #[error("no card at {zone}[{index}]")]
    NotInZone { zone: Zone, index: usize },
    #[error("action no longer matches the state")]
    StaleAction,
    #[error("{0} cannot be summoned this way")]
    NotSummonable(CardId),
    #[error("{0} cannot be placed in that zone")]
    WrongCategory(CardId),
    #[error("materials provide {provided}, need {required}")]
    InsufficientMaterials { required: u32, provided: u32 },
    #[error("too many materials: {provided} supplied, at most {max}")]
    TooManyMaterials { max: u32, provided: u32 },
    #[error("invalid material {0}")]
    InvalidMaterial(CardId),
    #[error("blocked by restriction: {0}")]
    Restricted(String),
    #[error("no summoning procedure for {0}")]
    NoProcedure(CardId),
    #[error("action kind not in the allow-list")]
    ActionNotAllowed,
}

/// Unresolvable data. Never silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown card id {0}")]
    UnknownCard(CardId),
    #[error("card id {0} defined twice")]
    DuplicateCard(CardId),
    #[error("card {0} has no entry in the effect registry")]
    UnregisteredCard(CardId),
    #[error("card {card} has no effect '{effect}'")]
    UnknownEffect { card: CardId, effect: String },
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
    #[error("duplicate instance id {0}")]
    DuplicateInstance(u32),
}

/// Error returned when applying any action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("illegal action: {0}")]
    Illegal(#[from] Illegal),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ActionError {
    /// True for the recoverable kind.
    #[must_use]
    pub fn is_illegal(&self) -> bool {
        matches!(self, ActionError::Illegal(_))
    }
}
