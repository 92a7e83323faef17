//! Core engine types: ids, zones, state, actions, snapshots, errors, RNG.
//!
//! These are the building blocks every other module works with. The
//! state is a value: every action produces a new `GameState` and never
//! mutates the one it was applied to.

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod rng;
pub mod snapshot;
pub mod state;

pub use action::{Action, ActionKind, ActionRecord, CoreAction};
pub use config::{FieldCapacity, Phase, Zone};
pub use entity::{InstanceAllocator, InstanceId};
pub use error::{ActionError, Illegal, ModelError};
pub use event::{DuelEvent, GyReason, MovedToGy};
pub use rng::GameRng;
pub use snapshot::{CardEntry, CardRecord, FieldSnapshot, OptUsedEntry, Snapshot, ZonesSnapshot};
pub use state::{GameState, OptKey, OptScope, Restriction, TurnInfo};
