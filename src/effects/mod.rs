//! Effect system for card activations.
//!
//! - `Effect`: atomic steps (move, summon, equip, restrict) addressed by instance id
//! - `CardEffect`: one activatable effect of one card (choices + resolution)
//! - `EffectAction` / `EffectParams`: a concrete activation with its choices
//! - `EffectRegistry`: card id -> handlers and summoning procedures; enumerates and applies
//! - `EffectResolver`: executes atoms on a state
//! - `targeting`: filters and subset helpers for computing choices
//!
//! ## Design Philosophy
//!
//! Handlers are pure functions of the state. They report choices and
//! describe their resolution as data; only the resolver mutates, and only
//! on a clone owned by the registry.

mod effect;
mod handler;
mod registry;
mod resolver;
pub mod targeting;

pub use effect::Effect;
pub use handler::{CardEffect, EffectAction, EffectParams};
pub use registry::EffectRegistry;
pub use resolver::EffectResolver;
pub use targeting::CardFilter;
