//! Game rules: core legality and summoning procedures.
//!
//! - `engine`: normal summon, set, extra deck summons, pass, and the
//!   `RulesEngine` seam the search drives
//! - `materials`: material requirements per extra deck monster
//!
//! Card effects live in `effects`; this module only knows the mechanics
//! every card shares.

pub mod engine;
pub mod materials;

pub use engine::{
    apply_core, check_restrictions, enumerate_core, extra_deck_summon, free_after, RulesEngine,
};
pub use materials::{link_contribution, MaterialSpec, SummonProcedure};
