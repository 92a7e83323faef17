//! Zones: field slot arrays and card movement.
//!
//! ## Key Types
//!
//! - `Zone`: Card location (from `core::config`)
//! - `CardLoc`: Zone plus pile/slot index
//! - `FieldZones`: Fixed-capacity field slots
//!
//! Movement primitives are methods on `GameState` defined in `manager`.

pub mod manager;

pub use manager::{CardLoc, FieldZones, Slot};

// Re-export zone types from core for convenience
pub use crate::core::config::{FieldCapacity, Zone};
