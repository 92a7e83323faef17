//! Card system: definitions, metadata, instances, and resolution.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions (the CID)
//! - `CardMeta`: Static attributes (attribute, race, category, level, link rating)
//! - `CardDefinition`: Name plus metadata
//! - `CardInstance`: One physical card in a duel, with its on-field flags
//! - `MetadataResolver`: Authoritative id -> metadata contract
//! - `CardDatabase`: In-process resolver with aliases and inert placeholders

pub mod attributes;
pub mod definition;
pub mod instance;
pub mod registry;

pub use attributes::{Attribute, CardKind, Race, SummonCategory};
pub use definition::{CardDefinition, CardId, CardMeta};
pub use instance::CardInstance;
pub use registry::{
    is_inert_id, CardDatabase, CardDatabaseDoc, MetadataResolver, Provenance, ResolvedCard,
    INERT_RANGE,
};
