//! Metadata resolution and the card database.
//!
//! `MetadataResolver` is the contract the state model trusts for static
//! card data. `CardDatabase` is the in-process implementation: card
//! definitions keyed by `CardId`, alias ids that point at a canonical
//! definition, and a reserved range of inert placeholder ids.
//!
//! Resolution fails closed. An id that is neither defined, aliased, nor
//! inside the placeholder range is a `ModelError::UnknownCard`.

use std::ops::RangeInclusive;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::definition::{CardDefinition, CardId, CardMeta};
use crate::core::error::ModelError;

/// Ids in this range resolve to inert placeholders when not defined.
pub const INERT_RANGE: RangeInclusive<u32> = 900_000..=999_999;

/// How an id was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Direct,
    /// Resolved through an alternate id.
    Alias { requested: CardId },
    /// Placeholder id with no behaviour.
    Inert,
}

/// Output of a successful resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCard {
    /// Canonical id (differs from the requested id for aliases).
    pub cid: CardId,
    pub name: String,
    pub meta: CardMeta,
    pub provenance: Provenance,
}

/// Source of authoritative card metadata.
pub trait MetadataResolver: Send + Sync {
    /// Resolve a card id, or fail with `ModelError::UnknownCard`.
    fn resolve(&self, id: CardId) -> Result<ResolvedCard, ModelError>;
}

/// True iff `id` lies in the reserved placeholder range.
#[must_use]
pub fn is_inert_id(id: CardId) -> bool {
    INERT_RANGE.contains(&id.raw())
}

/// JSON layout accepted by `CardDatabase::from_json`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CardDatabaseDoc {
    #[serde(default)]
    pub cards: Vec<CardDefinition>,
    /// Alternate id -> canonical id.
    #[serde(default)]
    pub aliases: Vec<(CardId, CardId)>,
}

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use combo_search::cards::{
///     Attribute, CardDatabase, CardDefinition, CardId, CardMeta, MetadataResolver, Provenance, Race,
/// };
///
/// let mut db = CardDatabase::new();
/// db.register(CardDefinition::new(
///     CardId::new(1),
///     "Cinder Zealot",
///     CardMeta::monster(Attribute::Light, Race::Fiend, 4),
/// ))
/// .unwrap();
/// db.add_alias(CardId::new(10), CardId::new(1)).unwrap();
///
/// let card = db.resolve(CardId::new(10)).unwrap();
/// assert_eq!(card.cid, CardId::new(1));
/// assert_eq!(card.provenance, Provenance::Alias { requested: CardId::new(10) });
///
/// assert!(db.resolve(CardId::new(2)).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardDatabase {
    cards: FxHashMap<CardId, CardDefinition>,
    aliases: FxHashMap<CardId, CardId>,
}

impl CardDatabase {
    /// Create a new empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load definitions and aliases from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let doc: CardDatabaseDoc = serde_json::from_str(json)
            .map_err(|e| ModelError::MalformedSnapshot(format!("card database: {e}")))?;
        let mut db = Self::new();
        db.extend(doc)?;
        Ok(db)
    }

    /// Merge a document into this database.
    pub fn extend(&mut self, doc: CardDatabaseDoc) -> Result<(), ModelError> {
        for card in doc.cards {
            self.register(card)?;
        }
        for (alias, canonical) in doc.aliases {
            self.add_alias(alias, canonical)?;
        }
        Ok(())
    }

    /// Register a card definition.
    ///
    /// `from_extra` is recomputed from the summon category so a hand-written
    /// definition cannot contradict itself.
    pub fn register(&mut self, mut card: CardDefinition) -> Result<(), ModelError> {
        if self.cards.contains_key(&card.id) || self.aliases.contains_key(&card.id) {
            return Err(ModelError::DuplicateCard(card.id));
        }
        card.meta.from_extra = card.meta.category.requires_extra_deck();
        self.cards.insert(card.id, card);
        Ok(())
    }

    /// Register `alias` as another id for `canonical`.
    pub fn add_alias(&mut self, alias: CardId, canonical: CardId) -> Result<(), ModelError> {
        if !self.cards.contains_key(&canonical) {
            return Err(ModelError::UnknownCard(canonical));
        }
        if self.cards.contains_key(&alias) || self.aliases.contains_key(&alias) {
            return Err(ModelError::DuplicateCard(alias));
        }
        self.aliases.insert(alias, canonical);
        Ok(())
    }

    /// Get a card definition by canonical ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    /// Check if a card ID (canonical or alias) is known.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id) || self.aliases.contains_key(&id)
    }

    /// Get the number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the database is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all card definitions.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }

    /// Find a definition by exact display name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&CardDefinition> {
        let mut hits: Vec<&CardDefinition> =
            self.cards.values().filter(|c| c.name == name).collect();
        hits.sort_by_key(|c| c.id);
        hits.first().copied()
    }
}

impl MetadataResolver for CardDatabase {
    fn resolve(&self, id: CardId) -> Result<ResolvedCard, ModelError> {
        let (canonical, provenance) = match self.aliases.get(&id) {
            Some(&canonical) => (canonical, Provenance::Alias { requested: id }),
            None => (id, Provenance::Direct),
        };

        if let Some(def) = self.cards.get(&canonical) {
            return Ok(ResolvedCard {
                cid: def.id,
                name: def.name.clone(),
                meta: def.meta,
                provenance,
            });
        }

        if is_inert_id(id) {
            return Ok(ResolvedCard {
                cid: id,
                name: format!("Placeholder {}", id.raw()),
                meta: CardMeta::placeholder(),
                provenance: Provenance::Inert,
            });
        }

        Err(ModelError::UnknownCard(id))
    }
}
