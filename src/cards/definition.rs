//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a card type: its
//! name and the metadata the resolver vouches for. For example
//! "Cinder Requiem" is a LIGHT Fiend Link-1 monster - these are part of
//! the definition.
//!
//! Instance-specific data (summon flags, equip links, location) is stored
//! separately in `CardInstance`.

use serde::{Deserialize, Serialize};

use super::attributes::{Attribute, CardKind, Race, SummonCategory};

/// Unique identifier for a card definition (the CID).
///
/// This identifies the "type" of card (e.g., "Cinder Acolyte"),
/// not a specific copy in a duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Static metadata for one card identifier.
///
/// `from_extra` is always derived from `category`; use the constructors
/// rather than building the struct by hand so the two never disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardMeta {
    pub kind: CardKind,
    pub attribute: Attribute,
    pub race: Race,
    pub category: SummonCategory,
    /// Level, or rank for xyz monsters. Zero for links and non-monsters.
    #[serde(default)]
    pub level: u8,
    /// Link rating, present only for link monsters.
    #[serde(default)]
    pub link_rating: Option<u8>,
    #[serde(default)]
    pub tuner: bool,
    #[serde(default)]
    pub from_extra: bool,
}

impl CardMeta {
    /// Main-deck monster.
    #[must_use]
    pub fn monster(attribute: Attribute, race: Race, level: u8) -> Self {
        Self {
            kind: CardKind::Monster,
            attribute,
            race,
            category: SummonCategory::Normal,
            level,
            link_rating: None,
            tuner: false,
            from_extra: false,
        }
    }

    /// Extra-deck monster of the given category.
    ///
    /// For link monsters `level` is ignored and `link_rating` is set
    /// from `rating`.
    #[must_use]
    pub fn extra(
        category: SummonCategory,
        attribute: Attribute,
        race: Race,
        rating: u8,
    ) -> Self {
        let (level, link_rating) = match category {
            SummonCategory::Link => (0, Some(rating)),
            _ => (rating, None),
        };
        Self {
            kind: CardKind::Monster,
            attribute,
            race,
            category,
            level,
            link_rating,
            tuner: false,
            from_extra: category.requires_extra_deck(),
        }
    }

    /// Non-monster card (spell, field spell, trap) or placeholder.
    #[must_use]
    pub fn non_monster(kind: CardKind) -> Self {
        Self {
            kind,
            attribute: Attribute::None,
            race: Race::None,
            category: SummonCategory::Normal,
            level: 0,
            link_rating: None,
            tuner: false,
            from_extra: false,
        }
    }

    /// Inert filler metadata.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::non_monster(CardKind::Placeholder)
    }

    /// Mark as a tuner (builder pattern).
    #[must_use]
    pub fn with_tuner(mut self) -> Self {
        self.tuner = true;
        self
    }

    #[must_use]
    pub fn is_monster(&self) -> bool {
        self.kind == CardKind::Monster
    }

    #[must_use]
    pub fn is_link(&self) -> bool {
        self.category == SummonCategory::Link
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.kind == CardKind::Placeholder
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use combo_search::cards::{Attribute, CardDefinition, CardId, CardMeta, Race};
///
/// let zealot = CardDefinition::new(
///     CardId::new(1100),
///     "Cinder Zealot",
///     CardMeta::monster(Attribute::Light, Race::Fiend, 4),
/// );
///
/// assert_eq!(zealot.meta.level, 4);
/// assert!(!zealot.meta.from_extra);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this card definition.
    pub id: CardId,

    /// Card name (display and bucket matching).
    pub name: String,

    /// Resolved static metadata.
    pub meta: CardMeta,
}

impl CardDefinition {
    /// Create a new card definition.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, meta: CardMeta) -> Self {
        Self {
            id,
            name: name.into(),
            meta,
        }
    }
}
