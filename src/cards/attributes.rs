//! Static card attributes resolved from the card database.
//!
//! These are the values the metadata resolver hands back for every card
//! identifier. They are authoritative: nothing in the engine guesses them.
//!
//! ## Types
//!
//! - `Attribute`: LIGHT, DARK, FIRE, ...
//! - `Race`: monster type (Fiend, Dragon, ...)
//! - `CardKind`: monster, spell, field spell, trap, or inert placeholder
//! - `SummonCategory`: normal (main deck) or one of the extra-deck categories

use serde::{Deserialize, Serialize};

/// Monster attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Light,
    Dark,
    Fire,
    Water,
    Earth,
    Wind,
    Divine,
    /// Spells, traps and placeholders have no attribute.
    None,
}

/// Monster type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Fiend,
    Fairy,
    Dragon,
    Spellcaster,
    Warrior,
    Machine,
    Beast,
    Zombie,
    Cyberse,
    Aqua,
    Pyro,
    Wyrm,
    /// Spells, traps and placeholders have no race.
    None,
}

/// Broad card kind. Decides which zones a card may occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Monster,
    Spell,
    FieldSpell,
    Trap,
    /// Explicitly inert filler. Occupies a pile zone and never acts.
    Placeholder,
}

impl CardKind {
    /// Spells and traps that occupy a spell/trap slot when set.
    #[must_use]
    pub fn is_spell_trap(self) -> bool {
        matches!(self, CardKind::Spell | CardKind::Trap)
    }
}

/// How a monster is summoned.
///
/// `Normal` covers every main-deck monster. The other variants live in
/// the extra deck and need a summoning procedure with materials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummonCategory {
    #[default]
    Normal,
    Fusion,
    Synchro,
    Xyz,
    Link,
}

impl SummonCategory {
    /// True iff monsters of this category start in the extra deck.
    #[must_use]
    pub fn requires_extra_deck(self) -> bool {
        !matches!(self, SummonCategory::Normal)
    }

    /// Lowercase label used in logs and action descriptions.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SummonCategory::Normal => "normal",
            SummonCategory::Fusion => "fusion",
            SummonCategory::Synchro => "synchro",
            SummonCategory::Xyz => "xyz",
            SummonCategory::Link => "link",
        }
    }
}
