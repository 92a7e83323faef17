//! Duel configuration types.
//!
//! - `Zone`: every location a card can occupy
//! - `Phase`: the part of the turn the combo player is in
//! - `FieldCapacity`: how many slots each fixed-capacity field zone has
//!
//! Pile zones (deck, hand, graveyard, banished, extra deck) are unbounded
//! ordered sequences. Field zones are slot arrays whose length is fixed by
//! `FieldCapacity`; placing into a full zone is illegal.

use serde::{Deserialize, Serialize};

/// Card location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Deck,
    Hand,
    Gy,
    Banished,
    Extra,
    MainMonster,
    SpellTrap,
    FieldSpell,
    ExtraMonster,
}

impl Zone {
    /// Every zone, in canonical enumeration order.
    pub const ALL: [Zone; 9] = [
        Zone::Hand,
        Zone::MainMonster,
        Zone::ExtraMonster,
        Zone::SpellTrap,
        Zone::FieldSpell,
        Zone::Gy,
        Zone::Banished,
        Zone::Deck,
        Zone::Extra,
    ];

    /// Pile zones (ordered sequences without capacity).
    pub const PILES: [Zone; 5] = [Zone::Deck, Zone::Hand, Zone::Gy, Zone::Banished, Zone::Extra];

    /// Field slot zones.
    pub const FIELD: [Zone; 4] = [
        Zone::MainMonster,
        Zone::ExtraMonster,
        Zone::SpellTrap,
        Zone::FieldSpell,
    ];

    /// Monster slot zones.
    pub const MONSTERS: [Zone; 2] = [Zone::MainMonster, Zone::ExtraMonster];

    /// True for the fixed-capacity field zones.
    #[must_use]
    pub fn is_field(self) -> bool {
        matches!(
            self,
            Zone::MainMonster | Zone::SpellTrap | Zone::FieldSpell | Zone::ExtraMonster
        )
    }

    /// True for the two monster slot groups.
    #[must_use]
    pub fn is_monster_zone(self) -> bool {
        matches!(self, Zone::MainMonster | Zone::ExtraMonster)
    }

    /// Short label used in reports and sort keys.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Zone::Deck => "deck",
            Zone::Hand => "hand",
            Zone::Gy => "gy",
            Zone::Banished => "banished",
            Zone::Extra => "extra",
            Zone::MainMonster => "mz",
            Zone::SpellTrap => "stz",
            Zone::FieldSpell => "fz",
            Zone::ExtraMonster => "emz",
        }
    }

    /// Stable small integer used in sort keys and hashing.
    #[must_use]
    pub fn ordinal(self) -> u8 {
        match self {
            Zone::Hand => 0,
            Zone::MainMonster => 1,
            Zone::ExtraMonster => 2,
            Zone::SpellTrap => 3,
            Zone::FieldSpell => 4,
            Zone::Gy => 5,
            Zone::Banished => 6,
            Zone::Deck => 7,
            Zone::Extra => 8,
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Turn phase.
///
/// The search only acts in `Main`. Passing moves the state to `End`,
/// which is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Draw,
    Standby,
    #[default]
    Main,
    Battle,
    End,
}

/// Slot counts for the fixed-capacity field zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldCapacity {
    pub main_monsters: usize,
    pub spell_traps: usize,
    pub extra_monsters: usize,
}

impl Default for FieldCapacity {
    fn default() -> Self {
        Self {
            main_monsters: 5,
            spell_traps: 5,
            extra_monsters: 2,
        }
    }
}

impl FieldCapacity {
    /// Slot count for a field zone. Pile zones return `None`.
    #[must_use]
    pub fn of(&self, zone: Zone) -> Option<usize> {
        match zone {
            Zone::MainMonster => Some(self.main_monsters),
            Zone::SpellTrap => Some(self.spell_traps),
            Zone::FieldSpell => Some(1),
            Zone::ExtraMonster => Some(self.extra_monsters),
            _ => None,
        }
    }

    /// Builder: main monster zone count.
    #[must_use]
    pub fn with_main_monsters(mut self, n: usize) -> Self {
        self.main_monsters = n;
        self
    }

    /// Builder: extra monster zone count.
    #[must_use]
    pub fn with_extra_monsters(mut self, n: usize) -> Self {
        self.extra_monsters = n;
        self
    }

    /// Builder: spell/trap zone count.
    #[must_use]
    pub fn with_spell_traps(mut self, n: usize) -> Self {
        self.spell_traps = n;
        self
    }
}
