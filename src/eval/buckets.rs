//! Endboard bucket definitions.
//!
//! A bucket is a named, tiered board piece. Buckets are supplied as an
//! ordered JSON list:
//!
//! ```json
//! [
//!   { "name": "Sovereign on board", "tier": "S", "type": "card",
//!     "card": "Cinder Sovereign", "zone": "field" },
//!   { "name": "Herald in GY", "tier": "B", "type": "condition",
//!     "condition": "Cinder Herald in gy" }
//! ]
//! ```
//!
//! ## Conditions
//!
//! - `<card> in <zone>`: the named card is in the zone
//! - `<card> equipped link >= <n>`: the named card is on the field and the
//!   link ratings of the cards equipped to it sum to at least `n`

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::normalize::normalize_name;
use crate::core::Zone;

/// Bucket definition errors.
#[derive(Debug, Error)]
pub enum BucketError {
    #[error("unrecognised condition: {0:?}")]
    UnknownCondition(String),

    #[error("unknown zone {0:?}")]
    UnknownZone(String),

    #[error("invalid bucket list: {0}")]
    Json(#[from] serde_json::Error),
}

/// Bucket tier. `S` ranks above `A` above `B`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    B,
}

/// Zone group a bucket can look at. `Field` covers every field zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardZone {
    Field,
    Hand,
    Gy,
    Banished,
    Deck,
    Extra,
    Mz,
    Emz,
    Stz,
    Fz,
}

impl BoardZone {
    /// Whether cards in `zone` are visible to this group.
    #[must_use]
    pub fn contains(self, zone: Zone) -> bool {
        match self {
            BoardZone::Field => zone.is_field(),
            BoardZone::Hand => zone == Zone::Hand,
            BoardZone::Gy => zone == Zone::Gy,
            BoardZone::Banished => zone == Zone::Banished,
            BoardZone::Deck => zone == Zone::Deck,
            BoardZone::Extra => zone == Zone::Extra,
            BoardZone::Mz => zone == Zone::MainMonster,
            BoardZone::Emz => zone == Zone::ExtraMonster,
            BoardZone::Stz => zone == Zone::SpellTrap,
            BoardZone::Fz => zone == Zone::FieldSpell,
        }
    }

    fn parse(s: &str) -> Result<Self, BucketError> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_lowercase()))
            .map_err(|_| BucketError::UnknownZone(s.to_string()))
    }
}

/// A derived fact checked against the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Condition {
    InZone { card: String, zone: BoardZone },
    EquippedLink { card: String, min: u32 },
}

impl Condition {
    /// Parse a condition string.
    pub fn parse(text: &str) -> Result<Self, BucketError> {
        let normalized = normalize_name(text);

        if let Some((card, threshold)) = normalized.split_once(" equipped link >= ") {
            let min = threshold
                .trim()
                .parse()
                .map_err(|_| BucketError::UnknownCondition(text.to_string()))?;
            return Ok(Condition::EquippedLink {
                card: card.trim().to_string(),
                min,
            });
        }

        if let Some((card, zone)) = normalized.rsplit_once(" in ") {
            if !card.trim().is_empty() {
                return Ok(Condition::InZone {
                    card: card.trim().to_string(),
                    zone: BoardZone::parse(zone)?,
                });
            }
        }

        Err(BucketError::UnknownCondition(text.to_string()))
    }
}

impl TryFrom<String> for Condition {
    type Error = BucketError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Condition::parse(&value)
    }
}

impl From<Condition> for String {
    fn from(value: Condition) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::InZone { card, zone } => {
                let zone = serde_json::to_value(zone)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                write!(f, "{card} in {zone}")
            }
            Condition::EquippedLink { card, min } => write!(f, "{card} equipped link >= {min}"),
        }
    }
}

/// How a bucket is satisfied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BucketRule {
    /// A named card (or one of its aliases) is in `zone`.
    Card {
        card: String,
        zone: BoardZone,
        #[serde(default)]
        aliases: Vec<String>,
    },

    /// A derived fact.
    Condition { condition: Condition },
}

/// One named, tiered board piece.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketDef {
    pub name: String,
    pub tier: Tier,
    #[serde(flatten)]
    pub rule: BucketRule,
}

impl BucketDef {
    /// Card bucket.
    pub fn card(name: impl Into<String>, tier: Tier, card: impl Into<String>, zone: BoardZone) -> Self {
        Self {
            name: name.into(),
            tier,
            rule: BucketRule::Card {
                card: card.into(),
                zone,
                aliases: Vec::new(),
            },
        }
    }

    /// Condition bucket.
    pub fn condition(name: impl Into<String>, tier: Tier, condition: &str) -> Result<Self, BucketError> {
        Ok(Self {
            name: name.into(),
            tier,
            rule: BucketRule::Condition {
                condition: Condition::parse(condition)?,
            },
        })
    }

    /// Add an alias to a card bucket. No effect on condition buckets.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        if let BucketRule::Card { aliases, .. } = &mut self.rule {
            aliases.push(alias.into());
        }
        self
    }
}

/// Parse an ordered bucket list from JSON.
pub fn parse_buckets(json: &str) -> Result<Vec<BucketDef>, BucketError> {
    Ok(serde_json::from_str(json)?)
}
