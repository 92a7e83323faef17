//! Endboard evaluator.
//!
//! Scores a board against an ordered bucket list. The result's
//! `RankKey` is `(S count, A count, B count)` and compares
//! lexicographically, so one S bucket outranks any number of A buckets.

use serde::{Deserialize, Serialize};

use super::buckets::{parse_buckets, BoardZone, BucketDef, BucketError, BucketRule, Condition, Tier};
use super::normalize::normalize_name;
use crate::cards::MetadataResolver;
use crate::core::error::ModelError;
use crate::core::{GameState, Snapshot, Zone};

/// `(S, A, B)` bucket counts. Higher compares better.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RankKey(pub u32, pub u32, pub u32);

impl RankKey {
    /// No S or A bucket achieved yet: the line is still setting up.
    #[must_use]
    pub fn is_setup(self) -> bool {
        self.0 == 0 && self.1 == 0
    }
}

impl std::fmt::Display for RankKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.0, self.1, self.2)
    }
}

/// An achieved bucket.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Achieved {
    pub tier: Tier,
    pub name: String,
}

/// Evaluator output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Achieved buckets, S first, then by name.
    pub achieved: Vec<Achieved>,
    pub rank_key: RankKey,
    pub summary: String,
}

// === Board view ===

/// One card as the evaluator sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewCard {
    /// Normalized name.
    pub name: String,
    pub zone: Zone,
    /// Sum of link ratings of the cards equipped to this one.
    pub equipped_link: u32,
}

/// Read-only projection of a board: every card with its normalized name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoardView {
    pub cards: Vec<ViewCard>,
}

impl BoardView {
    #[must_use]
    pub fn from_state(state: &GameState) -> Self {
        let cards = state
            .all_cards()
            .into_iter()
            .map(|(loc, card)| {
                let equipped_link = if loc.zone.is_field() {
                    state
                        .equipped_to(card.uid)
                        .iter()
                        .map(|e| u32::from(e.link_rating()))
                        .sum()
                } else {
                    0
                };
                ViewCard {
                    name: normalize_name(&card.name),
                    zone: loc.zone,
                    equipped_link,
                }
            })
            .collect();
        Self { cards }
    }

    /// Build the view of a snapshot, resolving bare card ids.
    pub fn from_snapshot(
        snapshot: &Snapshot,
        resolver: &dyn MetadataResolver,
    ) -> Result<Self, ModelError> {
        let state = GameState::from_snapshot(snapshot, resolver)?;
        Ok(Self::from_state(&state))
    }

    fn has(&self, names: &[String], zone: BoardZone) -> bool {
        self.cards
            .iter()
            .any(|c| zone.contains(c.zone) && names.iter().any(|n| *n == c.name))
    }
}

// === Evaluator ===

/// Scores boards against a bucket list.
#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    buckets: Vec<BucketDef>,
}

impl Evaluator {
    #[must_use]
    pub fn new(buckets: Vec<BucketDef>) -> Self {
        Self { buckets }
    }

    /// Load a bucket list from JSON.
    pub fn from_json(json: &str) -> Result<Self, BucketError> {
        Ok(Self::new(parse_buckets(json)?))
    }

    #[must_use]
    pub fn buckets(&self) -> &[BucketDef] {
        &self.buckets
    }

    #[must_use]
    pub fn evaluate(&self, state: &GameState) -> Evaluation {
        self.evaluate_view(&BoardView::from_state(state))
    }

    /// Evaluate a snapshot, resolving bare card ids through `resolver`.
    pub fn evaluate_snapshot(
        &self,
        snapshot: &Snapshot,
        resolver: &dyn MetadataResolver,
    ) -> Result<Evaluation, ModelError> {
        Ok(self.evaluate_view(&BoardView::from_snapshot(snapshot, resolver)?))
    }

    #[must_use]
    pub fn evaluate_view(&self, view: &BoardView) -> Evaluation {
        let mut achieved: Vec<Achieved> = self
            .buckets
            .iter()
            .filter(|b| satisfied(view, &b.rule))
            .map(|b| Achieved {
                tier: b.tier,
                name: b.name.clone(),
            })
            .collect();
        achieved.sort();

        let mut key = RankKey::default();
        for a in &achieved {
            match a.tier {
                Tier::S => key.0 += 1,
                Tier::A => key.1 += 1,
                Tier::B => key.2 += 1,
            }
        }

        Evaluation {
            summary: summarize(&achieved, key),
            achieved,
            rank_key: key,
        }
    }
}

fn satisfied(view: &BoardView, rule: &BucketRule) -> bool {
    match rule {
        BucketRule::Card {
            card,
            zone,
            aliases,
        } => {
            let names: Vec<String> = std::iter::once(card)
                .chain(aliases)
                .map(|n| normalize_name(n))
                .collect();
            view.has(&names, *zone)
        }
        BucketRule::Condition { condition } => match condition {
            Condition::InZone { card, zone } => view.has(std::slice::from_ref(card), *zone),
            Condition::EquippedLink { card, min } => view
                .cards
                .iter()
                .any(|c| c.zone.is_field() && c.name == *card && c.equipped_link >= *min),
        },
    }
}

fn summarize(achieved: &[Achieved], key: RankKey) -> String {
    if achieved.is_empty() {
        return "no buckets achieved".to_string();
    }
    let names: Vec<String> = achieved
        .iter()
        .map(|a| format!("[{:?}] {}", a.tier, a.name))
        .collect();
    format!("S={} A={} B={}: {}", key.0, key.1, key.2, names.join(", "))
}
