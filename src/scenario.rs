//! Scenario documents.
//!
//! A scenario is one JSON file describing where a search starts and how
//! it runs:
//!
//! ```json
//! {
//!   "name": "acolyte one-card",
//!   "state": { "zones": { "hand": [1001], "deck": [1002, 1003, 1100] } },
//!   "search": { "max_depth": 10, "beam_width": 64 },
//!   "sample": { "hands": 4, "hand_size": 2, "seed": 7 }
//! }
//! ```
//!
//! - `state`: the starting snapshot
//! - `search`: `SearchConfig`, every field optional
//! - `buckets`: endboard buckets (defaults to the Cinder buckets)
//! - `sample`: deal several opening hands from the hand+deck pool
//! - `cards`: extra card definitions merged into the Cinder database;
//!   they get no effects

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::{CardDatabase, CardDatabaseDoc, MetadataResolver};
use crate::core::{CardEntry, GameRng, GameState, ModelError, Snapshot};
use crate::effects::EffectRegistry;
use crate::eval::{BucketDef, BucketError, Evaluator};
use crate::games::cinder;
use crate::search::SearchConfig;

/// Failure to turn a scenario file into search roots.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Bucket(#[from] BucketError),
    #[error("cannot sample hands: {0}")]
    Sample(String),
}

/// Opening hand sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Number of hands to deal.
    pub hands: usize,
    #[serde(default = "default_hand_size")]
    pub hand_size: usize,
    #[serde(default)]
    pub seed: u64,
}

fn default_hand_size() -> usize {
    5
}

/// A parsed scenario file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub state: Snapshot,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buckets: Option<Vec<BucketDef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<Sample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<CardDatabaseDoc>,
}

impl Scenario {
    /// Read and parse a scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut scenario = Self::from_json(&text)?;
        if scenario.name.is_none() {
            scenario.name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        }
        info!("loaded scenario {}", scenario.display_name());
        Ok(scenario)
    }

    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("scenario")
    }

    /// The Cinder pool plus any cards the scenario declares.
    pub fn database(&self) -> Result<CardDatabase, ScenarioError> {
        let mut db = cinder::database()?;
        if let Some(doc) = &self.cards {
            db.extend(doc.clone())?;
        }
        Ok(db)
    }

    /// The Cinder registry, with scenario-declared cards as vanilla.
    #[must_use]
    pub fn registry(&self) -> EffectRegistry {
        let mut registry = cinder::registry();
        for card in self.cards.iter().flat_map(|doc| doc.cards.iter()) {
            if !registry.contains(card.id) {
                registry.register_vanilla(card.id);
            }
        }
        registry
    }

    /// Evaluator over the scenario's buckets, or the Cinder defaults.
    pub fn evaluator(&self) -> Result<Evaluator, ScenarioError> {
        let buckets = match &self.buckets {
            Some(buckets) => buckets.clone(),
            None => cinder::buckets()?,
        };
        Ok(Evaluator::new(buckets))
    }

    /// Starting snapshots: the state itself, or one per sampled hand.
    pub fn hands(&self) -> Result<Vec<Snapshot>, ScenarioError> {
        match self.sample {
            None => Ok(vec![self.state.clone()]),
            Some(sample) => deal(&self.state, sample),
        }
    }

    /// Search roots, resolved against `resolver`.
    pub fn roots(&self, resolver: &dyn MetadataResolver) -> Result<Vec<GameState>, ScenarioError> {
        self.hands()?
            .iter()
            .map(|snapshot| Ok(GameState::from_snapshot(snapshot, resolver)?))
            .collect()
    }
}

/// Deal `sample.hands` hands from the combined hand and deck pool.
///
/// Each hand keeps the pool order; the cards not drawn form the deck.
fn deal(base: &Snapshot, sample: Sample) -> Result<Vec<Snapshot>, ScenarioError> {
    let pool: Vec<CardEntry> = base
        .zones
        .hand
        .iter()
        .chain(base.zones.deck.iter())
        .cloned()
        .collect();
    if sample.hands == 0 {
        return Err(ScenarioError::Sample("hands must be at least 1".into()));
    }

    let mut rng = GameRng::new(sample.seed);
    let mut hands = Vec::with_capacity(sample.hands);
    for i in 0..sample.hands {
        let mut fork = rng.fork();
        let picked = fork.sample_indices(pool.len(), sample.hand_size).ok_or_else(|| {
            ScenarioError::Sample(format!(
                "hand size {} exceeds pool of {}",
                sample.hand_size,
                pool.len()
            ))
        })?;

        let mut snapshot = base.clone();
        snapshot.zones.hand = Vec::with_capacity(picked.len());
        snapshot.zones.deck = Vec::with_capacity(pool.len() - picked.len());
        let mut next = picked.iter().peekable();
        for (j, entry) in pool.iter().enumerate() {
            if next.peek() == Some(&&j) {
                next.next();
                snapshot.zones.hand.push(entry.clone());
            } else {
                snapshot.zones.deck.push(entry.clone());
            }
        }
        debug!("hand {}: {:?}", i + 1, snapshot.zones.hand);
        hands.push(snapshot);
    }
    Ok(hands)
}
