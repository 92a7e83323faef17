//! # combo-search
//!
//! Deterministic search for the best combo line a single player can make
//! in one main phase of a trading card game.
//!
//! ## Design Principles
//!
//! 1. **States are values**: applying an action clones the state and
//!    never mutates the source, so branches cannot observe each other.
//!
//! 2. **Fail closed**: a card the metadata resolver does not know is a
//!    `ModelError`, never a silently harmless default.
//!
//! 3. **Explicit registries**: card effects and summoning procedures live
//!    in an `EffectRegistry` value built at startup and passed by
//!    reference; there is no global table.
//!
//! ## Architecture
//!
//! - **Beam search**: each depth keeps the best `beam_width` states by
//!   endboard rank, with `setup_width` slots reserved for lines that
//!   have not scored yet.
//!
//! - **Structural hashing**: legality-equivalent states hash equal, which
//!   drives duplicate pruning and the transposition table.
//!
//! - **Persistent data structures**: O(1) cloning via `im-rs`.
//!
//! ## Modules
//!
//! - `core`: ids, zones, state, actions, snapshots, events, errors, RNG
//! - `cards`: card metadata, instances, the resolver and card database
//! - `zones`: field slots and zone-move primitives
//! - `effects`: card effect handlers and the effect registry
//! - `rules`: core legality (normal summon, set, extra deck summons)
//! - `eval`: endboard buckets and the evaluator
//! - `search`: hasher, transposition table, beam search, parallel driver
//! - `games`: built-in card pools
//! - `scenario` / `report`: input documents and output reports

pub mod cards;
pub mod core;
pub mod effects;
pub mod eval;
pub mod games;
pub mod report;
pub mod rules;
pub mod scenario;
pub mod search;
pub mod zones;

pub use crate::core::{
    Action, ActionError, ActionKind, ActionRecord, CoreAction, FieldCapacity, GameRng, GameState,
    Illegal, InstanceId, ModelError, Phase, Snapshot, Zone,
};

pub use crate::cards::{CardDatabase, CardDefinition, CardId, CardInstance, CardMeta, MetadataResolver};

pub use crate::effects::{CardEffect, EffectAction, EffectRegistry};

pub use crate::rules::RulesEngine;

pub use crate::eval::{BucketDef, Evaluation, Evaluator, RankKey, Tier};

pub use crate::search::{
    hash_state, CancelToken, Line, SearchConfig, SearchEngine, SearchResult, SearchStats,
    StateHash,
};

pub use crate::report::Report;
pub use crate::scenario::{Scenario, ScenarioError};

/// Initialise terminal logging at `level`, plus a debug-level file log
/// when `file` is given.
pub fn log(level: log::LevelFilter, file: Option<&std::path::Path>) -> anyhow::Result<()> {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let mut loggers: Vec<Box<dyn simplelog::SharedLogger>> = Vec::new();
    loggers.push(simplelog::TermLogger::new(
        level,
        config.clone(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    ));
    if let Some(path) = file {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        loggers.push(simplelog::WriteLogger::new(
            log::LevelFilter::Debug.max(level),
            config,
            std::fs::File::create(path)?,
        ));
    }
    simplelog::CombinedLogger::init(loggers)?;
    Ok(())
}
