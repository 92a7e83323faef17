//! Beam search for combo lines.
//!
//! ## Overview
//!
//! - `hash`: structural state hash used for deduplication and as the
//!   transposition key
//! - `tt`: bounded transposition table
//! - `beam`: diversified beam selection
//! - `engine`: the search loop
//! - `parallel`: independent searches on rayon workers
//! - `config` / `stats` / `cancel`: knobs, diagnostics, graceful stop
//!
//! ## Usage
//!
//! ```rust,ignore
//! use combo_search::search::{SearchConfig, SearchEngine};
//!
//! let mut engine = SearchEngine::new(&registry, &evaluator, SearchConfig::default());
//! let result = engine.search(&state)?;
//! if let Some(best) = result.best() {
//!     println!("{} in {} actions", best.evaluation.summary, best.actions.len());
//! }
//! ```

pub mod beam;
pub mod cancel;
pub mod config;
pub mod engine;
pub mod hash;
pub mod parallel;
pub mod stats;
pub mod tt;

pub use beam::{select_beam, Ranked};
pub use cancel::CancelToken;
pub use config::SearchConfig;
pub use engine::{Line, SearchEngine, SearchResult};
pub use hash::{hash_state, StateHash};
pub use parallel::{merge_results, search_all, RankedLine};
pub use stats::{SearchStats, StopReason};
pub use tt::{TranspositionTable, TtEntry, TtStats};
