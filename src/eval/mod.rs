//! Endboard evaluation.
//!
//! - `normalize`: card name folding for matching
//! - `buckets`: tiered bucket definitions and derived conditions
//! - `evaluator`: `BoardView` projection and the `Evaluator` itself

pub mod buckets;
pub mod evaluator;
pub mod normalize;

pub use buckets::{parse_buckets, BoardZone, BucketDef, BucketError, BucketRule, Condition, Tier};
pub use evaluator::{Achieved, BoardView, Evaluation, Evaluator, RankKey, ViewCard};
pub use normalize::{names_match, normalize_name};
