//! Diversified beam selection.
//!
//! Candidates are ranked by `(rank key, state hash)` descending; the
//! hash only breaks ties so selection is deterministic. Plain top-K
//! selection tends to fill the whole beam with variations of the first
//! line that reaches a good bucket. `select_beam` therefore reserves
//! `setup_width` slots for the best candidates still setting up (no S
//! or A bucket yet), then fills the remaining slots in rank order.
//!
//! If fewer setup candidates exist than `setup_width`, no slots are
//! reserved and selection is plain top-K.

use std::cmp::Ordering;

use super::hash::StateHash;
use crate::eval::RankKey;

/// Anything the beam can rank.
pub trait Ranked {
    fn rank_key(&self) -> RankKey;
    fn state_hash(&self) -> StateHash;

    fn is_setup(&self) -> bool {
        self.rank_key().is_setup()
    }
}

/// Descending `(rank key, hash)` order.
pub fn rank_order<T: Ranked>(a: &T, b: &T) -> Ordering {
    (b.rank_key(), b.state_hash()).cmp(&(a.rank_key(), a.state_hash()))
}

/// Select the next beam from `candidates`.
///
/// When there are at most `beam_width` candidates they are returned
/// unchanged.
#[must_use]
pub fn select_beam<T: Ranked>(mut candidates: Vec<T>, beam_width: usize, setup_width: usize) -> Vec<T> {
    if candidates.len() <= beam_width {
        return candidates;
    }
    candidates.sort_by(rank_order);

    let setup_count = candidates.iter().filter(|c| c.is_setup()).count();
    let reserve = setup_width.min(beam_width);
    if reserve == 0 || setup_count < reserve {
        candidates.truncate(beam_width);
        return candidates;
    }

    let mut picked = vec![false; candidates.len()];
    let mut taken = 0;

    for (i, c) in candidates.iter().enumerate() {
        if taken == reserve {
            break;
        }
        if c.is_setup() {
            picked[i] = true;
            taken += 1;
        }
    }
    for flag in picked.iter_mut() {
        if taken == beam_width {
            break;
        }
        if !*flag {
            *flag = true;
            taken += 1;
        }
    }

    // Keep rank order in the result
    candidates
        .into_iter()
        .zip(picked)
        .filter_map(|(c, keep)| keep.then_some(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Item(RankKey, u64);

    impl Ranked for Item {
        fn rank_key(&self) -> RankKey {
            self.0
        }
        fn state_hash(&self) -> StateHash {
            StateHash(self.1)
        }
    }

    fn achieved(n: u64) -> Vec<Item> {
        (0..n).map(|i| Item(RankKey(1, 0, 0), 100 + i)).collect()
    }

    fn setup(n: u64) -> Vec<Item> {
        (0..n).map(|i| Item(RankKey(0, 0, 1), 200 + i)).collect()
    }

    #[test]
    fn test_reserves_setup_slots() {
        let mut items = achieved(10);
        items.extend(setup(5));
        let beam = select_beam(items, 6, 2);

        assert_eq!(beam.len(), 6);
        assert_eq!(beam.iter().filter(|i| i.is_setup()).count(), 2);
        // Best setup states are the ones kept
        assert!(beam.contains(&Item(RankKey(0, 0, 1), 204)));
        assert!(beam.contains(&Item(RankKey(0, 0, 1), 203)));
    }

    #[test]
    fn test_plain_top_k_without_enough_setup() {
        let mut items = achieved(10);
        items.extend(setup(1));
        let beam = select_beam(items, 4, 2);

        assert_eq!(beam.len(), 4);
        assert!(beam.iter().all(|i| !i.is_setup()));
        assert_eq!(beam[0], Item(RankKey(1, 0, 0), 109));
    }

    #[test]
    fn test_small_input_unchanged() {
        let mut items = setup(2);
        items.extend(achieved(1));
        let beam = select_beam(items.clone(), 5, 2);
        assert_eq!(beam, items);
    }

    #[test]
    fn test_hash_breaks_ties() {
        let items = vec![
            Item(RankKey(0, 1, 0), 1),
            Item(RankKey(0, 1, 0), 3),
            Item(RankKey(0, 1, 0), 2),
        ];
        let beam = select_beam(items, 2, 0);
        assert_eq!(beam, vec![Item(RankKey(0, 1, 0), 3), Item(RankKey(0, 1, 0), 2)]);
    }
}
