//! Reproducible rank ids.
//!
//! Every launch, fresh or resumed, reseeds a generator with [`RANK_SEED`] and
//! draws one id per worker. The same world size therefore always yields the
//! same ordered ids, which is how a resumed run finds its old log directories
//! without persisting them.
//!
//! The generator is ChaCha8 rather than `StdRng`, whose algorithm may change
//! between rand releases.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const RANK_SEED: u64 = 42;
/// Ids are drawn from `0..RANK_ID_BOUND`.
pub const RANK_ID_BOUND: u32 = 1_000_000;

/// Infinite stream of rank ids, restarted from the seed on construction.
#[derive(Debug, Clone)]
pub struct RankSequence {
    rng: ChaCha8Rng,
}

impl RankSequence {
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(RANK_SEED),
        }
    }
}

impl Default for RankSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for RankSequence {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        Some(self.rng.gen_range(0..RANK_ID_BOUND))
    }
}

/// The first `world_size` ids of a freshly seeded sequence.
pub fn rank_ids(world_size: usize) -> Vec<u32> {
    RankSequence::new().take(world_size).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_ids_are_pinned() {
        assert_eq!(rank_ids(3), [224_080, 681_896, 146_386]);
    }

    #[test]
    fn sequence_restarts_identically() {
        assert_eq!(rank_ids(8), rank_ids(8));
    }

    #[test]
    fn smaller_world_is_a_prefix_of_larger() {
        let small = rank_ids(3);
        let large = rank_ids(10);
        assert_eq!(&large[..3], small.as_slice());
    }

    #[test]
    fn ids_stay_in_bound() {
        assert!(rank_ids(1000).iter().all(|id| *id < RANK_ID_BOUND));
    }
}
