//! Collision signal generation
//!
//! When more than one active device answers a probe, the bus carries an
//! indeterminate response. Two renditions are supported:
//!
//! - **Empty**: an empty line. This is what the discovery engine keys on
//!   and is the default.
//! - **Sample**: per-position garbage built by picking, for every output
//!   position, one symbol uniformly at random from the matching UIDs that
//!   are long enough to have one.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::uid::UID_LEN;

/// How a collision is rendered on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CollisionStrategy {
    /// Always answer with an empty line
    #[default]
    Empty,
    /// Sample each position from the matching UIDs
    Sample,
}

/// Build a garbage string by sampling each position from `matched`
///
/// Stops early at the first position no matched UID reaches.
pub fn sample_collision<S, R>(matched: &[S], max_len: usize, rng: &mut R) -> String
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let mut result = String::with_capacity(max_len);

    for i in 0..max_len {
        let candidates: Vec<u8> = matched
            .iter()
            .filter_map(|uid| uid.as_ref().as_bytes().get(i).copied())
            .collect();

        if candidates.is_empty() {
            break;
        }

        result.push(candidates[rng.gen_range(0..candidates.len())] as char);
    }

    result
}

/// Stateful collision signal source owned by a simulator
#[derive(Debug)]
pub struct CollisionSignal {
    strategy: CollisionStrategy,
    max_len: usize,
    rng: StdRng,
}

impl CollisionSignal {
    /// Create a signal source seeded from system entropy
    pub fn new(strategy: CollisionStrategy) -> Self {
        Self {
            strategy,
            max_len: UID_LEN,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a reproducible signal source
    pub fn with_seed(strategy: CollisionStrategy, seed: u64) -> Self {
        Self {
            strategy,
            max_len: UID_LEN,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Get the active strategy
    pub fn strategy(&self) -> CollisionStrategy {
        self.strategy
    }

    /// Produce the bus observable for a set of UIDs that all matched one probe
    pub fn signal<S: AsRef<str>>(&mut self, matched: &[S]) -> String {
        match self.strategy {
            CollisionStrategy::Empty => String::new(),
            CollisionStrategy::Sample => sample_collision(matched, self.max_len, &mut self.rng),
        }
    }
}
