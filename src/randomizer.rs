//! Uniform piece randomizer
//!
//! Every spawn draws one of the 8 shapes with equal probability. There is no
//! bag or history, so droughts and repeats are possible.

use crate::tetromino::{SHAPE_COUNT, ShapeId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct Randomizer {
    rng: ChaCha8Rng,
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomizer {
    /// Seed from OS entropy
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Fixed sequence for a given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn next_shape(&mut self) -> ShapeId {
        ShapeId::ALL[self.rng.gen_range(0..SHAPE_COUNT)]
    }
}
