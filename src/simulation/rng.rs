//! Seedable randomness for the engine.
//!
//! Next-location selection draws from `SimRng` rather than `rand::thread_rng()`
//! so a fixed seed replays the same mission order.

use bevy_ecs::prelude::*;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DEFAULT_SEED: u64 = 42;

#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl SimRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Uniform pick; `None` for an empty iterator.
    pub fn pick<I, T>(&mut self, items: I) -> Option<T>
    where
        I: IntoIterator<Item = T>,
    {
        items.into_iter().choose(&mut self.0)
    }
}
