//! Action-selection seam.
//!
//! The trained A2C network plugs in behind [`Policy`]; the harness itself
//! ships only a uniform random stand-in for smoke-testing the loop and
//! collecting baseline episodes.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rl_env::{ActionMask, Observation};

/// Picks one action index from the legal set.
pub trait Policy: Send {
    /// Returns a legal index from `mask`, or `None` when nothing is legal.
    fn select(&mut self, observation: &Observation, mask: &ActionMask) -> Option<usize>;
}

/// Uniform random choice over the legal actions.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RandomPolicy {
    fn select(&mut self, _observation: &Observation, mask: &ActionMask) -> Option<usize> {
        let legal: Vec<usize> = mask.legal_indices().collect();
        if legal.is_empty() {
            return None;
        }
        Some(legal[self.rng.gen_range(0..legal.len())])
    }
}
