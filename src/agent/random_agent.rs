use std::ops::RangeInclusive;

use rand::prelude::SmallRng;
use rand::{Rng, SeedableRng};

use super::Agent;

/// Agent that samples all sub-actions uniformly at random.
pub struct RandomAgent {
    rng: SmallRng,
}

impl Agent for RandomAgent {
    fn act_dyn(&mut self, _action: &str, range: RangeInclusive<i64>) -> i64 {
        self.rng.gen_range(range)
    }
}

impl RandomAgent {
    pub fn from_seed(seed: u64) -> Self {
        RandomAgent {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        RandomAgent::from_seed(0)
    }
}
