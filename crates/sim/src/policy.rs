use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use starfighter_shared::{Action, Observation};

pub trait Policy: Send {
    fn name(&self) -> &str;
    fn act(&mut self, obs: &Observation) -> Action;
}

/// Policy that does nothing - useful for testing.
pub struct DoNothingPolicy;

impl Policy for DoNothingPolicy {
    fn name(&self) -> &str {
        "do_nothing"
    }

    fn act(&mut self, _obs: &Observation) -> Action {
        Action::none()
    }
}

/// Uniform random controls in [-1, 1], seeded for reproducible runs.
pub struct RandomPolicy {
    rng: Pcg64,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn act(&mut self, _obs: &Observation) -> Action {
        Action {
            accelerate: self.rng.gen_range(-1.0..=1.0),
            pitch: self.rng.gen_range(-1.0..=1.0),
            roll: self.rng.gen_range(-1.0..=1.0),
            fire: self.rng.gen_range(-1.0..=1.0),
        }
    }
}
