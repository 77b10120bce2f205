pub mod steering;
pub mod cruiser;
pub mod pursuit;

pub use cruiser::CruiserPilot;
pub use pursuit::PursuitPilot;

use crate::policy::{DoNothingPolicy, Policy, RandomPolicy};

/// Names accepted by [`by_name`].
pub const PILOT_NAMES: &[&str] = &["pursuit", "cruiser", "random", "do_nothing"];

/// Build a pilot from its name. `seed` only matters for `random`.
pub fn by_name(name: &str, seed: u64) -> Option<Box<dyn Policy>> {
    match name {
        "pursuit" => Some(Box::new(PursuitPilot::new())),
        "cruiser" => Some(Box::new(CruiserPilot)),
        "random" => Some(Box::new(RandomPolicy::new(seed))),
        "do_nothing" => Some(Box::new(DoNothingPolicy)),
        _ => None,
    }
}
