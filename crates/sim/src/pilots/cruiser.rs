use starfighter_shared::*;

use super::steering::{evade, nearest_threat};
use crate::policy::Policy;

/// Flies straight at full throttle, swerving around anything the sensor
/// fan reports as close. Never fires.
pub struct CruiserPilot;

impl Policy for CruiserPilot {
    fn name(&self) -> &str {
        "cruiser"
    }

    fn act(&mut self, obs: &Observation) -> Action {
        match nearest_threat(obs) {
            Some(threat) => {
                let (pitch, roll) = evade(threat);
                Action {
                    accelerate: 0.3,
                    pitch,
                    roll,
                    fire: 0.0,
                }
            }
            None => Action {
                accelerate: 1.0,
                ..Action::none()
            },
        }
    }
}
