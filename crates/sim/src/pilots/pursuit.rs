use starfighter_shared::*;

use super::steering::{evade, nearest_threat, steer_towards};
use crate::policy::Policy;

/// Chases the front target and fires when it has a clear shot. Turns around
/// when only a rear target is known, and breaks off to avoid asteroids.
pub struct PursuitPilot {
    /// Largest normalized off-nose angle at which it will fire.
    pub fire_cone: f32,
}

impl PursuitPilot {
    pub fn new() -> Self {
        Self { fire_cone: 0.05 }
    }
}

impl Default for PursuitPilot {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for PursuitPilot {
    fn name(&self) -> &str {
        "pursuit"
    }

    fn act(&mut self, obs: &Observation) -> Action {
        let d = &obs.data;

        if let Some(threat) = nearest_threat(obs) {
            let (pitch, roll) = evade(threat);
            return Action {
                accelerate: 0.5,
                pitch,
                roll,
                fire: -1.0,
            };
        }

        if d[OBS_HAS_FRONT] > 0.0 {
            let yaw = d[OBS_FRONT_DIRECTION];
            let elevation = d[OBS_FRONT_DIRECTION + 1];
            let (pitch, roll) = steer_towards(yaw, elevation);
            let aimed = yaw.abs() < self.fire_cone && elevation.abs() < self.fire_cone;
            let clear = d[OBS_FRONT_CLEAR_SHOT] > 0.0;
            return Action {
                accelerate: 1.0,
                pitch,
                roll,
                fire: if aimed && clear { 1.0 } else { -1.0 },
            };
        }

        // Nothing ahead: loop over to face whatever is behind.
        let behind = d[OBS_REAR_DISTANCE] < 1.0;
        Action {
            accelerate: if behind { 0.5 } else { 1.0 },
            pitch: if behind { -1.0 } else { 0.0 },
            roll: 0.0,
            fire: -1.0,
        }
    }
}
