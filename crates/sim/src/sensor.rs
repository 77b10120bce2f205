use glam::Vec3;
use starfighter_shared::util::{normalize_distance, to_polar};
use starfighter_shared::*;

use crate::physics::{Physics, RigidBody, SphereCast};

/// Result of one sensor sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// (yaw, pitch, distance) per ray.
    pub values: [f32; SENSOR_OBS_SIZE],
    /// Most negative `distance - PROXIMITY_THRESHOLD` among close hits, else 0.
    pub proximity_penalty: f32,
    /// Agent body seen straight ahead, if it is nearer than the obstacle on
    /// the center ray.
    pub detected: Option<ColliderRef>,
}

/// Forward-looking fan of swept-sphere probes.
#[derive(Debug, Clone)]
pub struct RaySensor {
    origins: [Vec3; RAY_COUNT],
}

impl Default for RaySensor {
    fn default() -> Self {
        Self::new()
    }
}

impl RaySensor {
    pub fn new() -> Self {
        let s = 60f32.to_radians().sin();
        let r = RAY_FAN_RADIUS;
        let z = RAY_FAN_Z;
        Self {
            origins: [
                Vec3::new(0.0, 0.0, z),
                Vec3::new(0.0, -r, z),
                Vec3::new(0.0, r, z),
                Vec3::new(-s * r, r / 2.0, z),
                Vec3::new(-s * r, -r / 2.0, z),
                Vec3::new(s * r, r / 2.0, z),
                Vec3::new(s * r, -r / 2.0, z),
            ],
        }
    }

    pub fn origins(&self) -> &[Vec3; RAY_COUNT] {
        &self.origins
    }

    pub fn scan<P: Physics + ?Sized>(
        &self,
        body: &RigidBody,
        own: ColliderRef,
        physics: &P,
    ) -> SensorReading {
        let pos = body.position;
        let fwd = body.forward();
        let cast = |origin: Vec3, mask: LayerMask| SphereCast {
            origin,
            radius: RAY_RADIUS,
            direction: fwd,
            max_distance: RAY_RANGE,
            mask,
            ignore: Some(own),
        };

        // Only competes with the center ray.
        let mut agent_hit = physics.sphere_cast(&cast(pos, LayerMask::AGENTS));

        let mut values = [0.0f32; SENSOR_OBS_SIZE];
        let mut proximity = 0.0f32;
        let mut detected = None;

        for (i, local) in self.origins.iter().enumerate() {
            let mut hit = physics.sphere_cast(&cast(body.to_world(*local), LayerMask::OBSTACLES));

            if let Some(agent) = agent_hit.take() {
                if hit.map_or(true, |h| agent.distance < h.distance) {
                    detected = Some(agent.collider);
                    hit = Some(agent);
                }
            }

            let out = &mut values[i * 3..i * 3 + 3];
            match hit {
                Some(hit) => {
                    let delta = hit.point - pos;
                    let (yaw, pitch) = to_polar(body.localize(delta));
                    let distance = delta.length();
                    out[0] = (yaw / 90.0).clamp(-1.0, 1.0);
                    out[1] = (pitch / 90.0).clamp(-1.0, 1.0);
                    out[2] = normalize_distance(distance);
                    if distance < PROXIMITY_THRESHOLD {
                        proximity = proximity.min(distance - PROXIMITY_THRESHOLD);
                    }
                }
                None => {
                    out[0] = 0.0;
                    out[1] = 0.0;
                    out[2] = 1.0;
                }
            }
        }

        SensorReading {
            values,
            proximity_penalty: proximity,
            detected,
        }
    }
}
