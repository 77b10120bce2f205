use starfighter_shared::util::normalize_distance;
use starfighter_shared::*;

/// Sensor distance value below which an obstacle needs evading (~10 units).
pub fn danger_threshold() -> f32 {
    normalize_distance(10.0)
}

/// One sensor ray decoded from the observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayView {
    /// Normalized yaw, negative to the right.
    pub yaw: f32,
    /// Normalized pitch, positive above.
    pub pitch: f32,
    pub distance: f32,
}

pub fn rays(obs: &Observation) -> impl Iterator<Item = RayView> + '_ {
    obs.sensor().chunks_exact(3).map(|r| RayView {
        yaw: r[0],
        pitch: r[1],
        distance: r[2],
    })
}

/// Nearest ray hit inside the danger threshold.
pub fn nearest_threat(obs: &Observation) -> Option<RayView> {
    let threshold = danger_threshold();
    rays(obs)
        .filter(|r| r.distance < threshold)
        .min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal))
}

/// Bank-and-pull controls that bring a target at normalized (yaw, pitch)
/// onto the nose. Returns (pitch, roll) inputs.
///
/// Positive pitch input drops the nose; positive roll banks right.
pub fn steer_towards(yaw: f32, pitch: f32) -> (f32, f32) {
    let roll = (-yaw * 3.0).clamp(-1.0, 1.0);
    let pull = (-pitch * 3.0 - yaw.abs()).clamp(-1.0, 1.0);
    (pull, roll)
}

/// Pitch away from an obstacle: dive under things above, climb over the rest.
pub fn evade(threat: RayView) -> (f32, f32) {
    let pitch = if threat.pitch > 0.0 { 1.0 } else { -1.0 };
    let roll = (threat.yaw * 2.0).clamp(-1.0, 1.0);
    (pitch, roll)
}
