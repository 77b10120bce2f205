use glam::Vec3;
use rand::Rng;

/// Unsigned angle in degrees between two vectors. Zero if either is degenerate.
fn angle_deg(from: Vec3, to: Vec3) -> f32 {
    let denom = (from.length_squared() * to.length_squared()).sqrt();
    if denom < 1e-15 {
        return 0.0;
    }
    let dot = (from.dot(to) / denom).clamp(-1.0, 1.0);
    dot.acos().to_degrees()
}

/// Signed angle from `from` to `to` around `axis`. A zero cross product counts
/// as positive, so exactly-opposite vectors give +180.
fn signed_angle_deg(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let unsigned = angle_deg(from, to);
    let sign = if axis.dot(from.cross(to)) < 0.0 { -1.0 } else { 1.0 };
    unsigned * sign
}

fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    let sqr = normal.length_squared();
    if sqr < f32::EPSILON {
        return v;
    }
    v - normal * (v.dot(normal) / sqr)
}

/// (yaw, pitch) of a local-space direction relative to +Z, in degrees.
///
/// Yaw is measured in the horizontal plane around +Y, pitch in the vertical
/// plane around +X. Both go from the projected vector to forward, so a target
/// off to the right has negative yaw and a target above has positive pitch.
pub fn to_polar(v: Vec3) -> (f32, f32) {
    let yaw = signed_angle_deg(project_on_plane(v, Vec3::Y), Vec3::Z, Vec3::Y);
    let pitch = signed_angle_deg(project_on_plane(v, Vec3::X), Vec3::Z, Vec3::X);
    (yaw, pitch)
}

/// Soft squashing into (-1, 1).
pub fn sigmoid(x: f32) -> f32 {
    x / (1.0 + x.abs())
}

pub fn sigmoid_vec(v: Vec3) -> Vec3 {
    Vec3::new(sigmoid(v.x), sigmoid(v.y), sigmoid(v.z))
}

/// `base^exp` by repeated squaring.
pub fn pow_int(mut base: f32, mut exp: u32) -> f32 {
    let mut result = 1.0;
    while exp > 0 {
        if exp & 1 == 1 {
            result *= base;
        }
        exp >>= 1;
        base *= base;
    }
    result
}

/// Normalized distance used by every distance observation.
pub fn normalize_distance(distance: f32) -> f32 {
    sigmoid((distance - crate::DISTANCE_OFFSET) / crate::DISTANCE_SCALE)
}

/// Uniform point inside the unit ball.
pub fn random_in_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}
