use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use starfighter_shared::*;

/// Kinematic state of one rigid body. Local +Z is forward, +Y up, +X right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub radius: f32,
}

impl RigidBody {
    pub fn at(position: Vec3, rotation: Quat, radius: f32) -> Self {
        Self {
            position,
            rotation,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            radius,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// World direction into this body's local frame.
    pub fn localize(&self, v: Vec3) -> Vec3 {
        self.rotation.inverse() * v
    }

    /// Local point into world space.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Apply damping, then move and spin for one step.
    pub fn integrate(&mut self, dt: f32, drag: f32, angular_drag: f32) {
        self.velocity *= (1.0 - drag * dt).max(0.0);
        self.angular_velocity *= (1.0 - angular_drag * dt).max(0.0);
        self.position += self.velocity * dt;
        let spin = self.angular_velocity * dt;
        if spin.length_squared() > 0.0 {
            self.rotation = (Quat::from_scaled_axis(spin) * self.rotation).normalize();
        }
    }
}

/// A swept-sphere query.
#[derive(Debug, Clone, Copy)]
pub struct SphereCast {
    pub origin: Vec3,
    pub radius: f32,
    /// Unit direction.
    pub direction: Vec3,
    pub max_distance: f32,
    pub mask: LayerMask,
    /// Collider the sweep should pass through, usually the caster's own body.
    pub ignore: Option<ColliderRef>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Contact point on the struck collider's surface.
    pub point: Vec3,
    /// Distance travelled by the swept sphere before contact.
    pub distance: f32,
    pub collider: ColliderRef,
}

/// Query surface of the physics collaborator.
pub trait Physics {
    /// Nearest hit of a swept sphere. Colliders overlapping the sphere at its
    /// origin are not reported.
    fn sphere_cast(&self, cast: &SphereCast) -> Option<RayHit>;

    /// First collider in `mask`, other than `ignore`, that intersects the
    /// given sphere.
    fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        mask: LayerMask,
        ignore: Option<ColliderRef>,
    ) -> Option<ColliderRef>;
}

#[derive(Debug, Clone, Copy)]
pub struct SphereCollider {
    pub center: Vec3,
    pub radius: f32,
    pub collider: ColliderRef,
}

impl SphereCollider {
    fn sweep(&self, cast: &SphereCast) -> Option<RayHit> {
        let reach = self.radius + cast.radius;
        let m = cast.origin - self.center;
        let c = m.length_squared() - reach * reach;
        if c < 0.0 {
            return None;
        }
        let b = m.dot(cast.direction);
        if b > 0.0 {
            return None;
        }
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let t = -b - disc.sqrt();
        if t > cast.max_distance {
            return None;
        }
        let swept = cast.origin + cast.direction * t;
        let normal = (swept - self.center).normalize_or_zero();
        Some(RayHit {
            point: self.center + normal * self.radius,
            distance: t,
            collider: self.collider,
        })
    }
}

/// Sphere-only collision scene rebuilt from a snapshot every tick.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    colliders: Vec<SphereCollider>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            colliders: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, center: Vec3, radius: f32, collider: ColliderRef) {
        self.colliders.push(SphereCollider {
            center,
            radius,
            collider,
        });
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Colliders in `mask` that intersect the given sphere.
    pub fn overlapping(
        &self,
        center: Vec3,
        radius: f32,
        mask: LayerMask,
    ) -> impl Iterator<Item = &SphereCollider> + '_ {
        self.colliders.iter().filter(move |s| {
            let reach = s.radius + radius;
            mask.contains(LayerMask::of(s.collider))
                && (s.center - center).length_squared() < reach * reach
        })
    }
}

impl Physics for Scene {
    fn sphere_cast(&self, cast: &SphereCast) -> Option<RayHit> {
        self.colliders
            .iter()
            .filter(|s| cast.mask.contains(LayerMask::of(s.collider)))
            .filter(|s| Some(s.collider) != cast.ignore)
            .filter_map(|s| s.sweep(cast))
            .min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal))
    }

    fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        mask: LayerMask,
        ignore: Option<ColliderRef>,
    ) -> Option<ColliderRef> {
        self.overlapping(center, radius, mask)
            .map(|s| s.collider)
            .find(|c| Some(*c) != ignore)
    }
}
