use glam::{Quat, Vec3};
use starfighter_shared::*;

use crate::physics::RigidBody;

/// Fixed mass and damping of a ship hull.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipParams {
    pub mass: f32,
    pub drag: f32,
    pub angular_drag: f32,
    pub use_gravity: bool,
}

pub const SHIP_PARAMS: ShipParams = ShipParams {
    mass: SHIP_MASS,
    drag: SHIP_DRAG,
    angular_drag: SHIP_ANGULAR_DRAG,
    use_gravity: false,
};

/// Translates normalized control inputs into velocity-change impulses on a
/// single ship body.
#[derive(Debug, Clone)]
pub struct ShipShell {
    body: RigidBody,
}

impl ShipShell {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            body: RigidBody::at(position, rotation, SHIP_RADIUS),
        }
    }

    pub fn params(&self) -> &'static ShipParams {
        &SHIP_PARAMS
    }

    pub fn body(&self) -> &RigidBody {
        &self.body
    }

    pub fn accelerate(&mut self, v: f32) {
        self.body.velocity += self.body.forward() * v * ACCELERATION;
    }

    pub fn pitch(&mut self, v: f32) {
        self.body.angular_velocity += self.body.right() * v * PITCH_RATE;
    }

    /// Roll torque is applied around the forward axis, negated.
    pub fn roll(&mut self, v: f32) {
        self.body.angular_velocity += self.body.forward() * v * -ROLL_RATE;
    }

    /// Stop all linear and angular motion.
    pub fn reset(&mut self) {
        self.body.velocity = Vec3::ZERO;
        self.body.angular_velocity = Vec3::ZERO;
    }

    pub fn place(&mut self, position: Vec3, rotation: Quat) {
        self.body.position = position;
        self.body.rotation = rotation;
    }

    pub fn integrate(&mut self, dt: f32) {
        let p = &SHIP_PARAMS;
        self.body.integrate(dt, p.drag, p.angular_drag);
    }

    /// Push the hull out of a sphere it penetrates and cancel the velocity
    /// component pointing into it.
    pub fn resolve_contact(&mut self, center: Vec3, radius: f32) {
        let reach = radius + self.body.radius;
        let offset = self.body.position - center;
        let dist = offset.length();
        if dist >= reach {
            return;
        }
        let normal = if dist > f32::EPSILON { offset / dist } else { Vec3::Y };
        self.body.position = center + normal * reach;
        let into = self.body.velocity.dot(normal);
        if into < 0.0 {
            self.body.velocity -= normal * into;
        }
    }

    #[cfg(test)]
    pub(crate) fn body_mut(&mut self) -> &mut RigidBody {
        &mut self.body
    }
}
