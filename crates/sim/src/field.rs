use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use starfighter_shared::util::random_in_unit_sphere;
use starfighter_shared::*;

use crate::physics::Scene;

/// Axis-aligned box given by center and full size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub center: Vec3,
    pub size: Vec3,
}

impl Bounds {
    pub fn cube(center: Vec3, edge: f32) -> Self {
        Self {
            center,
            size: Vec3::splat(edge),
        }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }

    pub fn contains(&self, p: Vec3) -> bool {
        let (min, max) = (self.min(), self.max());
        p.cmpge(min).all() && p.cmple(max).all()
    }

    /// Re-enter through the opposite face on every axis that left the box,
    /// carrying the overflow. Points more than one box away land inside too.
    pub fn wrap(&self, mut p: Vec3) -> Vec3 {
        let (min, max) = (self.min(), self.max());
        for axis in 0..3 {
            if p[axis] < min[axis] || p[axis] > max[axis] {
                p[axis] = min[axis] + (p[axis] - min[axis]).rem_euclid(self.size[axis]);
            }
        }
        p
    }
}

/// One animated obstacle. Asteroids have no physics of their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub position: Vec3,
    /// Euler angles in degrees, applied Z first, then X, then Y.
    pub euler: Vec3,
    pub velocity: Vec3,
    /// Degrees per second per Euler axis.
    pub rotation: Vec3,
    pub radius: f32,
}

impl Asteroid {
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.euler.y.to_radians(),
            self.euler.x.to_radians(),
            self.euler.z.to_radians(),
        )
    }

    fn step(&mut self, dt: f32, bounds: &Bounds) {
        self.position = bounds.wrap(self.position + self.velocity * dt);
        let e = self.euler + self.rotation * dt;
        self.euler = Vec3::new(
            e.x.rem_euclid(360.0),
            e.y.rem_euclid(360.0),
            e.z.rem_euclid(360.0),
        );
    }
}

/// A toroidal field of drifting, tumbling asteroids.
#[derive(Debug, Clone)]
pub struct AsteroidField {
    origin: Vec3,
    bounds: Bounds,
    asteroids: Vec<Asteroid>,
    last_dt: f32,
}

impl AsteroidField {
    /// Scatter `config.asteroid_count` asteroids uniformly inside the bounds.
    pub fn initialize<R: Rng + ?Sized>(config: &FieldConfig, rng: &mut R) -> Self {
        let bounds = Bounds::cube(config.center, config.bounds_size);
        let (min, max) = (bounds.min(), bounds.max());
        let asteroids = (0..config.asteroid_count)
            .map(|_| {
                let position = Vec3::new(
                    rng.gen_range(min.x..=max.x),
                    rng.gen_range(min.y..=max.y),
                    rng.gen_range(min.z..=max.z),
                );
                let size: f32 = rng.gen::<f32>() * (1.0 - ASTEROID_MIN_RADIUS_FRAC)
                    + ASTEROID_MIN_RADIUS_FRAC;
                Asteroid {
                    position,
                    euler: Vec3::ZERO,
                    velocity: random_in_unit_sphere(rng) * config.max_velocity,
                    rotation: random_in_unit_sphere(rng) * config.max_rotation,
                    radius: size * size * config.max_radius,
                }
            })
            .collect();

        Self::from_asteroids(config.center, config.bounds_size, asteroids)
    }

    pub fn from_asteroids(origin: Vec3, bounds_size: f32, asteroids: Vec<Asteroid>) -> Self {
        Self {
            origin,
            bounds: Bounds::cube(origin, bounds_size),
            asteroids,
            last_dt: DT,
        }
    }

    /// Move and tumble every asteroid. Returns once the whole batch is done.
    pub fn advance(&mut self, dt: f32) {
        self.last_dt = dt;
        let bounds = self.bounds;
        self.asteroids
            .par_iter_mut()
            .for_each(|a| a.step(dt, &bounds));
    }

    pub fn update_bounds(&mut self, center: Vec3) {
        self.bounds.center = center;
    }

    /// Move the bounds back to the field origin and settle the asteroids into
    /// them immediately.
    pub fn reset_bounds(&mut self) {
        self.bounds = Bounds::cube(self.origin, self.bounds.size.x);
        self.advance(self.last_dt);
    }

    pub fn is_out_of_bounds(&self, pos: Vec3) -> bool {
        !self.bounds.contains(pos)
    }

    /// Sample a point within `radius` of `base` with no asteroid inside
    /// `clear_radius`. Falls back to `base` if every attempt is blocked.
    pub fn find_spawn_position<R: Rng + ?Sized>(
        &self,
        base: Vec3,
        radius: f32,
        clear_radius: f32,
        rng: &mut R,
    ) -> Vec3 {
        for _ in 0..=SPAWN_MAX_RETRIES {
            let p = base + random_in_unit_sphere(rng) * radius;
            if self.is_clear(p, clear_radius) {
                return p;
            }
        }
        tracing::warn!(?base, radius, clear_radius, "could not find spawn position");
        base
    }

    fn is_clear(&self, p: Vec3, clear_radius: f32) -> bool {
        self.asteroids.iter().all(|a| {
            let reach = a.radius + clear_radius;
            (a.position - p).length_squared() >= reach * reach
        })
    }

    pub fn add_colliders(&self, scene: &mut Scene) {
        for (i, a) in self.asteroids.iter().enumerate() {
            scene.push(a.position, a.radius, ColliderRef::Asteroid(i));
        }
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn center(&self) -> Vec3 {
        self.bounds.center
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.asteroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.asteroids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn rock(position: Vec3, velocity: Vec3) -> Asteroid {
        Asteroid {
            position,
            euler: Vec3::ZERO,
            velocity,
            rotation: Vec3::ZERO,
            radius: 1.0,
        }
    }

    #[test]
    fn test_initialize_inside_bounds() {
        let mut rng = Pcg64::seed_from_u64(1);
        let config = FieldConfig::default();
        let field = AsteroidField::initialize(&config, &mut rng);
        assert_eq!(field.len(), config.asteroid_count);
        for a in field.asteroids() {
            assert!(field.bounds().contains(a.position));
            assert!(a.velocity.length() <= config.max_velocity + 1e-4);
            assert!(a.rotation.length() <= config.max_rotation + 1e-4);
            let min_r = ASTEROID_MIN_RADIUS_FRAC * ASTEROID_MIN_RADIUS_FRAC * config.max_radius;
            assert!(a.radius >= min_r - 1e-4 && a.radius <= config.max_radius + 1e-4);
        }
    }

    #[test]
    fn test_advance_keeps_asteroids_in_bounds() {
        let mut rng = Pcg64::seed_from_u64(2);
        let config = FieldConfig {
            max_velocity: 40.0,
            ..Default::default()
        };
        let mut field = AsteroidField::initialize(&config, &mut rng);
        for tick in 0..500 {
            field.advance(DT);
            for (i, a) in field.asteroids().iter().enumerate() {
                assert!(
                    field.bounds().contains(a.position),
                    "asteroid {} left bounds at tick {}: {:?}",
                    i,
                    tick,
                    a.position
                );
            }
        }
    }

    #[test]
    fn test_wrap_carries_overflow() {
        let max_x = 50.0;
        let mut field = AsteroidField::from_asteroids(
            Vec3::ZERO,
            100.0,
            vec![rock(Vec3::new(max_x, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0))],
        );
        field.advance(0.1);
        let x = field.asteroids()[0].position.x;
        assert!((x - (-50.0 + 1.0)).abs() < 1e-4, "expected min.x + overflow, got {}", x);
    }

    #[test]
    fn test_wrap_negative_axis() {
        let mut field = AsteroidField::from_asteroids(
            Vec3::ZERO,
            100.0,
            vec![rock(Vec3::new(0.0, -49.5, 0.0), Vec3::new(0.0, -10.0, 0.0))],
        );
        field.advance(0.1);
        let y = field.asteroids()[0].position.y;
        assert!((y - 49.5).abs() < 1e-4, "got {}", y);
    }

    #[test]
    fn test_wrap_far_outside() {
        let bounds = Bounds::cube(Vec3::ZERO, 100.0);
        let p = bounds.wrap(Vec3::new(260.0, -180.0, 10.0));
        assert!((p - Vec3::new(-40.0, 20.0, 10.0)).length() < 1e-3, "got {:?}", p);
        assert!(bounds.contains(p));
    }

    #[test]
    fn test_orientation_from_euler() {
        let mut a = rock(Vec3::ZERO, Vec3::ZERO);
        a.euler = Vec3::new(0.0, 90.0, 0.0);
        let fwd = a.orientation() * Vec3::Z;
        assert!((fwd - Vec3::X).length() < 1e-5, "got {:?}", fwd);
    }

    #[test]
    fn test_rotation_accumulates_euler() {
        let mut a = rock(Vec3::ZERO, Vec3::ZERO);
        a.rotation = Vec3::new(90.0, -30.0, 0.0);
        a.euler = Vec3::new(350.0, 10.0, 0.0);
        let mut field = AsteroidField::from_asteroids(Vec3::ZERO, 100.0, vec![a]);
        field.advance(0.5);
        let e = field.asteroids()[0].euler;
        assert!((e.x - 35.0).abs() < 1e-3, "x wraps past 360, got {}", e.x);
        assert!((e.y - 355.0).abs() < 1e-3, "y wraps below 0, got {}", e.y);
    }

    #[test]
    fn test_update_and_reset_bounds() {
        let mut field = AsteroidField::from_asteroids(
            Vec3::ZERO,
            100.0,
            vec![rock(Vec3::new(40.0, 0.0, 0.0), Vec3::ZERO)],
        );
        field.update_bounds(Vec3::new(100.0, 0.0, 0.0));
        assert!(field.is_out_of_bounds(Vec3::ZERO));
        assert!(!field.is_out_of_bounds(Vec3::new(150.0, 0.0, 0.0)));
        assert!(field.is_out_of_bounds(Vec3::new(151.0, 0.0, 0.0)));
        // Contents are untouched by recentering.
        assert_eq!(field.asteroids()[0].position.x, 40.0);

        field.update_bounds(Vec3::new(200.0, 0.0, 0.0));
        field.reset_bounds();
        assert_eq!(field.center(), Vec3::ZERO);
        assert!(field.bounds().contains(field.asteroids()[0].position));
    }

    #[test]
    fn test_reset_bounds_settles_outside_asteroids() {
        let mut field = AsteroidField::from_asteroids(
            Vec3::ZERO,
            100.0,
            vec![rock(Vec3::new(0.0, 0.0, 0.0), Vec3::ZERO)],
        );
        field.update_bounds(Vec3::new(80.0, 0.0, 0.0));
        field.advance(DT);
        // x = 0 is below min.x = 30, so it wrapped forward.
        assert!((field.asteroids()[0].position.x - 100.0).abs() < 1e-4);

        field.reset_bounds();
        assert!((field.asteroids()[0].position.x).abs() < 1e-4);
    }

    #[test]
    fn test_spawn_position_is_clear() {
        let mut rng = Pcg64::seed_from_u64(3);
        let field = AsteroidField::initialize(&FieldConfig::default(), &mut rng);
        let base = Vec3::new(5.0, -5.0, 0.0);
        let p = field.find_spawn_position(base, 25.0, 5.0, &mut rng);
        assert!((p - base).length() <= 25.0 + 1e-4);
        if p != base {
            assert!(field.is_clear(p, 5.0));
        }
    }

    #[test]
    fn test_spawn_position_falls_back_to_base() {
        let mut rng = Pcg64::seed_from_u64(4);
        let mut big = rock(Vec3::ZERO, Vec3::ZERO);
        big.radius = 1000.0;
        let field = AsteroidField::from_asteroids(Vec3::ZERO, 100.0, vec![big]);
        let base = Vec3::new(1.0, 2.0, 3.0);
        let p = field.find_spawn_position(base, 25.0, 5.0, &mut rng);
        assert_eq!(p, base);
    }

    #[test]
    fn test_empty_field_spawns_first_try() {
        let mut rng = Pcg64::seed_from_u64(5);
        let field = AsteroidField::from_asteroids(Vec3::ZERO, 100.0, Vec::new());
        assert!(field.is_empty());
        let p = field.find_spawn_position(Vec3::ZERO, 0.0, 5.0, &mut rng);
        assert_eq!(p, Vec3::ZERO);
    }
}
