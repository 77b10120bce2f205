use glam::Vec3;
use starfighter_shared::*;

use crate::physics::{Physics, SphereCast};

#[derive(Debug, Clone, Copy)]
pub struct Bullet {
    pub shooter: AgentId,
    pub team: Team,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Remaining lifetime in simulated seconds.
    pub ttl: f32,
}

impl Bullet {
    fn new(shooter: AgentId, team: Team, position: Vec3, forward: Vec3) -> Self {
        let mut b = Self {
            shooter,
            team,
            position,
            velocity: Vec3::ZERO,
            ttl: 0.0,
        };
        b.rearm(shooter, team, position, forward);
        b
    }

    fn rearm(&mut self, shooter: AgentId, team: Team, position: Vec3, forward: Vec3) {
        self.shooter = shooter;
        self.team = team;
        self.position = position + forward * BULLET_SPAWN_OFFSET;
        self.velocity = forward * BULLET_SPEED;
        self.ttl = BULLET_LIFETIME_SECS;
    }
}

/// Live bullets plus a free list of spent records.
#[derive(Debug, Clone, Default)]
pub struct BulletPool {
    active: Vec<Bullet>,
    free: Vec<Bullet>,
}

impl BulletPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shoot(&mut self, shooter: AgentId, team: Team, position: Vec3, forward: Vec3) {
        let bullet = match self.free.pop() {
            Some(mut slot) => {
                slot.rearm(shooter, team, position, forward);
                slot
            }
            None => Bullet::new(shooter, team, position, forward),
        };
        self.active.push(bullet);
    }

    /// Move every bullet forward by `dt` and resolve those that hit something
    /// or ran out of time. Each shot resolves exactly once. A bullet already
    /// inside a collider hits it without moving.
    pub fn advance<P: Physics + ?Sized>(&mut self, dt: f32, physics: &P) -> Vec<ShotResolution> {
        let mut resolved = Vec::new();
        let mut i = 0;
        while i < self.active.len() {
            let b = &mut self.active[i];
            let own = Some(ColliderRef::Agent(b.shooter));

            let hit = match physics.overlap_sphere(b.position, BULLET_RADIUS, LayerMask::ALL, own) {
                Some(collider) => Some(collider),
                None => {
                    let step = dt.min(b.ttl);
                    let speed = b.velocity.length();
                    let travel = speed * step;
                    let swept = if travel > 0.0 {
                        physics.sphere_cast(&SphereCast {
                            origin: b.position,
                            radius: BULLET_RADIUS,
                            direction: b.velocity / speed,
                            max_distance: travel,
                            mask: LayerMask::ALL,
                            ignore: own,
                        })
                    } else {
                        None
                    };
                    b.position += b.velocity * step;
                    b.ttl -= dt;
                    swept.map(|h| h.collider)
                }
            };

            let outcome = match hit {
                Some(collider) => Some(ShotOutcome::Hit(collider)),
                None if b.ttl <= 0.0 => Some(ShotOutcome::TimedOut),
                None => None,
            };

            match outcome {
                Some(outcome) => {
                    resolved.push(ShotResolution {
                        shooter: b.shooter,
                        outcome,
                    });
                    let spent = self.active.swap_remove(i);
                    self.free.push(spent);
                }
                None => i += 1,
            }
        }
        resolved
    }

    pub fn active(&self) -> &[Bullet] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Time out every live bullet at once.
    pub fn expire_all(&mut self) -> Vec<ShotResolution> {
        let resolved = self
            .active
            .iter()
            .map(|b| ShotResolution {
                shooter: b.shooter,
                outcome: ShotOutcome::TimedOut,
            })
            .collect();
        self.free.append(&mut self.active);
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Scene;

    #[test]
    fn test_spawn_offset_and_speed() {
        let mut pool = BulletPool::new();
        pool.shoot(AgentId(0), Team::A, Vec3::ZERO, Vec3::Z);
        let b = pool.active()[0];
        assert_eq!(b.position, Vec3::new(0.0, 0.0, BULLET_SPAWN_OFFSET));
        assert_eq!(b.velocity, Vec3::new(0.0, 0.0, BULLET_SPEED));
        assert_eq!(b.ttl, BULLET_LIFETIME_SECS);
    }

    #[test]
    fn test_timeout_resolves_once() {
        let mut pool = BulletPool::new();
        let scene = Scene::new();
        pool.shoot(AgentId(0), Team::A, Vec3::ZERO, Vec3::Z);

        let mut events = Vec::new();
        for _ in 0..50 {
            events.extend(pool.advance(DT, &scene));
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].shooter, AgentId(0));
        assert_eq!(events[0].outcome, ShotOutcome::TimedOut);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_timeout_takes_lifetime() {
        let mut pool = BulletPool::new();
        let scene = Scene::new();
        pool.shoot(AgentId(0), Team::A, Vec3::ZERO, Vec3::Z);
        // 0.25 s at 50 Hz: still alive after 12 ticks, gone on the 13th.
        for tick in 0..12 {
            assert!(pool.advance(DT, &scene).is_empty(), "resolved early on tick {}", tick);
        }
        assert_eq!(pool.advance(DT, &scene).len(), 1);
    }

    #[test]
    fn test_hit_reports_collider() {
        let mut scene = Scene::new();
        scene.push(Vec3::new(0.0, 0.0, 60.0), SHIP_RADIUS, ColliderRef::Agent(AgentId(1)));
        let mut pool = BulletPool::new();
        pool.shoot(AgentId(0), Team::A, Vec3::ZERO, Vec3::Z);

        let mut events = Vec::new();
        for _ in 0..5 {
            events.extend(pool.advance(DT, &scene));
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].outcome, ShotOutcome::Hit(ColliderRef::Agent(AgentId(1))));
    }

    #[test]
    fn test_shooter_is_ignored() {
        let mut scene = Scene::new();
        // Shooter body sits a little ahead of the muzzle.
        scene.push(Vec3::new(0.0, 0.0, 10.0), SHIP_RADIUS, ColliderRef::Agent(AgentId(0)));
        scene.push(Vec3::new(0.0, 0.0, 30.0), 2.0, ColliderRef::Asteroid(7));
        let mut pool = BulletPool::new();
        pool.shoot(AgentId(0), Team::A, Vec3::ZERO, Vec3::Z);

        let events = pool.advance(DT, &scene);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].outcome, ShotOutcome::Hit(ColliderRef::Asteroid(7)));
    }

    #[test]
    fn test_point_blank_hit() {
        let mut scene = Scene::new();
        scene.push(Vec3::ZERO, SHIP_RADIUS, ColliderRef::Agent(AgentId(0)));
        // Muzzle at z = 3 is already inside this hull.
        scene.push(Vec3::new(0.0, 0.0, 4.0), SHIP_RADIUS, ColliderRef::Agent(AgentId(1)));
        let mut pool = BulletPool::new();
        pool.shoot(AgentId(0), Team::A, Vec3::ZERO, Vec3::Z);

        let events = pool.advance(DT, &scene);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].outcome, ShotOutcome::Hit(ColliderRef::Agent(AgentId(1))));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_expire_all_resolves_each_shot() {
        let mut pool = BulletPool::new();
        pool.shoot(AgentId(0), Team::A, Vec3::ZERO, Vec3::Z);
        pool.shoot(AgentId(1), Team::B, Vec3::ZERO, Vec3::X);

        let events = pool.expire_all();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.outcome == ShotOutcome::TimedOut));
        assert!(pool.is_empty());
        assert_eq!(pool.free.len(), 2);
        assert!(pool.advance(DT, &Scene::new()).is_empty());
    }

    #[test]
    fn test_records_are_reused() {
        let mut pool = BulletPool::new();
        let scene = Scene::new();
        pool.shoot(AgentId(0), Team::A, Vec3::ZERO, Vec3::Z);
        for _ in 0..20 {
            pool.advance(DT, &scene);
        }
        assert_eq!(pool.free.len(), 1);
        pool.shoot(AgentId(1), Team::B, Vec3::ZERO, Vec3::X);
        assert!(pool.free.is_empty());
        assert_eq!(pool.len(), 1);
    }
}
