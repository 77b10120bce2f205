use std::collections::HashSet;

use glam::{Quat, Vec3};
use rand::Rng;
use starfighter_shared::util::sigmoid_vec;
use starfighter_shared::*;

use crate::bullets::BulletPool;
use crate::field::AsteroidField;
use crate::observation::{AgentSnapshot, ObsWriter, Snapshot};
use crate::physics::RigidBody;
use crate::sensor::RaySensor;
use crate::shell::ShipShell;
use crate::tracker::{OpponentTracker, PLACEHOLDER_OPPONENT_BLOCK};

/// Per-episode counters reported in [`EpisodeSummary`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AgentStats {
    pub shots: u32,
    pub hits: u32,
    pub friendly_hits: u32,
    pub collisions: u32,
}

/// One ship plus everything it needs to observe, act and be rewarded.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    team: Team,
    kind: AgentKind,
    shell: ShipShell,
    sensor: RaySensor,
    /// Present for advanced agents only.
    tracker: Option<OpponentTracker>,
    spawn_offset: Vec3,
    spawn_rotation: Quat,
    pending_reward: f32,
    episode_reward: f32,
    steps: u64,
    boost: f32,
    /// Colliders touched during the last physics step.
    pub(crate) contacts: HashSet<ColliderRef>,
    stats: AgentStats,
}

impl Agent {
    /// `rivals` is ignored for basic agents.
    pub fn new(id: AgentId, spec: &AgentSpec, rivals: &[AgentId], field_center: Vec3) -> Self {
        let tracker = match spec.kind {
            AgentKind::Advanced => Some(OpponentTracker::new(rivals)),
            AgentKind::Basic => None,
        };
        let rotation = spec.spawn_rotation();
        Self {
            id,
            team: spec.team,
            kind: spec.kind,
            shell: ShipShell::new(field_center + spec.spawn_offset, rotation),
            sensor: RaySensor::new(),
            tracker,
            spawn_offset: spec.spawn_offset,
            spawn_rotation: rotation,
            pending_reward: 0.0,
            episode_reward: 0.0,
            steps: 0,
            boost: 0.0,
            contacts: HashSet::new(),
            stats: AgentStats::default(),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn body(&self) -> &RigidBody {
        self.shell.body()
    }

    pub fn shell(&self) -> &ShipShell {
        &self.shell
    }

    pub(crate) fn shell_mut(&mut self) -> &mut ShipShell {
        &mut self.shell
    }

    pub fn tracker(&self) -> Option<&OpponentTracker> {
        self.tracker.as_ref()
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }

    pub fn stats(&self) -> &AgentStats {
        &self.stats
    }

    pub fn episode_reward(&self) -> f32 {
        self.episode_reward
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            team: self.team,
            kind: self.kind,
            body: *self.shell.body(),
        }
    }

    pub fn add_reward(&mut self, r: f32) {
        self.pending_reward += r;
        self.episode_reward += r;
    }

    /// Reward accumulated since the last call.
    pub fn take_reward(&mut self) -> f32 {
        std::mem::take(&mut self.pending_reward)
    }

    /// Assemble this tick's observation and accrue the shaping rewards that
    /// come with it.
    ///
    /// Basic agents also recenter `field` on themselves.
    pub fn observe(&mut self, snapshot: &Snapshot, field: &mut AsteroidField) -> Observation {
        let body = *self.shell.body();
        let mut obs = ObsWriter::new();

        let scaled_local_velocity = body.localize(body.velocity) * VELOCITY_SCALE;
        obs.push_vec3(sigmoid_vec(scaled_local_velocity));
        obs.push_vec3(sigmoid_vec(
            body.localize(body.angular_velocity) * ANGULAR_VELOCITY_SCALE,
        ));

        let sensor = self
            .sensor
            .scan(&body, ColliderRef::Agent(self.id), &snapshot.scene);
        obs.push_slice(&sensor.values);
        self.add_reward(sensor.proximity_penalty);

        self.boost = 0.0;
        match self.tracker.as_mut() {
            Some(tracker) => {
                let reading =
                    tracker.observe(&body, scaled_local_velocity, sensor.detected, snapshot);
                obs.push_slice(&reading.values);
                self.boost = reading.boost;
                self.add_reward(reading.reward);
            }
            None => {
                obs.push_slice(&PLACEHOLDER_OPPONENT_BLOCK);
                self.add_reward(scaled_local_velocity.z * VELOCITY_REWARD_FACTOR);
                field.update_bounds(body.position);
            }
        }

        obs.finish()
    }

    /// Turn an action into impulses. Advanced agents may fire, and are
    /// respawned if they have left the field.
    pub fn apply_action<R: Rng + ?Sized>(
        &mut self,
        action: &Action,
        bullets: &mut BulletPool,
        field: &AsteroidField,
        rng: &mut R,
    ) {
        self.steps += 1;
        self.shell.accelerate(action.accelerate * (1.0 + self.boost));
        self.shell.pitch(action.pitch);
        self.shell.roll(action.roll);

        if self.kind == AgentKind::Basic {
            return;
        }

        if action.wants_fire() {
            let body = self.shell.body();
            bullets.shoot(self.id, self.team, body.position, body.forward());
            self.stats.shots += 1;
        }

        if field.is_out_of_bounds(self.shell.body().position) {
            tracing::debug!(agent = self.id.0, "left the field, respawning");
            self.respawn(field, rng);
        }
    }

    /// Score a resolved shot fired by this agent. `victim` is the team of the
    /// agent that was struck, if any.
    ///
    /// Returns true when the victim was an opponent and owes the matching
    /// penalty.
    pub fn on_shot_resolved(&mut self, outcome: ShotOutcome, victim: Option<Team>) -> bool {
        match (outcome, victim) {
            (ShotOutcome::Hit(ColliderRef::Agent(_)), Some(team)) if team == self.team => {
                self.stats.friendly_hits += 1;
                self.add_reward(-FRIENDLY_FIRE_PENALTY);
                false
            }
            (ShotOutcome::Hit(ColliderRef::Agent(_)), Some(_)) => {
                self.stats.hits += 1;
                self.add_reward(HIT_REWARD);
                true
            }
            // Timeouts, asteroids and anything unidentified.
            _ => {
                self.add_reward(-WASTE_AMMO_PENALTY);
                false
            }
        }
    }

    pub fn on_hit_taken(&mut self) {
        self.add_reward(-HIT_REWARD);
    }

    pub fn on_collision_enter(&mut self) {
        self.stats.collisions += 1;
        self.add_reward(-COLLISION_PENALTY);
    }

    /// Move back to a clear spot near the spawn point, at rest.
    pub fn respawn<R: Rng + ?Sized>(&mut self, field: &AsteroidField, rng: &mut R) {
        let position = field.find_spawn_position(
            field.center() + self.spawn_offset,
            SPAWN_RADIUS,
            SPAWN_CLEAR_RADIUS,
            rng,
        );
        self.shell.reset();
        self.shell.place(position, self.spawn_rotation);
        self.contacts.clear();
        self.boost = 0.0;
    }

    /// Close the current episode and start counting a new one.
    pub fn mark_episode_done(&mut self, arena: usize) -> EpisodeSummary {
        let summary = EpisodeSummary {
            arena,
            agent: self.id,
            team: self.team,
            steps: self.steps,
            reward: self.episode_reward,
            shots: self.stats.shots,
            hits: self.stats.hits,
            friendly_hits: self.stats.friendly_hits,
            collisions: self.stats.collisions,
        };
        self.steps = 0;
        self.episode_reward = 0.0;
        self.stats = AgentStats::default();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Scene;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn spec(kind: AgentKind, team: Team) -> AgentSpec {
        AgentSpec {
            kind,
            team,
            spawn_offset: Vec3::ZERO,
            heading_deg: 0.0,
        }
    }

    fn empty_field() -> AsteroidField {
        AsteroidField::from_asteroids(Vec3::ZERO, FIELD_BOUNDS_SIZE, Vec::new())
    }

    fn solo_snapshot(agent: &Agent) -> Snapshot {
        let mut scene = Scene::new();
        scene.push(agent.body().position, SHIP_RADIUS, ColliderRef::Agent(agent.id()));
        Snapshot {
            agents: vec![agent.snapshot()],
            scene,
        }
    }

    #[test]
    fn test_basic_observation_layout() {
        let mut agent = Agent::new(AgentId(0), &spec(AgentKind::Basic, Team::A), &[], Vec3::ZERO);
        let mut field = empty_field();
        let snap = solo_snapshot(&agent);
        let obs = agent.observe(&snap, &mut field);

        assert_eq!(obs.data.len(), OBS_SIZE);
        assert_eq!(obs.self_state(), &[0.0; SELF_OBS_SIZE]);
        for ray in obs.sensor().chunks(3) {
            assert_eq!(ray, &[0.0, 0.0, 1.0]);
        }
        assert_eq!(obs.opponents(), &PLACEHOLDER_OPPONENT_BLOCK);
        assert_eq!(obs.data[OBS_HAS_FRONT], 1.0);
    }

    #[test]
    fn test_basic_rewards_speed_and_recenters_field() {
        let mut agent = Agent::new(
            AgentId(0),
            &spec(AgentKind::Basic, Team::A),
            &[],
            Vec3::new(10.0, 0.0, 0.0),
        );
        agent.shell_mut().body_mut().velocity = Vec3::new(0.0, 0.0, 20.0);
        let mut field = empty_field();
        let snap = solo_snapshot(&agent);
        agent.observe(&snap, &mut field);

        let reward = agent.take_reward();
        assert!((reward - 2.0 * VELOCITY_REWARD_FACTOR).abs() < 1e-5, "reward {}", reward);
        assert_eq!(field.center(), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(agent.take_reward(), 0.0);
    }

    #[test]
    fn test_advanced_without_rivals_is_neutral() {
        let mut agent = Agent::new(AgentId(0), &spec(AgentKind::Advanced, Team::A), &[], Vec3::ZERO);
        agent.shell_mut().body_mut().velocity = Vec3::new(0.0, 0.0, 20.0);
        let mut field = empty_field();
        let snap = solo_snapshot(&agent);
        let obs = agent.observe(&snap, &mut field);

        assert_eq!(obs.data[OBS_HAS_FRONT], -1.0);
        // No base speed reward and no opponent reward.
        assert_eq!(agent.take_reward(), 0.0);
        assert_eq!(agent.boost(), 0.0);
        assert_eq!(field.center(), Vec3::ZERO);
    }

    #[test]
    fn test_boost_scales_acceleration() {
        let mut agent = Agent::new(AgentId(0), &spec(AgentKind::Advanced, Team::A), &[], Vec3::ZERO);
        agent.boost = 2.0;
        let mut rng = Pcg64::seed_from_u64(1);
        let mut bullets = BulletPool::new();
        let mut action = Action::none();
        action.accelerate = 1.0;
        agent.apply_action(&action, &mut bullets, &empty_field(), &mut rng);
        assert!((agent.body().velocity.z - 3.0 * ACCELERATION).abs() < 1e-5);
    }

    #[test]
    fn test_fire_only_for_advanced() {
        let mut rng = Pcg64::seed_from_u64(1);
        let field = empty_field();
        let mut action = Action::none();
        action.fire = 1.0;

        let mut basic = Agent::new(AgentId(0), &spec(AgentKind::Basic, Team::A), &[], Vec3::ZERO);
        let mut bullets = BulletPool::new();
        basic.apply_action(&action, &mut bullets, &field, &mut rng);
        assert!(bullets.is_empty());

        let mut advanced = Agent::new(AgentId(1), &spec(AgentKind::Advanced, Team::A), &[], Vec3::ZERO);
        advanced.apply_action(&action, &mut bullets, &field, &mut rng);
        assert_eq!(bullets.len(), 1);
        assert_eq!(advanced.stats().shots, 1);
    }

    #[test]
    fn test_out_of_bounds_respawns() {
        let mut agent = Agent::new(AgentId(0), &spec(AgentKind::Advanced, Team::A), &[], Vec3::ZERO);
        agent.shell_mut().place(Vec3::new(80.0, 0.0, 0.0), Quat::IDENTITY);
        agent.shell_mut().body_mut().velocity = Vec3::X;
        let mut rng = Pcg64::seed_from_u64(3);
        let field = empty_field();
        agent.apply_action(&Action::none(), &mut BulletPool::new(), &field, &mut rng);

        let body = agent.body();
        assert!(body.position.length() <= SPAWN_RADIUS + 1e-4, "respawned at {:?}", body.position);
        assert_eq!(body.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_shot_rewards() {
        let mut agent = Agent::new(AgentId(0), &spec(AgentKind::Advanced, Team::A), &[], Vec3::ZERO);

        assert!(!agent.on_shot_resolved(ShotOutcome::TimedOut, None));
        assert!((agent.take_reward() + WASTE_AMMO_PENALTY).abs() < 1e-6);

        assert!(!agent.on_shot_resolved(ShotOutcome::Hit(ColliderRef::Asteroid(4)), None));
        assert!((agent.take_reward() + WASTE_AMMO_PENALTY).abs() < 1e-6);

        let friend = ShotOutcome::Hit(ColliderRef::Agent(AgentId(1)));
        assert!(!agent.on_shot_resolved(friend, Some(Team::A)));
        assert!((agent.take_reward() + FRIENDLY_FIRE_PENALTY).abs() < 1e-6);

        let foe = ShotOutcome::Hit(ColliderRef::Agent(AgentId(2)));
        assert!(agent.on_shot_resolved(foe, Some(Team::B)));
        assert!((agent.take_reward() - HIT_REWARD).abs() < 1e-6);

        assert_eq!(agent.stats().hits, 1);
        assert_eq!(agent.stats().friendly_hits, 1);
    }

    #[test]
    fn test_episode_summary_resets_counters() {
        let mut agent = Agent::new(AgentId(3), &spec(AgentKind::Advanced, Team::B), &[], Vec3::ZERO);
        agent.on_collision_enter();
        agent.on_hit_taken();
        let summary = agent.mark_episode_done(2);

        assert_eq!(summary.arena, 2);
        assert_eq!(summary.agent, AgentId(3));
        assert_eq!(summary.team, Team::B);
        assert_eq!(summary.collisions, 1);
        assert!((summary.reward + COLLISION_PENALTY + HIT_REWARD).abs() < 1e-6);
        assert_eq!(agent.episode_reward(), 0.0);
        assert_eq!(*agent.stats(), AgentStats::default());
    }
}
