use std::collections::HashSet;

use rand::SeedableRng;
use rand_pcg::Pcg64;
use starfighter_shared::*;

use crate::agent::Agent;
use crate::bullets::BulletPool;
use crate::field::AsteroidField;
use crate::observation::Snapshot;
use crate::physics::Scene;

/// Contacts stay registered while the hull is within this distance of the
/// surface, so a body resting against an asteroid is not re-penalized.
const CONTACT_SKIN: f32 = 0.05;

/// Outcome of one arena tick.
#[derive(Debug, Clone, Default)]
pub struct ArenaStep {
    /// Observations the next actions are chosen from. On an episode end these
    /// belong to the fresh episode.
    pub observations: Vec<Observation>,
    /// Final observations of the episodes that ended this tick, else empty.
    pub terminal_observations: Vec<Observation>,
    pub rewards: Vec<f32>,
    pub dones: Vec<bool>,
    pub episodes: Vec<EpisodeSummary>,
}

/// One asteroid field with the agents flying in it.
#[derive(Debug, Clone)]
pub struct Arena {
    index: usize,
    field: AsteroidField,
    agents: Vec<Agent>,
    bullets: BulletPool,
    rng: Pcg64,
}

impl Arena {
    pub fn new(index: usize, config: &ArenaConfig, seed: u64) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = Pcg64::seed_from_u64(seed);
        let field = AsteroidField::initialize(&config.field, &mut rng);

        let agents = config
            .agents
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let rivals: Vec<AgentId> = config
                    .agents
                    .iter()
                    .enumerate()
                    .filter(|(_, other)| other.team == spec.team.opponent() && other.kind == AgentKind::Advanced)
                    .map(|(j, _)| AgentId(j))
                    .collect();
                Agent::new(AgentId(i), spec, &rivals, field.center())
            })
            .collect();

        Ok(Self {
            index,
            field,
            agents,
            bullets: BulletPool::new(),
            rng,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn field(&self) -> &AsteroidField {
        &self.field
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn bullets(&self) -> &BulletPool {
        &self.bullets
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn scene(&self) -> Scene {
        let mut scene = Scene::with_capacity(self.field.len() + self.agents.len());
        self.field.add_colliders(&mut scene);
        for agent in &self.agents {
            let body = agent.body();
            scene.push(body.position, body.radius, ColliderRef::Agent(agent.id()));
        }
        scene
    }

    /// Freeze the current state for this tick's observers.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            agents: self.agents.iter().map(Agent::snapshot).collect(),
            scene: self.scene(),
        }
    }

    pub fn observe(&mut self) -> Vec<Observation> {
        let snapshot = self.snapshot();
        let field = &mut self.field;
        self.agents
            .iter_mut()
            .map(|agent| agent.observe(&snapshot, field))
            .collect()
    }

    /// Apply one action per agent, in registration order.
    pub fn act(&mut self, actions: &[Action]) {
        for (agent, action) in self.agents.iter_mut().zip(actions) {
            agent.apply_action(action, &mut self.bullets, &self.field, &mut self.rng);
        }
    }

    /// Run physics for one tick: bodies, contacts, bullets, then the field.
    pub fn advance(&mut self, dt: f32) {
        for agent in &mut self.agents {
            agent.shell_mut().integrate(dt);
        }

        self.resolve_contacts();

        let scene = self.scene();
        for event in self.bullets.advance(dt, &scene) {
            self.dispatch(event);
        }

        self.field.advance(dt);
    }

    fn resolve_contacts(&mut self) {
        let scene = self.scene();
        for agent in &mut self.agents {
            let own = ColliderRef::Agent(agent.id());
            let position = agent.body().position;
            let radius = agent.body().radius;

            let touching: HashSet<ColliderRef> = scene
                .overlapping(position, radius + CONTACT_SKIN, LayerMask::ALL)
                .map(|c| c.collider)
                .filter(|c| *c != own)
                .collect();

            for rock in scene.overlapping(position, radius, LayerMask::OBSTACLES) {
                agent.shell_mut().resolve_contact(rock.center, rock.radius);
            }

            let entered = touching.difference(&agent.contacts).count();
            for _ in 0..entered {
                agent.on_collision_enter();
            }
            agent.contacts = touching;
        }
    }

    fn dispatch(&mut self, event: ShotResolution) {
        let victim = match event.outcome {
            ShotOutcome::Hit(ColliderRef::Agent(id)) => self.agents.get(id.0).map(|a| (id, a.team())),
            _ => None,
        };
        let Some(shooter) = self.agents.get_mut(event.shooter.0) else {
            return;
        };
        if shooter.on_shot_resolved(event.outcome, victim.map(|(_, team)| team)) {
            if let Some(agent) = victim.and_then(|(id, _)| self.agents.get_mut(id.0)) {
                agent.on_hit_taken();
            }
        }
    }

    pub fn take_rewards(&mut self) -> Vec<f32> {
        self.agents.iter_mut().map(Agent::take_reward).collect()
    }

    pub fn reset_agent(&mut self, id: AgentId) {
        if let Some(agent) = self.agents.get_mut(id.0) {
            agent.respawn(&self.field, &mut self.rng);
        }
    }

    pub fn reset_field(&mut self) {
        self.field.reset_bounds();
    }

    /// Close every agent's episode and respawn it. Bullets in flight keep
    /// flying and resolve on later ticks.
    pub fn end_episodes(&mut self) -> Vec<EpisodeSummary> {
        let index = self.index;
        self.agents
            .iter_mut()
            .map(|agent| {
                let summary = agent.mark_episode_done(index);
                agent.respawn(&self.field, &mut self.rng);
                summary
            })
            .collect()
    }

    /// Respawn everything and return the first observations.
    pub fn reset(&mut self) -> Vec<Observation> {
        for event in self.bullets.expire_all() {
            self.dispatch(event);
        }
        self.reset_field();
        for agent in &mut self.agents {
            agent.mark_episode_done(self.index);
            agent.respawn(&self.field, &mut self.rng);
        }
        let observations = self.observe();
        // Shaping accrued while building the first observation is not owed to
        // any action.
        self.take_rewards();
        observations
    }

    /// One full tick. When `end_episode` is set, episodes close after the
    /// terminal observation and the respawned agents observe once more.
    pub fn step(&mut self, actions: &[Action], dt: f32, end_episode: bool) -> ArenaStep {
        self.act(actions);
        self.advance(dt);
        let observations = self.observe();
        let rewards = self.take_rewards();
        let dones = vec![end_episode; observations.len()];

        if !end_episode {
            return ArenaStep {
                observations,
                terminal_observations: Vec::new(),
                rewards,
                dones,
                episodes: Vec::new(),
            };
        }

        self.reset_field();
        let episodes = self.end_episodes();
        let fresh = self.observe();
        // Same as `reset`: shaping from the first look is not owed to an action.
        self.take_rewards();

        ArenaStep {
            observations: fresh,
            terminal_observations: observations,
            rewards,
            dones,
            episodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn open_space(agents: Vec<AgentSpec>) -> ArenaConfig {
        ArenaConfig {
            field: FieldConfig {
                asteroid_count: 0,
                ..FieldConfig::default()
            },
            agents,
        }
    }

    fn advanced(team: Team, z: f32, heading_deg: f32) -> AgentSpec {
        AgentSpec {
            kind: AgentKind::Advanced,
            team,
            spawn_offset: Vec3::new(0.0, 0.0, z),
            heading_deg,
        }
    }

    #[test]
    fn test_rivals_are_opposing_advanced_agents() {
        let mut config = ArenaConfig::dogfight(2);
        config.agents.push(AgentSpec {
            kind: AgentKind::Basic,
            team: Team::B,
            spawn_offset: Vec3::ZERO,
            heading_deg: 0.0,
        });
        let arena = Arena::new(0, &config, 7).unwrap();
        let tracker = arena.agents()[0].tracker().expect("advanced agent tracks");
        assert_eq!(tracker.rival_count(), 2);
        assert_eq!(tracker.current(), Some(AgentId(2)));
        assert!(arena.agents()[4].tracker().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = open_space(Vec::new());
        assert!(Arena::new(0, &config, 0).is_err());
    }

    #[test]
    fn test_opposing_hit_dispatches_both_rewards() {
        let config = open_space(vec![advanced(Team::A, -20.0, 0.0), advanced(Team::B, 20.0, 180.0)]);
        let mut arena = Arena::new(0, &config, 1).unwrap();
        arena.dispatch(ShotResolution {
            shooter: AgentId(0),
            outcome: ShotOutcome::Hit(ColliderRef::Agent(AgentId(1))),
        });
        let rewards = arena.take_rewards();
        assert_eq!(rewards, vec![HIT_REWARD, -HIT_REWARD]);
    }

    #[test]
    fn test_friendly_hit_spares_victim() {
        let config = open_space(vec![advanced(Team::A, -20.0, 0.0), advanced(Team::A, 20.0, 0.0)]);
        let mut arena = Arena::new(0, &config, 1).unwrap();
        arena.dispatch(ShotResolution {
            shooter: AgentId(0),
            outcome: ShotOutcome::Hit(ColliderRef::Agent(AgentId(1))),
        });
        assert_eq!(arena.take_rewards(), vec![-FRIENDLY_FIRE_PENALTY, 0.0]);
    }

    #[test]
    fn test_collision_enter_penalized_once() {
        let config = open_space(vec![advanced(Team::A, 0.0, 0.0), advanced(Team::B, 2.0, 0.0)]);
        let mut arena = Arena::new(0, &config, 1).unwrap();
        arena.agents[0].shell_mut().place(Vec3::ZERO, glam::Quat::IDENTITY);
        arena.agents[1].shell_mut().place(Vec3::new(0.0, 0.0, 2.0), glam::Quat::IDENTITY);

        arena.resolve_contacts();
        assert_eq!(arena.take_rewards(), vec![-COLLISION_PENALTY, -COLLISION_PENALTY]);

        // Still touching: no new entry.
        arena.resolve_contacts();
        assert_eq!(arena.take_rewards(), vec![0.0, 0.0]);
        assert_eq!(arena.agents()[0].stats().collisions, 1);
    }

    #[test]
    fn test_end_episodes_marks_everyone() {
        let mut arena = Arena::new(3, &ArenaConfig::dogfight(1), 11).unwrap();
        arena.reset();
        let step = arena.step(&[Action::none(), Action::none()], DT, true);
        assert_eq!(step.dones, vec![true, true]);
        assert_eq!(step.episodes.len(), 2);
        assert!(step.episodes.iter().all(|e| e.arena == 3 && e.steps == 1));
        assert_eq!(arena.field().center(), arena.field().origin());
        assert_eq!(step.terminal_observations.len(), 2);
    }

    #[test]
    fn test_episode_end_observes_respawned_agents() {
        let config = open_space(vec![advanced(Team::A, 0.0, 0.0)]);
        let mut arena = Arena::new(0, &config, 5).unwrap();
        arena.reset();
        let throttle = [Action {
            accelerate: 1.0,
            ..Action::none()
        }];
        for _ in 0..19 {
            arena.step(&throttle, DT, false);
        }
        let step = arena.step(&throttle, DT, true);

        let terminal = &step.terminal_observations[0];
        let fresh = &step.observations[0];
        // Local forward speed sits at index 2 of the self block.
        assert!(terminal.self_state()[2] > 0.0, "terminal {:?}", terminal.self_state());
        assert_eq!(arena.agents()[0].body().velocity, Vec3::ZERO);
        assert_eq!(fresh.self_state()[2], 0.0, "fresh {:?}", fresh.self_state());
        assert_ne!(terminal, fresh);
    }

    #[test]
    fn test_reset_resolves_bullets_in_flight() {
        let config = open_space(vec![advanced(Team::A, 0.0, 0.0)]);
        let mut arena = Arena::new(0, &config, 5).unwrap();
        arena.bullets.shoot(AgentId(0), Team::A, Vec3::ZERO, Vec3::Z);
        arena.reset();
        assert!(arena.bullets().is_empty());
        // Nothing left over to charge the new episode.
        for _ in 0..20 {
            let step = arena.step(&[Action::none()], DT, false);
            assert_eq!(step.rewards, vec![0.0]);
        }
    }
}
