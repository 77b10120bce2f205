use rayon::prelude::*;
use serde::Serialize;
use starfighter_shared::*;

use crate::arena::{Arena, ArenaStep};

/// Flattened result of one academy step, one entry per agent across all
/// arenas in registration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StepResult {
    /// Observations for choosing the next actions. After an episode end
    /// these come from the respawned agents.
    pub observations: Vec<Observation>,
    /// Last observations of the episodes that ended this step, else empty.
    pub terminal_observations: Vec<Observation>,
    pub rewards: Vec<f32>,
    pub dones: Vec<bool>,
    /// Episodes that ended this step.
    pub episodes: Vec<EpisodeSummary>,
}

/// Drives every arena off one global step counter and forces a reset of all
/// fields and episodes every `reset_interval` steps.
#[derive(Debug)]
pub struct Academy {
    arenas: Vec<Arena>,
    step: u64,
    reset_interval: u64,
    dt: f32,
    /// Offsets of each arena's agents in the flattened action list.
    offsets: Vec<usize>,
    agent_count: usize,
}

impl Academy {
    pub fn new(config: AcademyConfig) -> Result<Self, SimError> {
        config.validate()?;
        let arenas = config
            .arenas
            .iter()
            .enumerate()
            .map(|(i, arena)| Arena::new(i, arena, config.seed.wrapping_add(i as u64)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut offsets = Vec::with_capacity(arenas.len());
        let mut agent_count = 0;
        for arena in &arenas {
            offsets.push(agent_count);
            agent_count += arena.len();
        }

        tracing::info!(
            arenas = arenas.len(),
            agents = agent_count,
            seed = config.seed,
            "academy initialized"
        );

        Ok(Self {
            arenas,
            step: 0,
            reset_interval: config.reset_interval,
            dt: config.dt,
            offsets,
            agent_count,
        })
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn agent_count(&self) -> usize {
        self.agent_count
    }

    pub fn arenas(&self) -> &[Arena] {
        &self.arenas
    }

    pub fn arena_mut(&mut self, index: usize) -> Option<&mut Arena> {
        self.arenas.get_mut(index)
    }

    /// Respawn every agent, return the fields to their origins and collect the
    /// first observations.
    pub fn reset(&mut self) -> Vec<Observation> {
        self.step = 0;
        tracing::debug!("academy reset");
        self.arenas
            .par_iter_mut()
            .map(Arena::reset)
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn step(&mut self, actions: &[Action]) -> Result<StepResult, SimError> {
        if actions.len() != self.agent_count {
            return Err(SimError::ActionCount {
                expected: self.agent_count,
                got: actions.len(),
            });
        }

        self.step += 1;
        let end_episode = self.step % self.reset_interval == 0;
        if end_episode {
            tracing::info!(step = self.step, "reset interval reached, ending all episodes");
        }

        let dt = self.dt;
        let slices: Vec<&[Action]> = self
            .arenas
            .iter()
            .zip(&self.offsets)
            .map(|(arena, &start)| &actions[start..start + arena.len()])
            .collect();

        let steps: Vec<ArenaStep> = self
            .arenas
            .par_iter_mut()
            .zip(slices)
            .map(|(arena, actions)| arena.step(actions, dt, end_episode))
            .collect();

        let mut result = StepResult {
            observations: Vec::with_capacity(self.agent_count),
            terminal_observations: Vec::new(),
            rewards: Vec::with_capacity(self.agent_count),
            dones: Vec::with_capacity(self.agent_count),
            episodes: Vec::new(),
        };
        for step in steps {
            result.observations.extend(step.observations);
            result.terminal_observations.extend(step.terminal_observations);
            result.rewards.extend(step.rewards);
            result.dones.extend(step.dones);
            result.episodes.extend(step.episodes);
        }
        Ok(result)
    }
}
