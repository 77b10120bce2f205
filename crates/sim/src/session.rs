use serde::Serialize;
use starfighter_shared::*;

use crate::academy::Academy;
use crate::policy::Policy;

/// Reward totals for one agent over a whole session.
#[derive(Debug, Clone, Serialize)]
pub struct AgentTotals {
    pub arena: usize,
    pub agent: AgentId,
    pub team: Team,
    pub kind: AgentKind,
    pub pilot: String,
    pub reward: f32,
    pub shots: u32,
    pub hits: u32,
    pub collisions: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub seed: u64,
    pub steps: u64,
    pub agents: Vec<AgentTotals>,
    /// Episodes closed by the reset interval during the session.
    pub episodes: Vec<EpisodeSummary>,
}

/// Drive an academy for `steps` steps. `policies` holds one policy per agent
/// in registration order.
pub fn run_session(
    config: AcademyConfig,
    policies: &mut [Box<dyn Policy>],
    steps: u64,
) -> Result<SessionReport, SimError> {
    let seed = config.seed;
    let mut academy = Academy::new(config)?;
    if policies.len() != academy.agent_count() {
        return Err(SimError::ActionCount {
            expected: academy.agent_count(),
            got: policies.len(),
        });
    }

    let mut agents: Vec<AgentTotals> = academy
        .arenas()
        .iter()
        .flat_map(|arena| {
            arena.agents().iter().map(move |agent| (arena.index(), agent))
        })
        .zip(policies.iter())
        .map(|((arena, agent), policy)| AgentTotals {
            arena,
            agent: agent.id(),
            team: agent.team(),
            kind: agent.kind(),
            pilot: policy.name().to_string(),
            reward: 0.0,
            shots: 0,
            hits: 0,
            collisions: 0,
        })
        .collect();

    let mut observations = academy.reset();
    let mut episodes = Vec::new();

    for _ in 0..steps {
        let actions: Vec<Action> = policies
            .iter_mut()
            .zip(&observations)
            .map(|(policy, obs)| policy.act(obs))
            .collect();

        let result = academy.step(&actions)?;
        for (totals, reward) in agents.iter_mut().zip(&result.rewards) {
            totals.reward += reward;
        }
        episodes.extend(result.episodes);
        observations = result.observations;
    }

    // Closed episodes plus whatever the open ones have counted so far.
    let open = academy
        .arenas()
        .iter()
        .flat_map(|arena| arena.agents().iter().map(|agent| *agent.stats()));
    for (totals, stats) in agents.iter_mut().zip(open) {
        totals.shots = stats.shots;
        totals.hits = stats.hits;
        totals.collisions = stats.collisions;
    }
    for e in &episodes {
        if let Some(totals) = agents.iter_mut().find(|t| t.arena == e.arena && t.agent == e.agent) {
            totals.shots += e.shots;
            totals.hits += e.hits;
            totals.collisions += e.collisions;
        }
    }

    tracing::info!(steps, episodes = episodes.len(), "session finished");

    Ok(SessionReport {
        seed,
        steps: academy.step_count(),
        agents,
        episodes,
    })
}
