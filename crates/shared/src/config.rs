use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{AgentKind, SimError, Team};

/// Asteroid field parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Field origin; bounds return here on reset.
    pub center: Vec3,
    /// Edge length of the cubic bounds.
    pub bounds_size: f32,
    pub asteroid_count: usize,
    pub max_radius: f32,
    pub max_velocity: f32,
    /// Degrees per second.
    pub max_rotation: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            bounds_size: crate::FIELD_BOUNDS_SIZE,
            asteroid_count: crate::FIELD_ASTEROID_COUNT,
            max_radius: crate::ASTEROID_MAX_RADIUS,
            max_velocity: crate::ASTEROID_MAX_VELOCITY,
            max_rotation: crate::ASTEROID_MAX_ROTATION,
        }
    }
}

/// One agent registration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AgentSpec {
    pub kind: AgentKind,
    pub team: Team,
    /// Spawn point relative to the field center.
    #[serde(default)]
    pub spawn_offset: Vec3,
    /// Initial heading around +Y, degrees.
    #[serde(default)]
    pub heading_deg: f32,
}

impl AgentSpec {
    pub fn spawn_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.heading_deg.to_radians())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    #[serde(default)]
    pub field: FieldConfig,
    pub agents: Vec<AgentSpec>,
}

impl ArenaConfig {
    /// One basic agent alone in a field, for obstacle-avoidance training.
    pub fn obstacle_course() -> Self {
        Self {
            field: FieldConfig::default(),
            agents: vec![AgentSpec {
                kind: AgentKind::Basic,
                team: Team::A,
                spawn_offset: Vec3::ZERO,
                heading_deg: 0.0,
            }],
        }
    }

    /// Two teams of advanced agents facing each other across the field.
    pub fn dogfight(per_team: usize) -> Self {
        let mut agents = Vec::with_capacity(per_team * 2);
        for (team, z, heading) in [(Team::A, -20.0, 0.0), (Team::B, 20.0, 180.0)] {
            for i in 0..per_team {
                let x = (i as f32 - (per_team as f32 - 1.0) / 2.0) * 10.0;
                agents.push(AgentSpec {
                    kind: AgentKind::Advanced,
                    team,
                    spawn_offset: Vec3::new(x, 0.0, z),
                    heading_deg: heading,
                });
            }
        }
        Self {
            field: FieldConfig::default(),
            agents,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let f = &self.field;
        if !(f.bounds_size > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "bounds_size must be positive, got {}",
                f.bounds_size
            )));
        }
        if f.max_radius < 0.0 || f.max_velocity < 0.0 || f.max_rotation < 0.0 {
            return Err(SimError::InvalidConfig(
                "asteroid radius, velocity and rotation limits must be non-negative".into(),
            ));
        }
        if self.agents.is_empty() {
            return Err(SimError::InvalidConfig("arena has no agents".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcademyConfig {
    pub seed: u64,
    /// Steps between forced resets of every field and episode.
    pub reset_interval: u64,
    /// Simulated seconds per step.
    pub dt: f32,
    pub arenas: Vec<ArenaConfig>,
}

impl Default for AcademyConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            reset_interval: crate::RESET_INTERVAL,
            dt: crate::DT,
            arenas: vec![ArenaConfig::dogfight(2)],
        }
    }
}

impl AcademyConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        let config: AcademyConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.arenas.is_empty() {
            return Err(SimError::InvalidConfig("no arenas configured".into()));
        }
        if self.reset_interval == 0 {
            return Err(SimError::InvalidConfig("reset_interval must be > 0".into()));
        }
        if !(self.dt > 0.0) {
            return Err(SimError::InvalidConfig(format!("dt must be positive, got {}", self.dt)));
        }
        for arena in &self.arenas {
            arena.validate()?;
        }
        Ok(())
    }

    pub fn agent_count(&self) -> usize {
        self.arenas.iter().map(|a| a.agents.len()).sum()
    }
}
