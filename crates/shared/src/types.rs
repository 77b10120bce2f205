use serde::{Deserialize, Serialize};

/// Index of an agent inside its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }
}

/// Which behaviour set an agent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Obstacle avoidance only. Emits a neutral opponent block and keeps its
    /// field centered on itself.
    Basic,
    /// Tracks opponents, shoots, and is reset when leaving the field.
    Advanced,
}

/// What a ray, bullet or contact ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderRef {
    Agent(AgentId),
    Asteroid(usize),
}

/// Collision layer bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const OBSTACLES: LayerMask = LayerMask(1 << 8);
    pub const AGENTS: LayerMask = LayerMask(1 << 9);
    pub const ALL: LayerMask = LayerMask(Self::OBSTACLES.0 | Self::AGENTS.0);

    pub fn contains(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn of(collider: ColliderRef) -> LayerMask {
        match collider {
            ColliderRef::Agent(_) => LayerMask::AGENTS,
            ColliderRef::Asteroid(_) => LayerMask::OBSTACLES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub accelerate: f32,
    pub pitch: f32,
    pub roll: f32,
    pub fire: f32,
}

impl Action {
    pub fn none() -> Self {
        Self {
            accelerate: 0.0,
            pitch: 0.0,
            roll: 0.0,
            fire: 0.0,
        }
    }

    pub fn from_raw(raw: [f32; crate::ACTION_SIZE]) -> Self {
        Self {
            accelerate: raw[0],
            pitch: raw[1],
            roll: raw[2],
            fire: raw[3],
        }
    }

    /// Build an action from an untyped slice, as handed over by a trainer.
    pub fn from_slice(raw: &[f32]) -> Result<Self, crate::SimError> {
        let raw: [f32; crate::ACTION_SIZE] = raw
            .try_into()
            .map_err(|_| crate::SimError::ActionLength {
                expected: crate::ACTION_SIZE,
                got: raw.len(),
            })?;
        Ok(Self::from_raw(raw))
    }

    pub fn to_raw(&self) -> [f32; crate::ACTION_SIZE] {
        [self.accelerate, self.pitch, self.roll, self.fire]
    }

    pub fn wants_fire(&self) -> bool {
        self.fire > 0.0
    }
}

impl Default for Action {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub data: [f32; crate::OBS_SIZE],
}

impl Observation {
    pub fn zeros() -> Self {
        Self {
            data: [0.0; crate::OBS_SIZE],
        }
    }

    pub fn self_state(&self) -> &[f32] {
        &self.data[crate::OBS_SELF_START..crate::OBS_SENSOR_START]
    }

    pub fn sensor(&self) -> &[f32] {
        &self.data[crate::OBS_SENSOR_START..crate::OBS_OPPONENT_START]
    }

    pub fn opponents(&self) -> &[f32] {
        &self.data[crate::OBS_OPPONENT_START..]
    }
}

impl serde::Serialize for Observation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.as_slice().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Observation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v: Vec<f32> = Vec::deserialize(deserializer)?;
        if v.len() != crate::OBS_SIZE {
            return Err(serde::de::Error::custom(format!(
                "expected {} floats, got {}",
                crate::OBS_SIZE,
                v.len()
            )));
        }
        let mut data = [0.0f32; crate::OBS_SIZE];
        data.copy_from_slice(&v);
        Ok(Observation { data })
    }
}

/// How a shot ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOutcome {
    TimedOut,
    Hit(ColliderRef),
}

/// Emitted exactly once per shot, tagged with the shooter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotResolution {
    pub shooter: AgentId,
    pub outcome: ShotOutcome,
}

/// Summary of one finished agent episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub arena: usize,
    pub agent: AgentId,
    pub team: Team,
    pub steps: u64,
    pub reward: f32,
    pub shots: u32,
    pub hits: u32,
    pub friendly_hits: u32,
    pub collisions: u32,
}
