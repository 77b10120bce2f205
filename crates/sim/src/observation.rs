use glam::Vec3;
use starfighter_shared::*;

use crate::physics::{RigidBody, Scene};

/// Published state of one agent for the current tick.
#[derive(Debug, Clone, Copy)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub team: Team,
    pub kind: AgentKind,
    pub body: RigidBody,
}

/// Frozen view of an arena that every agent observes from during a tick.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub agents: Vec<AgentSnapshot>,
    pub scene: Scene,
}

impl Snapshot {
    pub fn agent(&self, id: AgentId) -> Option<&AgentSnapshot> {
        self.agents.get(id.0).filter(|a| a.id == id)
    }
}

/// Sequential writer for the fixed-layout observation vector.
#[derive(Debug, Clone)]
pub struct ObsWriter {
    data: [f32; OBS_SIZE],
    cursor: usize,
}

impl Default for ObsWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ObsWriter {
    pub fn new() -> Self {
        Self {
            data: [0.0; OBS_SIZE],
            cursor: 0,
        }
    }

    pub fn push(&mut self, v: f32) {
        self.data[self.cursor] = v;
        self.cursor += 1;
    }

    pub fn push_slice(&mut self, values: &[f32]) {
        self.data[self.cursor..self.cursor + values.len()].copy_from_slice(values);
        self.cursor += values.len();
    }

    pub fn push_vec3(&mut self, v: Vec3) {
        self.push_slice(&v.to_array());
    }

    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn finish(self) -> Observation {
        debug_assert_eq!(self.cursor, OBS_SIZE, "observation written short");
        Observation { data: self.data }
    }
}
