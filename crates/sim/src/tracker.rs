use glam::Vec3;
use starfighter_shared::util::{normalize_distance, pow_int, sigmoid_vec, to_polar};
use starfighter_shared::*;

use crate::physics::RigidBody;
use crate::observation::Snapshot;

/// Opponent block when no rival is known.
pub const NEUTRAL_OPPONENT_BLOCK: [f32; OPPONENT_OBS_SIZE] = [
    0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, // front
    -1.0, // has front
    1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, // rear
];

/// Opponent block emitted by agents that never track opponents.
pub const PLACEHOLDER_OPPONENT_BLOCK: [f32; OPPONENT_OBS_SIZE] = [
    0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, // front
    1.0, // has front
    1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, // rear
];

const NEUTRAL_FRONT: [f32; FRONT_OBS_SIZE] = [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
const NEUTRAL_REAR: [f32; REAR_OBS_SIZE] = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];

/// One rival as seen from the observer this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opponent {
    pub agent: AgentId,
    pub sqr_distance: f32,
    /// World-space unit direction from observer to rival.
    pub direction: Vec3,
    /// `observer_forward · direction`
    pub dir_dot: f32,
}

impl Opponent {
    fn new(agent: AgentId) -> Self {
        Self {
            agent,
            sqr_distance: f32::INFINITY,
            direction: Vec3::ZERO,
            dir_dot: 0.0,
        }
    }

    fn update(&mut self, fwd: Vec3, delta: Vec3) {
        self.sqr_distance = delta.length_squared();
        self.direction = delta.normalize_or_zero();
        self.dir_dot = fwd.dot(self.direction);
    }
}

/// Front and rear targets picked this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Selection {
    pub front: Option<Opponent>,
    pub rear: Option<Opponent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerReading {
    pub values: [f32; OPPONENT_OBS_SIZE],
    pub reward: f32,
    /// Extra forward acceleration factor for the next action.
    pub boost: f32,
    pub selection: Selection,
}

impl TrackerReading {
    pub fn neutral() -> Self {
        Self {
            values: NEUTRAL_OPPONENT_BLOCK,
            reward: 0.0,
            boost: 0.0,
            selection: Selection::default(),
        }
    }
}

/// Ranks rivals by distance and keeps a sticky front target.
#[derive(Debug, Clone)]
pub struct OpponentTracker {
    opponents: Vec<Opponent>,
    current: Option<AgentId>,
}

impl OpponentTracker {
    pub fn new(rivals: &[AgentId]) -> Self {
        Self {
            opponents: rivals.iter().copied().map(Opponent::new).collect(),
            current: rivals.first().copied(),
        }
    }

    pub fn current(&self) -> Option<AgentId> {
        self.current
    }

    pub fn rival_count(&self) -> usize {
        self.opponents.len()
    }

    /// Refresh every rival from the snapshot and sort nearest first.
    fn rank(&mut self, me: &RigidBody, snapshot: &Snapshot) {
        let fwd = me.forward();
        for opp in &mut self.opponents {
            match snapshot.agent(opp.agent) {
                Some(rival) => opp.update(fwd, rival.body.position - me.position),
                None => *opp = Opponent::new(opp.agent),
            }
        }
        self.opponents
            .sort_by(|a, b| a.sqr_distance.partial_cmp(&b.sqr_distance).unwrap_or(std::cmp::Ordering::Equal));
    }

    /// Pick front/rear targets from the ranked list, applying hysteresis to
    /// the front target.
    fn select(&mut self) -> Selection {
        let mut selection = Selection::default();
        for opp in &self.opponents {
            if opp.dir_dot > 0.0 {
                if selection.front.is_none() {
                    selection.front = Some(*opp);
                }
            } else if opp.dir_dot < 0.0 && selection.rear.is_none() {
                selection.rear = Some(*opp);
            }
            if selection.front.is_some() && selection.rear.is_some() {
                break;
            }
        }

        if let Some(candidate) = selection.front {
            let current = self
                .current
                .and_then(|id| self.opponents.iter().find(|o| o.agent == id))
                .copied();
            match current {
                // Keep following the current target if that needs less
                // steering, even though another rival is now closer.
                Some(cur)
                    if candidate.dir_dot < cur.dir_dot
                        && cur.sqr_distance < FOLLOW_MAX_SQR_DISTANCE =>
                {
                    selection.front = Some(cur);
                }
                _ => self.current = Some(candidate.agent),
            }
        }
        selection
    }

    /// Build the opponent block and its shaping reward.
    ///
    /// `scaled_local_velocity` is the observer's own local velocity times
    /// `VELOCITY_SCALE`; `detected` is the agent body the sensor saw straight
    /// ahead this tick, if any.
    pub fn observe(
        &mut self,
        me: &RigidBody,
        scaled_local_velocity: Vec3,
        detected: Option<ColliderRef>,
        snapshot: &Snapshot,
    ) -> TrackerReading {
        if self.opponents.is_empty() {
            return TrackerReading::neutral();
        }

        self.rank(me, snapshot);
        let selection = self.select();

        let mut values = [0.0f32; OPPONENT_OBS_SIZE];
        let mut reward = 0.0;
        let mut boost = 0.0;

        let front = selection
            .front
            .and_then(|opp| snapshot.agent(opp.agent).map(|rival| (opp, rival.body)));
        match front {
            Some((opp, rival)) => {
                let out = &mut values[..FRONT_OBS_SIZE];
                out[0] = match detected {
                    None => 0.0,
                    Some(c) if c == ColliderRef::Agent(opp.agent) => 1.0,
                    Some(_) => -1.0,
                };
                let direction = me.localize(opp.direction);
                write_relative(&mut out[1..], me, &opp, direction, &rival);

                let follow = pow_int(direction.z, FOLLOW_REWARD_EXP);
                reward += scaled_local_velocity.z * VELOCITY_REWARD_FACTOR * follow;
                boost = pow_int(direction.z, BOOST_EXP) * BOOST_FACTOR;
            }
            None => values[..FRONT_OBS_SIZE].copy_from_slice(&NEUTRAL_FRONT),
        }

        values[FRONT_OBS_SIZE] = if front.is_some() { 1.0 } else { -1.0 };

        let rear = selection
            .rear
            .and_then(|opp| snapshot.agent(opp.agent).map(|rival| (opp, rival.body)));
        let out = &mut values[FRONT_OBS_SIZE + 1..];
        match rear {
            Some((opp, rival)) => {
                let mut direction = me.localize(opp.direction);
                if front.is_none() {
                    // Negative here: nudges the agent to turn around.
                    reward += direction.z;
                }
                direction.z = -direction.z;
                write_relative(out, me, &opp, direction, &rival);
            }
            None => out.copy_from_slice(&NEUTRAL_REAR),
        }

        TrackerReading {
            values,
            reward,
            boost,
            selection,
        }
    }
}

/// distance, direction polar / 90, orientation polar / 180, squashed velocity
fn write_relative(out: &mut [f32], me: &RigidBody, opp: &Opponent, direction: Vec3, rival: &RigidBody) {
    out[0] = normalize_distance(opp.sqr_distance.sqrt());
    let (yaw, pitch) = to_polar(direction);
    out[1] = yaw / 90.0;
    out[2] = pitch / 90.0;
    let (yaw, pitch) = to_polar(me.localize(rival.forward()));
    out[3] = yaw / 180.0;
    out[4] = pitch / 180.0;
    let velocity = sigmoid_vec(me.localize(rival.velocity) * VELOCITY_SCALE);
    out[5..8].copy_from_slice(&velocity.to_array());
}
