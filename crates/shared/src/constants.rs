// Tick rate
pub const TICK_RATE: u32 = 50;
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// Episodes
pub const RESET_INTERVAL: u64 = 5000;

// Asteroid field defaults
pub const FIELD_BOUNDS_SIZE: f32 = 100.0;
pub const FIELD_ASTEROID_COUNT: usize = 200;
pub const ASTEROID_MAX_RADIUS: f32 = 10.0;
pub const ASTEROID_MAX_VELOCITY: f32 = 2.0;
pub const ASTEROID_MAX_ROTATION: f32 = 2.0; // deg/s
pub const ASTEROID_MIN_RADIUS_FRAC: f32 = 0.3;
pub const SPAWN_MAX_RETRIES: u32 = 100;

// Ship
pub const SHIP_RADIUS: f32 = 1.5;
pub const SHIP_MASS: f32 = 1000.0;
pub const SHIP_DRAG: f32 = 2.0;
pub const SHIP_ANGULAR_DRAG: f32 = 5.0;
pub const ACCELERATION: f32 = 2.0;
pub const PITCH_RATE: f32 = 1.0;
pub const ROLL_RATE: f32 = 1.0;
pub const SPAWN_RADIUS: f32 = 25.0;
pub const SPAWN_CLEAR_RADIUS: f32 = 5.0;

// Sensor fan
pub const RAY_COUNT: usize = 7;
pub const RAY_RANGE: f32 = 40.0;
pub const RAY_RADIUS: f32 = 2.0;
pub const RAY_FAN_RADIUS: f32 = 4.0;
pub const RAY_FAN_Z: f32 = -3.0;
pub const PROXIMITY_THRESHOLD: f32 = 5.0;

// Distance normalization: sigmoid((d - OFFSET) / SCALE)
pub const DISTANCE_OFFSET: f32 = 15.0;
pub const DISTANCE_SCALE: f32 = 5.0;

// Observation scaling
pub const VELOCITY_SCALE: f32 = 0.1; // measured max local z ~48 with drag 2
pub const ANGULAR_VELOCITY_SCALE: f32 = 0.5; // measured max ~7 with angular drag 5

// Opponent tracking
pub const FOLLOW_MAX_SQR_DISTANCE: f32 = 10_000.0;
pub const FOLLOW_REWARD_EXP: u32 = 4;
pub const BOOST_EXP: u32 = 16;
pub const BOOST_FACTOR: f32 = 2.0;

// Rewards
pub const VELOCITY_REWARD_FACTOR: f32 = 0.2;
pub const WASTE_AMMO_PENALTY: f32 = 0.1;
pub const FRIENDLY_FIRE_PENALTY: f32 = 0.5;
pub const HIT_REWARD: f32 = 1.0;
pub const COLLISION_PENALTY: f32 = 1.0;

// Bullets
pub const BULLET_SPEED: f32 = 1000.0;
pub const BULLET_LIFETIME_SECS: f32 = 0.25;
pub const BULLET_RADIUS: f32 = 0.1;
pub const BULLET_SPAWN_OFFSET: f32 = 3.0;

// Observation layout
pub const SELF_OBS_SIZE: usize = 6;
pub const SENSOR_OBS_SIZE: usize = RAY_COUNT * 3; // 21
pub const FRONT_OBS_SIZE: usize = 9;
pub const REAR_OBS_SIZE: usize = 8;
pub const OPPONENT_OBS_SIZE: usize = FRONT_OBS_SIZE + 1 + REAR_OBS_SIZE; // 18
pub const OBS_SIZE: usize = SELF_OBS_SIZE + SENSOR_OBS_SIZE + OPPONENT_OBS_SIZE; // 45
pub const ACTION_SIZE: usize = 4;

pub const OBS_SELF_START: usize = 0;
pub const OBS_SENSOR_START: usize = OBS_SELF_START + SELF_OBS_SIZE; // 6
pub const OBS_OPPONENT_START: usize = OBS_SENSOR_START + SENSOR_OBS_SIZE; // 27
pub const OBS_FRONT_CLEAR_SHOT: usize = OBS_OPPONENT_START; // 27
pub const OBS_FRONT_DISTANCE: usize = OBS_OPPONENT_START + 1;
pub const OBS_FRONT_DIRECTION: usize = OBS_OPPONENT_START + 2; // yaw, pitch
pub const OBS_FRONT_ORIENTATION: usize = OBS_OPPONENT_START + 4;
pub const OBS_FRONT_VELOCITY: usize = OBS_OPPONENT_START + 6;
pub const OBS_HAS_FRONT: usize = OBS_OPPONENT_START + FRONT_OBS_SIZE; // 36
pub const OBS_REAR_DISTANCE: usize = OBS_HAS_FRONT + 1;
pub const OBS_REAR_DIRECTION: usize = OBS_HAS_FRONT + 2;
pub const OBS_REAR_ORIENTATION: usize = OBS_HAS_FRONT + 4;
pub const OBS_REAR_VELOCITY: usize = OBS_HAS_FRONT + 6;
