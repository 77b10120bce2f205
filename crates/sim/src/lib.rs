pub mod physics;
pub mod field;
pub mod shell;
pub mod sensor;
pub mod observation;
pub mod tracker;
pub mod bullets;
pub mod agent;
pub mod arena;
pub mod academy;
pub mod policy;
pub mod pilots;
pub mod session;

pub use academy::*;
pub use agent::Agent;
pub use arena::{Arena, ArenaStep};
pub use field::{Asteroid, AsteroidField, Bounds};
pub use physics::*;
pub use policy::*;
pub use session::*;
