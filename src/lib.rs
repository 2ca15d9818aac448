//! Dash Runner - simulation core for a side-scrolling runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (run state, fever, pools, spawn scheduling)
//! - `config`: Data-driven run tuning, loadable from JSON
//!
//! Rendering, UI, audio and input live outside this crate. They read the
//! simulation through accessors and feed it overlap events.

pub mod config;
pub mod sim;

pub use config::{ConfigError, RunConfig};
pub use sim::{Simulation, tick};

/// Default tuning constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Frame delta cap to prevent a spiral of death after a stall
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Playfield: entities appear here...
    pub const SPAWN_X: f32 = 12.0;
    /// ...and are recycled once they pass here
    pub const DESPAWN_X: f32 = -15.0;
    /// Ground obstacle lane
    pub const GROUND_Y: f32 = -3.5;
    /// Player column (fixed, the world scrolls past)
    pub const PLAYER_X: f32 = -6.0;

    /// Nominal entity scroll speed (units per scaled second)
    pub const ENTITY_SPEED: f32 = 8.0;

    /// Vitality
    pub const MAX_HEALTH: f32 = 200.0;
    pub const HEALTH_DECAY_RATE: f32 = 3.0; // per scaled second
    pub const LOW_HEALTH_RATIO: f32 = 0.15;
    pub const OBSTACLE_DAMAGE: f32 = 20.0;
    pub const HEAL_AMOUNT: f32 = 20.0;

    /// Distance and difficulty
    pub const DISTANCE_RATE: f32 = 5.0; // metres per scaled second
    pub const LEVEL_UP_DISTANCE: f32 = 100.0;
    pub const SPEED_STEP: f32 = 0.2;

    /// Fever
    pub const MAX_FEVER: f32 = 100.0;
    pub const FEVER_AMOUNT: f32 = 10.0;
    pub const FEVER_BOOST: f32 = 1.5;
    pub const FEVER_DURATION: f32 = 5.0;

    /// Obstacle generator
    pub const OBSTACLE_POOL_SIZE: usize = 5;
    pub const OBSTACLE_BASE_INTERVAL: f32 = 2.0;
    pub const OBSTACLE_INTERVAL_DECREASE: f32 = 0.1;
    pub const OBSTACLE_MIN_INTERVAL: f32 = 0.5;
    pub const BURST_EVERY_LEVELS: u32 = 5;
    pub const MAX_BURST: u32 = 3;
    pub const MIN_BURST_GAP: f32 = 2.5;
    /// Obstacle collider height
    pub const OBSTACLE_HEIGHT: f32 = 1.0;

    /// Item generators
    pub const ITEM_POOL_SIZE: usize = 3;
    pub const HEALTH_ITEM_INTERVAL: f32 = 5.0;
    pub const FEVER_ITEM_INTERVAL: f32 = 7.0;
    pub const HEALTH_ITEM_TIMER_OFFSET: f32 = 0.3;
    pub const FEVER_ITEM_TIMER_OFFSET: f32 = 0.6;
    /// Minimum wall-time between spawns of different generators
    pub const MIN_SPAWN_GAP: f64 = 0.3;
    pub const RETRY_MARGIN: f32 = 0.05;

    /// Placement search
    pub const ITEM_MIN_Y: f32 = -2.0;
    pub const ITEM_MAX_Y: f32 = 0.77;
    pub const FALLBACK_MIN_Y: f32 = -1.0;
    pub const SAFETY_MARGIN: f32 = 0.5;
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10;
}
