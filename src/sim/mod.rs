//! Deterministic simulation module
//!
//! All gameplay rules live here. This module must be pure and deterministic:
//! - Time only from the tick's clock sample
//! - Seeded RNG only
//! - Stable iteration order (pool slot order)
//! - No rendering, input or platform dependencies

pub mod clock;
pub mod items;
pub mod obstacle;
pub mod placement;
pub mod pool;
pub mod run_state;
pub mod state;
pub mod tick;

pub use clock::{Clock, ClockSample};
pub use items::{ItemScheduler, ItemTick, spawn_gate_open};
pub use obstacle::{BurstState, ObstacleScheduler};
pub use placement::{Placement, PlacementSearch};
pub use pool::{EntityHandle, EntityKind, EntityPool, PooledEntity};
pub use run_state::{FeverState, GameOverReason, RunEvent, RunState, RunSummary};
pub use state::{SimPhase, Simulation};
pub use tick::{ContactEffect, TickOutcome, handle_contact, tick};
