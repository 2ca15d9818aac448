//! Simulation aggregate
//!
//! Owns the clock, the run state and the three generators. Built once per
//! session and passed explicitly to whoever needs it (presentation layer,
//! headless runner, tests).

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::items::ItemScheduler;
use super::obstacle::ObstacleScheduler;
use super::pool::{EntityHandle, EntityKind, EntityPool};
use super::run_state::{RunEvent, RunState, RunSummary};
use crate::config::RunConfig;

/// Whether the simulation is being ticked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    Running,
    /// Only the unscaled clock advances
    Paused,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) config: RunConfig,
    /// Run seed for reproducibility
    pub(crate) seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) phase: SimPhase,
    pub(crate) clock: Clock,
    pub(crate) run: RunState,
    pub(crate) obstacles: ObstacleScheduler,
    pub(crate) health_items: ItemScheduler,
    pub(crate) fever_items: ItemScheduler,
}

impl Simulation {
    /// Build a run from `config`. An invalid config is logged and used
    /// as-is; degenerate ranges degrade to their bounds instead of failing.
    pub fn new(config: RunConfig, seed: u64) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("Running with invalid config: {e}");
        }
        let run = RunState::new(&config.vitality, &config.fever);
        let obstacles = ObstacleScheduler::new(&config.obstacles, &config.playfield);
        let health_items = ItemScheduler::new(
            EntityKind::HealthItem,
            &config.health_items,
            &config.spawn_rules,
            &config.playfield,
            config.obstacles.height,
        );
        let fever_items = ItemScheduler::new(
            EntityKind::FeverItem,
            &config.fever_items,
            &config.spawn_rules,
            &config.playfield,
            config.obstacles.height,
        );

        Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: SimPhase::Running,
            clock: Clock::new(),
            run,
            obstacles,
            health_items,
            fever_items,
        }
    }

    /// Reinitialize run state and every pool for a retry, same seed
    pub fn reset(&mut self) {
        self.reset_with_seed(self.seed);
    }

    pub fn reset_with_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.phase = SimPhase::Running;
        self.clock.reset_run();
        self.run.reset();
        self.obstacles.reset();
        self.health_items.reset();
        self.fever_items.reset();
        log::info!("Run reset (seed {})", seed);
    }

    /// Stop ticking the run. Has no effect once the run is over.
    pub fn pause(&mut self) {
        if self.phase == SimPhase::Running && !self.run.game_over() {
            self.phase = SimPhase::Paused;
            log::debug!("Paused at t={:.2}", self.clock.wall_elapsed());
        }
    }

    pub fn resume(&mut self) {
        if self.phase == SimPhase::Paused {
            self.phase = SimPhase::Running;
            log::debug!("Resumed at t={:.2}", self.clock.wall_elapsed());
        }
    }

    /// Quit the run from the pause menu: the run ends with `Quit`
    pub fn stop(&mut self) {
        self.run.stop();
    }

    /// True when the next tick will advance the run
    pub fn is_running(&self) -> bool {
        self.phase == SimPhase::Running && !self.run.game_over()
    }

    // === Commands forwarded to the run state ===

    pub fn apply_health_delta(&mut self, amount: f32) {
        self.run.apply_health_delta(amount);
    }

    pub fn add_fever_gauge(&mut self, amount: f32) {
        self.run.add_fever_gauge(amount);
    }

    pub fn drain_events(&mut self) -> Vec<RunEvent> {
        self.run.drain_events()
    }

    // === Read accessors ===

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn obstacles(&self) -> &ObstacleScheduler {
        &self.obstacles
    }

    pub fn health_items(&self) -> &ItemScheduler {
        &self.health_items
    }

    pub fn fever_items(&self) -> &ItemScheduler {
        &self.fever_items
    }

    pub fn score(&self) -> f32 {
        self.run.score()
    }

    pub fn health(&self) -> f32 {
        self.run.health()
    }

    pub fn max_health(&self) -> f32 {
        self.run.max_health()
    }

    pub fn fever_gauge(&self) -> f32 {
        self.run.fever_gauge()
    }

    pub fn max_fever(&self) -> f32 {
        self.run.max_fever()
    }

    pub fn fever_active(&self) -> bool {
        self.run.fever_active()
    }

    pub fn difficulty_level(&self) -> u32 {
        self.run.difficulty_level()
    }

    pub fn game_over(&self) -> bool {
        self.run.game_over()
    }

    pub fn summary(&self) -> RunSummary {
        self.run.summary()
    }

    /// Pool holding entities of `kind`
    pub fn pool(&self, kind: EntityKind) -> &EntityPool {
        match kind {
            EntityKind::Obstacle => self.obstacles.pool(),
            EntityKind::HealthItem => self.health_items.pool(),
            EntityKind::FeverItem => self.fever_items.pool(),
        }
    }

    pub(crate) fn pool_mut(&mut self, kind: EntityKind) -> &mut EntityPool {
        match kind {
            EntityKind::Obstacle => self.obstacles.pool_mut(),
            EntityKind::HealthItem => self.health_items.pool_mut(),
            EntityKind::FeverItem => self.fever_items.pool_mut(),
        }
    }

    /// Every active entity overlapping a player box centred on `center`
    pub fn contacts(&self, center: Vec2, reach: Vec2) -> Vec<EntityHandle> {
        [EntityKind::Obstacle, EntityKind::HealthItem, EntityKind::FeverItem]
            .into_iter()
            .flat_map(|kind| self.pool(kind).overlapping(center, reach))
            .collect()
    }
}
