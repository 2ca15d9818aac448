//! Obstacle generator
//!
//! The timing reference for every other generator: it never defers to
//! anyone. Difficulty shortens its interval and grows its bursts. A burst
//! is released one obstacle at a time; the next member waits until the
//! previous one has scrolled `min_burst_gap` away from the spawn edge.

use glam::Vec2;
use rand::Rng;

use super::pool::{EntityHandle, EntityKind, EntityPool};
use crate::config::{ObstacleConfig, PlayfieldConfig};

/// A burst that still has members to release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstState {
    pub remaining: u32,
    /// Most recently released member
    pub last: Option<EntityHandle>,
}

#[derive(Debug, Clone)]
pub struct ObstacleScheduler {
    config: ObstacleConfig,
    spawn_x: f32,
    pool: EntityPool,

    accumulated: f32,
    interval: f32,
    burst_size: u32,
    current_level: u32,
    burst: Option<BurstState>,
    last_fire_wall_time: Option<f64>,
}

impl ObstacleScheduler {
    pub fn new(config: &ObstacleConfig, playfield: &PlayfieldConfig) -> Self {
        let mut scheduler = Self {
            config: config.clone(),
            spawn_x: playfield.spawn_x,
            pool: EntityPool::new(EntityKind::Obstacle, config.pool_size),
            accumulated: 0.0,
            interval: config.base_interval,
            burst_size: 1,
            current_level: 1,
            burst: None,
            last_fire_wall_time: None,
        };
        scheduler.on_difficulty_changed(1);
        scheduler
    }

    /// Interval for a difficulty level: linear decrease, floored
    pub fn interval_for_level(config: &ObstacleConfig, level: u32) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        (config.base_interval - config.decrease_per_level * steps).max(config.min_interval)
    }

    /// Burst size for a difficulty level, at least 1
    pub fn burst_size_for_level(config: &ObstacleConfig, level: u32) -> u32 {
        let every = config.burst_every_levels.max(1);
        (1 + level.saturating_sub(1) / every).min(config.max_burst).max(1)
    }

    /// Recompute interval and burst size from the difficulty level
    pub fn on_difficulty_changed(&mut self, level: u32) {
        self.current_level = level.max(1);
        self.interval = Self::interval_for_level(&self.config, self.current_level);
        self.burst_size = Self::burst_size_for_level(&self.config, self.current_level);
        log::debug!(
            "Obstacle generator level {}: interval {:.2}s, burst {}",
            self.current_level,
            self.interval,
            self.burst_size
        );
    }

    /// Advance the timer and any pending burst. Returns obstacles placed this tick.
    pub fn tick<R: Rng>(&mut self, scaled_dt: f32, wall_now: f64, rng: &mut R) -> Vec<EntityHandle> {
        let mut spawned = Vec::new();
        self.accumulated += scaled_dt.max(0.0);

        if self.burst.is_some() {
            self.continue_burst(wall_now, rng, &mut spawned);
        }

        // A new burst starts only once the previous one is fully released
        if self.burst.is_none() && self.accumulated >= self.interval {
            self.accumulated = 0.0;
            self.burst = Some(BurstState {
                remaining: self.burst_size,
                last: None,
            });
            self.continue_burst(wall_now, rng, &mut spawned);
        }

        spawned
    }

    /// Release the next burst member if the previous one has cleared the gap
    fn continue_burst<R: Rng>(&mut self, wall_now: f64, rng: &mut R, spawned: &mut Vec<EntityHandle>) {
        let Some(burst) = self.burst else {
            return;
        };

        let clear = match burst.last.and_then(|h| self.pool.get(h)) {
            Some(prev) => self.spawn_x - prev.pos.x >= self.config.min_burst_gap,
            // First member, or the previous one is already gone
            None => true,
        };
        if !clear {
            return;
        }

        let lane = self.pick_lane(rng);
        match self.pool.acquire(Vec2::new(self.spawn_x, lane)) {
            Some(handle) => {
                self.last_fire_wall_time = Some(wall_now);
                spawned.push(handle);
                let remaining = burst.remaining - 1;
                self.burst = (remaining > 0).then_some(BurstState {
                    remaining,
                    last: Some(handle),
                });
            }
            None => {
                // Pool exhausted: drop the rest of this burst
                log::debug!(
                    "Obstacle pool exhausted ({} slots), skipping {} obstacle(s)",
                    self.pool.capacity(),
                    burst.remaining
                );
                self.burst = None;
            }
        }
    }

    fn pick_lane<R: Rng>(&self, rng: &mut R) -> f32 {
        match self.config.lanes.as_slice() {
            [] => 0.0,
            [only] => *only,
            lanes => lanes[rng.random_range(0..lanes.len())],
        }
    }

    /// Back to run-start state; every obstacle is recycled
    pub fn reset(&mut self) {
        self.pool.reset();
        self.accumulated = 0.0;
        self.burst = None;
        self.last_fire_wall_time = None;
        self.on_difficulty_changed(1);
    }

    pub fn last_fire_wall_time(&self) -> Option<f64> {
        self.last_fire_wall_time
    }

    pub fn active_entities(&self) -> Vec<(EntityHandle, Vec2)> {
        self.pool.active_entities()
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn burst_size(&self) -> u32 {
        self.burst_size
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn burst(&self) -> Option<BurstState> {
        self.burst
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut EntityPool {
        &mut self.pool
    }
}
