//! Pickup generators (health, fever)
//!
//! Each generator runs its own timer but defers to the obstacle generator
//! and to its sibling: it never fires within `min_gap` wall-seconds of
//! their last spawn. A deferred spawn retries shortly instead of waiting a
//! full interval.

use glam::Vec2;
use rand::Rng;

use super::obstacle::ObstacleScheduler;
use super::placement::{Placement, PlacementSearch};
use super::pool::{EntityHandle, EntityKind, EntityPool};
use crate::config::{ItemConfig, PlayfieldConfig, SpawnRulesConfig};

/// True when no reference generator fired within `min_gap` of `wall_now`
pub fn spawn_gate_open(wall_now: f64, references: &[Option<f64>], min_gap: f64) -> bool {
    references
        .iter()
        .flatten()
        .all(|&last| (wall_now - last).abs() >= min_gap)
}

/// What a generator did on a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemTick {
    Waiting,
    /// Timer was due but the gate was closed
    Deferred,
    Spawned {
        handle: EntityHandle,
        placement: Placement,
    },
    /// Timer was due, gate open, but every slot is in use
    PoolExhausted,
}

#[derive(Debug, Clone)]
pub struct ItemScheduler {
    config: ItemConfig,
    spawn_x: f32,
    min_gap: f64,
    retry_margin: f32,
    search: PlacementSearch,
    pool: EntityPool,

    accumulated: f32,
    last_fire_wall_time: Option<f64>,
}

impl ItemScheduler {
    pub fn new(
        kind: EntityKind,
        config: &ItemConfig,
        rules: &SpawnRulesConfig,
        playfield: &PlayfieldConfig,
        obstacle_height: f32,
    ) -> Self {
        Self {
            config: config.clone(),
            spawn_x: playfield.spawn_x,
            min_gap: rules.min_gap,
            retry_margin: rules.retry_margin,
            search: PlacementSearch::new(rules, obstacle_height),
            pool: EntityPool::new(kind, config.pool_size),
            accumulated: config.initial_timer,
            last_fire_wall_time: None,
        }
    }

    /// Advance the timer and spawn one pickup when due and allowed.
    ///
    /// `obstacles` is the timing reference and the source of lanes to
    /// avoid; `sibling` is the other item generator.
    pub fn tick<R: Rng>(
        &mut self,
        scaled_dt: f32,
        wall_now: f64,
        obstacles: &ObstacleScheduler,
        sibling: &ItemScheduler,
        rng: &mut R,
    ) -> ItemTick {
        self.accumulated += scaled_dt.max(0.0);
        if self.accumulated < self.config.interval {
            return ItemTick::Waiting;
        }

        let references = [obstacles.last_fire_wall_time(), sibling.last_fire_wall_time()];
        if !spawn_gate_open(wall_now, &references, self.min_gap) {
            self.accumulated = self.config.interval - self.retry_margin;
            log::debug!(
                "{} spawn deferred at t={:.2}: too close to another generator",
                self.pool.kind().as_str(),
                wall_now
            );
            return ItemTick::Deferred;
        }

        let obstacle_ys: Vec<f32> = obstacles
            .active_entities()
            .into_iter()
            .map(|(_, pos)| pos.y)
            .collect();
        let placement = self.search.choose(&obstacle_ys, rng);

        self.accumulated = 0.0;
        match self.pool.acquire(Vec2::new(self.spawn_x, placement.y())) {
            Some(handle) => {
                self.last_fire_wall_time = Some(wall_now);
                log::debug!(
                    "{} spawned at y={:.2} (t={:.2})",
                    self.pool.kind().as_str(),
                    placement.y(),
                    wall_now
                );
                ItemTick::Spawned { handle, placement }
            }
            None => {
                log::debug!("{} pool exhausted, spawn skipped", self.pool.kind().as_str());
                ItemTick::PoolExhausted
            }
        }
    }

    pub fn reset(&mut self) {
        self.pool.reset();
        self.accumulated = self.config.initial_timer;
        self.last_fire_wall_time = None;
    }

    pub fn kind(&self) -> EntityKind {
        self.pool.kind()
    }

    /// Effect amount applied when the player picks this item up
    pub fn amount(&self) -> f32 {
        self.config.amount
    }

    pub fn interval(&self) -> f32 {
        self.config.interval
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    pub fn last_fire_wall_time(&self) -> Option<f64> {
        self.last_fire_wall_time
    }

    pub fn active_entities(&self) -> Vec<(EntityHandle, Vec2)> {
        self.pool.active_entities()
    }

    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut EntityPool {
        &mut self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ObstacleConfig, RunConfig};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn generators(config: &RunConfig) -> (ObstacleScheduler, ItemScheduler, ItemScheduler) {
        let obstacles = ObstacleScheduler::new(&config.obstacles, &config.playfield);
        let health = ItemScheduler::new(
            EntityKind::HealthItem,
            &config.health_items,
            &config.spawn_rules,
            &config.playfield,
            config.obstacles.height,
        );
        let fever = ItemScheduler::new(
            EntityKind::FeverItem,
            &config.fever_items,
            &config.spawn_rules,
            &config.playfield,
            config.obstacles.height,
        );
        (obstacles, health, fever)
    }

    #[test]
    fn test_spawn_gate() {
        assert!(spawn_gate_open(5.0, &[None, None], 0.3));
        assert!(spawn_gate_open(5.0, &[Some(4.6), None], 0.3));
        assert!(!spawn_gate_open(5.0, &[Some(4.8), None], 0.3));
        assert!(!spawn_gate_open(5.0, &[Some(1.0), Some(5.1)], 0.3));
    }

    #[test]
    fn test_initial_timer_offset() {
        let config = RunConfig::default();
        let (_, health, fever) = generators(&config);
        assert_eq!(health.accumulated(), config.health_items.initial_timer);
        assert_eq!(fever.accumulated(), config.fever_items.initial_timer);
    }

    #[test]
    fn test_spawns_when_due_and_clear() {
        let config = RunConfig::default();
        let (obstacles, mut health, fever) = generators(&config);
        let mut rng = Pcg32::seed_from_u64(11);

        let result = health.tick(4.8, 4.8, &obstacles, &fever, &mut rng);
        let ItemTick::Spawned { handle, placement } = result else {
            panic!("expected spawn, got {result:?}");
        };
        assert!(!placement.is_fallback());
        assert_eq!(health.last_fire_wall_time(), Some(4.8));
        assert_eq!(health.accumulated(), 0.0);
        let pos = health.pool().get(handle).unwrap().pos;
        assert_eq!(pos.x, config.playfield.spawn_x);
        assert_eq!(health.active_entities(), vec![(handle, pos)]);
    }

    #[test]
    fn test_deferred_near_obstacle_spawn() {
        let config = RunConfig {
            obstacles: ObstacleConfig {
                base_interval: 5.0,
                ..ObstacleConfig::default()
            },
            ..RunConfig::default()
        };
        let (mut obstacles, mut health, fever) = generators(&config);
        let mut rng = Pcg32::seed_from_u64(5);

        // Obstacle fires at t=5.0
        assert_eq!(obstacles.tick(5.0, 5.0, &mut rng).len(), 1);

        // Health item due at the same moment: deferred
        let result = health.tick(4.8, 5.0, &obstacles, &fever, &mut rng);
        assert_eq!(result, ItemTick::Deferred);
        let retry_at = config.health_items.interval - config.spawn_rules.retry_margin;
        assert!((health.accumulated() - retry_at).abs() < 1e-6);

        // Still inside the gap
        assert_eq!(health.tick(0.1, 5.1, &obstacles, &fever, &mut rng), ItemTick::Deferred);

        // Gap elapsed: spawns
        let result = health.tick(0.1, 5.35, &obstacles, &fever, &mut rng);
        assert!(matches!(result, ItemTick::Spawned { .. }));
    }

    #[test]
    fn test_deferred_near_sibling_spawn() {
        let config = RunConfig::default();
        let (obstacles, mut health, mut fever) = generators(&config);
        let mut rng = Pcg32::seed_from_u64(8);

        let result = fever.tick(6.5, 20.0, &obstacles, &health, &mut rng);
        assert!(matches!(result, ItemTick::Spawned { .. }));

        let result = health.tick(4.8, 20.1, &obstacles, &fever, &mut rng);
        assert_eq!(result, ItemTick::Deferred);
    }

    #[test]
    fn test_pool_exhaustion_skips_spawn() {
        let config = RunConfig {
            health_items: ItemConfig {
                pool_size: 1,
                ..ItemConfig::health()
            },
            ..RunConfig::default()
        };
        let (obstacles, mut health, fever) = generators(&config);
        let mut rng = Pcg32::seed_from_u64(2);

        assert!(matches!(
            health.tick(4.8, 4.8, &obstacles, &fever, &mut rng),
            ItemTick::Spawned { .. }
        ));
        assert_eq!(
            health.tick(5.0, 9.8, &obstacles, &fever, &mut rng),
            ItemTick::PoolExhausted
        );
        assert_eq!(health.last_fire_wall_time(), Some(4.8));
        assert_eq!(health.accumulated(), 0.0);
    }
}
