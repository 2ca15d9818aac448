//! Per-frame simulation step
//!
//! Fixed order, one clock sample shared by everyone:
//! clock -> run state -> obstacles -> health items -> fever items -> motion.
//! Item generators run after the obstacle generator so their gate sees an
//! obstacle fired this very tick.

use super::clock::ClockSample;
use super::items::ItemTick;
use super::pool::{EntityHandle, EntityKind};
use super::run_state::RunEvent;
use super::state::Simulation;

/// What happened during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub clock: ClockSample,
    /// False when paused or after game over
    pub advanced: bool,
    pub obstacles_spawned: Vec<EntityHandle>,
    pub health_item: ItemTick,
    pub fever_item: ItemTick,
    /// Entities recycled at the trailing edge
    pub despawned: usize,
}

impl TickOutcome {
    fn idle(clock: ClockSample) -> Self {
        Self {
            clock,
            advanced: false,
            obstacles_spawned: Vec::new(),
            health_item: ItemTick::Waiting,
            fever_item: ItemTick::Waiting,
            despawned: 0,
        }
    }
}

/// Effect of the player touching an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactEffect {
    Damaged { amount: f32 },
    Healed { amount: f32 },
    FeverGained { amount: f32 },
}

/// Advance the simulation by `wall_dt` real seconds
pub fn tick(sim: &mut Simulation, wall_dt: f32) -> TickOutcome {
    let running = sim.is_running();
    let clock = sim.clock.advance(wall_dt, sim.run.speed_multiplier(), running);
    if !running {
        return TickOutcome::idle(clock);
    }

    // Run state first: schedulers must see this tick's level and speed
    sim.run.advance(clock.scaled_dt);
    sim.run.tick_fever(clock.scaled_dt);
    if sim.run.game_over() {
        return TickOutcome {
            advanced: true,
            ..TickOutcome::idle(clock)
        };
    }

    let level = sim.run.difficulty_level();
    if level != sim.obstacles.current_level() {
        sim.obstacles.on_difficulty_changed(level);
    }

    let obstacles_spawned = sim.obstacles.tick(clock.scaled_dt, clock.wall_now, &mut sim.rng);
    let health_item = sim.health_items.tick(
        clock.scaled_dt,
        clock.wall_now,
        &sim.obstacles,
        &sim.fever_items,
        &mut sim.rng,
    );
    let fever_item = sim.fever_items.tick(
        clock.scaled_dt,
        clock.wall_now,
        &sim.obstacles,
        &sim.health_items,
        &mut sim.rng,
    );

    // scaled_dt already carries the speed multiplier
    let dx = sim.config.playfield.entity_speed * clock.scaled_dt;
    let despawn_x = sim.config.playfield.despawn_x;
    let despawned = sim.obstacles.pool_mut().advance(dx, despawn_x)
        + sim.health_items.pool_mut().advance(dx, despawn_x)
        + sim.fever_items.pool_mut().advance(dx, despawn_x);

    TickOutcome {
        clock,
        advanced: true,
        obstacles_spawned,
        health_item,
        fever_item,
        despawned,
    }
}

/// Apply a player overlap with `handle` and consume the entity.
///
/// Returns `None` for entities that are no longer active (already consumed
/// on an earlier overlap frame) and after game over.
pub fn handle_contact(sim: &mut Simulation, handle: EntityHandle) -> Option<ContactEffect> {
    if sim.run.game_over() || !sim.pool(handle.kind).is_active(handle) {
        return None;
    }
    sim.pool_mut(handle.kind).release(handle);

    let effect = match handle.kind {
        EntityKind::Obstacle => {
            let amount = sim.config.obstacles.damage;
            sim.run.apply_health_delta(-amount);
            sim.run.push_event(RunEvent::ObstacleHit);
            ContactEffect::Damaged { amount }
        }
        EntityKind::HealthItem => {
            let amount = sim.health_items.amount();
            sim.run.apply_health_delta(amount);
            ContactEffect::Healed { amount }
        }
        EntityKind::FeverItem => {
            let amount = sim.fever_items.amount();
            sim.run.add_fever_gauge(amount);
            ContactEffect::FeverGained { amount }
        }
    };
    log::debug!("Player touched {}: {:?}", handle.kind.as_str(), effect);
    Some(effect)
}

impl Simulation {
    /// See [`tick`]
    pub fn tick(&mut self, wall_dt: f32) -> TickOutcome {
        tick(self, wall_dt)
    }

    /// See [`handle_contact`]
    pub fn handle_contact(&mut self, handle: EntityHandle) -> Option<ContactEffect> {
        handle_contact(self, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ObstacleConfig, RunConfig, SpawnRulesConfig, VitalityConfig};
    use crate::consts::*;
    use crate::sim::run_state::GameOverReason;
    use glam::Vec2;

    fn sim() -> Simulation {
        Simulation::new(RunConfig::default(), 12345)
    }

    fn assert_speed_invariant(sim: &Simulation) {
        let run = sim.run();
        let factor = if run.fever_active() { run.fever_boost() } else { 1.0 };
        assert!((run.speed_multiplier() - run.base_speed_multiplier() * factor).abs() < 1e-4);
    }

    #[test]
    fn test_tick_advances_score_and_health() {
        let mut sim = sim();
        let outcome = sim.tick(1.0);
        assert!(outcome.advanced);
        assert!((sim.score() - DISTANCE_RATE).abs() < 1e-5);
        assert!((sim.health() - (MAX_HEALTH - HEALTH_DECAY_RATE)).abs() < 1e-4);
    }

    #[test]
    fn test_tick_pause() {
        let mut sim = sim();
        sim.tick(0.5);
        let score = sim.score();

        sim.pause();
        let outcome = sim.tick(3.0);
        assert!(!outcome.advanced);
        assert_eq!(outcome.clock.scaled_dt, 0.0);
        assert_eq!(sim.score(), score);
        assert!((sim.clock().unscaled_elapsed() - 3.5).abs() < 1e-6);
        assert!((sim.clock().wall_elapsed() - 0.5).abs() < 1e-6);

        sim.resume();
        assert!(sim.tick(0.5).advanced);
        assert!(sim.score() > score);
    }

    #[test]
    fn test_obstacles_spawn_and_scroll() {
        let mut sim = sim();
        let mut spawned = None;
        for _ in 0..130 {
            let outcome = sim.tick(SIM_DT);
            if let Some(&handle) = outcome.obstacles_spawned.first() {
                spawned = Some(handle);
                break;
            }
        }
        let handle = spawned.expect("obstacle should spawn within ~2s");
        let x0 = sim.pool(EntityKind::Obstacle).get(handle).unwrap().pos.x;

        sim.tick(0.1);
        let x1 = sim.pool(EntityKind::Obstacle).get(handle).unwrap().pos.x;
        assert!((x0 - x1 - ENTITY_SPEED * 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_entities_recycled_at_trailing_edge() {
        let mut sim = sim();
        let handle = sim.obstacles.pool_mut().acquire(Vec2::new(DESPAWN_X + 0.1, GROUND_Y)).unwrap();
        let outcome = sim.tick(0.1);
        assert!(outcome.despawned >= 1);
        assert!(!sim.pool(EntityKind::Obstacle).is_active(handle));
    }

    #[test]
    fn test_contacts_apply_once() {
        let mut sim = sim();
        let obstacle = sim.obstacles.pool_mut().acquire(Vec2::new(PLAYER_X, GROUND_Y)).unwrap();

        let effect = sim.handle_contact(obstacle);
        assert_eq!(effect, Some(ContactEffect::Damaged { amount: OBSTACLE_DAMAGE }));
        assert_eq!(sim.health(), MAX_HEALTH - OBSTACLE_DAMAGE);

        // Second overlap frame: already consumed
        assert_eq!(sim.handle_contact(obstacle), None);
        assert_eq!(sim.health(), MAX_HEALTH - OBSTACLE_DAMAGE);
        assert!(sim.drain_events().contains(&RunEvent::ObstacleHit));

        let heal = sim.health_items.pool_mut().acquire(Vec2::new(PLAYER_X, 0.0)).unwrap();
        assert_eq!(sim.handle_contact(heal), Some(ContactEffect::Healed { amount: HEAL_AMOUNT }));
        assert_eq!(sim.health(), MAX_HEALTH);

        let fever = sim.fever_items.pool_mut().acquire(Vec2::new(PLAYER_X, 0.0)).unwrap();
        sim.handle_contact(fever);
        assert_eq!(sim.fever_gauge(), FEVER_AMOUNT);
    }

    #[test]
    fn test_contacts_found_by_player_box() {
        let mut sim = sim();
        let obstacle = sim.obstacles.pool_mut().acquire(Vec2::new(PLAYER_X + 0.2, GROUND_Y)).unwrap();
        sim.fever_items.pool_mut().acquire(Vec2::new(PLAYER_X, 0.5)).unwrap();

        let found = sim.contacts(Vec2::new(PLAYER_X, GROUND_Y), Vec2::new(0.5, 0.8));
        assert_eq!(found, vec![obstacle]);
    }

    #[test]
    fn test_game_over_freezes_simulation() {
        let mut sim = sim();
        sim.apply_health_delta(-MAX_HEALTH);
        sim.tick(SIM_DT);
        assert!(sim.game_over());
        assert_eq!(sim.summary().reason, Some(GameOverReason::Exhausted));

        let score = sim.score();
        let outcome = sim.tick(10.0);
        assert!(!outcome.advanced);
        assert_eq!(sim.score(), score);
        assert!(sim.obstacles().active_entities().is_empty());

        let obstacle = sim.obstacles.pool_mut().acquire(Vec2::ZERO).unwrap();
        assert_eq!(sim.handle_contact(obstacle), None);
    }

    #[test]
    fn test_stop_ends_run() {
        let mut sim = sim();
        sim.tick(1.0);
        sim.pause();
        sim.stop();
        assert!(sim.game_over());
        assert_eq!(sim.summary().reason, Some(GameOverReason::Quit));
        assert_eq!(sim.summary().distance, 5);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut sim = sim();
        for _ in 0..600 {
            sim.tick(SIM_DT);
        }
        sim.add_fever_gauge(MAX_FEVER);
        sim.stop();

        sim.reset();
        assert!(!sim.game_over());
        assert!(sim.is_running());
        assert_eq!(sim.score(), 0.0);
        assert_eq!(sim.health(), MAX_HEALTH);
        assert!(!sim.fever_active());
        assert_eq!(sim.difficulty_level(), 1);
        assert_eq!(sim.clock().wall_elapsed(), 0.0);
        assert!(sim.obstacles().active_entities().is_empty());
        assert!(sim.health_items().active_entities().is_empty());
        assert!(sim.fever_items().active_entities().is_empty());
        assert_eq!(sim.obstacles().last_fire_wall_time(), None);
    }

    #[test]
    fn test_collapsed_item_band_keeps_spawning() {
        let config = RunConfig {
            spawn_rules: SpawnRulesConfig {
                item_min_y: 0.77,
                item_max_y: 0.77,
                ..SpawnRulesConfig::default()
            },
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());

        let mut sim = Simulation::new(config, 1);
        let mut spawned = 0;
        for _ in 0..600 {
            let outcome = sim.tick(SIM_DT);
            if let ItemTick::Spawned { placement, .. } = outcome.health_item {
                assert_eq!(placement.y(), 0.77);
                spawned += 1;
            }
        }
        assert!(spawned > 0);
    }

    #[test]
    fn test_determinism() {
        let mut a = sim();
        let mut b = sim();
        for _ in 0..1200 {
            let oa = a.tick(SIM_DT);
            let ob = b.tick(SIM_DT);
            assert_eq!(oa, ob);
        }
        assert_eq!(a.score(), b.score());
        assert_eq!(a.obstacles().active_entities(), b.obstacles().active_entities());
    }

    #[test]
    fn test_difficulty_reaches_obstacle_scheduler() {
        let config = RunConfig {
            vitality: VitalityConfig {
                level_up_distance: 5.0,
                health_decay_rate: 0.0,
                ..VitalityConfig::default()
            },
            obstacles: ObstacleConfig {
                base_interval: 2.0,
                decrease_per_level: 0.1,
                min_interval: 0.5,
                ..ObstacleConfig::default()
            },
            ..RunConfig::default()
        };
        let mut sim = Simulation::new(config, 1);
        while sim.difficulty_level() < 20 {
            sim.tick(SIM_DT);
            assert_speed_invariant(&sim);
        }
        sim.tick(SIM_DT);
        assert_eq!(sim.obstacles().current_level(), sim.difficulty_level());
        assert!(sim.obstacles().interval() >= 0.5);
        if sim.difficulty_level() >= 16 {
            assert_eq!(sim.obstacles().interval(), 0.5);
        }
    }

    #[test]
    fn test_spawn_gate_holds_over_long_run() {
        let config = RunConfig {
            vitality: VitalityConfig {
                health_decay_rate: 0.0,
                ..VitalityConfig::default()
            },
            ..RunConfig::default()
        };
        let min_gap = config.spawn_rules.min_gap;
        let mut sim = Simulation::new(config, 777);

        let mut item_spawns = 0;
        for _ in 0..(60 * 120) {
            let outcome = sim.tick(SIM_DT);
            let now = outcome.clock.wall_now;
            let obstacle_fire = sim.obstacles().last_fire_wall_time();

            if matches!(outcome.health_item, ItemTick::Spawned { .. }) {
                item_spawns += 1;
                if let Some(t) = obstacle_fire {
                    assert!((now - t).abs() >= min_gap);
                }
                if let Some(t) = sim.fever_items().last_fire_wall_time() {
                    assert!((now - t).abs() >= min_gap);
                }
            }
            if matches!(outcome.fever_item, ItemTick::Spawned { .. }) {
                item_spawns += 1;
                if let Some(t) = obstacle_fire {
                    assert!((now - t).abs() >= min_gap);
                }
            }
        }
        assert!(item_spawns > 10);
    }
}
