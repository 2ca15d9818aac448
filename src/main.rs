//! Dash Runner headless runner
//!
//! Plays one run at a fixed timestep with a scripted player and prints the
//! result. Usage: `dash-runner [CONFIG] [--seed N] [--seconds S]`

use std::collections::HashSet;
use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use dash_runner::consts::*;
use dash_runner::sim::{EntityHandle, EntityKind, RunEvent, Simulation};
use dash_runner::{ConfigError, RunConfig};

/// Chance the scripted player clears an obstacle
const DODGE_CHANCE: f64 = 0.85;
/// Chance the scripted player goes for a pickup
const COLLECT_CHANCE: f64 = 0.6;
/// Player collider half-extents
const PLAYER_REACH: Vec2 = Vec2::new(0.5, 0.8);
/// Pickups anywhere in the player's column are reachable with a jump
const JUMP_REACH: Vec2 = Vec2::new(0.5, 5.0);

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to encode summary: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "dash-runner")]
#[command(about = "Play one headless run with a scripted player and print the summary")]
struct Args {
    /// Run config JSON; defaults are used when omitted
    config: Option<PathBuf>,
    /// Seed for spawning and the scripted player
    #[arg(long, default_value_t = 12345)]
    seed: u64,
    /// Longest run to simulate, in seconds
    #[arg(long, default_value_t = 600.0)]
    seconds: f32,
}

/// Stand-in for the physics/input layer: turns overlaps into contacts
struct ScriptedPlayer {
    rng: Pcg32,
    /// Entities already rolled for while they pass the player
    decided: HashSet<EntityHandle>,
}

impl ScriptedPlayer {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
            decided: HashSet::new(),
        }
    }

    fn contacts(&mut self, sim: &Simulation) -> Vec<EntityHandle> {
        let center = Vec2::new(PLAYER_X, GROUND_Y);
        let mut overlapping = sim.pool(EntityKind::Obstacle).overlapping(center, PLAYER_REACH);
        overlapping.extend(sim.pool(EntityKind::HealthItem).overlapping(center, JUMP_REACH));
        overlapping.extend(sim.pool(EntityKind::FeverItem).overlapping(center, JUMP_REACH));

        self.decided.retain(|h| overlapping.contains(h));

        let mut touched = Vec::new();
        for handle in overlapping {
            if !self.decided.insert(handle) {
                continue;
            }
            let chance = match handle.kind {
                EntityKind::Obstacle => 1.0 - DODGE_CHANCE,
                EntityKind::HealthItem | EntityKind::FeverItem => COLLECT_CHANCE,
            };
            if self.rng.random_bool(chance) {
                touched.push(handle);
            }
        }
        touched
    }
}

fn log_events(events: &[RunEvent], time: f64) {
    for event in events {
        match event {
            RunEvent::ObstacleHit => log::debug!("[{time:7.2}s] hit obstacle"),
            RunEvent::FeverStarted => log::info!("[{time:7.2}s] FEVER!"),
            RunEvent::FeverEnded => log::info!("[{time:7.2}s] fever over"),
            RunEvent::LevelUp { level } => log::info!("[{time:7.2}s] level {level}"),
            RunEvent::GameOver { reason, score } => {
                log::info!("[{time:7.2}s] game over ({reason:?}) at {score:.0}m")
            }
            RunEvent::HealthChanged { .. } | RunEvent::FeverGaugeChanged { .. } => {}
        }
    }
}

fn run() -> Result<(), CliError> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    let mut sim = Simulation::new(config, args.seed);
    let mut player = ScriptedPlayer::new(args.seed);
    log::info!("Starting run: seed {}, up to {}s", args.seed, args.seconds);

    let frame_dt = SIM_DT.min(MAX_FRAME_DT);
    let max_ticks = (args.seconds / frame_dt).ceil() as u64;
    for _ in 0..max_ticks {
        sim.tick(frame_dt);
        for handle in player.contacts(&sim) {
            sim.handle_contact(handle);
        }
        log_events(&sim.drain_events(), sim.clock().wall_elapsed());

        if sim.game_over() {
            break;
        }
    }
    if !sim.game_over() {
        sim.stop();
        log_events(&sim.drain_events(), sim.clock().wall_elapsed());
    }

    let summary = sim.summary();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
