//! Run configuration
//!
//! Every balance number the simulation uses lives here. Defaults come from
//! [`crate::consts`]; a JSON file can override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating a [`RunConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Playfield geometry shared by every generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldConfig {
    /// X where new entities appear (leading edge)
    pub spawn_x: f32,
    /// Entities past this X are recycled (trailing edge)
    pub despawn_x: f32,
    /// Nominal scroll speed of every entity
    pub entity_speed: f32,
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            spawn_x: SPAWN_X,
            despawn_x: DESPAWN_X,
            entity_speed: ENTITY_SPEED,
        }
    }
}

/// Health, distance and difficulty progression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalityConfig {
    pub max_health: f32,
    /// Health lost per scaled second
    pub health_decay_rate: f32,
    /// Health ratio under which the run reports low health
    pub low_health_ratio: f32,
    /// Score gained per scaled second
    pub distance_rate: f32,
    /// Score between two level-ups
    pub level_up_distance: f32,
    /// Base speed multiplier gained per level-up
    pub speed_step: f32,
}

impl Default for VitalityConfig {
    fn default() -> Self {
        Self {
            max_health: MAX_HEALTH,
            health_decay_rate: HEALTH_DECAY_RATE,
            low_health_ratio: LOW_HEALTH_RATIO,
            distance_rate: DISTANCE_RATE,
            level_up_distance: LEVEL_UP_DISTANCE,
            speed_step: SPEED_STEP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeverConfig {
    pub max_fever: f32,
    /// Speed multiplier applied on top of the base while fever is active
    pub boost: f32,
    /// Fever length in scaled seconds
    pub duration: f32,
}

impl Default for FeverConfig {
    fn default() -> Self {
        Self {
            max_fever: MAX_FEVER,
            boost: FEVER_BOOST,
            duration: FEVER_DURATION,
        }
    }
}

/// Obstacle generator tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub pool_size: usize,
    pub base_interval: f32,
    pub decrease_per_level: f32,
    pub min_interval: f32,
    /// Burst grows by one obstacle every this many levels
    pub burst_every_levels: u32,
    pub max_burst: u32,
    /// Horizontal clearance between consecutive burst members
    pub min_burst_gap: f32,
    /// Lanes obstacles may occupy (Y of the obstacle centre)
    pub lanes: Vec<f32>,
    pub height: f32,
    /// Health removed when the player touches an obstacle
    pub damage: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            pool_size: OBSTACLE_POOL_SIZE,
            base_interval: OBSTACLE_BASE_INTERVAL,
            decrease_per_level: OBSTACLE_INTERVAL_DECREASE,
            min_interval: OBSTACLE_MIN_INTERVAL,
            burst_every_levels: BURST_EVERY_LEVELS,
            max_burst: MAX_BURST,
            min_burst_gap: MIN_BURST_GAP,
            lanes: vec![GROUND_Y],
            height: OBSTACLE_HEIGHT,
            damage: OBSTACLE_DAMAGE,
        }
    }
}

/// One pickup generator
///
/// The two item sections have different defaults, so every field is
/// required when a section is present in the JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemConfig {
    pub pool_size: usize,
    pub interval: f32,
    /// Timer value at run start, staggers the item generators
    pub initial_timer: f32,
    /// Heal amount for health pickups, gauge amount for fever pickups
    pub amount: f32,
}

impl ItemConfig {
    pub fn health() -> Self {
        Self {
            pool_size: ITEM_POOL_SIZE,
            interval: HEALTH_ITEM_INTERVAL,
            initial_timer: HEALTH_ITEM_TIMER_OFFSET,
            amount: HEAL_AMOUNT,
        }
    }

    pub fn fever() -> Self {
        Self {
            pool_size: ITEM_POOL_SIZE,
            interval: FEVER_ITEM_INTERVAL,
            initial_timer: FEVER_ITEM_TIMER_OFFSET,
            amount: FEVER_AMOUNT,
        }
    }
}

/// Cross-generator timing gate and item placement search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRulesConfig {
    /// Minimum wall-time between two different generators firing
    pub min_gap: f64,
    /// Deferred spawns retry this long (scaled) before the interval
    pub retry_margin: f32,
    pub item_min_y: f32,
    pub item_max_y: f32,
    /// Lower bound of the sub-range used when the search gives up
    pub fallback_min_y: f32,
    pub safety_margin: f32,
    pub max_attempts: u32,
    /// Lane that is always avoided, even with no obstacle on screen
    pub reference_lane_y: f32,
}

impl Default for SpawnRulesConfig {
    fn default() -> Self {
        Self {
            min_gap: MIN_SPAWN_GAP,
            retry_margin: RETRY_MARGIN,
            item_min_y: ITEM_MIN_Y,
            item_max_y: ITEM_MAX_Y,
            fallback_min_y: FALLBACK_MIN_Y,
            safety_margin: SAFETY_MARGIN,
            max_attempts: MAX_PLACEMENT_ATTEMPTS,
            reference_lane_y: GROUND_Y,
        }
    }
}

/// Complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub playfield: PlayfieldConfig,
    pub vitality: VitalityConfig,
    pub fever: FeverConfig,
    pub obstacles: ObstacleConfig,
    pub health_items: ItemConfig,
    pub fever_items: ItemConfig,
    pub spawn_rules: SpawnRulesConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            playfield: PlayfieldConfig::default(),
            vitality: VitalityConfig::default(),
            fever: FeverConfig::default(),
            obstacles: ObstacleConfig::default(),
            health_items: ItemConfig::health(),
            fever_items: ItemConfig::fever(),
            spawn_rules: SpawnRulesConfig::default(),
        }
    }
}

impl RunConfig {
    /// Parse and validate a JSON config. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded run config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("vitality.max_health", self.vitality.max_health),
            ("vitality.level_up_distance", self.vitality.level_up_distance),
            ("fever.max_fever", self.fever.max_fever),
            ("fever.boost", self.fever.boost),
            ("obstacles.base_interval", self.obstacles.base_interval),
            ("obstacles.min_interval", self.obstacles.min_interval),
            ("health_items.interval", self.health_items.interval),
            ("fever_items.interval", self.fever_items.interval),
            ("playfield.entity_speed", self.playfield.entity_speed),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::invalid(field, format!("must be > 0, got {value}")));
            }
        }

        if self.playfield.despawn_x >= self.playfield.spawn_x {
            return Err(ConfigError::invalid(
                "playfield.despawn_x",
                "must lie behind spawn_x",
            ));
        }
        if self.obstacles.pool_size == 0 {
            return Err(ConfigError::invalid("obstacles.pool_size", "must be at least 1"));
        }
        if self.obstacles.lanes.is_empty() {
            return Err(ConfigError::invalid("obstacles.lanes", "needs at least one lane"));
        }
        if self.obstacles.burst_every_levels == 0 {
            return Err(ConfigError::invalid(
                "obstacles.burst_every_levels",
                "must be at least 1",
            ));
        }

        let rules = &self.spawn_rules;
        if rules.item_min_y >= rules.item_max_y {
            return Err(ConfigError::invalid("spawn_rules.item_min_y", "must be below item_max_y"));
        }
        if rules.fallback_min_y < rules.item_min_y || rules.fallback_min_y >= rules.item_max_y {
            return Err(ConfigError::invalid(
                "spawn_rules.fallback_min_y",
                "must lie inside the item band",
            ));
        }
        for item in [&self.health_items, &self.fever_items] {
            if rules.retry_margin < 0.0 || rules.retry_margin >= item.interval {
                return Err(ConfigError::invalid(
                    "spawn_rules.retry_margin",
                    "must be in [0, item interval)",
                ));
            }
        }

        Ok(())
    }
}
