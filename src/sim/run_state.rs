//! Run state: distance, health, difficulty and fever
//!
//! Owns every number the HUD shows. Collaborators mutate it through
//! [`RunState::apply_health_delta`] and [`RunState::add_fever_gauge`];
//! the tick drives [`RunState::advance`] and [`RunState::tick_fever`].

use serde::{Deserialize, Serialize};

use crate::config::{FeverConfig, VitalityConfig};

/// Fever state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeverState {
    Idle,
    /// Boost active for `remaining` more scaled seconds
    Active { remaining: f32 },
}

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Health ran out
    Exhausted,
    /// Player quit from the pause menu
    Quit,
}

/// Signals for presentation collaborators (HUD, camera shake, audio)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
    HealthChanged { health: f32, max_health: f32 },
    FeverGaugeChanged { gauge: f32, max_fever: f32 },
    FeverStarted,
    FeverEnded,
    LevelUp { level: u32 },
    ObstacleHit,
    GameOver { reason: GameOverReason, score: f32 },
}

/// Final numbers for the result screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Whole metres travelled
    pub distance: u32,
    pub level: u32,
    pub reason: Option<GameOverReason>,
}

#[derive(Debug, Clone)]
pub struct RunState {
    vitality: VitalityConfig,
    fever_config: FeverConfig,

    score: f32,
    health: f32,
    speed_multiplier: f32,
    base_speed_multiplier: f32,
    difficulty_level: u32,
    next_level_up_score: f32,
    fever_gauge: f32,
    fever: FeverState,
    game_over: Option<GameOverReason>,

    events: Vec<RunEvent>,
}

impl RunState {
    pub fn new(vitality: &VitalityConfig, fever: &FeverConfig) -> Self {
        Self {
            vitality: vitality.clone(),
            fever_config: fever.clone(),
            score: 0.0,
            health: vitality.max_health,
            speed_multiplier: 1.0,
            base_speed_multiplier: 1.0,
            difficulty_level: 1,
            next_level_up_score: vitality.level_up_distance,
            fever_gauge: 0.0,
            fever: FeverState::Idle,
            game_over: None,
            events: Vec::new(),
        }
    }

    /// Back to the run-start lifecycle state
    pub fn reset(&mut self) {
        *self = Self::new(&self.vitality, &self.fever_config);
    }

    /// Advance distance, health decay and difficulty by `scaled_dt`.
    ///
    /// No-op once the run is over.
    pub fn advance(&mut self, scaled_dt: f32) {
        if self.game_over.is_some() {
            return;
        }
        let scaled_dt = scaled_dt.max(0.0);

        self.score += scaled_dt * self.vitality.distance_rate;
        self.health = (self.health - scaled_dt * self.vitality.health_decay_rate)
            .clamp(0.0, self.vitality.max_health);

        if self.health <= 0.0 {
            self.finish(GameOverReason::Exhausted);
            return;
        }

        if self.score >= self.next_level_up_score {
            self.level_up();
        }
    }

    fn level_up(&mut self) {
        self.base_speed_multiplier += self.vitality.speed_step;
        self.next_level_up_score += self.vitality.level_up_distance;
        self.difficulty_level += 1;
        self.sync_speed();
        log::info!(
            "Level {} reached at {:.0}m (base speed {:.2})",
            self.difficulty_level,
            self.score,
            self.base_speed_multiplier
        );
        self.events.push(RunEvent::LevelUp {
            level: self.difficulty_level,
        });
    }

    /// speed = base, times the boost while fever is active
    fn sync_speed(&mut self) {
        self.speed_multiplier = match self.fever {
            FeverState::Active { .. } => self.base_speed_multiplier * self.fever_config.boost,
            FeverState::Idle => self.base_speed_multiplier,
        };
    }

    fn finish(&mut self, reason: GameOverReason) {
        if self.game_over.is_some() {
            return;
        }
        self.game_over = Some(reason);
        log::info!("Game over ({:?}) at {:.0}m, level {}", reason, self.score, self.difficulty_level);
        self.events.push(RunEvent::GameOver {
            reason,
            score: self.score,
        });
    }

    /// Heal (positive) or damage (negative), clamped to `[0, max_health]`.
    ///
    /// Game over is evaluated by the next [`RunState::advance`]. Ignored
    /// after the run has ended.
    pub fn apply_health_delta(&mut self, amount: f32) {
        if self.game_over.is_some() {
            return;
        }
        self.health = (self.health + amount).clamp(0.0, self.vitality.max_health);
        self.events.push(RunEvent::HealthChanged {
            health: self.health,
            max_health: self.vitality.max_health,
        });
    }

    /// Fill the fever gauge. A full gauge starts fever; while fever is
    /// active the gauge stays pinned and the call is ignored.
    pub fn add_fever_gauge(&mut self, amount: f32) {
        if self.game_over.is_some() || self.fever_active() {
            return;
        }
        let max_fever = self.fever_config.max_fever;
        self.fever_gauge = (self.fever_gauge + amount).clamp(0.0, max_fever);
        self.events.push(RunEvent::FeverGaugeChanged {
            gauge: self.fever_gauge,
            max_fever,
        });

        if self.fever_gauge >= max_fever {
            self.fever_gauge = max_fever;
            self.fever = FeverState::Active {
                remaining: self.fever_config.duration,
            };
            self.sync_speed();
            log::info!(
                "Fever started: speed {:.2} for {:.1}s",
                self.speed_multiplier,
                self.fever_config.duration
            );
            self.events.push(RunEvent::FeverStarted);
        }
    }

    /// Count down an active fever by `scaled_dt`
    pub fn tick_fever(&mut self, scaled_dt: f32) {
        if self.game_over.is_some() {
            return;
        }
        let FeverState::Active { remaining } = self.fever else {
            return;
        };

        let remaining = remaining - scaled_dt.max(0.0);
        if remaining > 0.0 {
            self.fever = FeverState::Active { remaining };
            return;
        }

        self.fever = FeverState::Idle;
        self.fever_gauge = 0.0;
        self.sync_speed();
        log::info!("Fever ended: speed back to {:.2}", self.speed_multiplier);
        self.events.push(RunEvent::FeverEnded);
        self.events.push(RunEvent::FeverGaugeChanged {
            gauge: 0.0,
            max_fever: self.fever_config.max_fever,
        });
    }

    /// End the run by player choice
    pub fn stop(&mut self) {
        self.finish(GameOverReason::Quit);
    }

    /// Queue a signal raised outside the state machine (contacts)
    pub(crate) fn push_event(&mut self, event: RunEvent) {
        self.events.push(event);
    }

    /// Take all queued signals
    pub fn drain_events(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.events)
    }

    // === Accessors ===

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.vitality.max_health
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn base_speed_multiplier(&self) -> f32 {
        self.base_speed_multiplier
    }

    pub fn difficulty_level(&self) -> u32 {
        self.difficulty_level
    }

    pub fn next_level_up_score(&self) -> f32 {
        self.next_level_up_score
    }

    pub fn fever_gauge(&self) -> f32 {
        self.fever_gauge
    }

    pub fn max_fever(&self) -> f32 {
        self.fever_config.max_fever
    }

    pub fn fever_boost(&self) -> f32 {
        self.fever_config.boost
    }

    pub fn fever(&self) -> FeverState {
        self.fever
    }

    pub fn fever_active(&self) -> bool {
        matches!(self.fever, FeverState::Active { .. })
    }

    /// Scaled seconds of fever left (0 when idle)
    pub fn fever_remaining(&self) -> f32 {
        match self.fever {
            FeverState::Active { remaining } => remaining,
            FeverState::Idle => 0.0,
        }
    }

    pub fn game_over(&self) -> bool {
        self.game_over.is_some()
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over
    }

    /// Health below the warning ratio while the run is still going
    pub fn is_low_health(&self) -> bool {
        !self.game_over() && self.health / self.vitality.max_health < self.vitality.low_health_ratio
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            distance: self.score.floor() as u32,
            level: self.difficulty_level,
            reason: self.game_over,
        }
    }
}
