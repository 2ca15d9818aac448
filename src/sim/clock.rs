//! Simulation clock
//!
//! Three views of time per tick:
//! - wall: real seconds the run has been ticking (frozen while paused)
//! - scaled: wall delta multiplied by the run speed multiplier
//! - unscaled: keeps advancing while paused or after game over, for
//!   presentation timers that live outside the simulation

/// Time values for one tick. Every component reads the same sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClockSample {
    /// Wall delta this tick (0 while not running)
    pub wall_dt: f32,
    /// Wall time since run start, after this tick
    pub wall_now: f64,
    /// `wall_dt * speed_multiplier`
    pub scaled_dt: f32,
    /// Raw delta, always advancing
    pub unscaled_dt: f32,
    pub unscaled_now: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Clock {
    wall_elapsed: f64,
    unscaled_elapsed: f64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` real seconds.
    ///
    /// When `running` is false only the unscaled view moves.
    pub fn advance(&mut self, dt: f32, speed_multiplier: f32, running: bool) -> ClockSample {
        let dt = dt.max(0.0);
        self.unscaled_elapsed += dt as f64;

        let (wall_dt, scaled_dt) = if running {
            (dt, dt * speed_multiplier)
        } else {
            (0.0, 0.0)
        };
        self.wall_elapsed += wall_dt as f64;

        ClockSample {
            wall_dt,
            wall_now: self.wall_elapsed,
            scaled_dt,
            unscaled_dt: dt,
            unscaled_now: self.unscaled_elapsed,
        }
    }

    /// Wall time since run start
    pub fn wall_elapsed(&self) -> f64 {
        self.wall_elapsed
    }

    /// Time since the clock was created, pauses included
    pub fn unscaled_elapsed(&self) -> f64 {
        self.unscaled_elapsed
    }

    /// Restart wall time for a new run. Unscaled time is never rewound.
    pub fn reset_run(&mut self) {
        self.wall_elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_time_uses_speed_multiplier() {
        let mut clock = Clock::new();
        let sample = clock.advance(0.5, 1.4, true);
        assert!((sample.scaled_dt - 0.7).abs() < 1e-6);
        assert!((sample.wall_now - 0.5).abs() < 1e-9);
        assert_eq!(sample.unscaled_dt, 0.5);
    }

    #[test]
    fn test_unscaled_time_advances_while_paused() {
        let mut clock = Clock::new();
        clock.advance(1.0, 1.0, true);
        let sample = clock.advance(2.0, 1.0, false);
        assert_eq!(sample.wall_dt, 0.0);
        assert_eq!(sample.scaled_dt, 0.0);
        assert!((sample.wall_now - 1.0).abs() < 1e-9);
        assert!((sample.unscaled_now - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_keeps_unscaled_time() {
        let mut clock = Clock::new();
        clock.advance(4.0, 1.0, true);
        clock.reset_run();
        assert_eq!(clock.wall_elapsed(), 0.0);
        assert!((clock.unscaled_elapsed() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut clock = Clock::new();
        let sample = clock.advance(-1.0, 2.0, true);
        assert_eq!(sample.scaled_dt, 0.0);
        assert_eq!(clock.unscaled_elapsed(), 0.0);
    }
}
