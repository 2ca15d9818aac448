//! Vertical placement search for pickups
//!
//! Rejection sampling: draw candidate Y values from the item band and keep
//! the first one clear of every obstacle lane in use. If nothing fits
//! after `max_attempts`, fall back to a reduced sub-range and accept the
//! small risk of overlap.

use rand::Rng;

use crate::config::SpawnRulesConfig;

/// Outcome of a placement search
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Candidate clear of every exclusion band
    Clear { y: f32, attempts: u32 },
    /// Search exhausted, sampled from the fallback sub-range
    Fallback { y: f32 },
}

impl Placement {
    pub fn y(&self) -> f32 {
        match *self {
            Placement::Clear { y, .. } | Placement::Fallback { y } => y,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Placement::Fallback { .. })
    }
}

/// Parameters of the search, borrowed from config
#[derive(Debug, Clone, Copy)]
pub struct PlacementSearch {
    pub min_y: f32,
    pub max_y: f32,
    pub fallback_min_y: f32,
    /// Half the obstacle height plus the safety margin
    pub exclusion_half_width: f32,
    pub max_attempts: u32,
    pub reference_lane_y: f32,
}

impl PlacementSearch {
    pub fn new(rules: &SpawnRulesConfig, obstacle_height: f32) -> Self {
        Self {
            min_y: rules.item_min_y,
            max_y: rules.item_max_y,
            fallback_min_y: rules.fallback_min_y,
            exclusion_half_width: obstacle_height * 0.5 + rules.safety_margin,
            max_attempts: rules.max_attempts,
            reference_lane_y: rules.reference_lane_y,
        }
    }

    /// True if `y` falls inside the exclusion band of any obstacle Y or
    /// the reference lane
    pub fn is_blocked(&self, y: f32, obstacle_ys: &[f32]) -> bool {
        obstacle_ys
            .iter()
            .chain(std::iter::once(&self.reference_lane_y))
            .any(|&obstacle_y| (y - obstacle_y).abs() <= self.exclusion_half_width)
    }

    pub fn choose<R: Rng>(&self, obstacle_ys: &[f32], rng: &mut R) -> Placement {
        for attempt in 1..=self.max_attempts {
            let y = sample(rng, self.min_y, self.max_y);
            if !self.is_blocked(y, obstacle_ys) {
                return Placement::Clear { y, attempts: attempt };
            }
        }

        let y = sample(rng, self.fallback_min_y, self.max_y);
        log::debug!(
            "Placement search exhausted after {} attempts, fallback y={:.2}",
            self.max_attempts,
            y
        );
        Placement::Fallback { y }
    }
}

/// Uniform draw from `[lo, hi)`. An empty or inverted range yields `lo`.
fn sample<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if lo < hi { rng.random_range(lo..hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn search() -> PlacementSearch {
        PlacementSearch::new(&SpawnRulesConfig::default(), 1.0)
    }

    #[test]
    fn test_default_band_clears_ground_lane() {
        let search = search();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let placement = search.choose(&[-3.5], &mut rng);
            assert_eq!(placement, Placement::Clear { y: placement.y(), attempts: 1 });
            assert!(placement.y() >= search.min_y && placement.y() < search.max_y);
        }
    }

    #[test]
    fn test_avoids_single_obstacle_in_band() {
        let search = search();
        let mut rng = Pcg32::seed_from_u64(42);
        let obstacle_ys = [-0.6];
        for _ in 0..500 {
            let placement = search.choose(&obstacle_ys, &mut rng);
            if !placement.is_fallback() {
                assert!((placement.y() - -0.6).abs() > search.exclusion_half_width);
            }
        }
    }

    #[test]
    fn test_fully_blocked_band_falls_back() {
        let search = search();
        let mut rng = Pcg32::seed_from_u64(3);
        // Lanes every unit cover the whole band
        let obstacle_ys = [-2.0, -1.0, 0.0, 1.0];
        let placement = search.choose(&obstacle_ys, &mut rng);
        assert!(placement.is_fallback());
        assert!(placement.y() >= search.fallback_min_y && placement.y() < search.max_y);
    }

    #[test]
    fn test_is_blocked_edges_inclusive() {
        let search = search();
        assert!(search.is_blocked(-1.0, &[0.0]));
        assert!(!search.is_blocked(-1.01, &[0.0]));
        assert!(search.is_blocked(-2.5, &[]));
    }

    #[test]
    fn test_empty_band_yields_lower_bound() {
        let rules = SpawnRulesConfig {
            item_min_y: 0.77,
            item_max_y: 0.77,
            fallback_min_y: 0.9,
            ..SpawnRulesConfig::default()
        };
        let search = PlacementSearch::new(&rules, 1.0);
        let mut rng = Pcg32::seed_from_u64(11);
        assert_eq!(search.choose(&[-3.5], &mut rng), Placement::Clear { y: 0.77, attempts: 1 });
        // Blocked everywhere: the inverted fallback range also degrades
        assert_eq!(search.choose(&[0.5], &mut rng), Placement::Fallback { y: 0.9 });
    }
}
