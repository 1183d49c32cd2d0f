//! Static per-level configuration table

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Highest configured level
pub const MAX_LEVEL: u32 = 15;

/// Target time gap between the reference and the next event, in years
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeGap {
    pub base: f64,
    pub variance: f64,
    pub minimum: f64,
}

/// Difficulty band an event should fall in at this level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyRange {
    pub min: i32,
    pub max: i32,
}

impl DifficultyRange {
    /// Ideal difficulty for this band (rounded-up midpoint)
    #[inline]
    pub fn ideal(&self) -> f64 {
        ((self.min + self.max) as f64 / 2.0).ceil()
    }
}

/// Points awarded per correct answer at this level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelScoring {
    pub base_points: i32,
    pub streak_multiplier: f64,
    pub time_multiplier: f64,
    pub combo_threshold: u32,
}

/// Level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level: u32,
    pub name: String,
    /// Correct answers required to clear the level
    pub events_needed: u32,
    pub time_gap: TimeGap,
    pub difficulty: DifficultyRange,
    pub scoring: LevelScoring,
    pub points_reward: i32,
}

#[allow(clippy::too_many_arguments)]
fn level(
    level: u32,
    name: &str,
    events_needed: u32,
    (base, variance, minimum): (f64, f64, f64),
    (min, max): (i32, i32),
    (base_points, streak_multiplier, time_multiplier, combo_threshold): (i32, f64, f64, u32),
    points_reward: i32,
) -> LevelConfig {
    LevelConfig {
        level,
        name: name.to_string(),
        events_needed,
        time_gap: TimeGap { base, variance, minimum },
        difficulty: DifficultyRange { min, max },
        scoring: LevelScoring {
            base_points,
            streak_multiplier,
            time_multiplier,
            combo_threshold,
        },
        points_reward,
    }
}

/// Level table, indexed by `level - 1`
pub static LEVEL_CONFIGS: Lazy<Vec<LevelConfig>> = Lazy::new(|| {
    vec![
        level(1, "Novice", 5, (320.0, 180.0, 150.0), (1, 1), (100, 1.0, 1.0, 2), 200),
        level(2, "Explorer", 6, (300.0, 160.0, 130.0), (1, 2), (110, 1.1, 1.05, 2), 250),
        level(3, "Initiate", 7, (260.0, 140.0, 110.0), (1, 3), (120, 1.2, 1.1, 3), 300),
        level(4, "Time Traveller", 8, (350.0, 150.0, 150.0), (2, 3), (130, 1.2, 1.15, 3), 350),
        level(5, "Chronicler", 9, (300.0, 100.0, 100.0), (2, 4), (140, 1.3, 1.2, 4), 400),
        level(6, "Amateur Historian", 10, (250.0, 100.0, 75.0), (3, 4), (150, 1.4, 1.25, 4), 450),
        level(7, "Enlightened Historian", 11, (200.0, 75.0, 50.0), (3, 5), (160, 1.5, 1.3, 5), 500),
        level(8, "Master of Time", 12, (150.0, 75.0, 50.0), (2, 5), (170, 1.6, 1.35, 5), 550),
        level(9, "Scholar", 13, (125.0, 50.0, 40.0), (3, 6), (180, 1.7, 1.4, 6), 600),
        level(10, "Expert Historian", 14, (100.0, 50.0, 30.0), (4, 6), (190, 1.8, 1.45, 6), 650),
        level(11, "Grand Historian", 15, (80.0, 40.0, 25.0), (4, 7), (200, 1.9, 1.5, 7), 700),
        level(12, "Legendary Historian", 16, (60.0, 30.0, 20.0), (5, 7), (210, 2.0, 1.55, 7), 750),
        level(13, "Master Historian", 17, (40.0, 20.0, 15.0), (5, 7), (220, 2.1, 1.6, 8), 800),
        level(14, "Oracle of Time", 18, (20.0, 10.0, 10.0), (6, 7), (230, 2.2, 1.65, 8), 850),
        // Boss tier: effectively never cleared
        level(15, "Keeper of Epochs", 10_000, (15.0, 5.0, 5.0), (6, 7), (240, 2.3, 1.7, 9), 900),
    ]
});

/// Look up the configuration for a level (1-based)
#[inline]
pub fn level_config(level: u32) -> Option<&'static LevelConfig> {
    let index = level.checked_sub(1)?;
    LEVEL_CONFIGS.get(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_level_configured() {
        for lvl in 1..=MAX_LEVEL {
            let config = level_config(lvl).unwrap();
            assert_eq!(config.level, lvl);
            assert!(config.time_gap.base > 0.0);
            assert!(config.difficulty.min <= config.difficulty.max);
        }
    }

    #[test]
    fn test_out_of_range_levels() {
        assert!(level_config(0).is_none());
        assert!(level_config(MAX_LEVEL + 1).is_none());
    }

    #[test]
    fn test_boss_tier_unreachable() {
        assert_eq!(level_config(15).unwrap().events_needed, 10_000);
    }

    #[test]
    fn test_ideal_difficulty() {
        assert_eq!(level_config(1).unwrap().difficulty.ideal(), 1.0);
        assert_eq!(level_config(5).unwrap().difficulty.ideal(), 3.0);
        assert_eq!(level_config(14).unwrap().difficulty.ideal(), 7.0);
    }
}
