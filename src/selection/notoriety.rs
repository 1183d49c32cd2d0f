//! Era-adjusted notoriety and tier sampling

use crate::timeline::ANTIQUE_YEAR_THRESHOLD;
use rand::Rng;
use serde::Serialize;

/// Notoriety assumed for events without a value when scoring or tiering
pub const DEFAULT_NOTORIETY: i32 = 60;

/// Fame bonus compensating for sparser records of older events
#[inline]
pub const fn era_boost(year: i32) -> i32 {
    if year < ANTIQUE_YEAR_THRESHOLD {
        15
    } else if year < 1500 {
        10
    } else if year < 1800 {
        5
    } else {
        0
    }
}

/// Notoriety plus era boost, clamped to 0..=100
#[inline]
pub fn adjusted_notoriety(notoriety: Option<i32>, year: i32, missing: i32) -> i32 {
    (notoriety.unwrap_or(missing) + era_boost(year)).clamp(0, 100)
}

/// Coarse fame bucket used before fine-grained scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum NotorietyTier {
    /// Very famous, adjusted notoriety of at least 75
    Star = 1,
    /// At least 50
    Classic = 2,
    /// Anything, left to the scorer
    Any = 3,
}

impl NotorietyTier {
    #[inline]
    pub const fn min_notoriety(self) -> i32 {
        match self {
            NotorietyTier::Star => 75,
            NotorietyTier::Classic => 50,
            NotorietyTier::Any => 0,
        }
    }

    /// Next, more permissive tier
    pub const fn relaxed(self) -> Option<NotorietyTier> {
        match self {
            NotorietyTier::Star => Some(NotorietyTier::Classic),
            NotorietyTier::Classic => Some(NotorietyTier::Any),
            NotorietyTier::Any => None,
        }
    }

    #[inline]
    pub const fn number(self) -> u8 {
        self as u8
    }
}

/// Probability of each tier (star, classic, any) for a level
pub const fn tier_probabilities(level: u32) -> [f64; 3] {
    if level <= 2 {
        [0.90, 0.08, 0.02]
    } else if level <= 4 {
        [0.70, 0.22, 0.08]
    } else if level <= 6 {
        [0.50, 0.30, 0.20]
    } else if level <= 9 {
        [0.35, 0.35, 0.30]
    } else if level <= 12 {
        [0.20, 0.35, 0.45]
    } else {
        [0.10, 0.30, 0.60]
    }
}

/// Draw the target tier for this selection
pub fn sample_tier<R: Rng + ?Sized>(level: u32, rng: &mut R) -> NotorietyTier {
    let [star, classic, _] = tier_probabilities(level);
    let roll: f64 = rng.gen();
    if roll < star {
        NotorietyTier::Star
    } else if roll < star + classic {
        NotorietyTier::Classic
    } else {
        NotorietyTier::Any
    }
}
