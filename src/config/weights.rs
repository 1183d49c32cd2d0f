//! Scoring weight profiles per level band

use serde::Serialize;

/// Weights applied to the scorer's sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weights {
    pub alpha_proximity: f64,
    pub beta_difficulty: f64,
    pub gamma_notoriety: f64,
    /// Malus points per past use of an event
    pub theta_frequency_malus: f64,
    /// Upper bound of the frequency malus
    pub theta_frequency_cap: f64,
}

/// Resolve the weight profile for a level
///
/// Four bands: up to 3, up to 8, up to 15, and everything above.
pub const fn weights_for_level(level: u32) -> Weights {
    if level <= 3 {
        Weights {
            alpha_proximity: 1.05,
            beta_difficulty: 1.0,
            gamma_notoriety: 0.45,
            theta_frequency_malus: 20.0,
            theta_frequency_cap: 450.0,
        }
    } else if level <= 8 {
        Weights {
            alpha_proximity: 1.0,
            beta_difficulty: 1.2,
            gamma_notoriety: 0.55,
            theta_frequency_malus: 18.0,
            theta_frequency_cap: 650.0,
        }
    } else if level <= 15 {
        Weights {
            alpha_proximity: 0.95,
            beta_difficulty: 1.35,
            gamma_notoriety: 0.55,
            theta_frequency_malus: 18.0,
            theta_frequency_cap: 800.0,
        }
    } else {
        Weights {
            alpha_proximity: 0.9,
            beta_difficulty: 1.6,
            gamma_notoriety: 0.5,
            theta_frequency_malus: 20.0,
            theta_frequency_cap: 900.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(weights_for_level(1), weights_for_level(3));
        assert_ne!(weights_for_level(3), weights_for_level(4));
        assert_eq!(weights_for_level(4), weights_for_level(8));
        assert_ne!(weights_for_level(8), weights_for_level(9));
        assert_eq!(weights_for_level(9), weights_for_level(15));
        assert_eq!(weights_for_level(16), weights_for_level(u32::MAX));
    }

    #[test]
    fn test_proximity_decreases_with_level() {
        let low = weights_for_level(2);
        let mid = weights_for_level(10);
        let high = weights_for_level(20);
        assert!(low.alpha_proximity > mid.alpha_proximity);
        assert!(mid.alpha_proximity > high.alpha_proximity);
        assert!(low.beta_difficulty < high.beta_difficulty);
    }
}
