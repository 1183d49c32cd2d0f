//! Adaptive time-gap targets

use crate::config::TimeGap;

/// How much the configured gap stretches for a reference in a given era
///
/// Recent references need small gaps, far-past ones much larger gaps.
pub const fn era_multiplier(reference_year: i32) -> f64 {
    if reference_year >= 2020 {
        0.15
    } else if reference_year >= 2000 {
        0.25
    } else if reference_year >= 1900 {
        0.4
    } else if reference_year >= 1800 {
        0.7
    } else if reference_year >= 1500 {
        1.0
    } else if reference_year >= 1000 {
        2.0
    } else if reference_year >= 500 {
        3.5
    } else if reference_year >= 0 {
        5.0
    } else {
        7.5
    }
}

/// Amplification of far-past multipliers at low levels: 3.5 at level 1,
/// tapering linearly to 1 at level 7
pub fn level_decay(level: u32) -> f64 {
    let steps = level.saturating_sub(1) as f64;
    (3.5 - steps * 2.5 / 6.0).max(1.0)
}

/// Ideal gap and acceptable window for one reference, in years
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapWindow {
    pub ideal: f64,
    pub min: f64,
    pub max: f64,
}

impl GapWindow {
    pub fn adaptive(time_gap: &TimeGap, level: u32, reference_year: i32) -> Self {
        let multiplier = era_multiplier(reference_year);
        let effective = if multiplier > 1.0 {
            multiplier * level_decay(level)
        } else {
            multiplier
        };
        let ideal = time_gap.base * effective;
        let min = (time_gap.minimum * effective).max(1.0);
        let max = (min + 50.0).max((time_gap.base + time_gap.variance) * effective);
        Self { ideal, min, max }
    }

    /// Widen the window: `min × min_factor`, `max × max_factor`
    pub fn relaxed(&self, min_factor: f64, max_factor: f64) -> Self {
        Self {
            ideal: self.ideal,
            min: self.min * min_factor,
            max: self.max * max_factor,
        }
    }

    #[inline]
    pub fn contains(&self, gap_years: f64) -> bool {
        gap_years >= self.min && gap_years <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAP: TimeGap = TimeGap {
        base: 100.0,
        variance: 50.0,
        minimum: 30.0,
    };

    #[test]
    fn test_decay_curve() {
        assert_eq!(level_decay(1), 3.5);
        assert!(level_decay(4) > 1.0 && level_decay(4) < 3.5);
        assert_eq!(level_decay(7), 1.0);
        assert_eq!(level_decay(15), 1.0);
    }

    #[test]
    fn test_far_past_needs_larger_gap_at_low_level() {
        let low = GapWindow::adaptive(&GAP, 1, -300);
        let high = GapWindow::adaptive(&GAP, 10, -300);
        assert!((low.ideal - 100.0 * 7.5 * 3.5).abs() < 1e-9);
        assert!((high.ideal - 750.0).abs() < 1e-9);
    }

    #[test]
    fn test_modern_reference_shrinks_gap() {
        let window = GapWindow::adaptive(&GAP, 1, 2021);
        assert!((window.ideal - 15.0).abs() < 1e-9);
        assert!(window.min >= 1.0);
        assert!(window.max >= window.min + 50.0);
    }

    #[test]
    fn test_relaxed_window() {
        let window = GapWindow::adaptive(&GAP, 8, 1600);
        let wide = window.relaxed(0.2, 5.0);
        assert!(wide.min < window.min);
        assert!(wide.max > window.max);
        assert!(wide.contains(window.ideal));
    }
}
