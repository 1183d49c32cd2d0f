//! Composite desirability score of a candidate against the reference

use super::gap::GapWindow;
use super::notoriety::{adjusted_notoriety, DEFAULT_NOTORIETY};
use crate::config::{DifficultyRange, Event, EventId, Weights};
use crate::timeline::{period_relation, DateCache, PeriodRelation};
use ahash::AHashMap;
use rand::Rng;
use serde::Serialize;

const GAP_POINTS: f64 = 35.0;
const DIFFICULTY_POINTS: f64 = 25.0;
const NOTORIETY_POINTS: f64 = 30.0;
const MAX_JITTER: f64 = 12.0;
const MAX_RECENCY_MALUS: f64 = 60.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Sub-scores of one candidate, kept for analytics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub gap: f64,
    pub difficulty: f64,
    pub notoriety: f64,
    pub context: f64,
    pub frequency_malus: f64,
    pub recency_malus: f64,
    pub jitter: f64,
    /// Multiplicative noise applied to the gap and difficulty terms
    pub random_factor: f64,
    /// Floored at 0, or negative infinity when a date is missing
    pub total: f64,
}

impl ScoreBreakdown {
    fn excluded() -> Self {
        Self {
            gap: 0.0,
            difficulty: 0.0,
            notoriety: 0.0,
            context: 0.0,
            frequency_malus: 0.0,
            recency_malus: 0.0,
            jitter: 0.0,
            random_factor: 1.0,
            total: f64::NEG_INFINITY,
        }
    }
}

/// Cache key: (candidate id, reference id, level)
type ScoreKey = (EventId, EventId, u32);

/// Memoized scores
#[derive(Debug, Default)]
pub struct ScoringCache {
    entries: AHashMap<ScoreKey, ScoreBreakdown>,
}

impl ScoringCache {
    pub fn new() -> Self {
        Self {
            entries: AHashMap::with_capacity(1024),
        }
    }

    pub fn get(&self, event_id: &str, reference_id: &str, level: u32) -> Option<&ScoreBreakdown> {
        self.entries
            .get(&(event_id.to_string(), reference_id.to_string(), level))
    }

    fn insert(&mut self, key: ScoreKey, breakdown: ScoreBreakdown) {
        self.entries.insert(key, breakdown);
    }

    /// Drop every entry scoring `event_id` as the candidate
    pub fn invalidate(&mut self, event_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(candidate, _, _), _| candidate != event_id);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Clear everything once the cache grows past `capacity`
    pub fn trim(&mut self, capacity: usize) -> bool {
        if self.entries.len() > capacity {
            tracing::debug!(entries = self.entries.len(), "score cache cleared");
            self.entries.clear();
            true
        } else {
            false
        }
    }
}

/// Everything the scorer needs to know about the current selection
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub reference: &'a Event,
    pub reference_year: i32,
    pub level: u32,
    pub window: GapWindow,
    pub weights: Weights,
    pub difficulty: DifficultyRange,
    pub now_ms: i64,
}

/// Target notoriety ratio and tolerance for a level
pub const fn notoriety_target(level: u32) -> (f64, f64) {
    if level <= 3 {
        (0.6, 0.25)
    } else if level <= 6 {
        (0.5, 0.3)
    } else if level <= 10 {
        (0.42, 0.35)
    } else {
        (0.35, 0.4)
    }
}

/// Context points for a candidate relative to the reference's key period
///
/// Beginners are kept away from easily confused periods; from level 5 on the
/// same confusions are sought out.
pub const fn context_points(relation: PeriodRelation, level: u32) -> f64 {
    match (relation, level <= 4) {
        (PeriodRelation::Same, true) => -500.0,
        (PeriodRelation::Trap, true) => -300.0,
        (PeriodRelation::Same, false) => 150.0,
        (PeriodRelation::Trap, false) => 100.0,
        (PeriodRelation::Unrelated, _) => 0.0,
    }
}

/// Hours during which a recently shown event is penalized
pub const fn recency_window_hours(level: u32) -> f64 {
    if level <= 4 {
        12.0
    } else if level <= 8 {
        24.0
    } else {
        48.0
    }
}

/// Score `event` against the context, using and filling the cache
pub fn score_event<R: Rng + ?Sized>(
    event: &Event,
    ctx: &ScoringContext<'_>,
    dates: &mut DateCache,
    cache: &mut ScoringCache,
    rng: &mut R,
) -> ScoreBreakdown {
    let key = (event.id.clone(), ctx.reference.id.clone(), ctx.level);
    if let Some(cached) = cache.entries.get(&key) {
        return *cached;
    }

    let breakdown = compute_score(event, ctx, dates, rng);
    cache.insert(key, breakdown);
    breakdown
}

fn compute_score<R: Rng + ?Sized>(
    event: &Event,
    ctx: &ScoringContext<'_>,
    dates: &mut DateCache,
    rng: &mut R,
) -> ScoreBreakdown {
    let time_diff = dates.time_difference_years(event, ctx.reference);
    let year = match dates.event_year(event) {
        Some(year) if time_diff.is_finite() => year,
        _ => return ScoreBreakdown::excluded(),
    };

    let random_factor = rng.gen_range(0.9..1.1);
    let weights = &ctx.weights;

    let ideal = ctx.window.ideal;
    let gap = if ideal > 0.0 {
        let ratio = (time_diff - ideal).abs() / ideal;
        GAP_POINTS * (1.0 - ratio).max(0.0) * random_factor * weights.alpha_proximity
    } else {
        0.0
    };

    let difficulty = match event.difficulty_level {
        Some(level) => {
            let distance = (level as f64 - ctx.difficulty.ideal()).abs() / 7.0;
            DIFFICULTY_POINTS * (1.0 - distance).max(0.0) * random_factor * weights.beta_difficulty
        }
        None => 0.0,
    };

    let (target, tolerance) = notoriety_target(ctx.level);
    let actual = adjusted_notoriety(event.notoriety, year, DEFAULT_NOTORIETY) as f64 / 100.0;
    let notoriety = (1.0 - (actual - target).abs() / tolerance).max(0.0)
        * weights.gamma_notoriety
        * NOTORIETY_POINTS;

    let context = context_points(period_relation(ctx.reference_year, year), ctx.level);

    let frequency_malus = (event.frequency_score.max(0) as f64 * weights.theta_frequency_malus)
        .min(weights.theta_frequency_cap);

    let recency_malus = match event.last_used {
        Some(last_used) => {
            let elapsed_hours = (ctx.now_ms - last_used.timestamp_millis()) as f64 / MS_PER_HOUR;
            let window = recency_window_hours(ctx.level);
            if elapsed_hours < window {
                MAX_RECENCY_MALUS * (1.0 - elapsed_hours.max(0.0) / window)
            } else {
                0.0
            }
        }
        None => 0.0,
    };

    let jitter = rng.gen::<f64>() * MAX_JITTER;

    let total = (gap + difficulty + notoriety + context + jitter - frequency_malus - recency_malus)
        .max(0.0);

    ScoreBreakdown {
        gap,
        difficulty,
        notoriety,
        context,
        frequency_malus,
        recency_malus,
        jitter,
        random_factor,
        total,
    }
}
