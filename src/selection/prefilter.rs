//! Reduce the corpus to a bounded working set before scoring

use super::notoriety::{adjusted_notoriety, sample_tier, NotorietyTier, DEFAULT_NOTORIETY};
use super::state::{SelectionState, UsedEvents};
use crate::config::{Event, TimeGap};
use crate::timeline::{DateCache, Era, ANTIQUE_YEAR_THRESHOLD};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;

/// Coarse temporal window, as a multiple of the level's base gap
const WINDOW_FACTOR: f64 = 3.0;

/// Era-diversity exclusion never leaves fewer candidates than this
pub const MIN_DIVERSE_POOL: usize = 10;

/// Highest level at which era diversity is enforced
pub const ERA_DIVERSITY_MAX_LEVEL: u32 = 5;

/// Antique events allowed per level: 1 at level 1 up to 5 from level 5 on
#[inline]
pub fn antique_quota(level: u32) -> u32 {
    level.clamp(1, 5)
}

/// Whether the session may still show an antique event at this level
#[inline]
pub fn can_add_antique(state: &SelectionState, level: u32) -> bool {
    state.antique_events_count < antique_quota(level)
}

/// Whether an event predates the antique threshold
pub fn is_antique(event: &Event, dates: &mut DateCache) -> bool {
    dates
        .event_year(event)
        .is_some_and(|year| year < ANTIQUE_YEAR_THRESHOLD)
}

/// Output of the pre-filter
#[derive(Debug, Clone)]
pub struct PreFiltered<'a> {
    pub events: Vec<&'a Event>,
    /// Tier the pool was actually filtered to (after any relaxation)
    pub tier: NotorietyTier,
}

/// Unused events other than the reference that are not at the same date
pub fn eligible_unused<'a>(
    corpus: &'a [Event],
    used: &UsedEvents,
    reference: &Event,
    dates: &mut DateCache,
) -> Vec<&'a Event> {
    let reference_date = reference.date_str();
    corpus
        .iter()
        .filter(|event| {
            if used.contains(&event.id) || event.id == reference.id {
                return false;
            }
            let Some(date) = event.date_str() else {
                return false;
            };
            if Some(date) == reference_date {
                return false;
            }
            dates.time_difference_years(event, reference) > 0.0
        })
        .collect()
}

/// Drop candidates in `era` when enough others remain
pub fn era_diversity_guard<'a>(
    pool: Vec<&'a Event>,
    era: Era,
    dates: &mut DateCache,
) -> Vec<&'a Event> {
    let (same, other): (Vec<&Event>, Vec<&Event>) = pool.into_iter().partition(|event| {
        dates.event_year(event).map(Era::of_year) == Some(era)
    });
    if other.len() >= MIN_DIVERSE_POOL {
        tracing::debug!(era = era.label(), dropped = same.len(), "era diversity enforced");
        other
    } else {
        same.into_iter().chain(other).collect()
    }
}

/// Most common era in the pool
fn dominant_era(pool: &[&Event], dates: &mut DateCache) -> Option<Era> {
    let mut counts = [0usize; Era::ALL.len()];
    for event in pool {
        if let Some(year) = dates.event_year(event) {
            counts[Era::of_year(year) as usize] += 1;
        }
    }
    counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .max_by_key(|(_, count)| **count)
        .map(|(index, _)| Era::ALL[index])
}

/// Order by frequency, then never-used first, then least recently used
pub(crate) fn variety_order(a: &Event, b: &Event) -> Ordering {
    a.frequency_score
        .cmp(&b.frequency_score)
        .then_with(|| match (a.last_used, b.last_used) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.cmp(&y),
        })
}

/// Sort a pool by variety with ties in random order, so a later truncation
/// does not always keep the start of the corpus
pub(crate) fn sort_for_variety<R: Rng + ?Sized>(pool: &mut [&Event], rng: &mut R) {
    pool.shuffle(rng);
    pool.sort_by(|a, b| variety_order(a, b));
}

/// Pre-filter the corpus for one selection
///
/// Returns at most `max_pool` events. An empty result means the caller must
/// fall back to every eligible unused event.
#[allow(clippy::too_many_arguments)]
pub fn pre_filter<'a, R: Rng + ?Sized>(
    corpus: &'a [Event],
    used: &UsedEvents,
    level: u32,
    reference: &Event,
    time_gap: &TimeGap,
    state: &SelectionState,
    dates: &mut DateCache,
    max_pool: usize,
    rng: &mut R,
) -> PreFiltered<'a> {
    let mut pool = eligible_unused(corpus, used, reference, dates);

    // Notoriety tier, relaxed until something survives
    let sampled = sample_tier(level, rng);
    let mut tier = sampled;
    loop {
        let floor = tier.min_notoriety();
        let kept: Vec<&Event> = pool
            .iter()
            .copied()
            .filter(|event| {
                let year = dates.event_year(event).unwrap_or_default();
                adjusted_notoriety(event.notoriety, year, DEFAULT_NOTORIETY) >= floor
            })
            .collect();
        if !kept.is_empty() || tier == NotorietyTier::Any {
            pool = kept;
            break;
        }
        match tier.relaxed() {
            Some(next) => tier = next,
            None => break,
        }
    }
    if tier != sampled {
        tracing::debug!(sampled = sampled.number(), used = tier.number(), "notoriety tier relaxed");
    }

    let window = time_gap.base * WINDOW_FACTOR;
    pool.retain(|event| dates.time_difference_years(event, reference) <= window);

    if !can_add_antique(state, level) {
        pool.retain(|event| !is_antique(event, dates));
    }

    if level <= ERA_DIVERSITY_MAX_LEVEL {
        if let Some(dominant) = dominant_era(&pool, dates) {
            if state.last_eras_all(2, |era| era == dominant) {
                pool = era_diversity_guard(pool, dominant, dates);
            }
        }
    }

    sort_for_variety(&mut pool, rng);
    pool.truncate(max_pool);

    PreFiltered { events: pool, tier }
}
