//! Fallback cascade: progressively relaxed criteria that always yield a candidate

use super::gap::GapWindow;
use super::prefilter::eligible_unused;
use super::scorer::ScoreBreakdown;
use super::state::UsedEvents;
use crate::config::Event;
use crate::timeline::DateCache;
use rand::Rng;
use serde::Serialize;

/// Rung of the cascade that produced a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackRung {
    Normal = 1,
    Relaxed1_5 = 2,
    Relaxed2_5 = 3,
    Relaxed5 = 4,
    IgnoreGap = 5,
    IgnoreScore = 6,
    Recycle = 7,
    LastResort = 8,
}

impl FallbackRung {
    /// Windowed rungs with the (min, max) factors applied to the primary window
    const WINDOWED: [(FallbackRung, f64, f64); 4] = [
        (FallbackRung::Normal, 1.0, 1.0),
        (FallbackRung::Relaxed1_5, 0.7, 1.5),
        (FallbackRung::Relaxed2_5, 0.4, 2.5),
        (FallbackRung::Relaxed5, 0.2, 5.0),
    ];

    #[inline]
    pub const fn number(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            FallbackRung::Normal => "normal",
            FallbackRung::Relaxed1_5 => "relaxed_1_5",
            FallbackRung::Relaxed2_5 => "relaxed_2_5",
            FallbackRung::Relaxed5 => "relaxed_5",
            FallbackRung::IgnoreGap => "ignore_gap",
            FallbackRung::IgnoreScore => "ignore_score",
            FallbackRung::Recycle => "recycle",
            FallbackRung::LastResort => "last_resort",
        }
    }
}

/// A candidate with its score and gap to the reference
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub event: &'a Event,
    pub score: f64,
    pub gap_years: f64,
    /// Absent when the score was assigned at random by a late rung
    pub parts: Option<ScoreBreakdown>,
}

/// Non-empty ranked candidates, best first
#[derive(Debug, Clone)]
pub struct Cascade<'a> {
    pub candidates: Vec<ScoredCandidate<'a>>,
    pub rung: FallbackRung,
}

fn ranked<'a>(mut candidates: Vec<ScoredCandidate<'a>>, rung: FallbackRung) -> Option<Cascade<'a>> {
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    Some(Cascade { candidates, rung })
}

/// Unused events ranked by a random score
fn random_unused<'a, R: Rng + ?Sized>(
    corpus: &'a [Event],
    used: &UsedEvents,
    reference: &Event,
    dates: &mut DateCache,
    rng: &mut R,
) -> Vec<ScoredCandidate<'a>> {
    eligible_unused(corpus, used, reference, dates)
        .into_iter()
        .map(|event| ScoredCandidate {
            event,
            score: rng.gen::<f64>() * 100.0,
            gap_years: dates.time_difference_years(event, reference),
            parts: None,
        })
        .collect()
}

/// First event other than the reference, preferring one at a different date
fn last_resort<'a>(corpus: &'a [Event], reference: &Event, dates: &mut DateCache) -> Option<&'a Event> {
    corpus
        .iter()
        .find(|event| {
            event.id != reference.id && {
                let gap = dates.time_difference_years(event, reference);
                gap.is_finite() && gap > 0.0
            }
        })
        .or_else(|| corpus.iter().find(|event| event.id != reference.id))
        .or_else(|| corpus.first())
}

/// Walk the cascade until a rung produces candidates
///
/// `scored` is the scored pool. Only an empty corpus yields `None`. The
/// recycle rung mutates `used` in place.
pub fn run_cascade<'a, R: Rng + ?Sized>(
    scored: &[ScoredCandidate<'a>],
    window: &GapWindow,
    corpus: &'a [Event],
    reference: &Event,
    used: &mut UsedEvents,
    dates: &mut DateCache,
    rng: &mut R,
) -> Option<Cascade<'a>> {
    for (rung, min_factor, max_factor) in FallbackRung::WINDOWED {
        let widened = window.relaxed(min_factor, max_factor);
        let hits: Vec<ScoredCandidate<'a>> = scored
            .iter()
            .filter(|c| c.score > 0.0 && widened.contains(c.gap_years))
            .cloned()
            .collect();
        if let Some(cascade) = ranked(hits, rung) {
            return Some(cascade);
        }
    }

    let positive: Vec<ScoredCandidate<'a>> = scored.iter().filter(|c| c.score > 0.0).cloned().collect();
    if let Some(cascade) = ranked(positive, FallbackRung::IgnoreGap) {
        tracing::debug!("gap window ignored");
        return Some(cascade);
    }

    let any = random_unused(corpus, used, reference, dates, rng);
    if let Some(cascade) = ranked(any, FallbackRung::IgnoreScore) {
        tracing::warn!(candidates = cascade.candidates.len(), "scoring ignored, random unused event");
        return Some(cascade);
    }

    if !used.is_empty() {
        let recycled = used.recycle_oldest_half();
        tracing::warn!(recycled, remaining = used.len(), "used events recycled");
        let any = random_unused(corpus, used, reference, dates, rng);
        if let Some(cascade) = ranked(any, FallbackRung::Recycle) {
            return Some(cascade);
        }
    }

    let event = last_resort(corpus, reference, dates)?;
    tracing::warn!(event_id = %event.id, "last resort selection");
    Some(Cascade {
        candidates: vec![ScoredCandidate {
            event,
            score: 0.0,
            gap_years: dates.time_difference_years(event, reference),
            parts: None,
        }],
        rung: FallbackRung::LastResort,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const WINDOW: GapWindow = GapWindow {
        ideal: 100.0,
        min: 50.0,
        max: 150.0,
    };

    fn candidate(event: &Event, score: f64, gap_years: f64) -> ScoredCandidate<'_> {
        ScoredCandidate {
            event,
            score,
            gap_years,
            parts: None,
        }
    }

    fn rung_for_gap(gap_years: f64) -> FallbackRung {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut dates = DateCache::new();
        let reference = Event::new("ref", "1900-01-01", "Reference");
        let event = Event::new("e", "1800-01-01", "Candidate");
        let corpus = vec![reference.clone(), event.clone()];
        let scored = vec![candidate(&event, 10.0, gap_years)];
        let mut used = UsedEvents::new();

        run_cascade(&scored, &WINDOW, &corpus, &reference, &mut used, &mut dates, &mut rng)
            .unwrap()
            .rung
    }

    #[test]
    fn test_windowed_rungs() {
        assert_eq!(rung_for_gap(100.0), FallbackRung::Normal);
        assert_eq!(rung_for_gap(200.0), FallbackRung::Relaxed1_5);
        assert_eq!(rung_for_gap(40.0), FallbackRung::Relaxed1_5);
        assert_eq!(rung_for_gap(300.0), FallbackRung::Relaxed2_5);
        assert_eq!(rung_for_gap(700.0), FallbackRung::Relaxed5);
        assert_eq!(rung_for_gap(2_000.0), FallbackRung::IgnoreGap);
    }

    #[test]
    fn test_best_first() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut dates = DateCache::new();
        let reference = Event::new("ref", "1900-01-01", "Reference");
        let a = Event::new("a", "1800-01-01", "A");
        let b = Event::new("b", "1810-01-01", "B");
        let corpus = vec![reference.clone(), a.clone(), b.clone()];
        let scored = vec![candidate(&a, 10.0, 100.0), candidate(&b, 40.0, 90.0)];
        let mut used = UsedEvents::new();

        let cascade = run_cascade(&scored, &WINDOW, &corpus, &reference, &mut used, &mut dates, &mut rng).unwrap();
        assert_eq!(cascade.candidates[0].event.id, "b");
    }

    #[test]
    fn test_zero_scores_fall_to_random_unused() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut dates = DateCache::new();
        let reference = Event::new("ref", "1900-01-01", "Reference");
        let zero = Event::new("z", "1800-01-01", "Zero");
        let corpus = vec![reference.clone(), zero.clone(), Event::new("u", "1700-01-01", "Unused")];
        let scored = vec![candidate(&zero, 0.0, 100.0)];
        let mut used = UsedEvents::new();

        let cascade = run_cascade(&scored, &WINDOW, &corpus, &reference, &mut used, &mut dates, &mut rng).unwrap();
        assert_eq!(cascade.rung, FallbackRung::IgnoreScore);
        assert_eq!(cascade.candidates.len(), 2);
        assert!(cascade.candidates.iter().all(|c| c.parts.is_none()));
        assert!(cascade.candidates.iter().all(|c| (0.0..100.0).contains(&c.score)));
    }

    #[test]
    fn test_exhausted_pool_recycles() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut dates = DateCache::new();
        let corpus = vec![
            Event::new("a", "1500-01-01", "A"),
            Event::new("b", "1600-01-01", "B"),
            Event::new("ref", "1900-01-01", "Reference"),
        ];
        let reference = corpus[2].clone();
        let mut used: UsedEvents = ["a", "b"].into_iter().collect();

        let cascade = run_cascade(&[], &WINDOW, &corpus, &reference, &mut used, &mut dates, &mut rng).unwrap();
        assert_eq!(cascade.rung, FallbackRung::Recycle);
        assert_eq!(cascade.candidates.len(), 1);
        assert_eq!(cascade.candidates[0].event.id, "a");
        assert!(!used.contains("a"));
        assert!(used.contains("b"));
    }

    #[test]
    fn test_last_resort() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut dates = DateCache::new();
        let corpus = vec![
            Event::new("ref", "1900-01-01", "Reference"),
            Event::new("twin", "1900-01-01", "Same day"),
        ];
        let reference = corpus[0].clone();
        let mut used = UsedEvents::new();

        let cascade = run_cascade(&[], &WINDOW, &corpus, &reference, &mut used, &mut dates, &mut rng).unwrap();
        assert_eq!(cascade.rung, FallbackRung::LastResort);
        assert_eq!(cascade.candidates[0].event.id, "twin");
    }

    #[test]
    fn test_last_resort_prefers_distinct_date() {
        let mut dates = DateCache::new();
        let corpus = vec![
            Event::new("twin", "1900-01-01", "Same day"),
            Event::new("ref", "1900-01-01", "Reference"),
            Event::new("later", "1950-01-01", "Later"),
        ];
        let picked = last_resort(&corpus, &corpus[1], &mut dates).unwrap();
        assert_eq!(picked.id, "later");
    }

    #[test]
    fn test_empty_corpus_yields_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut dates = DateCache::new();
        let reference = Event::new("ref", "1900-01-01", "Reference");
        let mut used = UsedEvents::new();

        let result = run_cascade(&[], &WINDOW, &[], &reference, &mut used, &mut dates, &mut rng);
        assert!(result.is_none());
    }

    #[test]
    fn test_rung_numbers() {
        assert_eq!(FallbackRung::Normal.number(), 1);
        assert_eq!(FallbackRung::LastResort.number(), 8);
        assert!(FallbackRung::IgnoreGap < FallbackRung::Recycle);
    }
}
