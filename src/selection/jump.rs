//! Temporal jumps: occasional large, era-biased leaps away from the reference

use super::notoriety::{adjusted_notoriety, DEFAULT_NOTORIETY};
use super::prefilter::is_antique;
use super::state::{SelectionState, UsedEvents};
use crate::config::Event;
use crate::timeline::{DateCache, Era};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// Why a jump was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpTrigger {
    /// The randomized countdown expired
    Scheduled,
    /// Low-level escape hatch out of a deep-past tunnel
    ReturnToPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpDirection {
    Forward,
    Backward,
}

/// Target of one jump: a direction and an inclusive year range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpPlan {
    pub trigger: JumpTrigger,
    pub direction: JumpDirection,
    pub min_year: i32,
    pub max_year: i32,
    pub reason: &'static str,
}

impl JumpPlan {
    fn forward(trigger: JumpTrigger, min_year: i32, reason: &'static str) -> Self {
        Self {
            trigger,
            direction: JumpDirection::Forward,
            min_year,
            max_year: i32::MAX,
            reason,
        }
    }

    fn backward(trigger: JumpTrigger, min_year: i32, max_year: i32, reason: &'static str) -> Self {
        Self {
            trigger,
            direction: JumpDirection::Backward,
            min_year,
            max_year,
            reason,
        }
    }

    /// Whether `year` lies in range and strictly on the jump's side of the reference
    pub fn accepts(&self, year: i32, reference_year: i32) -> bool {
        let directed = match self.direction {
            JumpDirection::Forward => year > reference_year,
            JumpDirection::Backward => year < reference_year,
        };
        directed && year >= self.min_year && year <= self.max_year
    }
}

/// Chance per call of a return-to-present jump
pub fn return_to_present_chance(level: u32, reference_year: i32) -> f64 {
    if level <= 5 && reference_year < 1900 {
        (0.45 - 0.05 * level.max(1) as f64).max(0.0)
    } else {
        0.0
    }
}

/// Decide whether this call attempts a jump
pub fn evaluate_trigger<R: Rng + ?Sized>(
    state: &SelectionState,
    level: u32,
    reference_year: i32,
    rng: &mut R,
) -> Option<JumpTrigger> {
    if state.jump_due() {
        return Some(JumpTrigger::Scheduled);
    }
    let chance = return_to_present_chance(level, reference_year);
    (chance > 0.0 && rng.gen::<f64>() < chance).then_some(JumpTrigger::ReturnToPresent)
}

/// Run of deep-past selections that counts as being stuck there
pub const fn stuck_in_past_threshold(level: u32) -> usize {
    if level <= 3 {
        2
    } else if level <= 8 {
        3
    } else {
        4
    }
}

/// Selections after 1800 in a row that count as being stuck in modern times
pub const STUCK_IN_MODERN_RUN: usize = 3;

pub fn is_stuck_in_past(state: &SelectionState, level: u32) -> bool {
    state.last_eras_all(stuck_in_past_threshold(level), Era::is_deep_past)
}

pub fn is_stuck_in_modern(state: &SelectionState) -> bool {
    state.last_eras_all(STUCK_IN_MODERN_RUN, Era::is_modern)
}

/// Pick the direction and year range of a jump
pub fn plan_jump<R: Rng + ?Sized>(
    trigger: JumpTrigger,
    state: &SelectionState,
    level: u32,
    reference_year: i32,
    rng: &mut R,
) -> JumpPlan {
    if trigger == JumpTrigger::ReturnToPresent {
        return JumpPlan::forward(trigger, 1900, "return to present");
    }
    if is_stuck_in_past(state, level) {
        return JumpPlan::forward(trigger, 1800, "stuck in past");
    }
    if is_stuck_in_modern(state) {
        return JumpPlan::backward(trigger, i32::MIN, 1499, "stuck in modern");
    }

    let roll: f64 = rng.gen();
    if reference_year > 1700 {
        if roll < 0.8 {
            JumpPlan::backward(trigger, i32::MIN, 1499, "massive jump to the deep past")
        } else {
            JumpPlan::backward(
                trigger,
                reference_year - 600,
                reference_year - 300,
                "jump back a few centuries",
            )
        }
    } else if reference_year >= 1000 {
        if roll < 0.5 {
            JumpPlan::forward(trigger, 1800, "jump to modern times")
        } else {
            JumpPlan::backward(trigger, i32::MIN, 499, "jump to antiquity")
        }
    } else if reference_year >= 0 {
        if roll < 0.7 {
            JumpPlan::forward(trigger, 1500, "jump past the middle ages")
        } else {
            JumpPlan::forward(trigger, reference_year + 500, "jump forward five centuries")
        }
    } else if roll < 0.85 {
        JumpPlan::forward(trigger, 1800, "jump from antiquity to modern times")
    } else {
        JumpPlan::forward(trigger, 500, "jump out of antiquity")
    }
}

/// Minimum adjusted notoriety of a jump target
pub const fn min_jump_notoriety(level: u32) -> i32 {
    if level <= 3 {
        70
    } else if level <= 6 {
        60
    } else if level <= 10 {
        50
    } else {
        40
    }
}

/// Inputs of a jump candidate search
#[derive(Debug, Clone, Copy)]
pub struct JumpSearch<'a, 'b> {
    pub corpus: &'a [Event],
    pub reference: &'b Event,
    pub reference_year: i32,
    pub used: &'b UsedEvents,
    /// Candidates must be at least this many years away
    pub min_gap: f64,
    /// Pacing floor, raised to the level's jump minimum
    pub notoriety_floor: i32,
    pub allow_antique: bool,
    pub limit: usize,
}

/// Find a jump target in the whole corpus, or `None` to fall through
pub fn find_jump_candidate<'a, R: Rng + ?Sized>(
    plan: &JumpPlan,
    search: &JumpSearch<'a, '_>,
    level: u32,
    dates: &mut DateCache,
    rng: &mut R,
) -> Option<&'a Event> {
    let floor = search.notoriety_floor.max(min_jump_notoriety(level));
    let mut matches: Vec<&'a Event> = search
        .corpus
        .iter()
        .filter(|event| {
            if event.id == search.reference.id || search.used.contains(&event.id) {
                return false;
            }
            let Some(year) = dates.event_year(event) else {
                return false;
            };
            plan.accepts(year, search.reference_year)
                && adjusted_notoriety(event.notoriety, year, DEFAULT_NOTORIETY) >= floor
                && dates.time_difference_years(event, search.reference) >= search.min_gap
                && (search.allow_antique || !is_antique(event, dates))
        })
        .collect();

    tracing::debug!(
        reason = plan.reason,
        matches = matches.len(),
        floor,
        "temporal jump candidates"
    );

    matches.sort_by_key(|event| event.frequency_score);
    matches.truncate(search.limit);
    matches.choose(rng).copied()
}
