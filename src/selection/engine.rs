//! Selection orchestrator
//!
//! [`Selector`] owns one game session's mutable state, its caches and its
//! random source, and composes every selection stage into a single
//! [`Selector::select_new_event`] call.

use super::adaptation::notoriety_floor;
use super::fallback::{run_cascade, FallbackRung, ScoredCandidate};
use super::gap::GapWindow;
use super::hooks::{SelectionHooks, SelectionTelemetry};
use super::jump::{evaluate_trigger, find_jump_candidate, min_jump_notoriety, plan_jump, JumpSearch};
use super::notoriety::adjusted_notoriety;
use super::prefilter::{
    can_add_antique, eligible_unused, era_diversity_guard, is_antique, pre_filter,
    sort_for_variety, ERA_DIVERSITY_MAX_LEVEL,
};
use super::scorer::{score_event, ScoreBreakdown, ScoringCache, ScoringContext};
use super::state::{SelectionState, UsedEvents};
use crate::config::{level_config, weights_for_level, Event, LevelConfig, SelectorSettings};
use crate::error::{Result, SelectorError};
use crate::timeline::{DateCache, Era, YearStamp};
use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Notoriety assumed for events without a value when applying the floor
const FLOOR_MISSING_NOTORIETY: i32 = 0;

/// Everything the host passes in for one selection
#[derive(Debug)]
pub struct SelectionRequest<'a> {
    pub events: &'a [Event],
    /// Event currently on screen
    pub reference: Option<&'a Event>,
    pub level: u32,
    /// Mutated in place: the selection is added, and the deepest fallback
    /// may recycle old entries
    pub used: &'a mut UsedEvents,
    /// Current run of correct answers
    pub streak: u32,
}

/// Annotations attached to a selected event for the UI and analytics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionMeta {
    pub is_temporal_jump: bool,
    pub temporal_jump_era: Option<Era>,
    pub is_bonus_event: bool,
    pub is_anti_frustration: bool,
    /// Minimum adjusted notoriety enforced for this selection
    pub notoriety_floor: i32,
    pub score: Option<f64>,
    pub score_parts: Option<ScoreBreakdown>,
    pub fallback_rung: Option<FallbackRung>,
    pub pool_tier: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedEvent {
    pub event: Event,
    pub meta: SelectionMeta,
}

/// Validated per-call inputs
struct Resolved<'a> {
    config: &'a LevelConfig,
    reference: &'a Event,
    reference_stamp: YearStamp,
}

/// Event selector for one game session
#[derive(Debug)]
pub struct Selector {
    settings: SelectorSettings,
    state: SelectionState,
    dates: DateCache,
    scores: ScoringCache,
    rng: ChaCha8Rng,
}

impl Default for Selector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector {
    /// Selector with default settings and an entropy-seeded random source
    pub fn new() -> Self {
        Self::from_parts(SelectorSettings::default(), ChaCha8Rng::from_entropy())
    }

    /// Reproducible selector with default settings
    pub fn with_seed(seed: u64) -> Self {
        Self::from_parts(SelectorSettings::default(), ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn with_settings(settings: SelectorSettings, seed: Option<u64>) -> Result<Self> {
        settings.validate()?;
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self::from_parts(settings, rng))
    }

    fn from_parts(settings: SelectorSettings, mut rng: ChaCha8Rng) -> Self {
        let state = SelectionState::new(&mut rng);
        Self {
            settings,
            state,
            dates: DateCache::new(),
            scores: ScoringCache::new(),
            rng,
        }
    }

    pub fn settings(&self) -> &SelectorSettings {
        &self.settings
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Mutable state, for hosts restoring a saved session
    pub fn state_mut(&mut self) -> &mut SelectionState {
        &mut self.state
    }

    pub fn date_cache(&self) -> &DateCache {
        &self.dates
    }

    pub fn score_cache(&self) -> &ScoringCache {
        &self.scores
    }

    pub fn record_correct_answer(&mut self) {
        self.state.record_correct_answer();
    }

    pub fn record_incorrect_answer(&mut self) {
        self.state.record_incorrect_answer();
    }

    /// Start a new level: the antique quota starts over
    pub fn begin_level(&mut self, level: u32) {
        tracing::debug!(level, antique = self.state.antique_events_count, "level started");
        self.state.begin_level();
    }

    /// Start a new game: fresh counters and empty caches
    pub fn reset(&mut self) {
        self.state = SelectionState::new(&mut self.rng);
        self.clear_caches();
    }

    /// Drop cached scores of an event whose usage metadata changed
    pub fn invalidate_event(&mut self, event_id: &str) -> usize {
        self.scores.invalidate(event_id)
    }

    pub fn clear_caches(&mut self) {
        self.dates.clear();
        self.scores.clear();
    }

    /// Select the next event using the wall clock
    pub fn select_new_event(
        &mut self,
        request: SelectionRequest<'_>,
        hooks: &mut dyn SelectionHooks,
    ) -> Result<Option<SelectedEvent>> {
        self.select_new_event_at(Utc::now().timestamp_millis(), request, hooks)
    }

    /// Select the next event at `now_ms` (milliseconds since the epoch)
    ///
    /// Returns `Ok(None)` when the call is debounced. Fatal errors are also
    /// reported through `hooks` (`set_error`, then `set_game_over(true)`).
    pub fn select_new_event_at(
        &mut self,
        now_ms: i64,
        request: SelectionRequest<'_>,
        hooks: &mut dyn SelectionHooks,
    ) -> Result<Option<SelectedEvent>> {
        match self.select_inner(now_ms, request, hooks) {
            Err(err) => {
                tracing::error!(error = %err, "event selection failed");
                hooks.set_error(&err.to_string());
                hooks.set_game_over(true);
                Err(err)
            }
            ok => ok,
        }
    }

    fn resolve<'a>(&mut self, request: &SelectionRequest<'a>) -> Result<Resolved<'a>> {
        if request.events.is_empty() {
            return Err(SelectorError::EmptyCorpus);
        }
        let reference = request.reference.ok_or(SelectorError::MissingReference)?;
        let config =
            level_config(request.level).ok_or(SelectorError::MissingLevelConfig(request.level))?;
        let raw = reference
            .date_str()
            .ok_or_else(|| SelectorError::InvalidReferenceDate(format!("event {} has no date", reference.id)))?;
        let reference_stamp = self
            .dates
            .lookup(raw)
            .ok_or_else(|| SelectorError::InvalidReferenceDate(raw.to_string()))?;
        Ok(Resolved {
            config,
            reference,
            reference_stamp,
        })
    }

    fn select_inner(
        &mut self,
        now_ms: i64,
        request: SelectionRequest<'_>,
        hooks: &mut dyn SelectionHooks,
    ) -> Result<Option<SelectedEvent>> {
        let Resolved {
            config,
            reference,
            reference_stamp,
        } = self.resolve(&request)?;

        if let Some(last) = self.state.last_call_ms {
            if (0..self.settings.debounce_ms).contains(&(now_ms - last)) {
                tracing::debug!(elapsed_ms = now_ms - last, "selection debounced");
                return Ok(None);
            }
        }
        self.state.last_call_ms = Some(now_ms);

        let SelectionRequest {
            events,
            level,
            used,
            streak,
            ..
        } = request;
        let reference_year = reference_stamp.year;

        self.state.event_count += 1;
        self.state.tick_bonus(&mut self.rng);
        let flags = self.state.take_pacing_flags();
        let floor = notoriety_floor(level, streak, flags);
        let window = GapWindow::adaptive(&config.time_gap, level, reference_year);

        tracing::debug!(
            event_count = self.state.event_count,
            level,
            reference = %reference.id,
            reference_year,
            floor,
            "selecting next event"
        );

        if let Some(trigger) = evaluate_trigger(&self.state, level, reference_year, &mut self.rng) {
            let plan = plan_jump(trigger, &self.state, level, reference_year, &mut self.rng);
            let search = JumpSearch {
                corpus: events,
                reference,
                reference_year,
                used: &*used,
                min_gap: window.min,
                notoriety_floor: floor,
                allow_antique: can_add_antique(&self.state, level),
                limit: self.settings.jump_candidate_limit,
            };
            match find_jump_candidate(&plan, &search, level, &mut self.dates, &mut self.rng) {
                Some(event) => {
                    self.state.schedule_next_jump(&mut self.rng);
                    let year = self.dates.event_year(event);
                    tracing::info!(
                        event_id = %event.id,
                        year,
                        reason = plan.reason,
                        next_jump = self.state.forced_jump_event_count,
                        "temporal jump"
                    );
                    let meta = SelectionMeta {
                        is_temporal_jump: true,
                        temporal_jump_era: year.map(Era::of_year),
                        is_bonus_event: flags.force_bonus,
                        is_anti_frustration: flags.force_easy,
                        notoriety_floor: floor.max(min_jump_notoriety(level)),
                        ..SelectionMeta::default()
                    };
                    let selected = self.finalize(event, reference, meta, level, used, hooks);
                    return Ok(Some(selected));
                }
                None => {
                    tracing::debug!(reason = plan.reason, "no temporal jump target, selecting normally");
                }
            }
        }

        let prefiltered = pre_filter(
            events,
            used,
            level,
            reference,
            &config.time_gap,
            &self.state,
            &mut self.dates,
            self.settings.max_prefilter_pool,
            &mut self.rng,
        );
        let tier = prefiltered.tier;
        let mut pool = prefiltered.events;
        if pool.is_empty() {
            tracing::debug!("pre-filter empty, using every unused event");
            pool = self.unused_within_quota(events, used, reference, level);
        }

        pool = self.apply_floor(pool, floor, events, used, reference, level);

        if level <= ERA_DIVERSITY_MAX_LEVEL && self.state.consecutive_era_count >= 2 {
            if let Some(era) = self.state.last_era() {
                pool = era_diversity_guard(pool, era, &mut self.dates);
            }
        }

        pool.truncate(self.settings.max_scoring_pool);

        let ctx = ScoringContext {
            reference,
            reference_year,
            level,
            window,
            weights: weights_for_level(level),
            difficulty: config.difficulty,
            now_ms,
        };
        let mut scored = Vec::with_capacity(pool.len());
        for event in pool {
            let parts = score_event(event, &ctx, &mut self.dates, &mut self.scores, &mut self.rng);
            scored.push(ScoredCandidate {
                event,
                score: parts.total,
                gap_years: self.dates.time_difference_years(event, reference),
                parts: Some(parts),
            });
        }

        let cascade = run_cascade(
            &scored,
            &window,
            events,
            reference,
            used,
            &mut self.dates,
            &mut self.rng,
        )
        .ok_or(SelectorError::EmptyCorpus)?;

        let top = cascade.candidates.len().min(self.settings.top_k).max(1);
        let pick = &cascade.candidates[self.rng.gen_range(0..top)];
        if cascade.rung != FallbackRung::Normal {
            tracing::debug!(rung = cascade.rung.label(), "fallback rung used");
        }

        let meta = SelectionMeta {
            is_bonus_event: flags.force_bonus,
            is_anti_frustration: flags.force_easy,
            notoriety_floor: floor,
            score: Some(pick.score),
            score_parts: pick.parts,
            fallback_rung: Some(cascade.rung),
            pool_tier: Some(tier.number()),
            ..SelectionMeta::default()
        };
        let event = pick.event;
        Ok(Some(self.finalize(event, reference, meta, level, used, hooks)))
    }

    /// Every eligible unused event, minus antiques once the quota is spent,
    /// least worn first
    fn unused_within_quota<'a>(
        &mut self,
        events: &'a [Event],
        used: &UsedEvents,
        reference: &Event,
        level: u32,
    ) -> Vec<&'a Event> {
        let mut pool = eligible_unused(events, used, reference, &mut self.dates);
        if !can_add_antique(&self.state, level) {
            pool.retain(|event| !is_antique(event, &mut self.dates));
        }
        sort_for_variety(&mut pool, &mut self.rng);
        pool
    }

    /// Keep events meeting the notoriety floor, widening the search before
    /// giving up on the floor entirely
    fn apply_floor<'a>(
        &mut self,
        pool: Vec<&'a Event>,
        floor: i32,
        events: &'a [Event],
        used: &UsedEvents,
        reference: &Event,
        level: u32,
    ) -> Vec<&'a Event> {
        if floor <= 0 {
            return pool;
        }
        let floored: Vec<&Event> = pool
            .iter()
            .copied()
            .filter(|event| meets_floor(event, floor, &mut self.dates))
            .collect();
        if !floored.is_empty() {
            return floored;
        }
        let widened: Vec<&Event> = self
            .unused_within_quota(events, used, reference, level)
            .into_iter()
            .filter(|event| meets_floor(event, floor, &mut self.dates))
            .collect();
        if !widened.is_empty() {
            tracing::debug!(floor, candidates = widened.len(), "notoriety floor met outside the pool");
            return widened;
        }
        tracing::debug!(floor, "notoriety floor unsatisfiable, ignored");
        pool
    }

    fn finalize(
        &mut self,
        event: &Event,
        reference: &Event,
        meta: SelectionMeta,
        level: u32,
        used: &mut UsedEvents,
        hooks: &mut dyn SelectionHooks,
    ) -> SelectedEvent {
        let year = self.dates.event_year(event);
        let era = year.map(Era::of_year);
        if let Some(era) = era {
            self.state.push_era(era);
        }
        if is_antique(event, &mut self.dates) {
            self.state.antique_events_count += 1;
        }
        let gap_years = self.dates.time_difference_years(event, reference);

        used.insert(event.id.clone());
        self.scores.invalidate(&event.id);
        self.dates.trim(self.settings.date_cache_capacity);
        self.scores.trim(self.settings.score_cache_capacity);

        let telemetry = SelectionTelemetry {
            event_id: event.id.clone(),
            year,
            era,
            notoriety: event.notoriety,
            gap_years,
            level,
            is_temporal_jump: meta.is_temporal_jump,
            is_bonus: meta.is_bonus_event,
            is_anti_frustration: meta.is_anti_frustration,
            pool_tier: meta.pool_tier,
            fallback_rung: meta.fallback_rung,
            score: meta.score,
        };

        tracing::debug!(
            event_id = %event.id,
            year,
            gap_years,
            rung = meta.fallback_rung.map(|r| r.label()),
            "event selected"
        );

        let selected = SelectedEvent {
            event: event.clone(),
            meta,
        };
        hooks.update_state(&selected);
        hooks.record_selection(&telemetry);
        selected
    }
}

fn meets_floor(event: &Event, floor: i32, dates: &mut DateCache) -> bool {
    let year = dates.event_year(event).unwrap_or_default();
    adjusted_notoriety(event.notoriety, year, FLOOR_MISSING_NOTORIETY) >= floor
}
