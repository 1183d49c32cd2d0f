//! Python-facing game session wrapping a [`Selector`]

use super::engine::{SelectedEvent, SelectionRequest, Selector};
use super::hooks::{SelectionHooks, SelectionTelemetry};
use super::state::UsedEvents;
use crate::config::{Event, SelectorSettings};
use crate::error::SelectorError;
use parking_lot::Mutex;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::sync::Arc;

// ============================================================================
// Session internals
// ============================================================================

/// Hooks that remember the last error and the game-over flag
#[derive(Debug, Default)]
struct SessionHooks {
    last_error: Option<String>,
    game_over: bool,
    last_telemetry: Option<SelectionTelemetry>,
}

impl SelectionHooks for SessionHooks {
    fn update_state(&mut self, _selected: &SelectedEvent) {}

    fn set_error(&mut self, message: &str) {
        self.last_error = Some(message.to_string());
    }

    fn set_game_over(&mut self, game_over: bool) {
        self.game_over = game_over;
    }

    fn record_selection(&mut self, telemetry: &SelectionTelemetry) {
        self.last_telemetry = Some(telemetry.clone());
    }
}

#[derive(Debug)]
struct SessionInner {
    selector: Selector,
    used: UsedEvents,
    hooks: SessionHooks,
}

impl SessionInner {
    fn select(
        &mut self,
        corpus: &[Event],
        reference_id: &str,
        level: u32,
        streak: u32,
    ) -> Result<Option<SelectedEvent>, SelectorError> {
        let reference = corpus.iter().find(|event| event.id == reference_id);
        let request = SelectionRequest {
            events: corpus,
            reference,
            level,
            used: &mut self.used,
            streak,
        };
        self.selector.select_new_event(request, &mut self.hooks)
    }
}

// ============================================================================
// Selection result
// ============================================================================

/// A selected event with its annotations
#[pyclass(name = "Selection")]
#[derive(Debug, Clone)]
pub struct PySelection {
    inner: SelectedEvent,
}

#[pymethods]
impl PySelection {
    #[getter]
    fn event_id(&self) -> &str {
        &self.inner.event.id
    }

    #[getter]
    fn title(&self) -> &str {
        &self.inner.event.title
    }

    #[getter]
    fn date(&self) -> Option<&str> {
        self.inner.event.date_str()
    }

    #[getter]
    fn is_temporal_jump(&self) -> bool {
        self.inner.meta.is_temporal_jump
    }

    #[getter]
    fn is_bonus_event(&self) -> bool {
        self.inner.meta.is_bonus_event
    }

    #[getter]
    fn is_anti_frustration(&self) -> bool {
        self.inner.meta.is_anti_frustration
    }

    #[getter]
    fn score(&self) -> Option<f64> {
        self.inner.meta.score
    }

    #[getter]
    fn fallback_rung(&self) -> Option<&'static str> {
        self.inner.meta.fallback_rung.map(|rung| rung.label())
    }

    #[getter]
    fn temporal_jump_era(&self) -> Option<&'static str> {
        self.inner.meta.temporal_jump_era.map(|era| era.label())
    }

    /// Event fields plus annotations as a dict
    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let event = &self.inner.event;
        let meta = &self.inner.meta;
        let dict = PyDict::new(py);
        dict.set_item("id", &event.id)?;
        dict.set_item("date", event.date_str())?;
        dict.set_item("title", &event.title)?;
        dict.set_item("illustration_url", &event.illustration_url)?;
        dict.set_item("difficulty_level", event.difficulty_level)?;
        dict.set_item("event_types", &event.event_types)?;
        dict.set_item("notoriety", event.notoriety)?;
        dict.set_item("frequency_score", event.frequency_score)?;
        dict.set_item("is_temporal_jump", meta.is_temporal_jump)?;
        dict.set_item("temporal_jump_era", meta.temporal_jump_era.map(|era| era.label()))?;
        dict.set_item("is_bonus_event", meta.is_bonus_event)?;
        dict.set_item("is_anti_frustration", meta.is_anti_frustration)?;
        dict.set_item("notoriety_floor", meta.notoriety_floor)?;
        dict.set_item("score", meta.score)?;
        dict.set_item("fallback_rung", meta.fallback_rung.map(|rung| rung.label()))?;
        dict.set_item("pool_tier", meta.pool_tier)?;
        Ok(dict)
    }
}

// ============================================================================
// Game session
// ============================================================================

/// One game's selector, used-set and error state
///
/// Shared behind a mutex so `select_next_async` can run on a worker thread.
#[pyclass]
pub struct GameSelector {
    inner: Arc<Mutex<SessionInner>>,
}

fn corpus() -> PyResult<Arc<Vec<Event>>> {
    crate::shared_corpus().ok_or_else(|| {
        PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(
            "Corpus not initialized. Call init_corpus() first.",
        )
    })
}

#[pymethods]
impl GameSelector {
    /// Create a session, optionally seeded and with JSON settings
    #[new]
    #[pyo3(signature = (seed=None, settings_json=None))]
    fn new(seed: Option<u64>, settings_json: Option<&str>) -> PyResult<Self> {
        let settings = match settings_json {
            Some(json) => SelectorSettings::from_json(json)?,
            None => SelectorSettings::default(),
        };
        let selector = Selector::with_settings(settings, seed)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(SessionInner {
                selector,
                used: UsedEvents::new(),
                hooks: SessionHooks::default(),
            })),
        })
    }

    /// Select the event to show after `reference_id`
    ///
    /// Returns None when the call is debounced. Raises on fatal errors, which
    /// also set `last_error` and `is_game_over`.
    #[pyo3(signature = (reference_id, level, streak=0))]
    fn select_next(&self, reference_id: &str, level: u32, streak: u32) -> PyResult<Option<PySelection>> {
        let corpus = corpus()?;
        let mut inner = self.inner.lock();
        let selected = inner.select(&corpus, reference_id, level, streak)?;
        Ok(selected.map(|selected| PySelection { inner: selected }))
    }

    /// Async variant of `select_next`, run on a blocking worker thread
    #[pyo3(signature = (reference_id, level, streak=0))]
    fn select_next_async<'py>(
        &self,
        py: Python<'py>,
        reference_id: String,
        level: u32,
        streak: u32,
    ) -> PyResult<Bound<'py, PyAny>> {
        let corpus = corpus()?;
        let session = Arc::clone(&self.inner);

        pyo3_async_runtimes::tokio::future_into_py(py, async move {
            let selected = tokio::task::spawn_blocking(move || {
                let mut inner = session.lock();
                inner.select(&corpus, &reference_id, level, streak)
            })
            .await
            .map_err(|e| {
                PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                    "Selection task panicked: {}",
                    e
                ))
            })??;

            Ok(selected.map(|selected| PySelection { inner: selected }))
        })
    }

    fn record_correct_answer(&self) {
        self.inner.lock().selector.record_correct_answer();
    }

    fn record_incorrect_answer(&self) {
        self.inner.lock().selector.record_incorrect_answer();
    }

    fn begin_level(&self, level: u32) {
        self.inner.lock().selector.begin_level(level);
    }

    /// Mark events as already shown (e.g. the two opening events)
    fn mark_used(&self, event_ids: Vec<String>) {
        self.inner.lock().used.extend(event_ids);
    }

    /// Start a new game
    fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.selector.reset();
        inner.used.clear();
        inner.hooks = SessionHooks::default();
    }

    #[getter]
    fn last_error(&self) -> Option<String> {
        self.inner.lock().hooks.last_error.clone()
    }

    #[getter]
    fn is_game_over(&self) -> bool {
        self.inner.lock().hooks.game_over
    }

    #[getter]
    fn used_count(&self) -> usize {
        self.inner.lock().used.len()
    }

    #[getter]
    fn event_count(&self) -> u32 {
        self.inner.lock().selector.state().event_count
    }

    /// Analytics record of the last selection as JSON
    fn last_telemetry_json(&self) -> PyResult<Option<String>> {
        let inner = self.inner.lock();
        inner
            .hooks
            .last_telemetry
            .as_ref()
            .map(|telemetry| serde_json::to_string(telemetry).map_err(SelectorError::from))
            .transpose()
            .map_err(PyErr::from)
    }
}
