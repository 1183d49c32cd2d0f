//! Chronoquiz Core - event selection and difficulty adaptation engine
//!
//! Given a corpus of historical events, the event currently on screen, the
//! player's level and what has already been shown, picks the next event so
//! that the time gap, the fame of the event and the pacing (temporal jumps,
//! bonus events, anti-frustration) suit the player. A selection is always
//! produced for a non-empty corpus.
//!
//! With the `python` feature the crate builds a Python extension module.

pub mod config;
pub mod error;
pub mod selection;
pub mod timeline;

pub use config::{level_config, weights_for_level, Event, EventId, LevelConfig, SelectorSettings};
pub use error::{Result, SelectorError};
pub use selection::{
    NoopHooks, RecordingHooks, SelectedEvent, SelectionHooks, SelectionMeta, SelectionRequest,
    SelectionTelemetry, Selector, UsedEvents,
};

#[cfg(feature = "python")]
use once_cell::sync::OnceCell;
#[cfg(feature = "python")]
use parking_lot::RwLock;
#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyList;
#[cfg(feature = "python")]
use std::sync::Arc;

// ============================================================================
// Cached Corpus
// ============================================================================

/// Global event corpus, loaded once and shared by every game session
#[cfg(feature = "python")]
static CORPUS: OnceCell<RwLock<Arc<Vec<Event>>>> = OnceCell::new();

/// Snapshot of the loaded corpus
#[cfg(feature = "python")]
pub(crate) fn shared_corpus() -> Option<Arc<Vec<Event>>> {
    CORPUS.get().map(|corpus| Arc::clone(&corpus.read()))
}

/// Install or replace the global corpus
#[cfg(feature = "python")]
fn store_corpus(events: Vec<Event>) -> usize {
    let count = events.len();
    let lock = CORPUS.get_or_init(|| RwLock::new(Arc::new(Vec::new())));
    *lock.write() = Arc::new(events);
    tracing::info!(events = count, "corpus loaded");
    count
}

// ============================================================================
// Python Functions
// ============================================================================

/// Load the event corpus (call once at startup, again to replace it)
///
/// # Arguments
/// * `events` - List of event dicts or objects, using either the English
///   field names or the backing store's column names
///
/// # Returns
/// Number of events loaded
#[cfg(feature = "python")]
#[pyfunction]
fn init_corpus(events: &Bound<'_, PyList>) -> PyResult<usize> {
    let events = config::deserialize_events(events)?;
    Ok(store_corpus(events))
}

/// Load the event corpus from a JSON array
#[cfg(feature = "python")]
#[pyfunction]
fn init_corpus_json(json: &str) -> PyResult<usize> {
    let events = Event::corpus_from_json(json)?;
    Ok(store_corpus(events))
}

/// Check if the corpus is loaded
#[cfg(feature = "python")]
#[pyfunction]
fn is_corpus_initialized() -> bool {
    CORPUS.get().is_some()
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[cfg(feature = "python")]
#[pymodule]
fn chronoquiz_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(init_corpus, m)?)?;
    m.add_function(wrap_pyfunction!(init_corpus_json, m)?)?;
    m.add_function(wrap_pyfunction!(is_corpus_initialized, m)?)?;
    m.add_class::<selection::GameSelector>()?;
    m.add_class::<selection::PySelection>()?;
    Ok(())
}
