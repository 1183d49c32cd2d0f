//! Configuration module for game data structures
//!
//! Event records, the static level table, weight profiles and engine settings.
//! With the `python` feature it also handles deserialization of the corpus
//! from Python objects.

mod event;
mod level;
mod settings;
mod weights;

pub use event::*;
pub use level::*;
pub use settings::*;
pub use weights::*;

#[cfg(feature = "python")]
pub use self::python::deserialize_events;

#[cfg(feature = "python")]
mod python {
    use super::Event;
    use crate::error::SelectorError;
    use chrono::{DateTime, Utc};
    use pyo3::types::{PyAnyMethods, PyDict, PyDictMethods, PyList, PyListMethods};
    use pyo3::Bound;

    /// Helper to get attribute from either dict or object
    fn get_attr<'py>(
        obj: &Bound<'py, pyo3::PyAny>,
        name: &str,
    ) -> pyo3::PyResult<Bound<'py, pyo3::PyAny>> {
        if let Ok(dict) = obj.downcast::<PyDict>() {
            dict.get_item(name)?
                .ok_or_else(|| pyo3::exceptions::PyKeyError::new_err(name.to_string()))
        } else {
            obj.getattr(name)
        }
    }

    /// Helper to get an optional, non-None attribute under any of `names`
    fn get_attr_opt<'py>(
        obj: &Bound<'py, pyo3::PyAny>,
        names: &[&str],
    ) -> Option<Bound<'py, pyo3::PyAny>> {
        names.iter().find_map(|name| {
            let value = if let Ok(dict) = obj.downcast::<PyDict>() {
                dict.get_item(*name).ok().flatten()
            } else {
                obj.getattr(*name).ok()
            };
            value.filter(|v| !v.is_none())
        })
    }

    /// Deserialize the event corpus from a Python list of dicts or objects
    ///
    /// Accepts both the English field names and the backing store's columns.
    pub fn deserialize_events(list: &Bound<'_, PyList>) -> pyo3::PyResult<Vec<Event>> {
        let mut events = Vec::with_capacity(list.len());
        for item in list.iter() {
            events.push(extract_event(&item)?);
        }
        Ok(events)
    }

    fn extract_event(obj: &Bound<'_, pyo3::PyAny>) -> pyo3::PyResult<Event> {
        // Support both string and integer ids
        let id_obj = get_attr(obj, "id")?;
        let id: String = if let Ok(id) = id_obj.extract::<i64>() {
            id.to_string()
        } else {
            id_obj.extract()?
        };

        let last_used = match get_attr_opt(obj, &["last_used", "lastUsed"]) {
            Some(value) => {
                let raw: String = value.extract()?;
                let parsed = DateTime::parse_from_rfc3339(&raw).map_err(|e| {
                    SelectorError::Deserialization(format!("event {}: last_used: {}", id, e))
                })?;
                Some(parsed.with_timezone(&Utc))
            }
            None => None,
        };

        Ok(Event {
            date: get_attr_opt(obj, &["date"]).and_then(|v| v.extract().ok()),
            title: get_attr_opt(obj, &["title", "titre"])
                .and_then(|v| v.extract().ok())
                .unwrap_or_default(),
            illustration_url: get_attr_opt(obj, &["illustration_url", "illustrationUrl"])
                .and_then(|v| v.extract().ok())
                .unwrap_or_default(),
            difficulty_level: get_attr_opt(obj, &["difficulty_level", "niveau_difficulte"])
                .and_then(|v| v.extract().ok()),
            event_types: get_attr_opt(obj, &["event_types", "types_evenement"])
                .and_then(|v| v.extract().ok())
                .unwrap_or_default(),
            notoriety: get_attr_opt(obj, &["notoriety", "notoriete"])
                .and_then(|v| v.extract().ok()),
            frequency_score: get_attr_opt(obj, &["frequency_score", "frequencyScore"])
                .and_then(|v| v.extract().ok())
                .unwrap_or(0),
            last_used,
            id,
        })
    }
}
