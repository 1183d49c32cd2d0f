//! Error types for the event selection engine

use thiserror::Error;

/// Main error type for the event selection engine
///
/// Every variant is fatal for the current game session: the engine reports it
/// through the host hooks and the game ends. Degraded situations (empty
/// filters, exhausted pools) never become errors, they go through the fallback
/// cascade instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectorError {
    #[error("No events available to continue")]
    EmptyCorpus,

    #[error("Reference event is missing")]
    MissingReference,

    #[error("Invalid reference date: {0}")]
    InvalidReferenceDate(String),

    #[error("Level config not found: {0}")]
    MissingLevelConfig(u32),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for SelectorError {
    fn from(err: serde_json::Error) -> Self {
        SelectorError::Deserialization(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<SelectorError> for pyo3::PyErr {
    fn from(err: SelectorError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};

        match err {
            SelectorError::MissingLevelConfig(level) => {
                PyKeyError::new_err(format!("Level config not found: {}", level))
            }
            SelectorError::InvalidReferenceDate(_)
            | SelectorError::InvalidSettings(_)
            | SelectorError::Deserialization(_) => PyValueError::new_err(err.to_string()),
            SelectorError::EmptyCorpus | SelectorError::MissingReference => {
                PyRuntimeError::new_err(err.to_string())
            }
        }
    }
}

/// Result type alias for the event selection engine
pub type Result<T> = std::result::Result<T, SelectorError>;
