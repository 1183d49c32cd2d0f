//! Tunable engine settings

use crate::error::{Result, SelectorError};
use serde::{Deserialize, Serialize};

/// Engine settings, all fields optional in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSettings {
    /// Calls closer together than this are dropped
    pub debounce_ms: i64,
    /// Maximum size of the pre-filtered working set
    pub max_prefilter_pool: usize,
    /// Maximum number of candidates scored per call
    pub max_scoring_pool: usize,
    /// Final pick is uniform among this many best candidates
    pub top_k: usize,
    /// Date cache is cleared once it grows past this many entries
    pub date_cache_capacity: usize,
    /// Score cache is cleared once it grows past this many entries
    pub score_cache_capacity: usize,
    /// Temporal jump picks among at most this many matches
    pub jump_candidate_limit: usize,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            max_prefilter_pool: 150,
            max_scoring_pool: 100,
            top_k: 5,
            date_cache_capacity: 1000,
            score_cache_capacity: 5000,
            jump_candidate_limit: 50,
        }
    }
}

impl SelectorSettings {
    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: SelectorSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.debounce_ms < 0 {
            return Err(SelectorError::InvalidSettings(
                "debounce_ms must not be negative".to_string(),
            ));
        }
        let caps = [
            ("max_prefilter_pool", self.max_prefilter_pool),
            ("max_scoring_pool", self.max_scoring_pool),
            ("top_k", self.top_k),
            ("date_cache_capacity", self.date_cache_capacity),
            ("score_cache_capacity", self.score_cache_capacity),
            ("jump_candidate_limit", self.jump_candidate_limit),
        ];
        for (name, value) in caps {
            if value == 0 {
                return Err(SelectorError::InvalidSettings(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }
}
