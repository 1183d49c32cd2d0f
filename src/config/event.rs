//! Historical event records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Unique event identifier as stored in the backing store
pub type EventId = String;

/// A historical event from the corpus
///
/// Loaded once at game start. `frequency_score` and `last_used` are written by
/// an external synchronization service whenever an event is shown; the engine
/// only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    /// ISO-ish date string, `None` when the store has no date
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, alias = "titre")]
    pub title: String,
    #[serde(default, alias = "illustrationUrl")]
    pub illustration_url: String,
    #[serde(default, alias = "niveau_difficulte", alias = "difficultyLevel")]
    pub difficulty_level: Option<i32>,
    #[serde(default, alias = "types_evenement", alias = "eventTypes")]
    pub event_types: Vec<String>,
    /// Fame on a 0..=100 scale
    #[serde(default, alias = "notoriete")]
    pub notoriety: Option<i32>,
    #[serde(
        default,
        alias = "frequencyScore",
        deserialize_with = "null_as_zero"
    )]
    pub frequency_score: i32,
    #[serde(default, alias = "lastUsed")]
    pub last_used: Option<DateTime<Utc>>,
}

fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i32>::deserialize(deserializer)?.unwrap_or_default())
}

impl Event {
    /// Create a bare event with an id, a date and a title
    pub fn new(id: impl Into<EventId>, date: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: Some(date.into()),
            title: title.into(),
            illustration_url: String::new(),
            difficulty_level: None,
            event_types: Vec::new(),
            notoriety: None,
            frequency_score: 0,
            last_used: None,
        }
    }

    pub fn with_notoriety(mut self, notoriety: i32) -> Self {
        self.notoriety = Some(notoriety);
        self
    }

    pub fn with_difficulty(mut self, difficulty: i32) -> Self {
        self.difficulty_level = Some(difficulty);
        self
    }

    pub fn with_frequency(mut self, frequency_score: i32) -> Self {
        self.frequency_score = frequency_score;
        self
    }

    pub fn with_last_used(mut self, last_used: DateTime<Utc>) -> Self {
        self.last_used = Some(last_used);
        self
    }

    /// Date string, treating an empty string like a missing date
    #[inline]
    pub fn date_str(&self) -> Option<&str> {
        self.date.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    /// Parse a corpus from the backing-store JSON export (an array of rows)
    pub fn corpus_from_json(json: &str) -> crate::error::Result<Vec<Event>> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_store_columns() {
        let json = r#"[{
            "id": "a1",
            "date": "1944-06-06",
            "titre": "D-Day",
            "illustration_url": "https://img/dday.png",
            "niveau_difficulte": 2,
            "types_evenement": ["war"],
            "notoriete": 92,
            "frequency_score": null,
            "last_used": "2024-01-01T10:00:00Z"
        }]"#;

        let corpus = Event::corpus_from_json(json).unwrap();
        assert_eq!(corpus.len(), 1);
        let event = &corpus[0];
        assert_eq!(event.title, "D-Day");
        assert_eq!(event.difficulty_level, Some(2));
        assert_eq!(event.notoriety, Some(92));
        assert_eq!(event.frequency_score, 0);
        assert!(event.last_used.is_some());
    }

    #[test]
    fn test_deserialize_minimal_row() {
        let corpus = Event::corpus_from_json(r#"[{"id": "x"}]"#).unwrap();
        assert_eq!(corpus[0].date_str(), None);
        assert_eq!(corpus[0].notoriety, None);
    }

    #[test]
    fn test_empty_date_is_missing() {
        let mut event = Event::new("e", "   ", "blank");
        assert_eq!(event.date_str(), None);
        event.date = Some("1789-07-14".to_string());
        assert_eq!(event.date_str(), Some("1789-07-14"));
    }

    #[test]
    fn test_invalid_json_is_deserialization_error() {
        let err = Event::corpus_from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::error::SelectorError::Deserialization(_)));
    }
}
