//! Memoized year/timestamp extraction from event date strings

use crate::config::Event;
use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Year used for dates that cannot be parsed
pub const DEFAULT_YEAR: i32 = 2000;

const MS_PER_YEAR: f64 = 365.25 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Leading signed year, e.g. "-44", "1515", "0476-09-04" with a bad month
static LEADING_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?\d{1,6})(?:$|[-/T ])").expect("leading year pattern is valid")
});

/// Parsed date: calendar year and UTC epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearStamp {
    pub year: i32,
    pub timestamp_ms: i64,
}

impl YearStamp {
    /// January 1st of `year`, midnight UTC
    pub fn start_of_year(year: i32) -> Option<Self> {
        let timestamp_ms = NaiveDate::from_ymd_opt(year, 1, 1)?
            .and_hms_opt(0, 0, 0)?
            .and_utc()
            .timestamp_millis();
        Some(Self { year, timestamp_ms })
    }

    /// Fallback stamp for unparseable dates
    pub fn fallback() -> Self {
        // 2000-01-01T00:00:00Z
        Self::start_of_year(DEFAULT_YEAR).unwrap_or(Self {
            year: DEFAULT_YEAR,
            timestamp_ms: 946_684_800_000,
        })
    }
}

/// Parse an ISO-ish date string without caching
pub fn parse_date(raw: &str) -> Option<YearStamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(YearStamp {
            year: dt.year(),
            timestamp_ms: dt.timestamp_millis(),
        });
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(YearStamp {
                year: dt.year(),
                timestamp_ms: dt.and_utc().timestamp_millis(),
            });
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let timestamp_ms = date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis();
        return Some(YearStamp {
            year: date.year(),
            timestamp_ms,
        });
    }

    let year: i32 = LEADING_YEAR.captures(raw)?.get(1)?.as_str().parse().ok()?;
    YearStamp::start_of_year(year)
}

/// Cache of parsed dates keyed by the raw date string
///
/// Unparseable strings are remembered separately and survive [`trim`], so
/// each one is reported only once.
///
/// [`trim`]: DateCache::trim
#[derive(Debug, Default)]
pub struct DateCache {
    entries: AHashMap<String, YearStamp>,
    malformed: AHashSet<String>,
}

impl DateCache {
    pub fn new() -> Self {
        Self {
            entries: AHashMap::with_capacity(1024),
            malformed: AHashSet::new(),
        }
    }

    /// Parse `raw`, or `None` if it is not a date
    pub fn lookup(&mut self, raw: &str) -> Option<YearStamp> {
        if let Some(cached) = self.entries.get(raw) {
            return Some(*cached);
        }
        if self.malformed.contains(raw) {
            return None;
        }

        match parse_date(raw) {
            Some(stamp) => {
                self.entries.insert(raw.to_string(), stamp);
                Some(stamp)
            }
            None => {
                tracing::warn!(date = raw, "unparseable event date, defaulting to year {}", DEFAULT_YEAR);
                self.malformed.insert(raw.to_string());
                None
            }
        }
    }

    /// Year and timestamp of `raw`, degrading to year 2000 when unparseable
    #[inline]
    pub fn year_of(&mut self, raw: &str) -> YearStamp {
        self.lookup(raw).unwrap_or_else(YearStamp::fallback)
    }

    /// Stamp of an event, `None` only when the event has no date at all
    #[inline]
    pub fn event_stamp(&mut self, event: &Event) -> Option<YearStamp> {
        event.date_str().map(|raw| self.year_of(raw))
    }

    #[inline]
    pub fn event_year(&mut self, event: &Event) -> Option<i32> {
        self.event_stamp(event).map(|stamp| stamp.year)
    }

    /// Absolute time between two events in years, infinite if a date is missing
    pub fn time_difference_years(&mut self, a: &Event, b: &Event) -> f64 {
        match (self.event_stamp(a), self.event_stamp(b)) {
            (Some(sa), Some(sb)) => (sa.timestamp_ms - sb.timestamp_ms).abs() as f64 / MS_PER_YEAR,
            _ => f64::INFINITY,
        }
    }

    /// Number of distinct unparseable date strings seen
    pub fn malformed_count(&self) -> u64 {
        self.malformed.len() as u64
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.malformed.clear();
    }

    /// Drop the parsed entries once they grow past `capacity`
    ///
    /// Malformed strings are kept so they are not counted again.
    pub fn trim(&mut self, capacity: usize) -> bool {
        if self.entries.len() > capacity {
            tracing::debug!(entries = self.entries.len(), "date cache cleared");
            self.entries.clear();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_date() {
        let mut cache = DateCache::new();
        let stamp = cache.year_of("1944-06-06");
        assert_eq!(stamp.year, 1944);
        assert_eq!(cache.len(), 1);

        // Cached call returns the same value
        assert_eq!(cache.year_of("1944-06-06"), stamp);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_rfc3339_and_naive_datetime() {
        assert_eq!(parse_date("1969-07-20T20:17:00Z").unwrap().year, 1969);
        assert_eq!(parse_date("1969-07-20T20:17:00").unwrap().year, 1969);
        assert_eq!(parse_date("1969-07-20 20:17:00").unwrap().year, 1969);
    }

    #[test]
    fn test_bce_and_bare_years() {
        assert_eq!(parse_date("-44").unwrap().year, -44);
        assert_eq!(parse_date("1515").unwrap().year, 1515);
        assert!(parse_date("-0044-03-15").unwrap().year < 0);
        assert!(parse_date("-44").unwrap().timestamp_ms < parse_date("1515").unwrap().timestamp_ms);
    }

    #[test]
    fn test_malformed_defaults_to_2000() {
        let mut cache = DateCache::new();
        let stamp = cache.year_of("not a date");
        assert_eq!(stamp.year, DEFAULT_YEAR);
        assert_eq!(stamp, YearStamp::fallback());
        assert_eq!(cache.malformed_count(), 1);

        // Reported once per distinct string
        cache.year_of("not a date");
        assert_eq!(cache.malformed_count(), 1);
    }

    #[test]
    fn test_missing_date_is_infinite_gap() {
        let mut cache = DateCache::new();
        let a = Event::new("a", "1900-01-01", "A");
        let mut b = Event::new("b", "1900-01-01", "B");
        b.date = None;
        assert!(cache.time_difference_years(&a, &b).is_infinite());
    }

    #[test]
    fn test_time_difference_in_years() {
        let mut cache = DateCache::new();
        let a = Event::new("a", "1900-01-01", "A");
        let b = Event::new("b", "2000-01-01", "B");
        let diff = cache.time_difference_years(&a, &b);
        assert!((diff - 100.0).abs() < 0.05);
    }

    #[test]
    fn test_trim_over_capacity() {
        let mut cache = DateCache::new();
        for year in 1000..1010 {
            cache.year_of(&format!("{}-01-01", year));
        }
        assert!(!cache.trim(10));
        assert_eq!(cache.len(), 10);
        cache.year_of("1500-01-01");
        assert!(cache.trim(10));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_trim_keeps_malformed_strings() {
        let mut cache = DateCache::new();
        cache.year_of("circa the flood");
        for year in 1000..1020 {
            cache.year_of(&format!("{}-01-01", year));
        }
        assert!(cache.trim(10));
        assert!(cache.is_empty());

        // Still known as malformed: not counted a second time
        assert_eq!(cache.year_of("circa the flood").year, DEFAULT_YEAR);
        assert_eq!(cache.malformed_count(), 1);

        cache.clear();
        assert_eq!(cache.malformed_count(), 0);
    }
}
