//! Property tests for the timeline module
//!
//! Covers date parsing, the date cache and era bucketing.

use proptest::prelude::*;

use crate::timeline::{parse_date, DateCache, Era, DEFAULT_YEAR};

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators for property tests
// ═══════════════════════════════════════════════════════════════════════════

/// Generate a well-formed `YYYY-MM-DD` string with its year
fn iso_date_strategy() -> impl Strategy<Value = (i32, String)> {
    (1..=9999i32, 1..=12u32, 1..=28u32)
        .prop_map(|(y, m, d)| (y, format!("{:04}-{:02}-{:02}", y, m, d)))
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// Well-formed dates always yield their own year
    #[test]
    fn prop_iso_dates_parse_to_year((year, raw) in iso_date_strategy()) {
        let stamp = parse_date(&raw).unwrap();
        prop_assert_eq!(stamp.year, year);
    }

    /// Cached and uncached lookups agree, and caching never changes the answer
    #[test]
    fn prop_cache_is_transparent((_, raw) in iso_date_strategy()) {
        let mut cache = DateCache::new();
        let first = cache.year_of(&raw);
        let second = cache.year_of(&raw);
        prop_assert_eq!(first, second);
        prop_assert_eq!(Some(first), parse_date(&raw));
        prop_assert_eq!(cache.malformed_count(), 0);
    }

    /// Garbage never panics and degrades to the default year
    #[test]
    fn prop_garbage_defaults(raw in "[a-zA-Z ]{1,20}") {
        let mut cache = DateCache::new();
        prop_assert_eq!(cache.year_of(&raw).year, DEFAULT_YEAR);
    }

    /// Later years never fall in an earlier era
    #[test]
    fn prop_era_monotonic(a in -5000..=2100i32, b in -5000..=2100i32) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(Era::of_year(lo) <= Era::of_year(hi));
    }
}
