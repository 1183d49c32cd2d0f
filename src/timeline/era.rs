//! Historical eras and the key periods players tend to confuse

use super::date_cache::parse_date;
use serde::Serialize;

/// Events before this year count as antique
pub const ANTIQUE_YEAR_THRESHOLD: i32 = 500;

/// Coarse historical era bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Era {
    Antiquity,
    MiddleAges,
    Renaissance,
    Nineteenth,
    Twentieth,
    TwentyFirst,
}

impl Era {
    pub const ALL: [Era; 6] = [
        Era::Antiquity,
        Era::MiddleAges,
        Era::Renaissance,
        Era::Nineteenth,
        Era::Twentieth,
        Era::TwentyFirst,
    ];

    #[inline]
    pub const fn of_year(year: i32) -> Era {
        if year < ANTIQUE_YEAR_THRESHOLD {
            Era::Antiquity
        } else if year < 1500 {
            Era::MiddleAges
        } else if year < 1800 {
            Era::Renaissance
        } else if year < 1900 {
            Era::Nineteenth
        } else if year < 2000 {
            Era::Twentieth
        } else {
            Era::TwentyFirst
        }
    }

    /// Era of a raw date string, `None` when it does not parse
    pub fn of_date(raw: &str) -> Option<Era> {
        parse_date(raw).map(|stamp| Era::of_year(stamp.year))
    }

    /// Antiquity or Middle Ages
    #[inline]
    pub const fn is_deep_past(self) -> bool {
        matches!(self, Era::Antiquity | Era::MiddleAges)
    }

    /// 1800 onwards
    #[inline]
    pub const fn is_modern(self) -> bool {
        matches!(self, Era::Nineteenth | Era::Twentieth | Era::TwentyFirst)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Era::Antiquity => "antiquity",
            Era::MiddleAges => "middle_ages",
            Era::Renaissance => "renaissance",
            Era::Nineteenth => "19th_century",
            Era::Twentieth => "20th_century",
            Era::TwentyFirst => "21st_century",
        }
    }
}

/// A period beginners confuse with its trap period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPeriod {
    pub name: &'static str,
    pub start: i32,
    pub end: i32,
    pub trap: &'static str,
}

impl KeyPeriod {
    #[inline]
    pub const fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }
}

pub const KEY_PERIODS: [KeyPeriod; 4] = [
    KeyPeriod {
        name: "world_war_1",
        start: 1914,
        end: 1918,
        trap: "world_war_2",
    },
    KeyPeriod {
        name: "world_war_2",
        start: 1939,
        end: 1945,
        trap: "world_war_1",
    },
    KeyPeriod {
        name: "french_revolution",
        start: 1789,
        end: 1799,
        trap: "napoleonic_era",
    },
    KeyPeriod {
        name: "napoleonic_era",
        start: 1804,
        end: 1815,
        trap: "french_revolution",
    },
];

/// Key period containing `year`, if any
pub fn key_period_of(year: i32) -> Option<&'static KeyPeriod> {
    KEY_PERIODS.iter().find(|p| p.contains(year))
}

fn key_period_named(name: &str) -> Option<&'static KeyPeriod> {
    KEY_PERIODS.iter().find(|p| p.name == name)
}

/// How a candidate's year relates to the reference's key period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PeriodRelation {
    /// Both in the same key period
    Same,
    /// Candidate sits in the reference period's trap
    Trap,
    Unrelated,
}

pub fn period_relation(reference_year: i32, candidate_year: i32) -> PeriodRelation {
    let Some(period) = key_period_of(reference_year) else {
        return PeriodRelation::Unrelated;
    };
    if period.contains(candidate_year) {
        return PeriodRelation::Same;
    }
    match key_period_named(period.trap) {
        Some(trap) if trap.contains(candidate_year) => PeriodRelation::Trap,
        _ => PeriodRelation::Unrelated,
    }
}
