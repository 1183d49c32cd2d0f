//! Date handling: parsed-date cache, eras and key periods

mod date_cache;
mod era;

#[cfg(test)]
mod property_tests;

pub use date_cache::*;
pub use era::*;
