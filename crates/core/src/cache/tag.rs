//! Calendar day tags and the clock that produces them.

use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};

use chrono::{Datelike, Local, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An 8-digit `YYYYMMDD` calendar-date identifier.
///
/// Lexicographic order equals chronological order, so tags sort directly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DayTag(String);

impl DayTag {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y%m%d").to_string())
    }

    /// Accepts exactly eight ASCII digits.
    pub fn parse(raw: &str) -> Option<Self> {
        (raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit())).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of "today".
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    fn today_tag(&self) -> DayTag {
        DayTag::from_date(self.today())
    }
}

/// The local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a settable date.
#[derive(Debug)]
pub struct FixedClock {
    days_from_ce: AtomicI32,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { days_from_ce: AtomicI32::new(date.num_days_from_ce()) }
    }

    pub fn set(&self, date: NaiveDate) {
        self.days_from_ce.store(date.num_days_from_ce(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        NaiveDate::from_num_days_from_ce_opt(self.days_from_ce.load(Ordering::SeqCst)).unwrap_or(NaiveDate::MIN)
    }
}
