//! Calendar date components for date tokens.
//!
//! Date tokens read "today" through a [`DateSource`] so the clock can be
//! pinned in tests and tooling.

use crate::{Error, Result};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated calendar date split into its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateParts {
    year: i32,
    month: u32,
    day: u32,
}

impl DateParts {
    /// Creates date parts, rejecting dates that do not exist.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from)
            .ok_or_else(|| Error::InvalidDate(format!("{year:04}-{month:02}-{day:02}")))
    }

    /// The local calendar date right now.
    #[must_use]
    pub fn today() -> Self {
        Self::from(Local::now().date_naive())
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Four-digit year, e.g. `2024`.
    #[must_use]
    pub fn year_segment(&self) -> String {
        self.year.to_string()
    }

    /// Zero-padded month, e.g. `03`.
    #[must_use]
    pub fn month_segment(&self) -> String {
        format!("{:02}", self.month)
    }

    /// Zero-padded day of month, e.g. `07`.
    #[must_use]
    pub fn day_segment(&self) -> String {
        format!("{:02}", self.day)
    }
}

impl From<NaiveDate> for DateParts {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for DateParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Supplies the current date to date tokens.
pub trait DateSource: Send + Sync {
    fn today(&self) -> DateParts;
}

/// Reads the local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDate;

impl DateSource for SystemDate {
    fn today(&self) -> DateParts {
        DateParts::today()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDate(pub DateParts);

impl DateSource for FixedDate {
    fn today(&self) -> DateParts {
        self.0
    }
}
