//! Calendar-month periods.

use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::Date;

/// One calendar month, the time bucket every series is keyed on.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Create a period, returning `None` if `month` is not in `1..=12`.
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 { Some(Self { year, month }) } else { None }
    }

    /// Parse a strict `YYYYMM` key such as `"202401"`.
    ///
    /// The key must be exactly six ASCII digits with a valid month.
    #[must_use]
    pub fn from_yyyymm(key: &str) -> Option<Self> {
        if key.len() != 6 || !key.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: i32 = key[..4].parse().ok()?;
        let month: u32 = key[4..].parse().ok()?;
        Self::new(year, month)
    }

    /// The month containing `date`.
    #[must_use]
    pub fn from_date(date: Date) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month, `1..=12`.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(&self) -> Date {
        Date::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// The following month.
    #[must_use]
    pub const fn succ(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
