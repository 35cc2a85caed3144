use std::fmt;

use chrono::{Datelike, NaiveDate};

/// A calendar day without a year, printed as `MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Returns `None` for days that exist in no year (`02-30`, `13-01`).
    pub fn new(month: u32, day: u32) -> Option<Self> {
        // 2000 is a leap year, so 02-29 is accepted.
        NaiveDate::from_ymd_opt(2000, month, day).map(|_| Self { month, day })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    /// Whether a configured date string (`MM-DD` or `MM-DD-YYYY`) falls on
    /// this day. Only the prefix is compared, so trailing year digits are
    /// ignored.
    pub fn matches(&self, configured: &str) -> bool {
        configured.trim().starts_with(&self.to_string())
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}
