//! Civil calendar dates with `M/D/YYYY` text conversion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error produced when text cannot be converted to a [`PlainDate`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DateParseError {
    /// The text is not in `M/D/YYYY` form.
    #[error("expected a date in M/D/YYYY form")]
    InvalidFormat,
    /// The components do not name a real calendar day.
    #[error("no such calendar day: {month}/{day}/{year}")]
    OutOfRange {
        /// Year component.
        year: i32,
        /// Month component (1-based).
        month: u8,
        /// Day component (1-based).
        day: u8,
    },
}

/// An immutable Gregorian calendar date.
///
/// Equality is structural; ordering is chronological. A `PlainDate` carries
/// no time-of-day or timezone information.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlainDate {
    year: i32,
    month: u8,
    day: u8,
}

impl PlainDate {
    /// Create a date, validating that the day exists in the given month.
    ///
    /// # Errors
    ///
    /// Returns [`DateParseError::OutOfRange`] when the month is not 1-12 or
    /// the day does not exist in that month.
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, DateParseError> {
        if !(1..=12).contains(&month) || day == 0 || day > Self::days_in_month(year, month) {
            return Err(DateParseError::OutOfRange { year, month, day });
        }
        Ok(Self { year, month, day })
    }

    /// Get the year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Get the month (1-based).
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Get the day of the month (1-based).
    #[must_use]
    pub const fn day(&self) -> u8 {
        self.day
    }

    /// Check whether a year is a Gregorian leap year.
    #[must_use]
    pub const fn is_leap_year(year: i32) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    /// Number of days in the given month of the given year.
    ///
    /// Months outside 1-12 report zero days.
    #[must_use]
    pub const fn days_in_month(year: i32, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 => {
                if Self::is_leap_year(year) {
                    29
                } else {
                    28
                }
            }
            _ => 0,
        }
    }

    /// Parse a date from `M/D/YYYY` text (e.g. `1/1/2020`).
    ///
    /// Surrounding whitespace is ignored. Zero-padded components are
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns [`DateParseError::InvalidFormat`] for malformed text and
    /// [`DateParseError::OutOfRange`] for a well-formed but nonexistent day.
    pub fn parse(text: &str) -> Result<Self, DateParseError> {
        let mut parts = text.trim().split('/');
        let month = Self::component(parts.next())?;
        let day = Self::component(parts.next())?;
        let year = parts
            .next()
            .and_then(|p| p.trim().parse::<i32>().ok())
            .ok_or(DateParseError::InvalidFormat)?;
        if parts.next().is_some() {
            return Err(DateParseError::InvalidFormat);
        }
        Self::new(year, month, day)
    }

    fn component(part: Option<&str>) -> Result<u8, DateParseError> {
        part.and_then(|p| p.trim().parse::<u8>().ok())
            .ok_or(DateParseError::InvalidFormat)
    }
}

impl fmt::Display for PlainDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.month, self.day, self.year)
    }
}

impl FromStr for PlainDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
