//! Month-granularity calendar values.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MatrixError;

/// A calendar month, used both for cohort origination periods and close months.
///
/// Internally pinned to the first day of the month so that ordering and
/// arithmetic are plain date operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CohortMonth(NaiveDate);

impl CohortMonth {
    /// Create a month from a year and a 1-based month number.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// Truncate a date to its month.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// Parse a period string.
    ///
    /// Accepts `YYYY-MM`, `YYYY-MM-DD` and datetime strings starting with a
    /// `YYYY-MM-DD` date; only the year and month are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use vintage_matrix::CohortMonth;
    ///
    /// let month = CohortMonth::parse("2024-03-17").unwrap();
    /// assert_eq!(month.label(), "2024-03");
    /// assert_eq!(CohortMonth::parse("2024-03").unwrap(), month);
    /// ```
    pub fn parse(value: &str) -> Result<Self, MatrixError> {
        let trimmed = value.trim();
        let head = trimmed
            .get(..7)
            .ok_or_else(|| MatrixError::InvalidPeriod(value.to_string()))?;

        // Anything after the month must look like a day component
        let rest = &trimmed[7..];
        if !rest.is_empty() && !rest.starts_with('-') {
            return Err(MatrixError::InvalidPeriod(value.to_string()));
        }

        NaiveDate::parse_from_str(&format!("{head}-01"), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| MatrixError::InvalidPeriod(value.to_string()))
    }

    /// The first day of the month.
    pub const fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Calendar month number (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The month `n` months earlier.
    pub fn minus_months(&self, n: u32) -> Self {
        Self(self.0.checked_sub_months(Months::new(n)).unwrap_or(NaiveDate::MIN))
    }

    /// The month `n` months later.
    pub fn plus_months(&self, n: u32) -> Self {
        Self(self.0.checked_add_months(Months::new(n)).unwrap_or(NaiveDate::MAX))
    }

    /// Signed number of months from `self` to `other`.
    ///
    /// Positive when `other` is later than `self`.
    pub fn months_until(&self, other: &Self) -> i64 {
        let from = i64::from(self.year()) * 12 + i64::from(self.month());
        let to = i64::from(other.year()) * 12 + i64::from(other.month());
        to - from
    }

    /// `YYYY-MM` label.
    pub fn label(&self) -> String {
        self.0.format("%Y-%m").to_string()
    }
}

impl fmt::Display for CohortMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for CohortMonth {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CohortMonth {
    type Error = MatrixError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CohortMonth> for String {
    fn from(month: CohortMonth) -> Self {
        month.label()
    }
}

impl From<NaiveDate> for CohortMonth {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}
