//! Year/month window applied to reconciled days.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Month restriction of an [`AttendanceFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MonthFilter {
    /// No month restriction.
    #[default]
    All,
    /// A single month, 1 through 12.
    Month(u32),
}

impl MonthFilter {
    /// Creates a single-month filter after range validation.
    pub fn month(month: u32) -> Result<Self, ValidationError> {
        if (1..=12).contains(&month) {
            Ok(Self::Month(month))
        } else {
            Err(ValidationError::MonthOutOfRange { value: month })
        }
    }

    /// Returns true if `month` (1-based) passes this filter.
    #[must_use]
    pub const fn matches(self, month: u32) -> bool {
        match self {
            Self::All => true,
            Self::Month(m) => m == month,
        }
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Month(m) => write!(f, "{m}"),
        }
    }
}

impl FromStr for MonthFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let month: u32 = trimmed
            .parse()
            .map_err(|_| ValidationError::InvalidMonthFilter {
                value: s.to_string(),
            })?;
        Self::month(month)
    }
}

/// Wire form: either `"all"`/`"3"` or a bare number.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MonthFilterRepr {
    Number(u32),
    Text(String),
}

impl Serialize for MonthFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::All => MonthFilterRepr::Text("all".to_string()).serialize(serializer),
            Self::Month(m) => MonthFilterRepr::Number(*m).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MonthFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match MonthFilterRepr::deserialize(deserializer)? {
            MonthFilterRepr::Number(m) => Self::month(m).map_err(serde::de::Error::custom),
            MonthFilterRepr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// The reporting window: one calendar year, optionally narrowed to a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttendanceFilter {
    pub year: i32,
    #[serde(default)]
    pub month: MonthFilter,
}

impl AttendanceFilter {
    /// Creates a window, rejecting a `MonthFilter::Month` outside 1..=12.
    pub fn new(year: i32, month: MonthFilter) -> Result<Self, ValidationError> {
        if let MonthFilter::Month(m) = month {
            MonthFilter::month(m)?;
        }
        Ok(Self { year, month })
    }

    /// A whole-year window.
    #[must_use]
    pub const fn year(year: i32) -> Self {
        Self {
            year,
            month: MonthFilter::All,
        }
    }

    /// Returns true if `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && self.month.matches(date.month())
    }
}

impl fmt::Display for AttendanceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month {
            MonthFilter::All => write!(f, "{}", self.year),
            MonthFilter::Month(m) => write!(f, "{}-{m:02}", self.year),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_filter_parses_all_and_numbers() {
        assert_eq!("all".parse::<MonthFilter>().unwrap(), MonthFilter::All);
        assert_eq!("ALL".parse::<MonthFilter>().unwrap(), MonthFilter::All);
        assert_eq!("3".parse::<MonthFilter>().unwrap(), MonthFilter::Month(3));
        assert_eq!(" 12 ".parse::<MonthFilter>().unwrap(), MonthFilter::Month(12));
    }

    #[test]
    fn month_filter_rejects_out_of_range() {
        assert_eq!(
            "13".parse::<MonthFilter>().unwrap_err(),
            ValidationError::MonthOutOfRange { value: 13 }
        );
        assert_eq!(
            "0".parse::<MonthFilter>().unwrap_err(),
            ValidationError::MonthOutOfRange { value: 0 }
        );
        assert!(matches!(
            "march".parse::<MonthFilter>().unwrap_err(),
            ValidationError::InvalidMonthFilter { .. }
        ));
    }

    #[test]
    fn month_filter_serde_accepts_text_and_number() {
        let parsed: MonthFilter = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(parsed, MonthFilter::All);
        let parsed: MonthFilter = serde_json::from_str("4").unwrap();
        assert_eq!(parsed, MonthFilter::Month(4));
        let parsed: MonthFilter = serde_json::from_str("\"4\"").unwrap();
        assert_eq!(parsed, MonthFilter::Month(4));
        assert!(serde_json::from_str::<MonthFilter>("13").is_err());

        assert_eq!(serde_json::to_string(&MonthFilter::All).unwrap(), "\"all\"");
        assert_eq!(serde_json::to_string(&MonthFilter::Month(7)).unwrap(), "7");
    }

    #[test]
    fn filter_contains_checks_year_and_month() {
        let whole_year = AttendanceFilter::year(2023);
        assert!(whole_year.contains(date(2023, 1, 1)));
        assert!(whole_year.contains(date(2023, 12, 31)));
        assert!(!whole_year.contains(date(2024, 1, 1)));

        let march = AttendanceFilter::new(2023, MonthFilter::Month(3)).unwrap();
        assert!(march.contains(date(2023, 3, 15)));
        assert!(!march.contains(date(2023, 4, 1)));
        assert!(!march.contains(date(2024, 3, 15)));
    }

    #[test]
    fn filter_new_rejects_out_of_range_month() {
        assert_eq!(
            AttendanceFilter::new(2024, MonthFilter::Month(13)).unwrap_err(),
            ValidationError::MonthOutOfRange { value: 13 }
        );
        assert_eq!(
            AttendanceFilter::new(2024, MonthFilter::Month(0)).unwrap_err(),
            ValidationError::MonthOutOfRange { value: 0 }
        );
        assert_eq!(
            AttendanceFilter::new(2024, MonthFilter::All).unwrap(),
            AttendanceFilter::year(2024)
        );
    }

    #[test]
    fn filter_display() {
        assert_eq!(AttendanceFilter::year(2024).to_string(), "2024");
        assert_eq!(
            AttendanceFilter::new(2024, MonthFilter::Month(3))
                .unwrap()
                .to_string(),
            "2024-03"
        );
    }
}
