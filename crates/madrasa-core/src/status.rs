//! Session labels and attendance status, parsed once at the input boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two observation slots of a school day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Session {
    Am,
    Pm,
}

impl Session {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Session {
    type Err = UnknownSession;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("am") || trimmed.eq_ignore_ascii_case("morning") {
            Ok(Self::Am)
        } else if trimmed.eq_ignore_ascii_case("pm") || trimmed.eq_ignore_ascii_case("afternoon")
        {
            Ok(Self::Pm)
        } else {
            Err(UnknownSession(s.to_string()))
        }
    }
}

impl Serialize for Session {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Session {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unrecognized session labels.
#[derive(Debug, Clone)]
pub struct UnknownSession(String);

impl fmt::Display for UnknownSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown session: {}", self.0)
    }
}

impl std::error::Error for UnknownSession {}

/// Whether a subject was present in a session.
///
/// Only two values exist. Anything that is not recognizably "present" is
/// absent, so parsing never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    /// Parses a backend status string, case-insensitively.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("present") {
            Self::Present
        } else {
            Self::Absent
        }
    }

    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::Present)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AttendanceStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&s))
    }
}
