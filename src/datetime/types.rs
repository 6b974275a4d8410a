//! Date/time types: layouts, time units and timezones

use crate::error::Error;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Layout
// ============================================================================

/// A date/time format tried by the heuristic parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// RFC 3339 / ISO 8601 with offset or `Z`, optional fraction
    Rfc3339,
    /// RFC 2822 (`Mon, 02 Jan 2006 15:04:05 -0700`)
    Rfc2822,
    /// chrono format carrying its own offset
    Zoned(String),
    /// chrono format with date and time but no offset
    Naive(String),
    /// chrono format with a date only; midnight is assumed
    Date(String),
}

impl Layout {
    /// Classify a layout string.
    ///
    /// `rfc3339` and `rfc2822` select the built-in parsers; anything else is
    /// a chrono format string.
    pub fn new(format: &str) -> Self {
        match format.to_ascii_lowercase().as_str() {
            "rfc3339" => return Layout::Rfc3339,
            "rfc2822" => return Layout::Rfc2822,
            _ => {}
        }
        let has_offset = ["%z", "%:z", "%::z", "%#z"]
            .iter()
            .any(|offset| format.contains(offset));
        let has_time = ["%H", "%I", "%T", "%R", "%k", "%l"]
            .iter()
            .any(|time| format.contains(time));
        if has_offset {
            Layout::Zoned(format.to_string())
        } else if has_time {
            Layout::Naive(format.to_string())
        } else {
            Layout::Date(format.to_string())
        }
    }

    /// Layout name as written in configuration
    pub fn name(&self) -> &str {
        match self {
            Layout::Rfc3339 => "rfc3339",
            Layout::Rfc2822 => "rfc2822",
            Layout::Zoned(f) | Layout::Naive(f) | Layout::Date(f) => f,
        }
    }

    /// Try to parse `value` with this layout.
    ///
    /// Naive layouts are interpreted in `timezone`.
    pub fn apply(&self, value: &str, timezone: Timezone) -> Option<DateTime<Utc>> {
        match self {
            Layout::Rfc3339 => DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Layout::Rfc2822 => DateTime::parse_from_rfc2822(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Layout::Zoned(format) => DateTime::parse_from_str(value, format)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Layout::Naive(format) => NaiveDateTime::parse_from_str(value, format)
                .ok()
                .and_then(|naive| timezone.localize(naive)),
            Layout::Date(format) => NaiveDate::parse_from_str(value, format)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .and_then(|naive| timezone.localize(naive)),
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Time Unit
// ============================================================================

/// Unit of numeric Unix timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    #[serde(alias = "s")]
    Second,
    #[serde(alias = "ms")]
    Millisecond,
    #[serde(alias = "us")]
    Microsecond,
    #[serde(alias = "ns")]
    Nanosecond,
}

impl TimeUnit {
    /// Seconds per unit
    pub fn factor(self) -> f64 {
        match self {
            TimeUnit::Second => 1.0,
            TimeUnit::Millisecond => 1e-3,
            TimeUnit::Microsecond => 1e-6,
            TimeUnit::Nanosecond => 1e-9,
        }
    }

    /// Convert a numeric timestamp in this unit to an instant.
    ///
    /// Integral values are converted exactly; fractional values keep
    /// nanosecond precision. Returns `None` when out of range.
    pub fn to_datetime(self, value: f64) -> Option<DateTime<Utc>> {
        if !value.is_finite() {
            return None;
        }
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            let n = value as i64;
            return match self {
                TimeUnit::Second => DateTime::from_timestamp(n, 0),
                TimeUnit::Millisecond => DateTime::from_timestamp_millis(n),
                TimeUnit::Microsecond => DateTime::from_timestamp_micros(n),
                TimeUnit::Nanosecond => Some(DateTime::from_timestamp_nanos(n)),
            };
        }

        let seconds = value * self.factor();
        if seconds.abs() >= i64::MAX as f64 {
            return None;
        }
        let whole = seconds.floor();
        let mut secs = whole as i64;
        let mut nanos = ((seconds - whole) * 1e9).round() as u32;
        if nanos >= 1_000_000_000 {
            secs += 1;
            nanos -= 1_000_000_000;
        }
        DateTime::from_timestamp(secs, nanos)
    }
}

// ============================================================================
// Timezone
// ============================================================================

/// Timezone used to interpret naive date/time strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timezone {
    #[default]
    Utc,
    /// The host's local timezone
    Local,
    Fixed(FixedOffset),
}

impl Timezone {
    /// Attach this timezone to a naive value and convert to UTC.
    ///
    /// Ambiguous local times resolve to the earliest instant; nonexistent
    /// ones (DST gaps) yield `None`.
    pub fn localize(self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Timezone::Utc => Some(naive.and_utc()),
            Timezone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Timezone::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl FromStr for Timezone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "utc" | "z" | "" => return Ok(Timezone::Utc),
            "local" => return Ok(Timezone::Local),
            _ => {}
        }

        let invalid = || Error::InvalidTimezone(s.to_string());
        let (sign, rest) = match trimmed.as_bytes()[0] {
            b'+' => (1, &trimmed[1..]),
            b'-' => (-1, &trimmed[1..]),
            _ => return Err(invalid()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Timezone::Fixed)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for Timezone {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timezone> for String {
    fn from(value: Timezone) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for Timezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timezone::Utc => write!(f, "UTC"),
            Timezone::Local => write!(f, "Local"),
            Timezone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}
