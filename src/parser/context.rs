//! Settings shared by every record parsed for one task

use crate::datetime::{DateTimeParser, TimeUnit};
use chrono::{DateTime, Utc};

/// Parsing context a [`Metric`](crate::metric::Metric) reads through.
///
/// Holds the numeric timestamp unit, the default instant substituted for
/// unparseable non-nullable date/time fields, and the layout parser with its
/// per-field cache.
#[derive(Debug)]
pub struct ParseContext {
    time_unit: TimeUnit,
    epoch: DateTime<Utc>,
    datetimes: DateTimeParser,
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseContext {
    /// Seconds, Unix epoch sentinel, default layouts in UTC
    pub fn new() -> Self {
        Self {
            time_unit: TimeUnit::default(),
            epoch: DateTime::<Utc>::UNIX_EPOCH,
            datetimes: DateTimeParser::default(),
        }
    }

    /// Set the unit of numeric timestamps
    #[must_use]
    pub fn with_time_unit(mut self, time_unit: TimeUnit) -> Self {
        self.time_unit = time_unit;
        self
    }

    /// Set the default instant for non-nullable date/time fields
    #[must_use]
    pub fn with_epoch_sentinel(mut self, epoch: DateTime<Utc>) -> Self {
        self.epoch = epoch;
        self
    }

    /// Replace the date/time layout parser
    #[must_use]
    pub fn with_datetime_parser(mut self, datetimes: DateTimeParser) -> Self {
        self.datetimes = datetimes;
        self
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    pub fn epoch_sentinel(&self) -> DateTime<Utc> {
        self.epoch
    }

    pub fn datetimes(&self) -> &DateTimeParser {
        &self.datetimes
    }
}
