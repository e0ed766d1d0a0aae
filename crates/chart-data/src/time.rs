// File: crates/chart-data/src/time.rs
// Summary: Time conversion: UTC timestamps and business days normalized to a canonical TimePoint.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::{ChartDataError, Result};

/// Seconds since the Unix epoch, UTC.
pub type UtcTimestamp = i64;

const SECONDS_PER_DAY: i64 = 86_400;
// NaiveDate::num_days_from_ce() of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Calendar date without time of day.
/// Not validated on construction; `convert_time` rejects dates that do not exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusinessDay {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl BusinessDay {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

impl fmt::Display for BusinessDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for BusinessDay {
    type Err = ChartDataError;

    fn from_str(s: &str) -> Result<Self> {
        string_to_business_day(s)
    }
}

/// Which of the two time representations a value uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeKind {
    Timestamp,
    BusinessDay,
}

impl fmt::Display for TimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeKind::Timestamp => f.write_str("timestamp"),
            TimeKind::BusinessDay => f.write_str("business day"),
        }
    }
}

/// Caller-facing time value, as supplied with series data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Time {
    Timestamp(UtcTimestamp),
    BusinessDay(BusinessDay),
}

impl Time {
    pub const fn kind(&self) -> TimeKind {
        match self {
            Time::Timestamp(_) => TimeKind::Timestamp,
            Time::BusinessDay(_) => TimeKind::BusinessDay,
        }
    }
}

impl From<UtcTimestamp> for Time {
    fn from(ts: UtcTimestamp) -> Self {
        Time::Timestamp(ts)
    }
}

impl From<BusinessDay> for Time {
    fn from(bd: BusinessDay) -> Self {
        Time::BusinessDay(bd)
    }
}

/// Canonical time key. Points are ordered and identified by `timestamp` alone;
/// `business_day` is carried along for label rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimePoint {
    pub timestamp: UtcTimestamp,
    pub business_day: Option<BusinessDay>,
}

impl TimePoint {
    pub const fn from_timestamp(timestamp: UtcTimestamp) -> Self {
        Self { timestamp, business_day: None }
    }

    pub const fn kind(&self) -> TimeKind {
        match self.business_day {
            Some(_) => TimeKind::BusinessDay,
            None => TimeKind::Timestamp,
        }
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.business_day {
            Some(bd) => write!(f, "{bd}"),
            None => write!(f, "{}", self.timestamp),
        }
    }
}

/// Normalize a caller time into a `TimePoint`.
///
/// Business days map to their UTC midnight using proleptic Gregorian day
/// counting; no time zone is involved.
pub fn convert_time(time: Time) -> Result<TimePoint> {
    match time {
        Time::Timestamp(ts) => Ok(TimePoint::from_timestamp(ts)),
        Time::BusinessDay(bd) => {
            let date = NaiveDate::from_ymd_opt(bd.year, bd.month, bd.day).ok_or(
                ChartDataError::InvalidDate { year: bd.year, month: bd.month, day: bd.day },
            )?;
            let days = i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE;
            Ok(TimePoint { timestamp: days * SECONDS_PER_DAY, business_day: Some(bd) })
        }
    }
}

/// Parse a strict `YYYY-MM-DD` string.
pub fn string_to_business_day(s: &str) -> Result<BusinessDay> {
    let parse_err = || ChartDataError::Parse { input: s.to_string() };
    let b = s.as_bytes();
    let shaped = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter().enumerate().all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
    if !shaped {
        return Err(parse_err());
    }
    // All-digit fields, so these parses cannot overflow.
    let year: i32 = s[0..4].parse().map_err(|_| parse_err())?;
    let month: u32 = s[5..7].parse().map_err(|_| parse_err())?;
    let day: u32 = s[8..10].parse().map_err(|_| parse_err())?;
    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(parse_err());
    }
    Ok(BusinessDay { year, month, day })
}
