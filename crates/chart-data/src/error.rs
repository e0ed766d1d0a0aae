// File: crates/chart-data/src/error.rs
// Summary: Error taxonomy for time conversion and DataLayer operations.

use thiserror::Error;

use crate::series::SeriesId;
use crate::time::{TimeKind, UtcTimestamp};

/// Errors raised by the data layer. Every variant is returned before any
/// shared state is touched, so a failed call leaves the time scale and the
/// series registry exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartDataError {
    /// A point's time representation disagrees with the kind already in use,
    /// either by another registered series or earlier in the same call.
    #[error("time type mismatch: expected {expected}, got {found}")]
    TimeTypeMismatch {
        expected: TimeKind,
        found: TimeKind,
    },

    /// Business-day string is not a `YYYY-MM-DD` calendar date.
    #[error("invalid business day string '{input}', expected format YYYY-MM-DD")]
    Parse { input: String },

    /// Business day does not name a real proleptic Gregorian date.
    #[error("invalid business day {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    /// Single-point update older than the series' last bar that is not an exact replace.
    #[error("out-of-order update for {series}: time {time} precedes last bar at {last}")]
    OrderingViolation {
        series: SeriesId,
        last: UtcTimestamp,
        time: UtcTimestamp,
    },

    /// The handle was never registered, or has already been removed.
    #[error("unknown series: {0}")]
    UnknownSeries(SeriesId),
}

pub type Result<T> = std::result::Result<T, ChartDataError>;
