// File: crates/chart-data/src/axis.rs
// Summary: Tick-mark weights for the time axis: how significant a boundary each scale point crosses.

use chrono::{DateTime, Datelike, Utc};

use crate::scale::TimeScalePoint;
use crate::time::UtcTimestamp;

/// Significance of the calendar boundary between a point and its predecessor.
/// Higher weights are preferred when the axis has to drop labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TickMarkWeight {
    LessThanSecond = 0,
    Second = 10,
    Minute1 = 20,
    Minute5 = 21,
    Minute30 = 22,
    Hour1 = 30,
    Hour3 = 31,
    Hour6 = 32,
    Hour12 = 33,
    Day = 50,
    Month = 60,
    Year = 70,
}

// Ascending by divisor (seconds).
const INTRADAY_DIVISORS: [(i64, TickMarkWeight); 8] = [
    (1, TickMarkWeight::Second),
    (60, TickMarkWeight::Minute1),
    (300, TickMarkWeight::Minute5),
    (1_800, TickMarkWeight::Minute30),
    (3_600, TickMarkWeight::Hour1),
    (10_800, TickMarkWeight::Hour3),
    (21_600, TickMarkWeight::Hour6),
    (43_200, TickMarkWeight::Hour12),
];

/// Weight of the boundary crossed going from `prev` to `current`.
pub fn weight_between(current: UtcTimestamp, prev: UtcTimestamp) -> TickMarkWeight {
    let dates = (
        DateTime::<Utc>::from_timestamp(current, 0),
        DateTime::<Utc>::from_timestamp(prev, 0),
    );
    if let (Some(cur), Some(prv)) = dates {
        if cur.year() != prv.year() {
            return TickMarkWeight::Year;
        }
        if cur.month() != prv.month() {
            return TickMarkWeight::Month;
        }
        if cur.day() != prv.day() {
            return TickMarkWeight::Day;
        }
    }
    for &(divisor, weight) in INTRADAY_DIVISORS.iter().rev() {
        if current.div_euclid(divisor) != prev.div_euclid(divisor) {
            return weight;
        }
    }
    TickMarkWeight::LessThanSecond
}

/// Weight of the first point, measured against a virtual predecessor one
/// average spacing earlier. Depends on the whole scale span.
fn leading_weight(points: &[TimeScalePoint]) -> TickMarkWeight {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => {
            let t0 = first.time.timestamp;
            let span = last.time.timestamp.saturating_sub(t0);
            let gaps = (points.len() - 1) as i64;
            let avg = span / gaps + i64::from(span % gaps != 0);
            weight_between(t0, t0.saturating_sub(avg))
        }
        _ => TickMarkWeight::LessThanSecond,
    }
}

/// Recompute weights from `start` to the end. The leading point is only
/// re-estimated when `start` is 0, so appends never touch it.
/// Returns the lowest index whose weight actually changed.
pub fn fill_weights(points: &mut [TimeScalePoint], start: usize) -> Option<usize> {
    if points.is_empty() {
        return None;
    }
    let mut first_changed = None;
    if start == 0 {
        let lead = leading_weight(points);
        if points[0].weight != lead {
            points[0].weight = lead;
            first_changed = Some(0);
        }
    }
    for i in start.max(1)..points.len() {
        let w = weight_between(points[i].time.timestamp, points[i - 1].time.timestamp);
        if points[i].weight != w {
            points[i].weight = w;
            first_changed.get_or_insert(i);
        }
    }
    first_changed
}
