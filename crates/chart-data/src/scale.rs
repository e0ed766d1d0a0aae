// File: crates/chart-data/src/scale.rs
// Summary: Shared time scale: strictly ascending, duplicate-free time points merged from all series.

use crate::axis::TickMarkWeight;
use crate::time::{TimePoint, UtcTimestamp};
use crate::types::Mark;

/// One entry of the shared scale. Its index is its position in `TimeScale::points`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeScalePoint {
    pub time: TimePoint,
    pub weight: TickMarkWeight,
}

impl TimeScalePoint {
    pub const fn new(time: TimePoint) -> Self {
        Self { time, weight: TickMarkWeight::LessThanSecond }
    }
}

/// Result of folding a sorted point list into the scale.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Points that were not on the scale before, ascending.
    pub inserted: Vec<TimePoint>,
    /// For each inserted point, the pre-merge index it was inserted before.
    /// Non-decreasing; `inserted_before[k] + k` is the point's final index.
    pub inserted_before: Vec<usize>,
}

impl MergeOutcome {
    /// Lowest index at which the merged scale differs from the previous one.
    pub fn first_changed(&self) -> Option<usize> {
        self.inserted_before.first().copied()
    }

    pub fn is_noop(&self) -> bool {
        self.inserted.is_empty()
    }

    /// Post-merge index of the point that sat at `old` before the merge.
    #[inline]
    pub fn shifted(&self, old: usize) -> usize {
        old + self.inserted_before.partition_point(|&p| p <= old)
    }
}

/// The single time axis shared by every series of a `DataLayer`.
/// Grows only: points are inserted, never removed.
#[derive(Clone, Debug, Default)]
pub struct TimeScale {
    points: Vec<TimeScalePoint>,
}

impl TimeScale {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn len(&self) -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }
    pub fn points(&self) -> &[TimeScalePoint] { &self.points }
    pub fn point(&self, index: usize) -> Option<&TimeScalePoint> { self.points.get(index) }

    pub(crate) fn points_mut(&mut self) -> &mut [TimeScalePoint] {
        &mut self.points
    }

    /// Index of the point with exactly this timestamp.
    pub fn index_of(&self, timestamp: UtcTimestamp) -> Option<usize> {
        self.points
            .binary_search_by_key(&timestamp, |p| p.time.timestamp)
            .ok()
    }

    /// Marks for every entry from `index` to the end of the scale.
    pub fn marks_from(&self, index: usize) -> Vec<Mark> {
        self.points
            .iter()
            .enumerate()
            .skip(index)
            .map(|(i, p)| Mark { index: i, time: p.time, weight: p.weight })
            .collect()
    }

    /// Fold an ascending list of points into the scale (two-pointer merge).
    ///
    /// Points whose timestamp is already present keep the existing entry.
    /// New points get a placeholder weight; recomputing weights is the caller's job.
    pub fn merge(&mut self, incoming: &[TimePoint]) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        let Some(first) = incoming.first() else { return outcome };

        // Pure append: the common streaming case, no rebuild needed.
        let tail = self.points.last().map(|p| p.time.timestamp);
        if tail.map_or(true, |t| t < first.timestamp) {
            let base = self.points.len();
            for tp in incoming {
                if self.points.last().is_some_and(|p| p.time.timestamp >= tp.timestamp) {
                    continue;
                }
                self.points.push(TimeScalePoint::new(*tp));
                outcome.inserted.push(*tp);
                outcome.inserted_before.push(base);
            }
            return outcome;
        }

        let old = std::mem::take(&mut self.points);
        let mut merged = Vec::with_capacity(old.len() + incoming.len());
        let mut i = 0usize;
        for tp in incoming {
            while i < old.len() && old[i].time.timestamp < tp.timestamp {
                merged.push(old[i]);
                i += 1;
            }
            if i < old.len() && old[i].time.timestamp == tp.timestamp {
                continue;
            }
            if merged.last().is_some_and(|p: &TimeScalePoint| p.time.timestamp == tp.timestamp) {
                continue;
            }
            merged.push(TimeScalePoint::new(*tp));
            outcome.inserted.push(*tp);
            outcome.inserted_before.push(i);
        }
        merged.extend_from_slice(&old[i..]);
        self.points = merged;
        outcome
    }
}
