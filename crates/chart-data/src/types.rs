// File: crates/chart-data/src/types.rs
// Summary: Update bundle types handed to render layers after each DataLayer operation.

use std::collections::BTreeMap;

use crate::axis::TickMarkWeight;
use crate::series::{Bar, SeriesId};
use crate::time::TimePoint;

/// Axis redraw hint for one scale entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mark {
    pub index: usize,
    pub time: TimePoint,
    pub weight: TickMarkWeight,
}

/// How a consumer applies a packet to its bar store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PacketKind {
    /// `update` is the series' complete bar list.
    Replace,
    /// Bars with a matching time are replaced, the rest inserted.
    Merge,
}

/// Bars of one series that are new or whose index moved, ascending by index.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesUpdatePacket<V> {
    pub kind: PacketKind,
    pub update: Vec<Bar<V>>,
}

impl<V> SeriesUpdatePacket<V> {
    pub fn replace(update: Vec<Bar<V>>) -> Self {
        Self { kind: PacketKind::Replace, update }
    }

    pub fn merge(update: Vec<Bar<V>>) -> Self {
        Self { kind: PacketKind::Merge, update }
    }

    /// Lowest index touched by this packet.
    pub fn first_index(&self) -> Option<usize> {
        self.update.first().map(|b| b.index)
    }
}

/// Global description of what changed on the shared scale.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeScaleUpdate<V> {
    /// Lowest scale index that changed; equals the scale length when nothing did.
    pub index: usize,
    /// Points newly added to the scale, ascending.
    pub changes: Vec<TimePoint>,
    /// Every scale entry from `index` to the end.
    pub marks: Vec<Mark>,
    pub series_updates: BTreeMap<SeriesId, SeriesUpdatePacket<V>>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdateResult<V> {
    pub time_scale_update: TimeScaleUpdate<V>,
}
