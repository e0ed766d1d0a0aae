// File: crates/chart-data/src/series.rs
// Summary: Series handles, input items, bars, and the consumer-side bar store that applies update packets.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::time::{Time, TimePoint};
use crate::types::{PacketKind, SeriesUpdatePacket};

static NEXT_SERIES_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a series. Compared by identity, never by data:
/// two series holding identical points still get distinct handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesId(u64);

impl SeriesId {
    /// Allocate a fresh, process-unique handle.
    pub fn next() -> Self {
        Self(NEXT_SERIES_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(&self) -> u64 { self.0 }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "series#{}", self.0)
    }
}

/// One caller-supplied data point.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesItem<V> {
    pub time: Time,
    pub value: V,
}

impl<V> SeriesItem<V> {
    pub fn new(time: impl Into<Time>, value: V) -> Self {
        Self { time: time.into(), value }
    }
}

/// A series' value at one index of the shared time scale.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bar<V> {
    pub index: usize,
    pub time: TimePoint,
    pub value: V,
}

/// OHLC value payload.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Validated candle for CSV feeds: the body (open and close) must sit
    /// inside the wick range, and no price may be NaN.
    pub fn try_new(open: f64, high: f64, low: f64, close: f64) -> Result<Self, &'static str> {
        if [open, high, low, close].iter().any(|p| p.is_nan()) {
            return Err("price is NaN");
        }
        if open.min(close) < low {
            return Err("body below low");
        }
        if open.max(close) > high {
            return Err("body above high");
        }
        Ok(Self { open, high, low, close })
    }
}

/// Bar storage owned by a rendered series. It never computes indices itself;
/// it only applies the packets a `DataLayer` hands back.
#[derive(Clone, Debug)]
pub struct SeriesStore<V> {
    bars: Vec<Bar<V>>,
}

impl<V> Default for SeriesStore<V> {
    fn default() -> Self {
        Self { bars: Vec::new() }
    }
}

impl<V: Clone> SeriesStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one packet: replace everything, or merge bars in by time.
    pub fn apply(&mut self, packet: &SeriesUpdatePacket<V>) {
        match packet.kind {
            PacketKind::Replace => self.bars = packet.update.clone(),
            PacketKind::Merge => {
                for bar in &packet.update {
                    let ts = bar.time.timestamp;
                    match self.bars.binary_search_by_key(&ts, |b| b.time.timestamp) {
                        Ok(i) => self.bars[i] = bar.clone(),
                        Err(i) => self.bars.insert(i, bar.clone()),
                    }
                }
            }
        }
    }

    pub fn bars(&self) -> &[Bar<V>] { &self.bars }
    pub fn last(&self) -> Option<&Bar<V>> { self.bars.last() }
    pub fn len(&self) -> usize { self.bars.len() }
    pub fn is_empty(&self) -> bool { self.bars.is_empty() }

    /// Bar sitting at a given scale index, if this series has one there.
    pub fn bar_at(&self, index: usize) -> Option<&Bar<V>> {
        self.bars
            .binary_search_by_key(&index, |b| b.index)
            .ok()
            .map(|i| &self.bars[i])
    }
}
