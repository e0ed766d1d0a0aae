// File: crates/chart-data/src/data_layer.rs
// Summary: DataLayer orchestrator: registers series, drives the time scale merge, and builds update bundles.

use std::collections::BTreeMap;

use crate::axis;
use crate::error::{ChartDataError, Result};
use crate::scale::{MergeOutcome, TimeScale};
use crate::series::{Bar, SeriesId, SeriesItem};
use crate::time::{convert_time, TimeKind, TimePoint};
use crate::types::{SeriesUpdatePacket, TimeScaleUpdate, UpdateResult};

/// Owns the shared time scale and the bar index lists of every registered series.
///
/// Each mutating call either applies completely and returns the update bundle,
/// or fails before touching any state.
pub struct DataLayer<V> {
    scale: TimeScale,
    series: BTreeMap<SeriesId, Vec<Bar<V>>>,
}

impl<V: Clone> Default for DataLayer<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> DataLayer<V> {
    pub fn new() -> Self {
        Self { scale: TimeScale::new(), series: BTreeMap::new() }
    }

    pub fn time_scale(&self) -> &TimeScale { &self.scale }
    pub fn is_registered(&self, series: SeriesId) -> bool { self.series.contains_key(&series) }
    pub fn series_count(&self) -> usize { self.series.len() }

    pub fn series_bars(&self, series: SeriesId) -> Option<&[Bar<V>]> {
        self.series.get(&series).map(Vec::as_slice)
    }

    /// Time kind shared by every point on the scale. Fixed by the first point
    /// ever merged, since the scale never drops points.
    ///
    /// The kind outlives the series that established it: after every series
    /// is removed, data of the other kind is still rejected.
    pub fn time_kind(&self) -> Option<TimeKind> {
        self.scale.points().first().map(|p| p.time.kind())
    }

    /// Replace all data of `series`, registering it if needed.
    ///
    /// Items may arrive unsorted and with repeated times; they are sorted by
    /// time and the last item for a given time wins.
    #[tracing::instrument(level = "debug", skip_all, fields(series = %series))]
    pub fn set_series_data<I>(&mut self, series: SeriesId, items: I) -> Result<UpdateResult<V>>
    where
        I: IntoIterator<Item = SeriesItem<V>>,
    {
        let expected = self.time_kind();
        let mut call_kind: Option<TimeKind> = None;
        let mut converted: Vec<(TimePoint, V)> = Vec::new();
        for item in items {
            let found = item.time.kind();
            if let Some(expected) = call_kind.or(expected) {
                if expected != found {
                    tracing::debug!(%expected, %found, "rejecting series data");
                    return Err(ChartDataError::TimeTypeMismatch { expected, found });
                }
            }
            call_kind = Some(found);
            converted.push((convert_time(item.time)?, item.value));
        }

        converted.sort_by_key(|(time, _)| time.timestamp);
        let mut points: Vec<(TimePoint, V)> = Vec::with_capacity(converted.len());
        for (time, value) in converted {
            match points.last_mut() {
                Some(last) if last.0.timestamp == time.timestamp => *last = (time, value),
                _ => points.push((time, value)),
            }
        }

        let times: Vec<TimePoint> = points.iter().map(|(time, _)| *time).collect();
        let outcome = self.scale.merge(&times);
        tracing::trace!(
            inserted = outcome.inserted.len(),
            first_changed = ?outcome.first_changed(),
            "merged series times into scale"
        );

        let mut packets = BTreeMap::new();
        self.shift_bars(&outcome, Some(series), &mut packets);

        // Both lists are ascending, so one forward cursor locates every point.
        let scale_points = self.scale.points();
        let mut cursor = 0usize;
        let bars: Vec<Bar<V>> = points
            .into_iter()
            .map(|(time, value)| {
                cursor += scale_points[cursor..].partition_point(|p| p.time.timestamp < time.timestamp);
                Bar { index: cursor, time, value }
            })
            .collect();

        packets.insert(series, SeriesUpdatePacket::replace(bars.clone()));
        self.series.insert(series, bars);

        // A full replace redraws from the start of the scale.
        let result = self.finish(&outcome, packets, Some(0));
        tracing::debug!(
            index = result.time_scale_update.index,
            changes = result.time_scale_update.changes.len(),
            "set series data"
        );
        Ok(result)
    }

    /// Append a point to `series`, or replace its last point when the time matches.
    #[tracing::instrument(level = "debug", skip_all, fields(series = %series))]
    pub fn update_series_data(&mut self, series: SeriesId, item: SeriesItem<V>) -> Result<UpdateResult<V>> {
        let found = item.time.kind();
        if let Some(expected) = self.time_kind() {
            if expected != found {
                tracing::debug!(%expected, %found, "rejecting update");
                return Err(ChartDataError::TimeTypeMismatch { expected, found });
            }
        }
        let time = convert_time(item.time)?;

        let last = self
            .series
            .get(&series)
            .and_then(|bars| bars.last())
            .map(|b| b.time.timestamp);
        match last {
            Some(last) if last == time.timestamp => return Ok(self.replace_last(series, item.value)),
            Some(last) if last > time.timestamp => {
                tracing::debug!(last, time = time.timestamp, "rejecting out-of-order update");
                return Err(ChartDataError::OrderingViolation { series, last, time: time.timestamp });
            }
            _ => {}
        }

        let outcome = self.scale.merge(std::slice::from_ref(&time));
        tracing::trace!(inserted = outcome.inserted.len(), first_changed = ?outcome.first_changed(), "merged point into scale");

        let mut packets = BTreeMap::new();
        self.shift_bars(&outcome, None, &mut packets);

        let index = self.scale.points().partition_point(|p| p.time.timestamp < time.timestamp);
        let bar = Bar { index, time, value: item.value };
        self.series.entry(series).or_default().push(bar.clone());
        packets
            .entry(series)
            .or_insert_with(|| SeriesUpdatePacket::merge(Vec::new()))
            .update
            .push(bar);

        let result = self.finish(&outcome, packets, None);
        tracing::debug!(index = result.time_scale_update.index, "appended point");
        Ok(result)
    }

    /// Unregister `series`. The scale keeps every point, including those only
    /// this series contributed; remaining series are re-sent in full.
    #[tracing::instrument(level = "debug", skip_all, fields(series = %series))]
    pub fn remove_series(&mut self, series: SeriesId) -> Result<UpdateResult<V>> {
        if self.series.remove(&series).is_none() {
            tracing::debug!("remove of unknown series");
            return Err(ChartDataError::UnknownSeries(series));
        }
        let packets = self
            .series
            .iter()
            .map(|(id, bars)| (*id, SeriesUpdatePacket::replace(bars.clone())))
            .collect();
        let result = self.finish(&MergeOutcome::default(), packets, Some(0));
        tracing::debug!(remaining = self.series.len(), "removed series");
        Ok(result)
    }

    fn replace_last(&mut self, series: SeriesId, value: V) -> UpdateResult<V> {
        let mut packets = BTreeMap::new();
        if let Some(bar) = self.series.get_mut(&series).and_then(|bars| bars.last_mut()) {
            bar.value = value;
            packets.insert(series, SeriesUpdatePacket::merge(vec![bar.clone()]));
        }
        let result = self.finish(&MergeOutcome::default(), packets, None);
        tracing::debug!(index = result.time_scale_update.index, "replaced last point");
        result
    }

    /// Move every bar at or after the first insertion to its new index and
    /// record the moved bars as merge packets.
    fn shift_bars(
        &mut self,
        outcome: &MergeOutcome,
        skip: Option<SeriesId>,
        packets: &mut BTreeMap<SeriesId, SeriesUpdatePacket<V>>,
    ) {
        let Some(first) = outcome.first_changed() else { return };
        for (id, bars) in self.series.iter_mut() {
            if skip == Some(*id) {
                continue;
            }
            let start = bars.partition_point(|b| b.index < first);
            if start == bars.len() {
                continue;
            }
            for bar in &mut bars[start..] {
                bar.index = outcome.shifted(bar.index);
            }
            packets.insert(*id, SeriesUpdatePacket::merge(bars[start..].to_vec()));
        }
    }

    fn finish(
        &mut self,
        outcome: &MergeOutcome,
        packets: BTreeMap<SeriesId, SeriesUpdatePacket<V>>,
        forced: Option<usize>,
    ) -> UpdateResult<V> {
        let merged_at = outcome.first_changed();
        // Weights before the redraw start are untouched by the merge.
        let reweighted = forced
            .or(merged_at)
            .and_then(|start| axis::fill_weights(self.scale.points_mut(), start));
        let touched = packets.values().filter_map(SeriesUpdatePacket::first_index).min();
        let index = [merged_at, reweighted, touched, forced]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(self.scale.len());

        UpdateResult {
            time_scale_update: TimeScaleUpdate {
                index,
                changes: outcome.inserted.clone(),
                marks: self.scale.marks_from(index),
                series_updates: packets,
            },
        }
    }
}
