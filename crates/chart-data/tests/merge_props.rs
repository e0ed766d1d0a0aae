// File: crates/chart-data/tests/merge_props.rs
// Purpose: Property tests over random operation sequences: monotonic scale, complete shift reporting,
// incremental tick weights, consumer replay and all-or-nothing failures.

use chart_data::axis::fill_weights;
use chart_data::{DataLayer, PacketKind, SeriesId, SeriesItem, SeriesStore, Time, TimeScalePoint};
use proptest::prelude::*;
use std::collections::BTreeMap;

const SERIES: usize = 3;

#[derive(Clone, Debug)]
enum Op {
    Set(usize, Vec<(i64, i32)>),
    Update(usize, i64, i32),
    Remove(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => (0..SERIES, proptest::collection::vec((0i64..200, any::<i32>()), 0..20)).prop_map(|(s, pts)| Op::Set(s, pts)),
        3 => (0..SERIES, 0i64..260, any::<i32>()).prop_map(|(s, t, v)| Op::Update(s, t * 30, v)),
        1 => (0..SERIES).prop_map(Op::Remove),
    ]
}

fn scale_times(points: &[TimeScalePoint]) -> Vec<i64> {
    points.iter().map(|p| p.time.timestamp).collect()
}

proptest! {
    #[test]
    fn random_operations_keep_invariants(ops in proptest::collection::vec(arb_op(), 1..40)) {
        let ids: Vec<SeriesId> = (0..SERIES).map(|_| SeriesId::next()).collect();
        let mut dl: DataLayer<i32> = DataLayer::new();
        let mut stores: BTreeMap<SeriesId, SeriesStore<i32>> = BTreeMap::new();

        for op in ops {
            let before = dl.time_scale().points().to_vec();
            let bars_before: BTreeMap<SeriesId, Vec<_>> = ids
                .iter()
                .filter_map(|id| dl.series_bars(*id).map(|b| (*id, b.to_vec())))
                .collect();

            let res = match &op {
                Op::Set(s, pts) => dl.set_series_data(
                    ids[*s],
                    pts.iter().map(|&(t, v)| SeriesItem::new(Time::Timestamp(t * 10), v)),
                ),
                Op::Update(s, t, v) => dl.update_series_data(ids[*s], SeriesItem::new(Time::Timestamp(*t), *v)),
                Op::Remove(s) => dl.remove_series(ids[*s]),
            };

            let after = scale_times(dl.time_scale().points());
            // Strictly ascending, never shrinking, every old point retained.
            prop_assert!(after.windows(2).all(|w| w[0] < w[1]));
            let old = scale_times(&before);
            prop_assert!(old.iter().all(|t| after.binary_search(t).is_ok()));

            let res = match res {
                Ok(res) => res,
                Err(_) => {
                    // Nothing moved.
                    prop_assert_eq!(dl.time_scale().points(), before.as_slice());
                    for id in &ids {
                        prop_assert_eq!(dl.series_bars(*id).map(<[_]>::to_vec), bars_before.get(id).cloned());
                    }
                    continue;
                }
            };
            let upd = res.time_scale_update;

            if let Op::Remove(s) = op {
                stores.remove(&ids[s]);
            }
            prop_assert_eq!(upd.changes.len(), after.len() - old.len());
            if let Some(first_new) = upd.changes.first() {
                let p = dl.time_scale().index_of(first_new.timestamp).unwrap();
                prop_assert!(upd.index <= p);
                // Appends and inserts redraw from the insertion point, never earlier.
                if matches!(&op, Op::Update(..)) {
                    prop_assert_eq!(upd.index, p);
                }
                // Any series with a bar at or after the insertion point must be reported.
                for (id, bars) in &bars_before {
                    if bars.iter().any(|b| b.index >= p) && dl.is_registered(*id) {
                        prop_assert!(upd.series_updates.contains_key(id), "missing shift for {}", id);
                    }
                }
            } else {
                // Idempotent merge: no other series moves.
                for (id, packet) in &upd.series_updates {
                    if packet.kind == PacketKind::Merge {
                        let touched = match &op {
                            Op::Update(s, _, _) => ids[*s] == *id,
                            _ => false,
                        };
                        prop_assert!(touched);
                    }
                }
            }
            prop_assert_eq!(upd.marks.len(), after.len() - upd.index.min(after.len()));
            if matches!(&op, Op::Set(..) | Op::Remove(_)) {
                prop_assert_eq!(upd.index, 0);
            }

            // Weights match a from-scratch fill, except the leading estimate,
            // which is only redone by full redraws or a new first point.
            let now = dl.time_scale().points();
            let mut fresh = now.to_vec();
            fill_weights(&mut fresh, 0);
            for (got, want) in now.iter().zip(&fresh).skip(1) {
                prop_assert_eq!(got.weight, want.weight);
            }
            if let Some(first) = now.first() {
                let redrawn = matches!(&op, Op::Set(..) | Op::Remove(_))
                    || before.first().map(|p| p.time.timestamp) != Some(first.time.timestamp);
                if redrawn {
                    prop_assert_eq!(first.weight, fresh[0].weight);
                } else {
                    prop_assert_eq!(Some(first.weight), before.first().map(|p| p.weight));
                }
            }

            for (id, packet) in &upd.series_updates {
                prop_assert!(packet.update.windows(2).all(|w| w[0].index < w[1].index));
                stores.entry(*id).or_default().apply(packet);
            }
            for id in &ids {
                match dl.series_bars(*id) {
                    Some(bars) => {
                        prop_assert_eq!(stores.get(id).map(|s| s.bars().to_vec()).unwrap_or_default(), bars.to_vec());
                        for bar in bars {
                            prop_assert_eq!(dl.time_scale().point(bar.index).map(|p| p.time.timestamp), Some(bar.time.timestamp));
                        }
                    }
                    None => prop_assert!(!stores.contains_key(id)),
                }
            }
        }
    }

    #[test]
    fn resetting_same_data_changes_nothing(times in proptest::collection::btree_set(0i64..1_000, 1..30)) {
        let mut dl: DataLayer<i64> = DataLayer::new();
        let a = SeriesId::next();
        let b = SeriesId::next();
        let items = || times.iter().map(|&t| SeriesItem::new(Time::Timestamp(t), t)).collect::<Vec<_>>();
        dl.set_series_data(a, items()).unwrap();
        dl.set_series_data(b, times.iter().map(|&t| SeriesItem::new(Time::Timestamp(t * 2), t))).unwrap();
        let before = dl.time_scale().points().to_vec();
        let a_bars = dl.series_bars(a).unwrap().to_vec();

        let upd = dl.set_series_data(a, items()).unwrap().time_scale_update;
        prop_assert!(upd.changes.is_empty());
        prop_assert_eq!(upd.series_updates.len(), 1);
        prop_assert_eq!(dl.time_scale().points(), before.as_slice());
        prop_assert_eq!(dl.series_bars(a).unwrap(), a_bars.as_slice());
    }
}
