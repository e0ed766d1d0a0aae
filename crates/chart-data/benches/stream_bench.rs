// File: crates/chart-data/benches/stream_bench.rs
// Summary: Streaming single-point updates (appends and last-bar replaces) against a populated scale.

use anyhow::Result;
use chart_data::{DataLayer, SeriesId, SeriesItem, Time};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion, black_box};

fn seeded(n: usize) -> Result<(DataLayer<f64>, SeriesId, SeriesId)> {
    let mut dl = DataLayer::new();
    let a = SeriesId::next();
    let b = SeriesId::next();
    dl.set_series_data(a, (0..n as i64).map(|i| SeriesItem::new(Time::Timestamp(i * 60), i as f64)))?;
    dl.set_series_data(b, (0..n as i64).map(|i| SeriesItem::new(Time::Timestamp(i * 120), i as f64)))?;
    Ok((dl, a, b))
}

fn bench_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_series_data");
    for &n in &[10_000usize, 100_000usize] {
        group.bench_function(format!("append_1k_n{n}"), |bch| {
            bch.iter_batched(
                || seeded(n).expect("seed"),
                |(mut dl, a, _)| -> Result<()> {
                    let start = n as i64 * 60;
                    for k in 0..1_000i64 {
                        black_box(dl.update_series_data(a, SeriesItem::new(Time::Timestamp(start + k * 60), k as f64))?);
                    }
                    Ok(())
                },
                BatchSize::LargeInput,
            );
        });
        group.bench_function(format!("replace_last_n{n}"), |bch| {
            let (mut dl, a, _) = seeded(n).expect("seed");
            let last = (n as i64 - 1) * 60;
            bch.iter(|| -> Result<()> {
                black_box(dl.update_series_data(a, SeriesItem::new(Time::Timestamp(last), 1.0))?);
                Ok(())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_stream);
criterion_main!(benches);
