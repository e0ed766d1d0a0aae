// File: crates/demo/src/main.rs
// Summary: Demo loads OHLC CSVs (or synthesizes data), seeds a DataLayer with the first half of each series,
// streams the remainder point by point, and logs every update bundle.

use anyhow::{Context, Result};
use chart_data::{BusinessDay, Candle, DataLayer, SeriesId, SeriesItem, SeriesStore, Time, UpdateResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const USAGE: &str = "usage: chart-data-demo [--json] [CSV_A] [CSV_B]";

struct Args {
    inputs: Vec<String>,
    json: bool,
}

struct Feed {
    name: String,
    items: Vec<SeriesItem<Candle>>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let Some(args) = parse_args() else {
        println!("{USAGE}");
        return Ok(());
    };

    let feeds = if args.inputs.is_empty() {
        tracing::info!("no input files given, using synthetic business-day data");
        synthetic_feeds()
    } else {
        let mut feeds = Vec::new();
        for raw in &args.inputs {
            let (path, used_alt) = resolve_path(raw)?;
            if used_alt {
                tracing::info!(path = %path.display(), "extension swapped between .csv/.cvs");
            }
            let items = load_ohlc_csv(&path)
                .with_context(|| format!("failed to load CSV '{}'", path.display()))?;
            if items.is_empty() {
                anyhow::bail!("no rows loaded from '{}', check headers/delimiter", path.display());
            }
            let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("series").to_string();
            feeds.push(Feed { name, items });
        }
        feeds
    };

    let mut dl: DataLayer<Candle> = DataLayer::new();
    let mut stores: BTreeMap<SeriesId, SeriesStore<Candle>> = BTreeMap::new();
    let mut handles = Vec::with_capacity(feeds.len());
    let mut cursors = Vec::with_capacity(feeds.len());

    // Seed: first half of every feed in one full replace.
    for feed in &feeds {
        let id = SeriesId::next();
        let seed = feed.items.len() / 2;
        let res = dl
            .set_series_data(id, feed.items[..seed].to_vec())
            .with_context(|| format!("seeding {}", feed.name))?;
        tracing::info!(series = %id, name = %feed.name, bars = seed, "seeded series");
        publish(&res, &mut stores, args.json)?;
        handles.push(id);
        cursors.push(seed);
    }

    // Stream the rest round-robin; each feed stays in its own time order.
    loop {
        let mut progressed = false;
        for (k, feed) in feeds.iter().enumerate() {
            let Some(item) = feed.items.get(cursors[k]) else { continue };
            cursors[k] += 1;
            progressed = true;
            match dl.update_series_data(handles[k], item.clone()) {
                Ok(res) => publish(&res, &mut stores, args.json)?,
                Err(err) => tracing::warn!(name = %feed.name, error = %err, "skipping point"),
            }
        }
        if !progressed {
            break;
        }
    }

    if handles.len() > 1 {
        let removed = handles[0];
        let res = dl.remove_series(removed)?;
        stores.remove(&removed);
        tracing::info!(series = %removed, "removed series; its points stay on the scale");
        publish(&res, &mut stores, args.json)?;
    }

    tracing::info!(
        scale_points = dl.time_scale().len(),
        series = dl.series_count(),
        kind = ?dl.time_kind(),
        "done"
    );
    for (id, store) in &stores {
        let expected = dl.series_bars(*id).unwrap_or_default();
        if store.bars() != expected {
            anyhow::bail!("bar store for {id} diverged from the data layer");
        }
        tracing::info!(
            series = %id,
            bars = store.len(),
            last_close = ?store.last().map(|b| b.value.close),
            "bar store in sync"
        );
    }
    Ok(())
}

/// Hand an update bundle to the consumer side: apply packets, then log or print it.
fn publish(
    res: &UpdateResult<Candle>,
    stores: &mut BTreeMap<SeriesId, SeriesStore<Candle>>,
    json: bool,
) -> Result<()> {
    let upd = &res.time_scale_update;
    for (id, packet) in &upd.series_updates {
        stores.entry(*id).or_default().apply(packet);
    }
    if json {
        println!("{}", serde_json::to_string(res)?);
    } else {
        tracing::debug!(
            index = upd.index,
            changes = upd.changes.len(),
            marks = upd.marks.len(),
            series = upd.series_updates.len(),
            "time scale update"
        );
    }
    Ok(())
}

fn parse_args() -> Option<Args> {
    let mut args = Args { inputs: Vec::new(), json: false };
    for a in std::env::args().skip(1) {
        match a.as_str() {
            "-h" | "--help" => return None,
            "--json" => args.json = true,
            _ => args.inputs.push(a),
        }
    }
    Some(args)
}

/// Two daily feeds over Q1 2024: one trades every day, the other every third day.
fn synthetic_feeds() -> Vec<Feed> {
    let mut daily = Vec::new();
    let mut sparse = Vec::new();
    let mut price = 100.0f64;
    for month in 1..=3u32 {
        for day in 1..=28u32 {
            let step = ((month * 31 + day) as f64 * 0.3).sin();
            let open = price;
            price += step;
            let candle = Candle {
                open,
                high: open.max(price) + 0.5,
                low: open.min(price) - 0.5,
                close: price,
            };
            let time = Time::BusinessDay(BusinessDay::new(2024, month, day));
            if day % 3 == 0 {
                sparse.push(SeriesItem { time, value: candle });
            }
            daily.push(SeriesItem { time, value: candle });
        }
    }
    vec![
        Feed { name: "synthetic-daily".into(), items: daily },
        Feed { name: "synthetic-sparse".into(), items: sparse },
    ]
}

/// Resolve path, trying .csv/.cvs swap if needed.
/// Returns (actual_path, used_alt)
fn resolve_path(raw: &str) -> Result<(PathBuf, bool)> {
    let p = Path::new(raw);
    if p.exists() {
        return Ok((p.to_path_buf(), false));
    }
    if let Some(alt) = swap_ext(p) {
        if alt.exists() {
            return Ok((alt, true));
        }
    }
    anyhow::bail!("file not found: {}", p.display());
}

fn swap_ext(p: &Path) -> Option<PathBuf> {
    let mut alt = p.to_path_buf();
    let ext = p.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "cvs" => alt.set_extension("csv"),
        "csv" => alt.set_extension("cvs"),
        _ => return None,
    };
    Some(alt)
}

/// Load Binance-like OHLC CSV rows as series items.
fn load_ohlc_csv(path: &Path) -> Result<Vec<SeriesItem<Candle>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect::<Vec<_>>();
    tracing::debug!(?headers, "csv headers");

    let idx = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

    let i_time = idx(&["time", "timestamp", "open_time", "date", "datetime"])
        .context("no time column (time/timestamp/open_time/date/datetime)")?;
    let i_open = idx(&["open", "o"]).context("no open column")?;
    let i_high = idx(&["high", "h"]).context("no high column")?;
    let i_low = idx(&["low", "l"]).context("no low column")?;
    let i_close = idx(&["close", "c", "adj_close", "close_price"]).context("no close column")?;

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for rec in rdr.records() {
        let rec = rec?;
        let num = |i: usize| rec.get(i).and_then(|s| s.trim().parse::<f64>().ok());
        let time = rec.get(i_time).and_then(parse_time);
        let candle = match (num(i_open), num(i_high), num(i_low), num(i_close)) {
            (Some(o), Some(h), Some(l), Some(c)) => Candle::try_new(o, h, l, c).ok(),
            _ => None,
        };
        match (time, candle) {
            (Some(time), Some(value)) => out.push(SeriesItem { time, value }),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, path = %path.display(), "skipped malformed rows");
    }
    Ok(out)
}

/// Epoch seconds/milliseconds become timestamps; `YYYY-MM-DD...` becomes a business day.
fn parse_time(s: &str) -> Option<Time> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        // epoch ms -> sec
        let secs = if n > 10_i64.pow(12) { n / 1000 } else { n };
        return Some(Time::Timestamp(secs));
    }
    let date = s.get(..10)?;
    date.parse::<BusinessDay>().ok().map(Time::BusinessDay)
}
