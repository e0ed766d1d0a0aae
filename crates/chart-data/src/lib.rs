// File: crates/chart-data/src/lib.rs
// Summary: Library entry point; exports the time conversion helpers, the shared time scale and the DataLayer.

pub mod axis;
pub mod data_layer;
pub mod error;
pub mod scale;
pub mod series;
pub mod time;
pub mod types;

pub use axis::TickMarkWeight;
pub use data_layer::DataLayer;
pub use error::{ChartDataError, Result};
pub use scale::{MergeOutcome, TimeScale, TimeScalePoint};
pub use series::{Bar, Candle, SeriesId, SeriesItem, SeriesStore};
pub use time::{convert_time, string_to_business_day, BusinessDay, Time, TimeKind, TimePoint, UtcTimestamp};
pub use types::{Mark, PacketKind, SeriesUpdatePacket, TimeScaleUpdate, UpdateResult};
