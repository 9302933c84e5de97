//! Data models and the metrics-rendering pipeline.
//!
//! This module turns a raw [`Snapshot`](crate::source::Snapshot) into
//! chart-ready series.
//!
//! ## Submodules
//!
//! - [`duration`]: Microsecond formatting for histogram summaries, and duration
//!   string parsing for settings (e.g., "1s", "500ms")
//! - [`policy`]: Fixed bucket ladder, time window and color palette
//! - [`series`]: Pure normalizers for histogram, categorical and stacked shapes
//! - [`panels`]: Panel definitions and per-poll [`DashboardData`]
//!
//! ## Data Flow
//!
//! ```text
//! Snapshot (raw JSON)
//!        │
//!        ▼
//! DashboardData::from_snapshot()   (select sub-objects per panel)
//!        │
//!        ├──▶ normalize_histogram()   ──▶ HistogramSeries + HistogramSummary
//!        ├──▶ normalize_categorical() ──▶ CategoricalSeries
//!        └──▶ normalize_stacked()     ──▶ StackedSeries
//! ```

pub mod duration;
pub mod panels;
pub mod policy;
pub mod series;

pub use panels::{
    Dashboard, DashboardData, HistogramPanel, MetricRef, PanelData, PanelState, PiePanel,
    StackedPanel,
};
pub use policy::{BucketLadder, Palette, PaletteColor, TimeWindow, BUCKET_LADDER, PALETTE, TIME_WINDOW};
pub use series::{
    normalize_categorical, normalize_histogram, normalize_stacked, CategoricalSeries,
    HistogramSeries, HistogramStat, HistogramSummary, NamedValue, StackedDataset, StackedSeries,
    TimeSeries,
};
