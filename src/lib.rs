// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # vardash
//!
//! A terminal dashboard for expvar-style `/debug/vars` metrics endpoints.
//!
//! This crate polls a JSON metrics document, normalizes latency histograms,
//! message totals and per-minute activity counters into chart-ready series,
//! and draws them in an interactive terminal UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│  chart  │───▶│   ui    │ │
//! │  │ (state) │    │(normalize)    │(builders)    │ (views) │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── HttpSource | FileSource | ChannelSource    │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with an HTTP
//!   poller guarded by a single-flight flag and a request timeout, a file
//!   source, and a channel source for embedding
//! - **[`data`]**: Duration formatting, fixed chart policy, series normalizers
//!   and per-panel [`DashboardData`]
//! - **[`chart`]**: Builders that bind normalized series to named [`Surfaces`]
//! - **[`app`]**, **[`events`]**, **[`ui`]**: TUI state, key handling and views
//! - **[`config`](crate::config)**, **[`error`]**: Layered settings and the error taxonomy
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll a local endpoint (GET http://localhost:8081/debug/vars)
//! vardash
//!
//! # Poll another host every 2 seconds
//! vardash --url http://gateway-host:8081 --refresh 2s
//!
//! # Render a saved snapshot
//! vardash --file vars.json
//! ```
//!
//! ### Normalizing without a terminal
//!
//! ```
//! use vardash::data::{normalize_histogram, HistogramStat};
//!
//! let stat = HistogramStat { min: 12.0, average: 1500.0, max: 2_000_000.0, count: None };
//! let series = normalize_histogram(&[0; 22], &stat).unwrap();
//! assert_eq!(series.summary.avg, "1.500ms");
//! assert_eq!(series.summary.max, "2.000s");
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use vardash::{App, ChannelSource, Dashboard};
//!
//! // Create a channel for pushing snapshots
//! let (tx, source) = ChannelSource::create("in-process");
//!
//! // Create the app
//! let app = App::new(Box::new(source), Dashboard::default());
//! ```
//!
//! ### Fetching one snapshot
//!
//! ```no_run
//! use std::time::Duration;
//! use vardash::Fetcher;
//!
//! # tokio_test::block_on(async {
//! let fetcher = Fetcher::builder()
//!     .base_url("http://localhost:8081")
//!     .timeout(Duration::from_secs(2))
//!     .build()
//!     .unwrap();
//! let snapshot = fetcher.fetch().await.unwrap();
//! println!("{} variables", snapshot.len());
//! # });
//! ```

pub mod app;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use chart::{RenderedChart, Surfaces};
pub use crate::config::{load_settings, Overrides, Settings};
pub use data::{Dashboard, DashboardData, PanelData, PanelState};
pub use error::DashError;
pub use source::{ChannelSource, DataSource, Fetcher, FileSource, HttpSource, Snapshot};
