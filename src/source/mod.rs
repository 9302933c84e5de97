//! Data source abstraction for receiving metric snapshots.
//!
//! This module provides a trait-based abstraction for receiving `/debug/vars`
//! snapshots from various sources (an HTTP endpoint, a file on disk, or an
//! in-memory channel when the dashboard is embedded).

mod channel;
mod file;
mod http;
mod single_flight;
mod snapshot;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use http::{Fetcher, FetcherBuilder, HttpSource, PollOutcome, DEFAULT_PATH, DEFAULT_TIMEOUT};
pub use single_flight::{FlightGuard, SingleFlight};
pub use snapshot::Snapshot;

use std::fmt::Debug;

/// Trait for receiving metric snapshots from various sources.
///
/// Implementations of this trait provide snapshots from different
/// backends - HTTP polling, file polling, or in-memory channels.
///
/// # Example
///
/// ```
/// use vardash::{DataSource, FileSource};
///
/// let mut source = FileSource::new("vars.json");
/// if let Some(snapshot) = source.poll() {
///     println!("Got {} variables", snapshot.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Ask the source to start producing a fresh snapshot.
    ///
    /// Called once per refresh tick. Sources that push data on their own
    /// ignore it. Must not block.
    fn refresh(&mut self) {}

    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(snapshot)` if new data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<Snapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Check if the source has encountered an error.
    ///
    /// Returns the error message if the last attempt to obtain data failed.
    fn error(&self) -> Option<String>;
}
