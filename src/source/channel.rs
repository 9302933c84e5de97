//! Latest-wins snapshot mailbox.
//!
//! Backed by a tokio watch channel: a producer overwrites the pending
//! snapshot, and [`poll`](DataSource::poll) hands out the newest one at most
//! once. [`HttpSource`](super::HttpSource) delivers its fetches through one;
//! embedders that already hold the metrics can push into one directly.

use tokio::sync::watch;

use super::{DataSource, Snapshot};

/// Receiving side of a snapshot mailbox.
///
/// ```
/// use vardash::{ChannelSource, DataSource, Snapshot};
///
/// let (tx, mut source) = ChannelSource::create("in-process");
/// assert!(source.poll().is_none());
///
/// tx.send_replace(Snapshot::new());
/// assert!(source.poll().is_some());
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Snapshot>,
    description: String,
}

impl ChannelSource {
    /// Wrap a receiver. Its current value counts as already seen.
    pub fn new(mut receiver: watch::Receiver<Snapshot>, name: &str) -> Self {
        drop(receiver.borrow_and_update());
        Self {
            receiver,
            description: format!("channel: {}", name),
        }
    }

    /// Create a mailbox; nothing is delivered until the first send.
    pub fn create(name: &str) -> (watch::Sender<Snapshot>, Self) {
        let (tx, rx) = watch::channel(Snapshot::default());
        (tx, Self::new(rx, name))
    }

    /// Whether a snapshot is waiting to be polled.
    pub fn has_pending(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Snapshot> {
        if !self.has_pending() {
            return None;
        }
        Some(self.receiver.borrow_and_update().clone())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        // a dropped producer just means no further updates
        None
    }
}
