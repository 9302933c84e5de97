//! HTTP data source polling a `/debug/vars` endpoint.
//!
//! [`Fetcher`] issues one GET per call. [`HttpSource`] runs fetches on a
//! tokio runtime behind a [`SingleFlight`] guard so the TUI loop never
//! blocks on the network and never stacks up requests. Results land in a
//! [`ChannelSource`] mailbox, so the UI only ever sees the newest snapshot.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, warn};

use super::single_flight::SingleFlight;
use super::{ChannelSource, DataSource, Snapshot};
use crate::error::DashError;

/// Path of the metrics document on the endpoint.
pub const DEFAULT_PATH: &str = "/debug/vars";

/// Upper bound on a single request, connect to last body byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// What happened to one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The continuation ran with a fresh snapshot.
    Delivered,
    /// The endpoint was unreachable, timed out or answered non-200.
    /// The continuation did not run; the next tick retries.
    Skipped(String),
}

/// Issues GET requests against a metrics endpoint.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    url: String,
}

impl Fetcher {
    /// Create a new builder for configuring the fetcher.
    pub fn builder() -> FetcherBuilder {
        FetcherBuilder::default()
    }

    /// Full URL that is polled.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode one snapshot.
    ///
    /// Non-200 statuses and network failures are [`DashError::Transport`];
    /// a body that is not a JSON object is [`DashError::Decode`].
    pub async fn fetch(&self) -> Result<Snapshot, DashError> {
        let response = self
            .client
            .get(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DashError::Transport(format!(
                "expected 200 from server but got {}",
                status
            )));
        }

        let body = response.bytes().await?;
        Snapshot::from_slice(&body)
    }

    /// Fetch one snapshot and hand it to `on_success`.
    ///
    /// Transport failures are logged and reported as [`PollOutcome::Skipped`]
    /// without running the continuation. Decode failures are returned.
    pub async fn poll<F>(&self, on_success: F) -> Result<PollOutcome, DashError>
    where
        F: FnOnce(Snapshot),
    {
        match self.fetch().await {
            Ok(snapshot) => {
                on_success(snapshot);
                Ok(PollOutcome::Delivered)
            }
            Err(DashError::Transport(reason)) => {
                warn!(url = %self.url, %reason, "metrics poll skipped");
                Ok(PollOutcome::Skipped(reason))
            }
            Err(err) => Err(err),
        }
    }
}

/// Builder for [`Fetcher`].
#[derive(Debug, Default)]
pub struct FetcherBuilder {
    base_url: Option<String>,
    path: Option<String>,
    timeout: Option<Duration>,
}

impl FetcherBuilder {
    /// Set the endpoint base URL (default: "http://localhost:8081").
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the metrics path (default: "/debug/vars").
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the request timeout (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> Result<Fetcher, DashError> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| "http://localhost:8081".to_string());
        let path = self.path.unwrap_or_else(|| DEFAULT_PATH.to_string());

        Ok(Fetcher {
            client,
            url: join_url(&base_url, &path),
        })
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// A data source that polls an HTTP endpoint in the background.
///
/// Each [`refresh`](DataSource::refresh) starts at most one fetch on the
/// given runtime; delivered snapshots are picked up by
/// [`poll`](DataSource::poll) without blocking.
#[derive(Debug)]
pub struct HttpSource {
    fetcher: Arc<Fetcher>,
    runtime: Handle,
    flight: SingleFlight,
    sender: Arc<watch::Sender<Snapshot>>,
    inbox: ChannelSource,
    description: String,
    last_error: Arc<Mutex<Option<String>>>,
}

impl HttpSource {
    /// Create a source that runs its fetches on `runtime`.
    pub fn new(fetcher: Fetcher, runtime: Handle) -> Self {
        let (sender, inbox) = ChannelSource::create(fetcher.url());
        let description = format!("http: {}", fetcher.url());
        Self {
            fetcher: Arc::new(fetcher),
            runtime,
            flight: SingleFlight::new(),
            sender: Arc::new(sender),
            inbox,
            description,
            last_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Whether a fetch is currently running.
    pub fn in_flight(&self) -> bool {
        self.flight.is_busy()
    }

    /// Start a fetch unless one is already running.
    ///
    /// Returns `true` if a new fetch was started.
    pub fn start_fetch(&self) -> bool {
        let Some(guard) = self.flight.try_acquire() else {
            debug!(url = %self.fetcher.url(), "previous poll still in flight, skipping tick");
            return false;
        };

        let fetcher = self.fetcher.clone();
        let sender = self.sender.clone();
        let last_error = self.last_error.clone();

        self.runtime.spawn(async move {
            let _guard = guard;
            let result = fetcher
                .poll(|snapshot| {
                    // overwrites a snapshot the UI has not picked up yet
                    sender.send_replace(snapshot);
                })
                .await;

            let message = match result {
                Ok(PollOutcome::Delivered) => None,
                Ok(PollOutcome::Skipped(reason)) => Some(reason),
                Err(err) => {
                    error!(url = %fetcher.url(), error = %err, "metrics poll failed");
                    Some(err.to_string())
                }
            };
            if let Ok(mut slot) = last_error.lock() {
                *slot = message;
            }
        });

        true
    }
}

impl DataSource for HttpSource {
    fn refresh(&mut self) {
        self.start_fetch();
    }

    fn poll(&mut self) -> Option<Snapshot> {
        self.inbox.poll()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().ok()?.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a canned response to every connection. Returns the base URL and
    /// a counter of accepted connections.
    async fn serve(
        status_line: &'static str,
        body: &'static str,
        delay: Duration,
    ) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut request = [0u8; 4096];
                    let _ = socket.read(&mut request).await;
                    tokio::time::sleep(delay).await;
                    let response = format!(
                        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        status_line,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{}", addr), hits)
    }

    /// Answer each connection with its sequence number, starting at 1.
    async fn serve_counter() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut hits = 0u64;
            while let Ok((mut socket, _)) = listener.accept().await {
                hits += 1;
                let body = format!(r#"{{"hits":{}}}"#, hits);
                tokio::spawn(async move {
                    let mut request = [0u8; 4096];
                    let _ = socket.read(&mut request).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    async fn settle(source: &HttpSource) {
        for _ in 0..200 {
            if !source.in_flight() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("fetch did not finish");
    }

    fn fetcher(base_url: &str) -> Fetcher {
        Fetcher::builder()
            .base_url(base_url)
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap()
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    #[test]
    fn builder_defaults() {
        let fetcher = Fetcher::builder().build().unwrap();
        assert_eq!(fetcher.url(), "http://localhost:8081/debug/vars");
    }

    #[test]
    fn builder_joins_slashes() {
        let fetcher = Fetcher::builder()
            .base_url("http://10.0.0.1:9000/")
            .path("/metrics/vars")
            .build()
            .unwrap();
        assert_eq!(fetcher.url(), "http://10.0.0.1:9000/metrics/vars");
    }

    #[tokio::test]
    async fn ok_response_invokes_continuation_once() {
        let (url, _) = serve("200 OK", r#"{"a":1}"#, Duration::ZERO).await;
        let mut delivered = Vec::new();

        let outcome = fetcher(&url).poll(|snapshot| delivered.push(snapshot)).await;

        assert_eq!(outcome, Ok(PollOutcome::Delivered));
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].len(), 1);
        assert_eq!(delivered[0].get("a"), Some(&serde_json::json!(1)));
    }

    #[tokio::test]
    async fn unavailable_skips_and_logs_once() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let (url, _) = serve("503 Service Unavailable", "", Duration::ZERO).await;
        let mut calls = 0;

        let outcome = fetcher(&url).poll(|_| calls += 1).await.unwrap();

        assert_eq!(calls, 0);
        assert!(matches!(outcome, PollOutcome::Skipped(ref reason) if reason.contains("503")));
        let lines = logs.lines();
        assert_eq!(lines.len(), 1, "{:?}", lines);
        assert!(lines[0].contains("metrics poll skipped"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_skipped() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut calls = 0;
        let outcome = fetcher(&format!("http://{}", addr)).poll(|_| calls += 1).await;

        assert!(matches!(outcome, Ok(PollOutcome::Skipped(_))));
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn invalid_body_is_a_decode_error() {
        let (url, _) = serve("200 OK", "not json", Duration::ZERO).await;
        let mut calls = 0;

        let outcome = fetcher(&url).poll(|_| calls += 1).await;

        assert!(matches!(outcome, Err(DashError::Decode(_))));
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn non_object_body_is_a_decode_error() {
        let (url, _) = serve("200 OK", "[1,2,3]", Duration::ZERO).await;
        assert!(matches!(fetcher(&url).fetch().await, Err(DashError::Decode(_))));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let (url, _) = serve("200 OK", "{}", Duration::from_secs(5)).await;
        let fetcher = Fetcher::builder()
            .base_url(url)
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let mut calls = 0;

        let outcome = fetcher.poll(|_| calls += 1).await;

        assert!(matches!(outcome, Ok(PollOutcome::Skipped(_))));
        assert_eq!(calls, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn http_source_is_single_flight() {
        let (url, hits) = serve("200 OK", r#"{"x":2}"#, Duration::from_millis(200)).await;
        let mut source = HttpSource::new(fetcher(&url), Handle::current());

        assert!(source.start_fetch());
        assert!(!source.start_fetch());
        source.refresh();
        assert!(source.in_flight());

        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!source.in_flight());
        let snapshot = source.poll().unwrap();
        assert!(snapshot.contains_key("x"));
        assert!(source.poll().is_none());
        assert!(source.error().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn unread_snapshots_are_replaced_by_newer_ones() {
        let url = serve_counter().await;
        let mut source = HttpSource::new(fetcher(&url), Handle::current());

        for _ in 0..3 {
            assert!(source.start_fetch());
            settle(&source).await;
        }

        let snapshot = source.poll().unwrap();
        assert_eq!(snapshot.get("hits"), Some(&serde_json::json!(3)));
        assert!(source.poll().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn http_source_records_skip_reason() {
        let (url, _) = serve("500 Internal Server Error", "", Duration::ZERO).await;
        let mut source = HttpSource::new(fetcher(&url), Handle::current());

        source.refresh();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("500"));
        assert_eq!(source.description(), format!("http: {}/debug/vars", url));
    }
}
