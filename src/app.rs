//! Application state and navigation logic.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, warn};

use crate::data::{Dashboard, DashboardData, HistogramSeries, PanelData};
use crate::source::DataSource;
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Compact histograms for every timed operation, with min/avg/max.
    Overview,
    /// One histogram in full detail, with axes.
    Latency,
    /// Pie charts of message totals.
    Messages,
    /// Stacked per-minute activity bars.
    Activity,
}

impl View {
    pub const ALL: [View; 4] = [View::Overview, View::Latency, View::Messages, View::Activity];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Overview => View::Latency,
            View::Latency => View::Messages,
            View::Messages => View::Activity,
            View::Activity => View::Overview,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Overview => View::Activity,
            View::Latency => View::Overview,
            View::Messages => View::Latency,
            View::Activity => View::Messages,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Latency => "Latency",
            View::Messages => "Messages",
            View::Activity => "Activity",
        }
    }

    /// Position in the tab bar.
    pub fn index(&self) -> usize {
        match self {
            View::Overview => 0,
            View::Latency => 1,
            View::Messages => 2,
            View::Activity => 3,
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub dashboard: Dashboard,
    pub data: Option<DashboardData>,
    pub load_error: Option<String>,

    // Navigation state
    pub selected_histogram: usize,

    // Draw axes on the overview histograms too
    pub overview_axes: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading from `source` and drawing `dashboard`.
    pub fn new(source: Box<dyn DataSource>, dashboard: Dashboard) -> Self {
        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            source,
            dashboard,
            data: None,
            load_error: None,
            selected_histogram: 0,
            overview_axes: false,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Ask the source for a fresh snapshot. Called once per refresh tick.
    pub fn refresh(&mut self) {
        self.source.refresh();
    }

    /// Poll the data source for new data.
    ///
    /// Returns Ok(true) if new data was received, Ok(false) if no new data.
    /// A source error is shown alongside the last good data rather than
    /// replacing it.
    pub fn reload_data(&mut self) -> Result<bool> {
        let received = if let Some(snapshot) = self.source.poll() {
            let data = DashboardData::from_snapshot(&snapshot, &self.dashboard);
            let failed = data.failed_panels();
            if failed > 0 {
                warn!(failed, "some panels could not be normalized");
            }
            debug!(
                variables = data.variable_count,
                ready = data.ready_panels(),
                "snapshot received"
            );
            self.data = Some(data);

            // Clamp selection index
            let count = self.histogram_count();
            if self.selected_histogram >= count {
                self.selected_histogram = count.saturating_sub(1);
            }
            true
        } else {
            false
        };

        self.load_error = self.source.error();
        Ok(received)
    }

    fn histogram_count(&self) -> usize {
        self.data
            .as_ref()
            .map(|d| d.histograms.len())
            .unwrap_or(self.dashboard.histograms.len())
    }

    /// The histogram panel picked for the Latency view.
    pub fn selected_histogram(&self) -> Option<&PanelData<HistogramSeries>> {
        self.data.as_ref()?.histograms.get(self.selected_histogram)
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move histogram selection down by one.
    pub fn select_next(&mut self) {
        let max = self.histogram_count().saturating_sub(1);
        self.selected_histogram = (self.selected_histogram + 1).min(max);
    }

    /// Move histogram selection up by one.
    pub fn select_prev(&mut self) {
        self.selected_histogram = self.selected_histogram.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_histogram = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_histogram = self.histogram_count().saturating_sub(1);
    }

    /// Open the selected histogram in the Latency view.
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Overview {
            self.current_view = View::Latency;
        }
    }

    /// Leave the detail view, back to the overview.
    pub fn go_back(&mut self) {
        if self.current_view != View::Overview {
            self.current_view = View::Overview;
        }
    }

    /// Toggle axis labels on the overview histograms.
    pub fn toggle_overview_axes(&mut self) {
        self.overview_axes = !self.overview_axes;
        let state = if self.overview_axes { "shown" } else { "hidden" };
        self.set_status_message(format!("Overview axes {}", state));
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ChannelSource, Snapshot};
    use serde_json::json;
    use tokio::sync::watch;

    fn snapshot() -> Snapshot {
        serde_json::from_value(json!({
            "decoder.timing.histogram": vec![1u64; 32],
            "decoder.timing.average": {"average": 10.0, "count": 1, "min": 1.0, "max": 20.0},
        }))
        .unwrap()
    }

    fn app() -> (watch::Sender<Snapshot>, App) {
        let (tx, source) = ChannelSource::create("test");
        (tx, App::new(Box::new(source), Dashboard::default()))
    }

    #[test]
    fn views_cycle_both_ways() {
        for view in View::ALL {
            assert_eq!(view.next().prev(), view);
            assert_eq!(View::ALL[view.index()], view);
        }
        assert_eq!(View::Activity.next(), View::Overview);
    }

    #[test]
    fn reload_builds_dashboard_data() {
        let (tx, mut app) = app();
        // nothing delivered yet
        assert!(!app.reload_data().unwrap());
        assert!(app.data.is_none());

        tx.send(snapshot()).unwrap();
        assert!(app.reload_data().unwrap());

        let data = app.data.as_ref().unwrap();
        assert_eq!(data.variable_count, 2);
        assert_eq!(data.histograms.len(), Dashboard::default().histograms.len());
        // nothing new until the next send
        assert!(!app.reload_data().unwrap());
    }

    #[test]
    fn selection_stays_in_range() {
        let (_tx, mut app) = app();
        let count = app.dashboard.histograms.len();

        app.select_prev();
        assert_eq!(app.selected_histogram, 0);

        for _ in 0..count + 5 {
            app.select_next();
        }
        assert_eq!(app.selected_histogram, count - 1);

        app.select_first();
        assert_eq!(app.selected_histogram, 0);
        app.select_last();
        assert_eq!(app.selected_histogram, count - 1);
    }

    #[test]
    fn detail_and_back() {
        let (_tx, mut app) = app();
        app.enter_detail();
        assert_eq!(app.current_view, View::Latency);
        app.go_back();
        assert_eq!(app.current_view, View::Overview);

        app.set_view(View::Messages);
        app.enter_detail();
        assert_eq!(app.current_view, View::Messages);
    }

    #[test]
    fn axis_toggle_sets_status() {
        let (_tx, mut app) = app();
        app.toggle_overview_axes();
        assert!(app.overview_axes);
        assert_eq!(app.get_status_message(), Some("Overview axes shown"));
    }
}
