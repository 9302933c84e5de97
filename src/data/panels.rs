//! Dashboard panel definitions and per-poll panel data.
//!
//! A [`Dashboard`] names which metric families feed which chart. Turning a
//! [`Snapshot`] into [`DashboardData`] is the "select the relevant
//! sub-objects, then normalize" step of the pipeline.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::policy::BUCKET_LADDER;
use super::series::{
    normalize_categorical, normalize_histogram, normalize_stacked, CategoricalSeries,
    HistogramSeries, NamedValue, StackedSeries,
};
use crate::error::DashError;
use crate::source::Snapshot;

/// A latency histogram fed by `<metric>.histogram` and `<metric>.average`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramPanel {
    pub id: String,
    pub title: String,
    pub metric: String,
}

/// A labelled metric family used as one slice or one stacked dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRef {
    pub label: String,
    pub metric: String,
}

/// A pie chart of running totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiePanel {
    pub id: String,
    pub title: String,
    pub slices: Vec<MetricRef>,
}

/// Stacked per-minute bars over the rolling window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackedPanel {
    pub id: String,
    pub title: String,
    pub series: Vec<MetricRef>,
}

/// The full set of panels shown by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default)]
    pub histograms: Vec<HistogramPanel>,
    #[serde(default)]
    pub pies: Vec<PiePanel>,
    #[serde(default)]
    pub stacked: Vec<StackedPanel>,
}

fn histogram(id: &str, title: &str, metric: &str) -> HistogramPanel {
    HistogramPanel {
        id: id.to_string(),
        title: title.to_string(),
        metric: metric.to_string(),
    }
}

fn refs(pairs: &[(&str, &str)]) -> Vec<MetricRef> {
    pairs
        .iter()
        .map(|(label, metric)| MetricRef {
            label: label.to_string(),
            metric: metric.to_string(),
        })
        .collect()
}

/// Created/updated/deleted counters of one entity kind.
fn crud(entity: &str) -> Vec<MetricRef> {
    [("created", "create"), ("updated", "update"), ("deleted", "delete")]
        .iter()
        .map(|(label, op)| MetricRef {
            label: label.to_string(),
            metric: format!("{}.{}", entity, op),
        })
        .collect()
}

impl Default for Dashboard {
    /// Panels for the LoRa network server's published counters.
    fn default() -> Self {
        Self {
            histograms: vec![
                histogram("incoming", "Incoming", "incoming.timing"),
                histogram("outgoing", "Outgoing", "outgoing.timing"),
                histogram("gateway-receive", "Gateway receive", "gateway.receive.timing"),
                histogram("gateway-send", "Gateway send", "gateway.send.timing"),
                histogram("decoder", "Decoder", "decoder.timing"),
                histogram("decrypter", "Decrypter", "decrypter.timing"),
                histogram("macprocessor", "MAC processor", "macprocessor.timing"),
                histogram("encoder", "Encoder", "encoder.timing"),
                histogram("scheduler-send", "Scheduler send", "scheduler.send.timing"),
                histogram("scheduler-process", "Scheduler process", "scheduler.process.timing"),
                histogram("gwif-channel", "Gateway channel", "gwif.channel.send"),
                histogram("decoder-channel", "Decoder channel", "decoder.channel.send"),
                histogram("decrypter-channel", "Decrypter channel", "decrypter.channel.send"),
                histogram("mac-channel", "MAC channel", "macprocessor.channel.send"),
                histogram("scheduler-channel", "Scheduler channel", "scheduler.channel.sends"),
                histogram("encoder-channel", "Encoder channel", "encoder.channel.send"),
            ],
            pies: vec![
                PiePanel {
                    id: "lora-messages".to_string(),
                    title: "LoRa messages".to_string(),
                    slices: refs(&[
                        ("confirmed up", "lora.msg.confirmedup"),
                        ("confirmed down", "lora.msg.confirmeddown"),
                        ("unconfirmed up", "lora.msg.unconfirmedup"),
                        ("unconfirmed down", "lora.msg.unconfirmeddown"),
                        ("join request", "lora.msg.joinrequest"),
                        ("join accept", "lora.msg.joinaccept"),
                    ]),
                },
                PiePanel {
                    id: "pipeline".to_string(),
                    title: "Pipeline stages".to_string(),
                    slices: refs(&[
                        ("gateway in", "process.gateway.in"),
                        ("decoder", "process.decoder"),
                        ("decrypter", "process.decrypter"),
                        ("mac processor", "process.macprocessor"),
                        ("scheduler in", "process.scheduler.in"),
                        ("scheduler out", "process.scheduler.out"),
                        ("encoder", "process.encoder"),
                        ("gateway out", "process.gateway.out"),
                    ]),
                },
                PiePanel {
                    id: "failures".to_string(),
                    title: "Failures".to_string(),
                    slices: refs(&[
                        ("MIC failed", "lora.mic.failed"),
                        ("frame counter", "lora.fcnt.failed"),
                        ("missed deadline", "process.deadlineMissed"),
                    ]),
                },
            ],
            stacked: vec![
                StackedPanel {
                    id: "gateways".to_string(),
                    title: "Gateways".to_string(),
                    series: crud("gateway"),
                },
                StackedPanel {
                    id: "applications".to_string(),
                    title: "Applications".to_string(),
                    series: crud("application"),
                },
                StackedPanel {
                    id: "devices".to_string(),
                    title: "Devices".to_string(),
                    series: crud("device"),
                },
                StackedPanel {
                    id: "lora-traffic".to_string(),
                    title: "LoRa traffic".to_string(),
                    series: refs(&[
                        ("confirmed up", "lora.msg.confirmedup"),
                        ("confirmed down", "lora.msg.confirmeddown"),
                        ("unconfirmed up", "lora.msg.unconfirmedup"),
                        ("unconfirmed down", "lora.msg.unconfirmeddown"),
                        ("join request", "lora.msg.joinrequest"),
                        ("join accept", "lora.msg.joinaccept"),
                    ]),
                },
            ],
        }
    }
}

/// Outcome of normalizing one panel for one poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "series", rename_all = "lowercase")]
pub enum PanelState<T> {
    Ready(T),
    /// None of the panel's metrics were present in the snapshot.
    Missing,
    /// The metrics were present but did not fit the chart's shape.
    #[serde(serialize_with = "serialize_error")]
    Failed(DashError),
}

fn serialize_error<S: serde::Serializer>(err: &DashError, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&err.to_string())
}

impl<T> PanelState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            PanelState::Ready(series) => Some(series),
            _ => None,
        }
    }

    fn from_result(result: Result<T, DashError>) -> Self {
        match result {
            Ok(series) => PanelState::Ready(series),
            Err(err) => PanelState::Failed(err),
        }
    }
}

/// A panel definition paired with this poll's normalized series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelData<T> {
    pub id: String,
    pub title: String,
    pub state: PanelState<T>,
}

/// Everything the views draw for one snapshot.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub histograms: Vec<PanelData<HistogramSeries>>,
    pub pies: Vec<PanelData<CategoricalSeries>>,
    pub stacked: Vec<PanelData<StackedSeries>>,
    /// Number of top-level variables in the snapshot.
    pub variable_count: usize,
    pub last_updated: Instant,
}

impl DashboardData {
    /// Normalize every panel of `dashboard` against `snapshot`.
    ///
    /// Each panel fails on its own; one malformed metric never blanks the
    /// rest of the dashboard.
    pub fn from_snapshot(snapshot: &Snapshot, dashboard: &Dashboard) -> Self {
        Self {
            histograms: dashboard
                .histograms
                .iter()
                .map(|panel| PanelData {
                    id: panel.id.clone(),
                    title: panel.title.clone(),
                    state: histogram_state(snapshot, panel),
                })
                .collect(),
            pies: dashboard
                .pies
                .iter()
                .map(|panel| PanelData {
                    id: panel.id.clone(),
                    title: panel.title.clone(),
                    state: pie_state(snapshot, panel),
                })
                .collect(),
            stacked: dashboard
                .stacked
                .iter()
                .map(|panel| PanelData {
                    id: panel.id.clone(),
                    title: panel.title.clone(),
                    state: stacked_state(snapshot, panel),
                })
                .collect(),
            variable_count: snapshot.len(),
            last_updated: Instant::now(),
        }
    }

    /// Count of panels that failed to normalize.
    pub fn failed_panels(&self) -> usize {
        count_failed(&self.histograms) + count_failed(&self.pies) + count_failed(&self.stacked)
    }

    /// Count of panels with a chart to draw.
    pub fn ready_panels(&self) -> usize {
        count_ready(&self.histograms) + count_ready(&self.pies) + count_ready(&self.stacked)
    }

    /// Panels as a JSON document, for one-shot diagnostics.
    pub fn to_json(&self) -> Value {
        json!({
            "variables": self.variable_count,
            "histograms": self.histograms,
            "pies": self.pies,
            "stacked": self.stacked,
        })
    }
}

fn count_ready<T>(panels: &[PanelData<T>]) -> usize {
    panels.iter().filter(|p| p.state.ready().is_some()).count()
}

fn count_failed<T>(panels: &[PanelData<T>]) -> usize {
    panels.iter().filter(|p| matches!(p.state, PanelState::Failed(_))).count()
}

fn histogram_state(snapshot: &Snapshot, panel: &HistogramPanel) -> PanelState<HistogramSeries> {
    let (Some(counts), Some(stat)) = (
        snapshot.histogram_counts(&panel.metric),
        snapshot.histogram_stat(&panel.metric),
    ) else {
        return PanelState::Missing;
    };

    PanelState::from_result(normalize_histogram(fit_to_ladder(&counts), &stat))
}

/// The producer keeps overflow buckets past the ladder's last step; those
/// are not charted. Shorter arrays pass through so they fail validation.
fn fit_to_ladder(counts: &[u64]) -> &[u64] {
    &counts[..counts.len().min(BUCKET_LADDER.len())]
}

fn pie_state(snapshot: &Snapshot, panel: &PiePanel) -> PanelState<CategoricalSeries> {
    let values: Vec<NamedValue> = panel
        .slices
        .iter()
        .filter_map(|slice| {
            snapshot.total(&slice.metric).map(|total| NamedValue::new(&slice.label, total as f64))
        })
        .collect();

    if values.is_empty() {
        return PanelState::Missing;
    }
    PanelState::Ready(normalize_categorical(&values))
}

fn stacked_state(snapshot: &Snapshot, panel: &StackedPanel) -> PanelState<StackedSeries> {
    let series: Vec<_> = panel
        .series
        .iter()
        .filter_map(|s| snapshot.minute_series(&s.metric, &s.label))
        .collect();

    if series.is_empty() {
        return PanelState::Missing;
    }
    PanelState::Ready(normalize_stacked(&series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PaletteColor;
    use serde_json::json;

    fn snapshot() -> Snapshot {
        serde_json::from_value(json!({
            "decoder.timing.histogram": (0..32).collect::<Vec<u64>>(),
            "decoder.timing.average": {"average": 1500.0, "count": 3, "min": 10.0, "max": 2_000_000.0},
            "encoder.timing.histogram": [1, 2, 3],
            "encoder.timing.average": {"average": 1.0, "count": 1, "min": 1.0, "max": 1.0},
            "lora.msg.confirmedup.total": 10,
            "lora.msg.joinrequest.total": 4,
            "gateway.create.minute": vec![1u64; 60],
            "gateway.delete.minute": vec![2u64; 60],
        }))
        .unwrap()
    }

    fn panel<'a, T>(panels: &'a [PanelData<T>], id: &str) -> &'a PanelData<T> {
        panels.iter().find(|p| p.id == id).unwrap()
    }

    #[test]
    fn wide_producer_histogram_is_fitted_to_ladder() {
        let data = DashboardData::from_snapshot(&snapshot(), &Dashboard::default());
        let decoder = panel(&data.histograms, "decoder").state.ready().unwrap();

        assert_eq!(decoder.counts.len(), 22);
        assert_eq!(decoder.counts[21], 21);
        assert_eq!(decoder.summary.avg, "1.500ms");
    }

    #[test]
    fn short_histogram_fails_only_its_panel() {
        let data = DashboardData::from_snapshot(&snapshot(), &Dashboard::default());

        assert_eq!(
            panel(&data.histograms, "encoder").state,
            PanelState::Failed(DashError::ShapeMismatch {
                expected: 22,
                actual: 3
            })
        );
        assert!(panel(&data.histograms, "decoder").state.ready().is_some());
        assert_eq!(data.failed_panels(), 1);
    }

    #[test]
    fn absent_metrics_are_missing() {
        let data = DashboardData::from_snapshot(&snapshot(), &Dashboard::default());
        assert_eq!(panel(&data.histograms, "incoming").state, PanelState::Missing);
        assert_eq!(panel(&data.pies, "failures").state, PanelState::Missing);
        assert_eq!(panel(&data.stacked, "devices").state, PanelState::Missing);
    }

    #[test]
    fn pie_uses_present_slices_in_order() {
        let data = DashboardData::from_snapshot(&snapshot(), &Dashboard::default());
        let pie = panel(&data.pies, "lora-messages").state.ready().unwrap();

        assert_eq!(pie.labels, vec!["confirmed up", "join request"]);
        assert_eq!(pie.values, vec![10.0, 4.0]);
        assert_eq!(pie.colors, vec![PaletteColor::Red, PaletteColor::Green]);
    }

    #[test]
    fn stacked_panel_has_fixed_axis() {
        let data = DashboardData::from_snapshot(&snapshot(), &Dashboard::default());
        let gateways = panel(&data.stacked, "gateways").state.ready().unwrap();

        assert_eq!(gateways.labels.len(), 61);
        assert_eq!(gateways.datasets.len(), 2);
        assert_eq!(gateways.datasets[0].label, "created");
        assert_eq!(gateways.datasets[1].label, "deleted");
    }

    #[test]
    fn same_snapshot_normalizes_identically() {
        let snapshot = snapshot();
        let dashboard = Dashboard::default();
        let a = DashboardData::from_snapshot(&snapshot, &dashboard);
        let b = DashboardData::from_snapshot(&snapshot, &dashboard);

        assert_eq!(a.histograms, b.histograms);
        assert_eq!(a.pies, b.pies);
        assert_eq!(a.stacked, b.stacked);
    }

    #[test]
    fn dashboard_deserializes_from_config_shape() {
        let dashboard: Dashboard = serde_json::from_value(json!({
            "histograms": [{"id": "rpc", "title": "RPC", "metric": "rpc.timing"}]
        }))
        .unwrap();
        assert_eq!(dashboard.histograms.len(), 1);
        assert!(dashboard.pies.is_empty());
    }

    #[test]
    fn json_report_tags_panel_states() {
        let data = DashboardData::from_snapshot(&snapshot(), &Dashboard::default());
        let report = data.to_json();

        assert_eq!(report["variables"], 8);
        let histograms = report["histograms"].as_array().unwrap();
        let by_id = |id: &str| histograms.iter().find(|h| h["id"] == id).unwrap().clone();

        assert_eq!(by_id("decoder")["state"]["state"], "ready");
        assert_eq!(by_id("decoder")["state"]["series"]["summary"]["avg"], "1.500ms");
        assert_eq!(by_id("encoder")["state"]["state"], "failed");
        assert_eq!(
            by_id("encoder")["state"]["series"],
            "shape mismatch: expected 22 entries, got 3"
        );
        assert_eq!(by_id("incoming")["state"], json!({"state": "missing"}));
    }
}
