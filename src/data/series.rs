//! Series normalization: raw metric shapes to chart-ready arrays.
//!
//! Every function here is pure. Normalizing the same input twice yields the
//! same output, and nothing is written to a display surface; histogram
//! summaries are returned so the caller decides where to show them.

use serde::{Deserialize, Serialize};

use super::duration::format_micros;
use super::policy::{PaletteColor, BUCKET_LADDER, PALETTE, TIME_WINDOW};
use crate::error::DashError;

/// Min/average/max of a latency histogram, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HistogramStat {
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub average: f64,
    #[serde(default)]
    pub max: f64,
    /// Number of samples seen by the producer, when it reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// One slice of a categorical (pie) chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One tracked quantity across the rolling time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub name: String,
    pub data: Vec<u64>,
}

impl TimeSeries {
    pub fn new(name: impl Into<String>, data: Vec<u64>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Formatted min/avg/max text for a histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramSummary {
    pub min: String,
    pub avg: String,
    pub max: String,
}

/// Histogram ready for the bar chart builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSeries {
    pub labels: Vec<&'static str>,
    pub counts: Vec<u64>,
    pub summary: HistogramSummary,
}

/// Parallel label/value/color arrays for a pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<PaletteColor>,
}

impl CategoricalSeries {
    /// Sum of all slice values.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// A single dataset of a stacked bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedDataset {
    pub label: String,
    pub color: PaletteColor,
    pub data: Vec<u64>,
}

impl StackedDataset {
    /// Sample drawn at `point` of a `window`-wide axis.
    ///
    /// Samples are oldest-first with the newest last, so a short series is
    /// right-aligned onto the final slot and a long one keeps its newest
    /// samples. Slots before the first sample read as zero.
    pub fn sample_at(&self, point: usize, window: usize) -> u64 {
        (point + self.data.len())
            .checked_sub(window)
            .and_then(|index| self.data.get(index))
            .copied()
            .unwrap_or(0)
    }
}

/// Stacked time-series bars sharing one label axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<StackedDataset>,
}

impl StackedSeries {
    /// Column totals across all datasets, one per label.
    pub fn column_totals(&self) -> Vec<u64> {
        let window = self.labels.len();
        let mut totals = vec![0u64; window];
        for dataset in &self.datasets {
            for (point, total) in totals.iter_mut().enumerate() {
                *total = total.saturating_add(dataset.sample_at(point, window));
            }
        }
        totals
    }
}

/// Bind bucket counts to the fixed ladder and format the summary stats.
///
/// Fails with [`DashError::ShapeMismatch`] unless there is exactly one count
/// per bucket, and with [`DashError::InvalidInput`] if a stat is negative.
pub fn normalize_histogram(
    counts: &[u64],
    stat: &HistogramStat,
) -> Result<HistogramSeries, DashError> {
    BUCKET_LADDER.validate(counts)?;

    let summary = HistogramSummary {
        min: format_micros(stat.min)?,
        avg: format_micros(stat.average)?,
        max: format_micros(stat.max)?,
    };

    Ok(HistogramSeries {
        labels: BUCKET_LADDER.labels.to_vec(),
        counts: counts.to_vec(),
        summary,
    })
}

/// Split named values into parallel arrays, coloring by position.
///
/// Order is preserved as given; it decides both legend order and colors.
pub fn normalize_categorical(values: &[NamedValue]) -> CategoricalSeries {
    let mut series = CategoricalSeries {
        labels: Vec::with_capacity(values.len()),
        values: Vec::with_capacity(values.len()),
        colors: Vec::with_capacity(values.len()),
    };

    for (index, item) in values.iter().enumerate() {
        series.labels.push(item.name.clone());
        series.values.push(item.value);
        series.colors.push(PALETTE.color(index));
    }

    series
}

/// Build one dataset per time series over the shared 61-sample axis.
///
/// Sample counts are not checked against the window; the axis is fixed.
/// See [`StackedDataset::sample_at`] for how samples map onto it.
pub fn normalize_stacked(series: &[TimeSeries]) -> StackedSeries {
    StackedSeries {
        labels: TIME_WINDOW.labels(),
        datasets: series
            .iter()
            .enumerate()
            .map(|(index, s)| StackedDataset {
                label: s.name.clone(),
                color: PALETTE.color(index),
                data: s.data.clone(),
            })
            .collect(),
    }
}
