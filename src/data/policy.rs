//! Fixed presentation policy shared by every chart.
//!
//! The bucket ladder, the rolling time window and the color palette are
//! design constants rather than values derived from the data, so charts stay
//! comparable across polls. Each carries a version so input shapes can be
//! validated against a known policy.

use serde::Serialize;

use crate::error::DashError;

/// Fixed ladder of exponentially growing latency buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketLadder {
    pub version: u32,
    pub labels: &'static [&'static str],
}

/// The 22-step bucket ladder from `0-1us` up to `1-2s`.
pub const BUCKET_LADDER: BucketLadder = BucketLadder {
    version: 1,
    labels: &[
        "0-1us",
        "1-2us",
        "2-4us",
        "4-8us",
        "8-16us",
        "16-32us",
        "32-64us",
        "64-128us",
        "128-256us",
        "256-512us",
        "512us-1ms",
        "1-2ms",
        "2-4ms",
        "4-8ms",
        "8-16ms",
        "16-32ms",
        "32-64ms",
        "64-128ms",
        "128-256ms",
        "256-512ms",
        "512ms-1s",
        "1-2s",
    ],
};

impl BucketLadder {
    /// Number of buckets on the ladder.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Check that a count array has exactly one entry per bucket.
    pub fn validate(&self, counts: &[u64]) -> Result<(), DashError> {
        if counts.len() != self.len() {
            return Err(DashError::ShapeMismatch {
                expected: self.len(),
                actual: counts.len(),
            });
        }
        Ok(())
    }
}

/// Rolling window of per-minute samples: `past` buckets plus "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub version: u32,
    pub past: usize,
}

/// Sixty past buckets plus the current one.
pub const TIME_WINDOW: TimeWindow = TimeWindow {
    version: 1,
    past: 60,
};

impl TimeWindow {
    /// Total number of samples in the window, including "now".
    pub fn len(&self) -> usize {
        self.past + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Axis labels `"60"`, `"59"`, ..., `"1"`, `"now"`.
    pub fn labels(&self) -> Vec<String> {
        (1..=self.past)
            .rev()
            .map(|i| i.to_string())
            .chain(std::iter::once("now".to_string()))
            .collect()
    }
}

/// Named chart color. Kept symbolic so normalized series stay independent
/// of the terminal palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteColor {
    Red,
    Green,
    Blue,
    Orange,
    Purple,
    Yellow,
}

impl PaletteColor {
    pub fn name(self) -> &'static str {
        match self {
            PaletteColor::Red => "red",
            PaletteColor::Green => "green",
            PaletteColor::Blue => "blue",
            PaletteColor::Orange => "orange",
            PaletteColor::Purple => "purple",
            PaletteColor::Yellow => "yellow",
        }
    }
}

/// Cyclic color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub version: u32,
    pub colors: &'static [PaletteColor],
}

pub const PALETTE: Palette = Palette {
    version: 1,
    colors: &[
        PaletteColor::Red,
        PaletteColor::Green,
        PaletteColor::Blue,
        PaletteColor::Orange,
        PaletteColor::Purple,
        PaletteColor::Yellow,
    ],
};

impl Palette {
    /// Color for the series at `index`; wraps around past the last color.
    pub fn color(&self, index: usize) -> PaletteColor {
        self.colors[index % self.colors.len()]
    }
}
