use std::time::Duration;

use anyhow::{bail, Result};

use crate::error::DashError;

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
];

/// Units a microsecond value can be promoted through, smallest first.
const PROMOTIONS: [&str; 3] = ["us", "ms", "s"];

/// Parse duration strings like "1s", "500ms", "2.5s" (used for refresh and timeout settings)
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.parse()?;
            if !val.is_finite() || val < 0.0 {
                bail!("Duration out of range: {}", s);
            }
            return Ok(Duration::from_nanos((val * multiplier) as u64));
        }
    }

    bail!("Unknown duration format: {}", s)
}

/// Format a microsecond duration the way the histogram summaries show it.
///
/// The value is divided by 1000 at most twice, each time it exceeds 1000,
/// moving from `us` to `ms` to `s`. Seconds are never promoted further, so
/// very long durations read as e.g. `"2500.000s"`.
///
/// ```
/// use vardash::data::duration::format_micros;
///
/// assert_eq!(format_micros(1500.0).unwrap(), "1.500ms");
/// ```
pub fn format_micros(micros: f64) -> Result<String, DashError> {
    if !micros.is_finite() || micros < 0.0 {
        return Err(DashError::InvalidInput(format!(
            "duration must be a finite, non-negative number of microseconds, got {}",
            micros
        )));
    }

    let mut value = micros;
    let mut unit = 0;
    while unit < PROMOTIONS.len() - 1 && value > 1000.0 {
        value /= 1000.0;
        unit += 1;
    }

    Ok(format!("{:.3}{}", value, PROMOTIONS[unit]))
}
