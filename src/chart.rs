//! Chart-facing helpers built on [`crate::color`], [`crate::tokens`] and
//! [`crate::data`]: what gauge, donut/pie and line/area charts actually call.

use serde::{Deserialize, Serialize};

use crate::color::{hex_to_rgb, interpolate_color};
use crate::data::{clamp, derive_analytics, parse_categories, parse_csv, Analytics, NumericSeries};
use crate::error::ColorError;
use crate::tokens::{resolve_css_color, TokenResolver};

/// Fraction of the gauge range covered by `value`, in `0.0..=1.0`.
///
/// Degenerate ranges (`max <= min`) and NaN values read as empty.
pub fn gauge_fill(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() || max <= min || !(max - min).is_finite() {
        return 0.0;
    }
    (clamp(value, min, max) - min) / (max - min)
}

/// Colour of a gauge at `value`, blended from `start` to `end`.
///
/// `start` and `end` may be hex literals or token references.
pub fn gauge_color<R>(
    value: f64,
    min: f64,
    max: f64,
    start: &str,
    end: &str,
    resolver: &R,
) -> Result<String, ColorError>
where
    R: TokenResolver + ?Sized,
{
    let from = hex_to_rgb(&resolve_css_color(start, resolver))?;
    let to = hex_to_rgb(&resolve_css_color(end, resolver))?;
    Ok(interpolate_color(from, to, gauge_fill(value, min, max)))
}

/// Slice percentages for pie and donut charts (sum to 100 unless all zero).
///
/// Negative and non-finite values count as zero.
pub fn percent_shares(values: &[f64]) -> Vec<f64> {
    let cleaned: Vec<f64> = values
        .iter()
        .map(|&v| if v.is_finite() && v > 0.0 { v } else { 0.0 })
        .collect();
    let total: f64 = cleaned.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return vec![0.0; cleaned.len()];
    }
    cleaned.iter().map(|v| v / total * 100.0).collect()
}

/// Parsed two-series chart input, aligned to its labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series_a: NumericSeries,
    pub series_b: NumericSeries,
    pub analytics: Analytics,
}

impl ChartData {
    /// Build from comma-separated config fields. Short series are padded
    /// with zeros; long ones are kept as-is but only labelled points feed
    /// the analytics.
    pub fn from_config(labels: &str, series_a: &str, series_b: &str) -> Self {
        let labels = parse_categories(labels);
        let n = labels.len();
        let series_a = parse_csv(series_a).padded(n, 0.0);
        let series_b = parse_csv(series_b).padded(n, 0.0);
        if series_a.len() > n || series_b.len() > n {
            log::debug!(
                "[chart] series longer than {} labels; extra points ignored by analytics",
                n
            );
        }
        let analytics = derive_analytics(&labels, &series_a, &series_b);

        Self {
            labels,
            series_a,
            series_b,
            analytics,
        }
    }
}
