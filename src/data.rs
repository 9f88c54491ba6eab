//! Series transforms for chart inputs
//!
//! Chart configs arrive as comma-separated strings; these helpers turn them
//! into typed series and derive the small analytics overlays the line and
//! area charts draw.
//!
//! Parsing policy: unparsable numeric tokens become `NaN` in place, so
//! positions stay aligned with their category labels. Use [`finite_only`]
//! where skipping is preferred.

use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Ordered numeric series (one value per category).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericSeries(Vec<f64>);

impl NumericSeries {
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Pad with `value` up to `length` (never truncates).
    pub fn padded(&self, length: usize, value: f64) -> NumericSeries {
        NumericSeries(pad_array(&self.0, length, value))
    }
}

impl Deref for NumericSeries {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for NumericSeries {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl FromIterator<f64> for NumericSeries {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for NumericSeries {
    type Item = f64;
    type IntoIter = std::vec::IntoIter<f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NumericSeries {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Trend and volatility overlays, one entry per label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub trend: Vec<f64>,
    pub volatility: Vec<f64>,
}

/// Basic statistics over the finite values of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub mean: f64,
}

fn split_fields(input: &str) -> impl Iterator<Item = &str> {
    // Empty input has no fields, not one empty field.
    let input = if input.trim().is_empty() { None } else { Some(input) };
    input
        .into_iter()
        .flat_map(|s| s.split(','))
        .map(str::trim)
}

/// Parse `"1, 2, 3"` into a numeric series. Bad tokens yield `NaN`.
pub fn parse_csv(input: &str) -> NumericSeries {
    split_fields(input)
        .map(|t| t.parse::<f64>().unwrap_or(f64::NAN))
        .collect()
}

/// Parse `"a, b, c"` into trimmed category labels. Duplicates are kept.
pub fn parse_categories(input: &str) -> Vec<String> {
    split_fields(input).map(str::to_string).collect()
}

/// Clamp `value` into `min..=max`.
///
/// An inverted range (`min > max`) returns `min`. NaN passes through.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if min > max {
        return min;
    }
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Append `default_value` until the result holds `length` items.
/// Longer inputs are returned as-is. The result is allocated up front, so
/// callers taking `length` from user input should bound it first.
pub fn pad_array<T: Clone>(arr: &[T], length: usize, default_value: T) -> Vec<T> {
    let mut out = arr.to_vec();
    if out.len() < length {
        out.resize(length, default_value);
    }
    out
}

/// Derive trend (`a - b`) and volatility (`|a - b|`) per label.
///
/// Both series are padded with zeros to the label count; values past the
/// last label are ignored.
pub fn derive_analytics<S: AsRef<str>>(
    labels: &[S],
    series_a: &[f64],
    series_b: &[f64],
) -> Analytics {
    let n = labels.len();
    let a = pad_array(series_a, n, 0.0);
    let b = pad_array(series_b, n, 0.0);

    let trend: Vec<f64> = a.iter().zip(&b).take(n).map(|(x, y)| x - y).collect();
    let volatility = trend.iter().map(|d| d.abs()).collect();

    Analytics { trend, volatility }
}

/// Drop NaN and infinities.
pub fn finite_only(series: &[f64]) -> NumericSeries {
    series.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Summary over finite values; `None` when there are none.
pub fn summarize(series: &[f64]) -> Option<SeriesSummary> {
    let finite = finite_only(series);
    let first = *finite.first()?;
    let (min, max, sum) = finite
        .iter()
        .fold((first, first, 0.0), |(lo, hi, sum), &v| {
            (lo.min(v), hi.max(v), sum + v)
        });
    let count = finite.len();

    Some(SeriesSummary {
        count,
        min,
        max,
        sum,
        mean: sum / count as f64,
    })
}
