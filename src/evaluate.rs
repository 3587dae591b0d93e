use crate::error::{Result, SamplingError};
use crate::index;
use crate::series::TimeSeries;

/// Zero-order-hold reconstruction error.
///
/// For every point of `original` after the first, the receiver holds the last
/// sampled value at or before that point's timestamp. The absolute difference
/// is one error sample.
///
/// Points with no sampled point at or before them are skipped rather than
/// reported, so the output can be shorter than `original.len() - 1`.
///
/// # Arguments
/// * `sampled` - The transmitted points.
/// * `original` - The full reference series.
///
/// # Returns
/// * `Vec<f64>` - One non-negative error per eligible point, in time order.
pub fn evaluate_error(sampled: &TimeSeries, original: &TimeSeries) -> Vec<f64> {
    let held = sampled.points();
    original
        .points()
        .iter()
        .skip(1)
        .filter_map(|point| {
            index::last_at_or_before(held, point.timestamp)
                .map(|i| (point.value - held[i].value).abs())
        })
        .collect()
}

/// Average seconds between transmitted points: `(last - first) / count`.
///
/// # Errors
/// * `InsufficientData` if fewer than two points were selected.
pub fn efficiency(selected: &TimeSeries) -> Result<f64> {
    if selected.len() < 2 {
        return Err(SamplingError::InsufficientData {
            required: 2,
            found: selected.len(),
        });
    }
    let span = (selected.last().timestamp - selected.first().timestamp) as f64;
    Ok(span / selected.len() as f64)
}

/// Summary statistics of a set of error samples.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ErrorSummary {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    pub max: f64,
    pub count: usize,
}

impl ErrorSummary {
    /// Returns `None` for an empty sample set.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let count = samples.len();
        let mean = samples.iter().sum::<f64>() / count as f64;
        let variance = samples.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / count as f64;

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        };

        Some(Self {
            mean,
            median,
            std: variance.sqrt(),
            max: sorted[count - 1],
            count,
        })
    }
}
