//! Sampling policies.
//!
//! Each policy maps a [`TimeSeries`] to the [`IndexSelection`] of points that
//! would be transmitted. Policies are pure: the same series and parameters
//! always give the same selection.

use crate::error::{Result, SamplingError};
use crate::index;
use crate::profile::{HOURS_PER_DAY, VolatilityProfile};
use crate::series::{IndexSelection, SamplePoint, TimeSeries};

fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SamplingError::invalid(
            name,
            format!("must be a positive finite number, got {value}"),
        ));
    }
    Ok(())
}

/// Constant polling interval: keeps indices `0, k, 2k, ...`.
///
/// # Errors
/// * `InvalidParameter` if `stride` is zero or larger than the series.
pub fn fixed_stride(series: &TimeSeries, stride: usize) -> Result<IndexSelection> {
    if stride == 0 {
        return Err(SamplingError::invalid("stride", "must be a positive integer"));
    }
    if stride > series.len() {
        return Err(SamplingError::invalid(
            "stride",
            format!("{stride} is greater than the series length {}", series.len()),
        ));
    }
    Ok(IndexSelection::from_sorted(
        (0..series.len()).step_by(stride).collect(),
    ))
}

/// Send-on-delta: selects a point once it moved more than `threshold` away
/// from the last selected value.
///
/// One greedy pass, never revisits a decision.
///
/// # Errors
/// * `InvalidParameter` if `threshold` is not positive and finite.
pub fn threshold_trigger(series: &TimeSeries, threshold: f64) -> Result<IndexSelection> {
    ensure_positive("threshold", threshold)?;

    let points = series.points();
    let mut selection = IndexSelection::starting_at_zero();
    let mut last_value = points[0].value;

    for (i, point) in points.iter().enumerate().skip(1) {
        if (point.value - last_value).abs() > threshold {
            selection.push(i);
            last_value = point.value;
        }
    }
    Ok(selection)
}

/// Seconds to wait after `latest` before the next poll, extrapolating the
/// slope between the two most recent readings.
///
/// A flat pair (zero slope) waits the full `max_poll_interval`.
pub fn predictive_wait(
    previous: &SamplePoint,
    latest: &SamplePoint,
    max_dt: f64,
    max_poll_interval: f64,
) -> f64 {
    let elapsed = (latest.timestamp - previous.timestamp) as f64;
    let slope = (latest.value - previous.value).abs() / elapsed;
    if slope == 0.0 {
        return max_poll_interval;
    }
    (max_dt / slope).min(max_poll_interval)
}

/// Linear extrapolation: schedules each wake time so the signal is expected
/// to move by `max_dt`, capped at `max_poll_interval` seconds, then takes the
/// first available point strictly after that time.
///
/// Sampling stops when no point exists after the next wake time.
///
/// # Errors
/// * `InsufficientData` if the series has fewer than two points.
/// * `InvalidParameter` if `max_dt` or `max_poll_interval` is not positive.
pub fn predictive_linear(
    series: &TimeSeries,
    max_dt: f64,
    max_poll_interval: f64,
) -> Result<IndexSelection> {
    ensure_positive("max_dt", max_dt)?;
    ensure_positive("max_poll_interval", max_poll_interval)?;
    if series.len() < 2 {
        return Err(SamplingError::InsufficientData {
            required: 2,
            found: series.len(),
        });
    }

    let points = series.points();
    let mut selection = IndexSelection::from_sorted(vec![0, 1]);
    let (mut previous, mut latest) = (points[0], points[1]);

    loop {
        let wait = predictive_wait(&previous, &latest, max_dt, max_poll_interval);
        let wake_at = latest.timestamp as f64 + wait;
        let Some(next) = index::first_after(points, wake_at) else {
            break;
        };
        selection.push(next);
        previous = latest;
        latest = points[next];
    }
    Ok(selection)
}

/// Desired seconds between samples for each hour of the day.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyIntervals {
    seconds: [f64; HOURS_PER_DAY],
}

impl HourlyIntervals {
    /// Same interval for every hour.
    pub fn uniform(seconds: f64) -> Result<Self> {
        Self::from_table([seconds; HOURS_PER_DAY])
    }

    /// Explicit table. Entries must be non-negative; `+inf` means "never
    /// sample again during this hour".
    pub fn from_table(seconds: [f64; HOURS_PER_DAY]) -> Result<Self> {
        if let Some(hour) = seconds.iter().position(|s| s.is_nan() || *s < 0.0) {
            return Err(SamplingError::invalid(
                "poll_interval_by_hour",
                format!("hour {hour} has interval {}", seconds[hour]),
            ));
        }
        Ok(Self { seconds })
    }

    /// `3600 * target_dt / rate[hour]`: the time the signal typically needs
    /// to move by `target_dt` during that hour.
    ///
    /// Hours the profile never observed (or saw perfectly flat) use the
    /// profile's global rate. A globally flat profile yields infinite
    /// intervals.
    pub fn from_profile(profile: &VolatilityProfile, target_dt: f64) -> Result<Self> {
        ensure_positive("target_dt", target_dt)?;
        let seconds = std::array::from_fn(|hour| {
            let rate = profile.rate_or_global(hour);
            if rate > 0.0 {
                3600.0 * target_dt / rate
            } else {
                f64::INFINITY
            }
        });
        Ok(Self { seconds })
    }

    pub fn interval(&self, hour: usize) -> f64 {
        self.seconds[hour % HOURS_PER_DAY]
    }
}

/// Hour-adaptive stride: selects a point once more than the interval of the
/// point's own hour has elapsed since the last selection.
pub fn hourly_adaptive_rate(
    series: &TimeSeries,
    intervals: &HourlyIntervals,
) -> Result<IndexSelection> {
    let points = series.points();
    let mut selection = IndexSelection::starting_at_zero();
    let mut last_timestamp = points[0].timestamp;

    for (i, point) in points.iter().enumerate().skip(1) {
        let elapsed = (point.timestamp - last_timestamp) as f64;
        if elapsed > intervals.interval(point.hour()) {
            selection.push(i);
            last_timestamp = point.timestamp;
        }
    }
    Ok(selection)
}

/// A policy with all of its parameters bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Policy {
    FixedStride { stride: usize },
    ThresholdTrigger { threshold: f64 },
    PredictiveLinear { max_dt: f64, max_poll_interval: f64 },
    HourlyAdaptiveRate { intervals: HourlyIntervals },
}

impl Policy {
    pub fn select(&self, series: &TimeSeries) -> Result<IndexSelection> {
        let selection = match self {
            Policy::FixedStride { stride } => fixed_stride(series, *stride),
            Policy::ThresholdTrigger { threshold } => threshold_trigger(series, *threshold),
            Policy::PredictiveLinear {
                max_dt,
                max_poll_interval,
            } => predictive_linear(series, *max_dt, *max_poll_interval),
            Policy::HourlyAdaptiveRate { intervals } => hourly_adaptive_rate(series, intervals),
        }?;
        tracing::debug!(
            policy = ?self,
            points = series.len(),
            selected = selection.len(),
            "policy applied"
        );
        Ok(selection)
    }
}

/// A policy variant with its fixed context, waiting for the swept parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyFamily {
    /// Swept parameter: stride `k`.
    FixedStride,
    /// Swept parameter: value threshold.
    ThresholdTrigger,
    /// Swept parameter: `max_dt`.
    PredictiveLinear { max_poll_interval: f64 },
    /// Swept parameter: `target_dt` applied to the profile.
    HourlyAdaptiveRate { profile: VolatilityProfile },
}

impl PolicyFamily {
    pub fn name(&self) -> &'static str {
        match self {
            PolicyFamily::FixedStride => "stride",
            PolicyFamily::ThresholdTrigger => "threshold",
            PolicyFamily::PredictiveLinear { .. } => "predictive",
            PolicyFamily::HourlyAdaptiveRate { .. } => "hourly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PolicyFamily::FixedStride => "Constant Polling Interval",
            PolicyFamily::ThresholdTrigger => "Optimal Polling Rate",
            PolicyFamily::PredictiveLinear { .. } => "Linear Regression",
            PolicyFamily::HourlyAdaptiveRate { .. } => "Hourly Rate of Change",
        }
    }

    /// Binds the swept parameter.
    ///
    /// # Errors
    /// * `InvalidParameter` if `parameter` is not valid for the family (a
    ///   stride must be a positive whole number).
    pub fn with_parameter(&self, parameter: f64) -> Result<Policy> {
        match self {
            PolicyFamily::FixedStride => {
                if !parameter.is_finite() || parameter < 1.0 || parameter.fract() != 0.0 {
                    return Err(SamplingError::invalid(
                        "stride",
                        format!("must be a positive whole number, got {parameter}"),
                    ));
                }
                Ok(Policy::FixedStride {
                    stride: parameter as usize,
                })
            }
            PolicyFamily::ThresholdTrigger => Ok(Policy::ThresholdTrigger {
                threshold: parameter,
            }),
            PolicyFamily::PredictiveLinear { max_poll_interval } => Ok(Policy::PredictiveLinear {
                max_dt: parameter,
                max_poll_interval: *max_poll_interval,
            }),
            PolicyFamily::HourlyAdaptiveRate { profile } => Ok(Policy::HourlyAdaptiveRate {
                intervals: HourlyIntervals::from_profile(profile, parameter)?,
            }),
        }
    }
}
