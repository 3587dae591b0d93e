//! Hour-of-day volatility profile.
//!
//! The profile is the average absolute rate of change (value per hour) of a
//! series, bucketed by the hour of day of each observation. It is derived once
//! from the full history and reused for every parameter of a sweep, so it can
//! be cached on disk next to the data.

use anyhow::Context;

use crate::error::{Result, SamplingError};
use crate::series::TimeSeries;

pub const HOURS_PER_DAY: usize = 24;

/// Average absolute rate of change per hour of day.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VolatilityProfile {
    rates: [Option<f64>; HOURS_PER_DAY],
    counts: [u64; HOURS_PER_DAY],
    global_rate: f64,
}

impl VolatilityProfile {
    /// Computes the profile of a series.
    ///
    /// Each consecutive pair contributes `|Δvalue| / Δhours` to the bucket of
    /// the later point's hour. Hours without observations stay `None`.
    ///
    /// # Errors
    /// * `EmptyInput` if the series has fewer than two points.
    pub fn compute(series: &TimeSeries) -> Result<Self> {
        if series.len() < 2 {
            return Err(SamplingError::EmptyInput(
                "volatility profile needs at least two consecutive points",
            ));
        }

        let mut sums = [0.0f64; HOURS_PER_DAY];
        let mut counts = [0u64; HOURS_PER_DAY];
        let mut total = 0.0;

        for pair in series.points().windows(2) {
            let hours = (pair[1].timestamp - pair[0].timestamp) as f64 / 3600.0;
            let rate = (pair[1].value - pair[0].value).abs() / hours;
            let hour = pair[1].hour();
            sums[hour] += rate;
            counts[hour] += 1;
            total += rate;
        }

        let mut rates = [None; HOURS_PER_DAY];
        for hour in 0..HOURS_PER_DAY {
            if counts[hour] > 0 {
                rates[hour] = Some(sums[hour] / counts[hour] as f64);
            }
        }
        let global_rate = total / (series.len() - 1) as f64;

        tracing::debug!(
            observed_hours = counts.iter().filter(|&&c| c > 0).count(),
            global_rate,
            "computed volatility profile"
        );

        Ok(Self {
            rates,
            counts,
            global_rate,
        })
    }

    /// Builds a profile from a fixed per-hour table, e.g. historical rates.
    ///
    /// # Errors
    /// * `InvalidParameter` if any rate is negative or not finite.
    pub fn from_rates(table: [f64; HOURS_PER_DAY]) -> Result<Self> {
        if let Some(hour) = table.iter().position(|r| !r.is_finite() || *r < 0.0) {
            return Err(SamplingError::invalid(
                "rate_of_change",
                format!("hour {hour} has rate {}", table[hour]),
            ));
        }
        Ok(Self {
            rates: table.map(Some),
            counts: [1; HOURS_PER_DAY],
            global_rate: table.iter().sum::<f64>() / HOURS_PER_DAY as f64,
        })
    }

    /// Average rate for `hour`, if any pair landed in that hour.
    pub fn rate(&self, hour: usize) -> Option<f64> {
        self.rates.get(hour).copied().flatten()
    }

    /// Rate for `hour`, falling back to the global average for hours that
    /// were never observed or were perfectly flat.
    pub fn rate_or_global(&self, hour: usize) -> f64 {
        match self.rate(hour) {
            Some(rate) if rate > 0.0 => rate,
            _ => self.global_rate,
        }
    }

    /// Mean rate over every consecutive pair of the source series.
    pub fn global_rate(&self) -> f64 {
        self.global_rate
    }

    pub fn count(&self, hour: usize) -> u64 {
        self.counts.get(hour).copied().unwrap_or(0)
    }

    pub fn observed_hours(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.rates
            .iter()
            .enumerate()
            .filter_map(|(hour, rate)| rate.map(|r| (hour, r)))
    }

    /// Serializes the profile to a cache file with `bincode`.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let data = bincode::serialize(self)?;
        std::fs::write(path.as_ref(), data)
            .with_context(|| format!("Failed to write profile cache {}", path.as_ref().display()))?;
        anyhow::Ok(())
    }

    /// Loads a profile previously written by [`VolatilityProfile::save`].
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let data = std::fs::read(path.as_ref())
            .with_context(|| format!("Failed to read profile cache {}", path.as_ref().display()))?;
        let profile = bincode::deserialize(&data)?;
        anyhow::Ok(profile)
    }
}

/// Absolute differences between consecutive values, in series order.
///
/// The result has `len - 1` entries and is empty for a single point.
/// Summarize it with [`crate::evaluate::ErrorSummary::from_samples`].
pub fn absolute_differences(series: &TimeSeries) -> Vec<f64> {
    series
        .points()
        .windows(2)
        .map(|pair| (pair[1].value - pair[0].value).abs())
        .collect()
}
