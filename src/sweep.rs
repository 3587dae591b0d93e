//! Efficiency/error trade-off harness.
//!
//! A sweep applies one policy family over a range of parameter values and
//! records, for each value, how often the policy transmits (efficiency) and
//! how far the zero-order-hold reconstruction drifts from the reference.

use crate::error::{Result, SamplingError};
use crate::evaluate::{self, ErrorSummary};
use crate::policy::PolicyFamily;
use crate::series::TimeSeries;

/// Largest number of values a single range may produce.
pub const MAX_RANGE_POINTS: usize = 1_000_000;

/// Half-open range `[start, stop)` walked in `step` increments, like
/// `numpy.arange`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParameterRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl ParameterRange {
    /// # Errors
    /// * `InvalidParameter` if a bound is not finite, `step <= 0`,
    ///   `start >= stop`, or the range holds more than [`MAX_RANGE_POINTS`]
    ///   values.
    pub fn new(start: f64, stop: f64, step: f64) -> Result<Self> {
        let range = Self { start, stop, step };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.start.is_finite() && self.stop.is_finite() && self.step.is_finite()) {
            return Err(SamplingError::invalid("range", "bounds must be finite"));
        }
        if self.step <= 0.0 {
            return Err(SamplingError::invalid("range", "step must be positive"));
        }
        if self.start >= self.stop {
            return Err(SamplingError::invalid(
                "range",
                format!("start {} is not below stop {}", self.start, self.stop),
            ));
        }
        let points = ((self.stop - self.start) / self.step).ceil();
        if points > MAX_RANGE_POINTS as f64 {
            return Err(SamplingError::invalid(
                "range",
                format!("step {} gives more than {} values", self.step, MAX_RANGE_POINTS),
            ));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        ((self.stop - self.start) / self.step).ceil().max(0.0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values are computed as `start + i * step` so rounding does not accumulate.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |i| self.start + i as f64 * self.step)
    }
}

/// Outcome of one parameter value.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SweepRecord {
    pub parameter: f64,
    /// Average seconds between transmitted points.
    pub efficiency: f64,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub selected: usize,
}

/// All records of one policy family.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyReport {
    pub policy: &'static str,
    pub label: &'static str,
    pub records: Vec<SweepRecord>,
}

/// Sweep over a reference series, optionally running the policies on its
/// last `limit` points only. Errors are always measured against the whole
/// reference.
#[derive(Debug, Clone, Copy)]
pub struct Sweep<'a> {
    reference: &'a TimeSeries,
    limit: Option<usize>,
}

impl<'a> Sweep<'a> {
    pub fn new(reference: &'a TimeSeries) -> Self {
        Self {
            reference,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    fn window(&self) -> TimeSeries {
        match self.limit {
            Some(limit) => self.reference.tail(limit),
            None => self.reference.clone(),
        }
    }

    /// Evaluates a single parameter value.
    ///
    /// Returns `Ok(None)` when the selection is degenerate (fewer than two
    /// points, or no error sample could be computed).
    ///
    /// # Errors
    /// * Any validation error of the policy for this parameter.
    pub fn record(&self, family: &PolicyFamily, parameter: f64) -> Result<Option<SweepRecord>> {
        self.record_on(&self.window(), family, parameter)
    }

    fn record_on(
        &self,
        window: &TimeSeries,
        family: &PolicyFamily,
        parameter: f64,
    ) -> Result<Option<SweepRecord>> {
        let policy = family.with_parameter(parameter)?;
        let selection = policy.select(window)?;
        let sampled = window.select(&selection);

        let efficiency = match evaluate::efficiency(&sampled) {
            Ok(efficiency) => efficiency,
            Err(SamplingError::InsufficientData { found, .. }) => {
                tracing::warn!(
                    policy = family.name(),
                    parameter,
                    found,
                    "skipping degenerate selection"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let errors = evaluate::evaluate_error(&sampled, self.reference);
        let Some(summary) = ErrorSummary::from_samples(&errors) else {
            tracing::warn!(policy = family.name(), parameter, "no error samples, skipping");
            return Ok(None);
        };

        Ok(Some(SweepRecord {
            parameter,
            efficiency,
            mean: summary.mean,
            median: summary.median,
            std: summary.std,
            selected: selection.len(),
        }))
    }

    pub fn run(&self, family: &PolicyFamily, range: &ParameterRange) -> Result<Vec<SweepRecord>> {
        self.run_with(family, range, |_| {})
    }

    /// Runs the sweep, calling `on_step` after each parameter value.
    pub fn run_with<F>(
        &self,
        family: &PolicyFamily,
        range: &ParameterRange,
        mut on_step: F,
    ) -> Result<Vec<SweepRecord>>
    where
        F: FnMut(f64),
    {
        range.validate()?;
        let window = self.window();
        let mut records = Vec::new();
        for parameter in range.values() {
            if let Some(record) = self.record_on(&window, family, parameter)? {
                records.push(record);
            }
            on_step(parameter);
        }
        tracing::debug!(
            policy = family.name(),
            records = records.len(),
            window = window.len(),
            "sweep finished"
        );
        Ok(records)
    }

    pub fn report(&self, family: &PolicyFamily, range: &ParameterRange) -> Result<PolicyReport> {
        Ok(PolicyReport {
            policy: family.name(),
            label: family.label(),
            records: self.run(family, range)?,
        })
    }
}

/// Sweeps `family` over `range` on `series`, measuring against the same series.
pub fn sweep(
    family: &PolicyFamily,
    range: &ParameterRange,
    series: &TimeSeries,
) -> Result<Vec<SweepRecord>> {
    Sweep::new(series).run(family, range)
}

/// Records ordered by ascending mean error.
pub fn sort_by_mean(records: &[SweepRecord]) -> Vec<SweepRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| a.mean.total_cmp(&b.mean));
    sorted
}

/// Records not dominated by another record with lower mean error and a
/// longer average interval.
pub fn pareto_front(records: &[SweepRecord]) -> Vec<SweepRecord> {
    let mut front: Vec<SweepRecord> = Vec::new();
    for record in sort_by_mean(records) {
        if front.last().is_none_or(|best| record.efficiency > best.efficiency) {
            front.push(record);
        }
    }
    front
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> TimeSeries {
        TimeSeries::from_pairs((0..40).map(|i| (i * 600, (i % 10) as f64))).unwrap()
    }

    #[test]
    fn range_matches_arange() {
        let range = ParameterRange::new(1.0, 10.0, 1.0).unwrap();
        let expected: Vec<f64> = (1..10).map(f64::from).collect();
        assert_eq!(range.values().collect::<Vec<_>>(), expected);
        assert!(ParameterRange::new(1.0, 1.0, 1.0).is_err());
        assert!(ParameterRange::new(0.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn vanishing_step_is_rejected() {
        assert!(matches!(
            ParameterRange::new(0.1, 3.0, 1e-300),
            Err(SamplingError::InvalidParameter { name: "range", .. })
        ));
        assert!(ParameterRange::new(0.0, 1_000_000.0, 1.0).is_ok());
        assert!(ParameterRange::new(0.0, 1_000_001.0, 1.0).is_err());

        // Ranges built field by field are checked again before sweeping.
        let unchecked = ParameterRange {
            start: 0.1,
            stop: 3.0,
            step: 1e-300,
        };
        assert!(matches!(
            sweep(&PolicyFamily::ThresholdTrigger, &unchecked, &ramp()),
            Err(SamplingError::InvalidParameter { name: "range", .. })
        ));
    }

    #[test]
    fn stride_sweep_efficiency_grows() {
        let series = ramp();
        let range = ParameterRange::new(1.0, 6.0, 1.0).unwrap();
        let records = sweep(&PolicyFamily::FixedStride, &range, &series).unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(records[0].mean, 0.0);
        assert!(records.windows(2).all(|w| w[0].efficiency <= w[1].efficiency));
    }

    #[test]
    fn degenerate_selections_are_skipped() {
        let series = ramp();
        // A threshold above the signal range keeps only the first point.
        let range = ParameterRange::new(0.5, 20.0, 10.0).unwrap();
        let records = sweep(&PolicyFamily::ThresholdTrigger, &range, &series).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].parameter, 0.5);
    }

    #[test]
    fn invalid_parameters_abort_the_sweep() {
        let series = TimeSeries::from_pairs((0..5).map(|i| (i * 600, 0.0))).unwrap();
        let range = ParameterRange::new(1.0, 10.0, 1.0).unwrap();
        assert!(matches!(
            sweep(&PolicyFamily::FixedStride, &range, &series),
            Err(SamplingError::InvalidParameter { name: "stride", .. })
        ));
    }

    #[test]
    fn limited_window_is_measured_against_full_reference() {
        let series = ramp();
        let sweep = Sweep::new(&series).with_limit(Some(10));
        let record = sweep.record(&PolicyFamily::FixedStride, 1.0).unwrap().unwrap();
        // Only the last ten points are sampled; earlier points have no held
        // value and are skipped, the rest reconstruct exactly.
        assert_eq!(record.selected, 10);
        assert_eq!(record.mean, 0.0);
    }

    #[test]
    fn pareto_front_drops_dominated_records() {
        let record = |mean: f64, efficiency: f64| SweepRecord {
            parameter: 0.0,
            efficiency,
            mean,
            median: mean,
            std: 0.0,
            selected: 2,
        };
        let records = vec![
            record(0.5, 900.0),
            record(0.1, 600.0),
            record(0.3, 500.0),
            record(0.9, 2000.0),
        ];
        let front = pareto_front(&records);
        let means: Vec<f64> = front.iter().map(|r| r.mean).collect();
        assert_eq!(means, vec![0.1, 0.5, 0.9]);
    }
}
