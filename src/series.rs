use crate::error::{Result, SamplingError};

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;

/// A single timestamped reading.
///
/// `timestamp` is in Unix seconds. `value` is whatever the sensor reports
/// (degrees Celsius for the greenhouse data); its range is checked by the
/// loader, not here.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SamplePoint {
    pub timestamp: i64,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// UTC hour of day (0..=23) of this point's timestamp.
    pub fn hour(&self) -> usize {
        (self.timestamp.rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_HOUR) as usize
    }
}

/// Ordered, non-empty record of samples with strictly increasing timestamps.
///
/// Policies only read a `TimeSeries`; they never reorder or mutate it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    points: Vec<SamplePoint>,
}

impl TimeSeries {
    /// Builds a series, checking that it is non-empty and strictly increasing in time.
    ///
    /// # Errors
    /// * `EmptyInput` if `points` is empty.
    /// * `NotIncreasing` with the first offending index otherwise.
    pub fn new(points: Vec<SamplePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(SamplingError::EmptyInput("time series has no points"));
        }
        if let Some(index) = points
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(SamplingError::NotIncreasing { index: index + 1 });
        }
        Ok(Self { points })
    }

    /// Convenience constructor from `(timestamp, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i64, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(timestamp, value)| SamplePoint::new(timestamp, value))
                .collect(),
        )
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// A constructed series always holds at least one point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &SamplePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &SamplePoint {
        &self.points[self.points.len() - 1]
    }

    /// Returns the last `count` points as a new series (the whole series if
    /// `count` is zero or larger than the length).
    pub fn tail(&self, count: usize) -> TimeSeries {
        if count == 0 || count >= self.points.len() {
            return self.clone();
        }
        TimeSeries {
            points: self.points[self.points.len() - count..].to_vec(),
        }
    }

    /// Materializes the points a selection would transmit.
    pub fn select(&self, selection: &IndexSelection) -> TimeSeries {
        TimeSeries {
            points: selection.iter().map(|i| self.points[i]).collect(),
        }
    }
}

/// Strictly increasing indices into a [`TimeSeries`], always starting at 0.
///
/// Only the policies construct selections, so the invariant holds for every
/// value a caller can observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSelection {
    indices: Vec<usize>,
}

impl IndexSelection {
    pub(crate) fn starting_at_zero() -> Self {
        Self { indices: vec![0] }
    }

    pub(crate) fn from_sorted(indices: Vec<usize>) -> Self {
        debug_assert!(indices.first() == Some(&0));
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        Self { indices }
    }

    pub(crate) fn push(&mut self, index: usize) {
        debug_assert!(self.indices.last().is_none_or(|&last| last < index));
        self.indices.push(index);
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Index of the most recently selected point.
    pub fn last(&self) -> usize {
        self.indices[self.indices.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_series() {
        assert!(matches!(
            TimeSeries::new(Vec::new()),
            Err(SamplingError::EmptyInput(_))
        ));
    }

    #[test]
    fn rejects_repeated_timestamp() {
        let err = TimeSeries::from_pairs([(0, 1.0), (60, 1.0), (60, 2.0)]).unwrap_err();
        assert!(matches!(err, SamplingError::NotIncreasing { index: 2 }));
    }

    #[test]
    fn tail_keeps_last_points() {
        let series = TimeSeries::from_pairs((0..10).map(|i| (i * 60, i as f64))).unwrap();
        let tail = series.tail(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail.first().timestamp, 420);
        assert_eq!(series.tail(0).len(), 10);
        assert_eq!(series.tail(50).len(), 10);
    }

    #[test]
    fn hour_of_day_is_utc() {
        // 2024-01-01 13:45:00 UTC
        let point = SamplePoint::new(1_704_116_700, 0.0);
        assert_eq!(point.hour(), 13);
        assert_eq!(SamplePoint::new(-1, 0.0).hour(), 23);
    }

    #[test]
    fn select_materializes_points() {
        let series = TimeSeries::from_pairs([(0, 1.0), (10, 2.0), (20, 3.0)]).unwrap();
        let selection = IndexSelection::from_sorted(vec![0, 2]);
        let sampled = series.select(&selection);
        assert_eq!(sampled.points(), &[SamplePoint::new(0, 1.0), SamplePoint::new(20, 3.0)]);
    }
}
