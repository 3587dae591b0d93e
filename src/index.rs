use crate::series::SamplePoint;

/// Finds the last point whose timestamp is at or before `timestamp`.
///
/// Binary search over a time-sorted slice. The comparison is inclusive, so a
/// point sharing the exact timestamp is the one returned.
///
/// # Arguments
/// * `points` - Points sorted by strictly increasing timestamp.
/// * `timestamp` - Unix seconds to look up.
///
/// # Returns
/// * `Option<usize>` - Position of the held point, or `None` if every point is later.
pub fn last_at_or_before(points: &[SamplePoint], timestamp: i64) -> Option<usize> {
    points
        .partition_point(|p| p.timestamp <= timestamp)
        .checked_sub(1)
}

/// Finds the first point whose timestamp is strictly after `instant`.
///
/// `instant` is fractional seconds because wake times come out of a slope
/// division. The comparison is exclusive: a point exactly at `instant` is
/// skipped.
///
/// # Returns
/// * `Option<usize>` - Position of the next available point, or `None` when the
///   series ends before `instant`.
pub fn first_after(points: &[SamplePoint], instant: f64) -> Option<usize> {
    let position = points.partition_point(|p| (p.timestamp as f64) <= instant);
    (position < points.len()).then_some(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<SamplePoint> {
        [0, 600, 1200, 1800]
            .into_iter()
            .map(|t| SamplePoint::new(t, 0.0))
            .collect()
    }

    #[test]
    fn last_at_or_before_is_inclusive() {
        let points = points();
        assert_eq!(last_at_or_before(&points, 600), Some(1));
        assert_eq!(last_at_or_before(&points, 1199), Some(1));
        assert_eq!(last_at_or_before(&points, 5000), Some(3));
        assert_eq!(last_at_or_before(&points, -1), None);
    }

    #[test]
    fn first_after_is_exclusive() {
        let points = points();
        assert_eq!(first_after(&points, 600.0), Some(2));
        assert_eq!(first_after(&points, 600.5), Some(2));
        assert_eq!(first_after(&points, -10.0), Some(0));
        assert_eq!(first_after(&points, 1800.0), None);
    }
}
