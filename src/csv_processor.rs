use crate::config;
use crate::error::SamplingError;
use crate::series::{SamplePoint, TimeSeries};
use crate::sweep;

/// Datetime layouts accepted in the time column, tried in order after RFC 3339.
const TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y%m%d %H%M%S"];

/// One row of the sweep output file.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RecordRow {
    pub policy: String,
    pub parameter: f64,
    pub efficiency: f64,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub selected: usize,
}

/// Parses a datetime string into Unix seconds.
///
/// Naive datetimes are read as UTC, so hour-of-day buckets follow the wall
/// clock written in the file.
///
/// # Returns
/// * `Option<i64>` - Unix timestamp, or `None` if no known layout matches.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    TIME_FORMATS.iter().find_map(|format| {
        chrono::NaiveDateTime::parse_from_str(raw, format)
            .ok()
            .map(|dt| dt.and_utc().timestamp())
    })
}

fn column_position(headers: &csv::StringRecord, name: &str) -> anyhow::Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| SamplingError::MissingField(format!("column `{}` not found", name)).into())
}

/// Reads and cleans a time series from any CSV source.
///
/// This function:
/// 1. Locates the time and value columns by header name.
/// 2. Parses each time into a Unix timestamp.
/// 3. Drops rows whose value is empty, not a finite number, outside the
///    configured bounds, or more than `max_jump` away from the previous raw
///    row. A row following an unreadable value has no usable jump and is
///    dropped as well.
/// 4. Drops rows whose timestamp does not advance.
///
/// # Errors
/// * `MissingField` if a column is absent or a time cannot be parsed.
/// * `EmptyInput` if no row survives the filters.
/// * CSV decoding failures.
pub fn read_series<R: std::io::Read>(
    reader: R,
    loader: &config::LoaderConfig,
) -> anyhow::Result<TimeSeries> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    let time_pos = column_position(&headers, &loader.time_column)?;
    let value_pos = column_position(&headers, &loader.value_column)?;

    let mut points: Vec<SamplePoint> = Vec::new();
    let mut previous_raw: Option<f64> = None;
    let mut dropped = 0usize;

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let raw_time = record.get(time_pos).unwrap_or_default();
        let timestamp = parse_timestamp(raw_time).ok_or_else(|| {
            let reason = format!("row {}: `{}` is not a datetime", row + 1, raw_time);
            SamplingError::MissingField(reason)
        })?;
        let value = record
            .get(value_pos)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(f64::NAN);

        // A missing reading poisons the next jump, so that row is dropped too.
        let jump = previous_raw.map_or(0.0, |p| (value - p).abs());
        previous_raw = Some(value);

        let in_bounds = value > loader.min_value && value < loader.max_value;
        if !value.is_finite() || !in_bounds || jump.is_nan() || jump > loader.max_jump {
            tracing::debug!(row = row + 1, value, jump, "dropping filtered row");
            dropped += 1;
            continue;
        }
        if points.last().is_some_and(|last| timestamp <= last.timestamp) {
            tracing::warn!(row = row + 1, timestamp, "dropping row with non-increasing timestamp");
            dropped += 1;
            continue;
        }
        points.push(SamplePoint::new(timestamp, value));
    }

    if dropped > 0 {
        tracing::warn!(dropped, kept = points.len(), "filtered rows while loading");
    }
    Ok(TimeSeries::new(points)?)
}

/// Loads a time series from a CSV file. See [`read_series`].
pub fn load_series<P: AsRef<std::path::Path>>(
    path: P,
    loader: &config::LoaderConfig,
) -> anyhow::Result<TimeSeries> {
    let file = std::fs::File::open(path.as_ref())
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path.as_ref().display(), e))?;
    read_series(file, loader)
}

/// Writes all sweep records to a CSV file, one row per parameter value.
pub fn write_records<P: AsRef<std::path::Path>>(
    path: P,
    reports: &[sweep::PolicyReport],
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for report in reports {
        for record in &report.records {
            writer.serialize(RecordRow {
                policy: report.policy.to_string(),
                parameter: record.parameter,
                efficiency: record.efficiency,
                mean: record.mean,
                median: record.median,
                std: record.std,
                selected: record.selected,
            })?;
        }
    }
    writer.flush()?;
    anyhow::Ok(())
}
