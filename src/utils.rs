use poll_rate_lab::schedule;
use poll_rate_lab::series;
use poll_rate_lab::sweep;

use chrono::TimeZone;

/// Configures a custom Rayon thread pool with specified size.
///
/// Sweeps of different policies are independent, so the binary can run them
/// side by side on a pool of exactly `num_threads` threads.
///
/// # Arguments
/// * `num_threads` - Desired number of threads for the pool.
///
/// # Returns
/// * `Result<ThreadPool>` - Created thread pool or an error if creation fails.
pub fn configure_thread_pool(num_threads: usize) -> anyhow::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))
}

/// Formats Unix timestamp into readable string: YYYY-MM-DD HH:MM:SS.
///
/// # Arguments
/// * `ts` - Unix timestamp in seconds.
///
/// # Returns
/// * `anyhow::Result<String>` - Formatted string (e.g., "2024-06-13 10:00:00"),
///   or an error if the timestamp is out of range.
pub fn format_timestamp(ts: i64) -> anyhow::Result<String> {
    let dt = chrono::Utc
        .timestamp_opt(ts, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("Timestamp {} is out of range", ts))?;
    anyhow::Ok(dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Prints the covered time span of a series.
pub fn print_series_span(series: &series::TimeSeries) -> anyhow::Result<()> {
    println!(
        "📄 {} points from {} to {}",
        series.len(),
        format_timestamp(series.first().timestamp)?,
        format_timestamp(series.last().timestamp)?,
    );
    let steps = poll_rate_lab::absolute_differences(series);
    if let Some(summary) = poll_rate_lab::ErrorSummary::from_samples(&steps) {
        println!(
            "📏 Step sizes: mean {:.4}, median {:.4}, std {:.4}, max {:.4}",
            summary.mean, summary.median, summary.std, summary.max,
        );
    }
    anyhow::Ok(())
}

/// Prints the first `count` records of a sweep.
///
/// # Example Output
/// ```text
///  - param: 2.0000, efficiency: 1200.0 s, mean: 0.2510, median: 0.2000, std: 0.1933, selected: 500
/// ```
pub fn print_records(records: &[sweep::SweepRecord], count: usize) {
    for record in records.iter().take(count) {
        println!(
            " - param: {:.4}, efficiency: {:.1} s, mean: {:.4}, median: {:.4}, \
             std: {:.4}, selected: {}",
            record.parameter,
            record.efficiency,
            record.mean,
            record.median,
            record.std,
            record.selected,
        );
    }
}

/// Prints the Pareto front of every report, best error first.
pub fn print_comparison(reports: &[sweep::PolicyReport]) {
    for report in reports {
        let front = sweep::pareto_front(&report.records);
        println!(
            "📈 {} ({} records, {} on the front)",
            report.label,
            report.records.len(),
            front.len()
        );
        print_records(&front, front.len());
    }
}

/// Prints the wait a poller would use for each hour of the day.
pub fn print_schedule(source: &str, schedule: &schedule::PollSchedule) {
    let target_dt = schedule.to_config().target_dt;
    println!("🕒 Poll waits by hour from {} (target_dt = {})", source, target_dt);
    for hour in 0..24 {
        let wait = schedule.wait_for_hour(hour);
        println!(" - {:02}h: {:>8.1} s", hour, wait.as_secs_f64());
    }
}
