//! End-to-end comparison: load a CSV, profile it, sweep every policy and
//! write the combined records.

use poll_rate_lab::config::{Config, LoaderConfig};
use poll_rate_lab::csv_processor;
use poll_rate_lab::policy::PolicyFamily;
use poll_rate_lab::schedule::PollSchedule;
use poll_rate_lab::sweep::{self, ParameterRange, Sweep};
use poll_rate_lab::{TimeSeries, VolatilityProfile};

/// Two days of 10-minute readings: calm nights, a warm swing during the day.
fn greenhouse_csv() -> String {
    let mut csv = String::from("id,time,value\n");
    let start = chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    for i in 0..288 {
        let at = start + chrono::Duration::minutes(10 * i);
        let hour = (i % 144) as f64 / 6.0;
        let day = ((hour - 6.0) / 12.0 * std::f64::consts::PI).sin().max(0.0);
        let value = 15.0 + 12.0 * day + 0.05 * ((i as f64) * 1.7).sin();
        let time = at.format("%Y-%m-%d %H:%M:%S");
        csv.push_str(&format!("greenhouse,{},{:.3}\n", time, value));
    }
    csv
}

fn load_greenhouse() -> TimeSeries {
    csv_processor::read_series(greenhouse_csv().as_bytes(), &LoaderConfig::default()).unwrap()
}

#[test]
fn compares_all_policies() {
    let series = load_greenhouse();
    assert_eq!(series.len(), 288);

    let profile = VolatilityProfile::compute(&series).unwrap();
    // Daytime swings move faster than the calm night.
    assert!(profile.rate(9).unwrap() > profile.rate(2).unwrap());

    let config = Config::default();
    let families = [
        (PolicyFamily::FixedStride, config.sweep.stride),
        (PolicyFamily::ThresholdTrigger, config.sweep.threshold),
        (
            PolicyFamily::PredictiveLinear { max_poll_interval: config.sweep.max_poll_interval },
            config.sweep.predictive,
        ),
        (PolicyFamily::HourlyAdaptiveRate { profile: profile.clone() }, config.sweep.hourly),
    ];

    let harness = Sweep::new(&series).with_limit(Some(200));
    let reports: Vec<_> = families
        .iter()
        .map(|(family, range)| harness.report(family, range).unwrap())
        .collect();

    for report in &reports {
        assert!(!report.records.is_empty(), "{} produced no records", report.policy);
        let front = sweep::pareto_front(&report.records);
        assert!(
            front
                .windows(2)
                .all(|w| w[0].mean <= w[1].mean && w[0].efficiency < w[1].efficiency)
        );
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comparison.csv");
    csv_processor::write_records(&path, &reports).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    let total: usize = reports.iter().map(|r| r.records.len()).sum();
    assert_eq!(written.lines().count(), total + 1);
    assert!(written.starts_with("policy,parameter,efficiency,mean,median,std,selected"));
}

#[test]
fn sweep_is_repeatable() {
    let series = load_greenhouse();
    let range = ParameterRange::new(0.1, 2.0, 0.1).unwrap();
    let first = sweep::sweep(&PolicyFamily::ThresholdTrigger, &range, &series).unwrap();
    let second = sweep::sweep(&PolicyFamily::ThresholdTrigger, &range, &series).unwrap();
    assert_eq!(first, second);
}

#[test]
fn schedule_from_recorded_profile() {
    let series = load_greenhouse();
    let profile = VolatilityProfile::compute(&series).unwrap();
    let schedule = PollSchedule::from_profile(&profile, 0.5).unwrap();
    assert!(schedule.wait_for_hour(2) > schedule.wait_for_hour(9));
}
