use poll_rate_lab::config;
use poll_rate_lab::policy::PolicyFamily;
use poll_rate_lab::series::TimeSeries;
use poll_rate_lab::sweep::{ParameterRange, PolicyReport, Sweep};

use rayon::prelude::*;

/// Builds the policy families to sweep, each paired with its parameter range.
///
/// # Arguments
/// * `policy` - One of `cli::POLICY_CHOICES`.
/// * `sweep` - Ranges from the configuration.
/// * `profile` - Volatility profile for the hour-adaptive family.
pub fn select_families(
    policy: &str,
    sweep: &config::SweepConfig,
    profile: &poll_rate_lab::VolatilityProfile,
) -> anyhow::Result<Vec<(PolicyFamily, ParameterRange)>> {
    let all = vec![
        (PolicyFamily::FixedStride, sweep.stride),
        (
            PolicyFamily::PredictiveLinear {
                max_poll_interval: sweep.max_poll_interval,
            },
            sweep.predictive,
        ),
        (PolicyFamily::ThresholdTrigger, sweep.threshold),
        (PolicyFamily::HourlyAdaptiveRate { profile: profile.clone() }, sweep.hourly),
    ];
    if policy == "all" {
        return anyhow::Ok(all);
    }
    let selected: Vec<_> = all
        .into_iter()
        .filter(|(family, _)| family.name() == policy)
        .collect();
    if selected.is_empty() {
        return Err(anyhow::anyhow!("Unknown policy: {}", policy));
    }
    anyhow::Ok(selected)
}

fn progress_bar(
    multi: &indicatif::MultiProgress,
    family: &PolicyFamily,
    len: usize,
) -> indicatif::ProgressBar {
    let bar = multi.add(indicatif::ProgressBar::new(len as u64));
    let style = indicatif::ProgressStyle::with_template("{prefix:>12} [{bar:40}] {pos}/{len}")
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_prefix(family.name());
    bar
}

/// Runs every family's sweep, in parallel on the current Rayon pool.
///
/// Each sweep gets its own progress bar. Reports come back in the order of
/// `families` regardless of which sweep finishes first.
///
/// # Returns
/// * `anyhow::Result<Vec<PolicyReport>>` - One report per family, or the first sweep error.
pub fn run_sweeps(
    reference: &TimeSeries,
    limit: Option<usize>,
    families: &[(PolicyFamily, ParameterRange)],
) -> anyhow::Result<Vec<PolicyReport>> {
    let multi = indicatif::MultiProgress::new();
    let sweep = Sweep::new(reference).with_limit(limit);

    let reports = families
        .par_iter()
        .map(|(family, range)| {
            let bar = progress_bar(&multi, family, range.len());
            let records = sweep
                .run_with(family, range, |_| bar.inc(1))
                .map_err(|e| anyhow::anyhow!("Sweep of {} failed: {}", family.name(), e))?;
            bar.finish();
            Ok::<_, anyhow::Error>(PolicyReport {
                policy: family.name(),
                label: family.label(),
                records,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    anyhow::Ok(reports)
}
