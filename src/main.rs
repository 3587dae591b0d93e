mod cli;
mod progress;
mod utils;

use anyhow::Context;
use poll_rate_lab::{config, csv_processor, schedule};
use poll_rate_lab::VolatilityProfile;

/// Loads the cached profile if the cache file exists, otherwise computes it
/// from the full series and stores it there.
fn load_or_compute_profile(
    series: &poll_rate_lab::TimeSeries,
    cache: Option<&std::path::Path>,
) -> anyhow::Result<VolatilityProfile> {
    match cache {
        Some(path) if path.exists() => {
            println!("📦 Using cached profile {}", path.display());
            VolatilityProfile::load(path)
        }
        Some(path) => {
            let profile = VolatilityProfile::compute(series)?;
            profile.save(path)?;
            println!("📦 Saved profile to {}", path.display());
            anyhow::Ok(profile)
        }
        None => anyhow::Ok(VolatilityProfile::compute(series)?),
    }
}

/// Main entry point of the application.
///
/// This function orchestrates the entire workflow:
/// 1. Parses command-line arguments and the optional config file.
/// 2. Loads and cleans the reference series.
/// 3. Derives (or loads) the hour-of-day volatility profile.
/// 4. Sweeps the selected policies and prints their Pareto fronts.
/// 5. Optionally writes every record to CSV and prints the poll schedule.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Success or an error if any step fails.
fn main() -> anyhow::Result<()> {
    let total_start = std::time::Instant::now();
    let args = cli::Args::parse();

    let level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => config::Config::load(path)?,
        None => config::Config::default(),
    };

    println!("Loading {}...", args.input.display());
    let series = csv_processor::load_series(&args.input, &config.loader)
        .with_context(|| format!("Failed to load series from {}", args.input.display()))?;
    utils::print_series_span(&series)?;

    let profile = load_or_compute_profile(&series, args.profile_cache.as_deref())?;
    let families = progress::select_families(&args.policy, &config.sweep, &profile)?;

    let effective_threads = match args.threads {
        Some(n) if n > 0 => {
            let max_threads = num_cpus::get();
            if n > max_threads {
                println!("⚠️ Warning: Limiting thread count to {} (max available)", max_threads);
                max_threads
            } else { n }
        }
        Some(_) => return Err(anyhow::anyhow!("Number of threads must be a positive integer")),
        None => rayon::current_num_threads(),
    };
    println!("🚀 Using {} thread(s)", effective_threads);

    let sweep_start = std::time::Instant::now();
    let reports = if args.threads.is_some() {
        let local_pool = utils::configure_thread_pool(effective_threads)?;
        local_pool.install(|| progress::run_sweeps(&series, args.limit, &families))?
    } else {
        progress::run_sweeps(&series, args.limit, &families)?
    };
    println!(
        "✅ Sweeps completed in {:?} seconds",
        sweep_start.elapsed().as_secs_f64()
    );

    if args.check {
        for report in &reports {
            println!("📄 First 5 records of {}", report.label);
            utils::print_records(&report.records, 5);
        }
    }
    utils::print_comparison(&reports);

    if let Some(output) = &args.output {
        csv_processor::write_records(output, &reports)?;
        println!("💾 Wrote sweep records to {}", output.display());
    }

    if args.schedule {
        let configured = schedule::PollSchedule::new(&config.schedule)?;
        utils::print_schedule("configured rate table", &configured);
        let derived = schedule::PollSchedule::from_profile(&profile, config.schedule.target_dt)?;
        utils::print_schedule("rates of this series", &derived);
    }

    println!(
        "✅ Done in {:?} seconds",
        total_start.elapsed().as_secs_f64()
    );
    Ok(())
}
