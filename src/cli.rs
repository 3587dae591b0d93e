/// Policies selectable on the command line.
pub const POLICY_CHOICES: [&str; 5] = ["all", "stride", "threshold", "predictive", "hourly"];

/// Structure representing command-line arguments.
#[derive(Debug)]
pub struct Args {
    pub input: std::path::PathBuf,
    pub output: Option<std::path::PathBuf>,
    pub config: Option<std::path::PathBuf>,
    pub profile_cache: Option<std::path::PathBuf>,
    pub policy: String,
    pub limit: Option<usize>,
    pub threads: Option<usize>,
    pub check: bool,
    pub schedule: bool,
    pub verbose: bool,
}

/// Command-line arguments parser using Clap.
///
/// Supports the input series, an optional sweep output file, the policy
/// selection and the sweep window size.
impl Args {
    /// Parses command-line arguments using `clap`.
    ///
    /// # Returns
    /// * `Args` - Struct containing parsed arguments.
    ///
    /// # Errors
    /// * If required arguments are missing or invalid.
    pub fn parse() -> Self {
        let matches = command().get_matches();
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        Args {
            input: matches
                .get_one::<String>("input")
                .map(std::path::PathBuf::from)
                .unwrap_or_default(),
            output: matches.get_one::<String>("output").map(std::path::PathBuf::from),
            config: matches.get_one::<String>("config").map(std::path::PathBuf::from),
            profile_cache: matches
                .get_one::<String>("profile-cache")
                .map(std::path::PathBuf::from),
            policy: matches
                .get_one::<String>("policy")
                .cloned()
                .unwrap_or_else(|| "all".to_string()),
            limit: matches.get_one::<usize>("limit").copied(),
            threads: matches.get_one::<usize>("threads").copied(),
            check: matches.get_flag("check"),
            schedule: matches.get_flag("schedule"),
            verbose: matches.get_flag("verbose"),
        }
    }
}

fn command() -> clap::Command {
    clap::Command::new("poll-rate-lab")
        .version("0.1.0")
        .about("Compare adaptive sampling policies on a recorded sensor series")
        .arg(
            clap::Arg::new("input")
                .short('i')
                .long("input")
                .help("Path to the CSV file with time and value columns")
                .required(true)
                .num_args(1),
        )
        .arg(
            clap::Arg::new("output")
            .short('o')
            .long("output")
            .help("Write every sweep record to this CSV file")
            .num_args(1),
        )
        .arg(
            clap::Arg::new("config")
            .long("config")
            .help("TOML file overriding sweep ranges, loader filters and schedule")
            .num_args(1),
        )
        .arg(
            clap::Arg::new("profile-cache")
            .long("profile-cache")
            .help("Reuse the volatility profile stored in this file, or store it there")
            .num_args(1),
        )
        .arg(
            clap::Arg::new("policy")
            .short('p')
            .long("policy")
            .help("Policy to sweep. Available: all, stride, threshold, predictive, hourly")
            .value_parser(POLICY_CHOICES)
            .default_value("all")
            .num_args(1),
        )
        .arg(
            clap::Arg::new("limit")
            .short('l')
            .long("limit")
            .help("Run policies on the last N points only (errors still use the full series)")
            .num_args(1)
            .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
        )
        .arg(
            clap::Arg::new("threads")
            .short('t')
            .long("threads")
            .help("Number of threads to use (default: all available)")
            .num_args(1)
            .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
        )
        .arg(
            clap::Arg::new("check")
            .short('c')
            .long("check")
            .help("Print the first records and the Pareto front of each policy")
            .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("schedule")
            .short('s')
            .long("schedule")
            .help("Print the per-hour poll waits derived from the profile")
            .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("Enable debug logging")
            .action(clap::ArgAction::SetTrue),
        )
}

/// Validates that a count argument is a positive integer.
///
/// # Arguments
/// * `s` - String representation of the count.
///
/// # Returns
/// * `Result<usize>` - Validated count.
fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let matches = command().try_get_matches_from(["poll-rate-lab", "-i", "data.csv"]).unwrap();
        let args = Args::from_matches(&matches);
        assert_eq!(args.input, std::path::PathBuf::from("data.csv"));
        assert_eq!(args.policy, "all");
        assert_eq!(args.limit, None);
        assert!(!args.check);
    }

    #[test]
    fn parses_limit_and_policy() {
        let matches = command()
            .try_get_matches_from([
                "poll-rate-lab", "-i", "d.csv", "-l", "1000", "-p", "hourly", "-c",
            ])
            .unwrap();
        let args = Args::from_matches(&matches);
        assert_eq!(args.limit, Some(1000));
        assert_eq!(args.policy, "hourly");
        assert!(args.check);
    }

    #[test]
    fn rejects_zero_limit_and_unknown_policy() {
        let parse = |argv: &[&str]| command().try_get_matches_from(argv);
        assert!(parse(&["poll-rate-lab", "-i", "d.csv", "-l", "0"]).is_err());
        assert!(parse(&["poll-rate-lab", "-i", "d.csv", "-p", "random"]).is_err());
    }

    #[test]
    fn positive_parser() {
        assert_eq!(parse_usize_positive("4"), Ok(4));
        assert!(parse_usize_positive("0").is_err());
        assert!(parse_usize_positive("x").is_err());
    }
}
