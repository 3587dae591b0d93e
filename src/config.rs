//! Configuration file support.
//!
//! A TOML file can override the sweep ranges, the loader filters and the
//! poll schedule. Every field is optional; missing ones keep the defaults of
//! the greenhouse study.
//!
//! ```toml
//! [sweep]
//! max_poll_interval = 7200.0
//! stride = { start = 1.0, stop = 10.0, step = 1.0 }
//! threshold = { start = 0.1, stop = 3.0, step = 0.05 }
//!
//! [loader]
//! min_value = 0.0
//! max_value = 50.0
//! max_jump = 6.0
//!
//! [schedule]
//! target_dt = 0.5
//! ```

use anyhow::Context;

use crate::schedule::ScheduleConfig;
use crate::sweep::ParameterRange;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub sweep: SweepConfig,
    pub loader: LoaderConfig,
    pub schedule: ScheduleConfig,
}

/// Parameter ranges swept for each policy family.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub stride: ParameterRange,
    pub threshold: ParameterRange,
    pub predictive: ParameterRange,
    /// Swept `target_dt` of the hour-adaptive policy.
    pub hourly: ParameterRange,
    /// Wait cap of the predictive policy, in seconds.
    pub max_poll_interval: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            stride: ParameterRange { start: 1.0, stop: 10.0, step: 1.0 },
            threshold: ParameterRange { start: 0.1, stop: 3.0, step: 0.05 },
            predictive: ParameterRange { start: 0.4, stop: 3.0, step: 0.05 },
            hourly: ParameterRange { start: 0.01, stop: 3.0, step: 0.05 },
            max_poll_interval: 7200.0,
        }
    }
}

/// Column names and cleaning filters applied while loading a CSV file.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub time_column: String,
    pub value_column: String,
    /// Values must be strictly above this bound.
    pub min_value: f64,
    /// Values must be strictly below this bound.
    pub max_value: f64,
    /// Largest accepted absolute change from the previous raw row.
    pub max_jump: f64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            time_column: "time".to_string(),
            value_column: "value".to_string(),
            min_value: 0.0,
            max_value: 50.0,
            max_jump: 6.0,
        }
    }
}

impl Config {
    /// Loads a TOML configuration file.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config {}", path.as_ref().display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;
        config.validate()?;
        anyhow::Ok(config)
    }

    /// Checks ranges and the schedule table eagerly so a bad file fails
    /// before any data is loaded.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, range) in [
            ("stride", &self.sweep.stride),
            ("threshold", &self.sweep.threshold),
            ("predictive", &self.sweep.predictive),
            ("hourly", &self.sweep.hourly),
        ] {
            range
                .validate()
                .with_context(|| format!("Invalid [sweep.{}] range", name))?;
        }
        if !(self.sweep.max_poll_interval.is_finite() && self.sweep.max_poll_interval > 0.0) {
            return Err(anyhow::anyhow!("max_poll_interval must be a positive number of seconds"));
        }
        if self.loader.min_value >= self.loader.max_value {
            return Err(anyhow::anyhow!("loader min_value must be below max_value"));
        }
        crate::schedule::PollSchedule::new(&self.schedule).context("Invalid [schedule] section")?;
        anyhow::Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn partial_sections_override_only_given_fields() {
        let config = Config::from_toml(
            r#"
            [sweep]
            max_poll_interval = 3600.0
            stride = { start = 2.0, stop = 5.0, step = 1.0 }

            [loader]
            value_column = "temperature"
            "#,
        )
        .unwrap();

        assert_eq!(config.sweep.max_poll_interval, 3600.0);
        assert_eq!(config.sweep.stride.start, 2.0);
        assert_eq!(config.sweep.threshold, SweepConfig::default().threshold);
        assert_eq!(config.loader.value_column, "temperature");
        assert_eq!(config.loader.time_column, "time");
    }

    #[test]
    fn rejects_bad_range() {
        let err = Config::from_toml(
            r#"
            [sweep]
            hourly = { start = 1.0, stop = 0.5, step = 0.1 }
            "#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("sweep.hourly"));

        let err = Config::from_toml(
            r#"
            [sweep]
            threshold = { start = 0.1, stop = 3.0, step = 1e-300 }
            "#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("sweep.threshold"));
    }

    #[test]
    fn rejects_bad_schedule() {
        assert!(Config::from_toml("[schedule]\ntarget_dt = -1.0\n").is_err());
    }
}
