//! Wait computation for an online poller.
//!
//! The poller itself (HTTP calls, sleeping) lives outside this crate. It
//! asks a [`PollSchedule`] how long to wait after each reading, based on the
//! historical rate of change of the current hour.

use crate::error::{Result, SamplingError};
use crate::profile::{HOURS_PER_DAY, VolatilityProfile};

use chrono::Timelike;

/// Historical per-hour rate of change of the greenhouse sensor (°C/hour).
const GREENHOUSE_RATE_OF_CHANGE: [f64; HOURS_PER_DAY] = [
    0.609164, 0.533102, 0.490007, 0.441728, 0.422819, 0.397558, 0.381043, 0.459887, 1.095440,
    2.825424, 3.922974, 3.454793, 2.309282, 1.671112, 1.513777, 1.621256, 2.043299, 2.568422,
    2.934706, 2.461657, 2.166300, 1.601714, 1.058227, 0.778290,
];

/// `[schedule]` section of the configuration file.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Change of value tolerated between two polls.
    pub target_dt: f64,
    /// Typical rate of change for each hour of day, in value per hour.
    pub rate_of_change: [f64; HOURS_PER_DAY],
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            target_dt: 0.5,
            rate_of_change: GREENHOUSE_RATE_OF_CHANGE,
        }
    }
}

/// Validated schedule: per-hour waits derived from a rate table.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSchedule {
    target_dt: f64,
    rate_of_change: [f64; HOURS_PER_DAY],
}

impl PollSchedule {
    /// # Errors
    /// * `InvalidParameter` if `target_dt` or any rate is not positive and finite.
    pub fn new(config: &ScheduleConfig) -> Result<Self> {
        if !config.target_dt.is_finite() || config.target_dt <= 0.0 {
            return Err(SamplingError::invalid(
                "target_dt",
                format!("must be positive, got {}", config.target_dt),
            ));
        }
        if let Some(hour) = config
            .rate_of_change
            .iter()
            .position(|r| !r.is_finite() || *r <= 0.0)
        {
            return Err(SamplingError::invalid(
                "rate_of_change",
                format!("hour {hour} has rate {}", config.rate_of_change[hour]),
            ));
        }
        Ok(Self {
            target_dt: config.target_dt,
            rate_of_change: config.rate_of_change,
        })
    }

    /// Builds the rate table from a computed profile. Unobserved or flat
    /// hours take the profile's global rate.
    pub fn from_profile(profile: &VolatilityProfile, target_dt: f64) -> Result<Self> {
        Self::new(&ScheduleConfig {
            target_dt,
            rate_of_change: std::array::from_fn(|hour| profile.rate_or_global(hour)),
        })
    }

    /// `3600 * target_dt / rate[hour]`.
    pub fn wait_for_hour(&self, hour: usize) -> std::time::Duration {
        let rate = self.rate_of_change[hour % HOURS_PER_DAY];
        std::time::Duration::from_secs_f64(3600.0 * self.target_dt / rate)
    }

    /// When to poll next after a reading taken at `now`.
    pub fn next_wake(&self, now: chrono::DateTime<chrono::Utc>) -> chrono::DateTime<chrono::Utc> {
        let wait = self.wait_for_hour(now.hour() as usize);
        now + chrono::Duration::milliseconds(wait.as_millis() as i64)
    }

    pub fn to_config(&self) -> ScheduleConfig {
        ScheduleConfig {
            target_dt: self.target_dt,
            rate_of_change: self.rate_of_change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_table_waits_longer_at_night() {
        let schedule = PollSchedule::new(&ScheduleConfig::default()).unwrap();
        let night = schedule.wait_for_hour(6);
        let morning = schedule.wait_for_hour(10);
        assert!(night > morning);
        // 3600 * 0.5 / 3.922974
        assert_eq!(morning.as_secs(), 458);
    }

    #[test]
    fn next_wake_uses_current_hour() {
        let mut config = ScheduleConfig::default();
        config.target_dt = 1.0;
        config.rate_of_change = [1.0; HOURS_PER_DAY];
        config.rate_of_change[14] = 4.0;
        let schedule = PollSchedule::new(&config).unwrap();

        let now = chrono::Utc.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap();
        assert_eq!(
            schedule.next_wake(now),
            chrono::Utc.with_ymd_and_hms(2024, 5, 1, 14, 45, 0).unwrap()
        );
    }

    #[test]
    fn rejects_zero_rates() {
        let mut config = ScheduleConfig::default();
        config.rate_of_change[3] = 0.0;
        assert!(PollSchedule::new(&config).is_err());
        config = ScheduleConfig::default();
        config.target_dt = 0.0;
        assert!(PollSchedule::new(&config).is_err());
    }

    #[test]
    fn from_profile_fills_unobserved_hours() {
        let mut rates = [2.0; HOURS_PER_DAY];
        rates[0] = 0.0;
        let profile = VolatilityProfile::from_rates(rates).unwrap();
        let schedule = PollSchedule::from_profile(&profile, 1.0).unwrap();
        assert_eq!(schedule.to_config().rate_of_change[0], profile.global_rate());
        assert_eq!(schedule.wait_for_hour(5).as_secs(), 1800);
    }
}
