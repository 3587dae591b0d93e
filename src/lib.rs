//! Adaptive sampling policies for slowly varying sensor signals.
//!
//! Given a recorded series of `(timestamp, value)` readings, each policy
//! picks the readings that would actually be transmitted. The evaluators
//! measure how rarely a policy transmits and how far a receiver holding the
//! last reported value drifts from the truth; the sweep harness compares
//! policies over their parameter ranges.

pub mod config;
pub mod csv_processor;
pub mod error;
pub mod evaluate;
pub mod index;
pub mod policy;
pub mod profile;
pub mod schedule;
pub mod series;
pub mod sweep;

pub use error::{Result, SamplingError};
pub use evaluate::{ErrorSummary, efficiency, evaluate_error};
pub use policy::{HourlyIntervals, Policy, PolicyFamily};
pub use profile::{VolatilityProfile, absolute_differences};
pub use series::{IndexSelection, SamplePoint, TimeSeries};
pub use sweep::{ParameterRange, PolicyReport, Sweep, SweepRecord, sweep};
