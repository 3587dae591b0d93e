//! Error taxonomy for the sampling core.

use thiserror::Error;

/// Failures reported by the sampling policies, the profile and the evaluators.
///
/// Validation happens eagerly at the start of each operation; nothing is
/// retried internally.
#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("insufficient data: need at least {required} points, found {found}")]
    InsufficientData { required: usize, found: usize },

    #[error("timestamps are not strictly increasing at index {index}")]
    NotIncreasing { index: usize },
}

impl SamplingError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SamplingError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SamplingError>;
