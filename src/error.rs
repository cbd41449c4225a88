//! Error types for planrun
//!
//! Every error here is scoped to a single run. Batch evaluation captures
//! them per run and keeps going.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// planrun error types
#[derive(Error, Debug)]
pub enum Error {
    /// A value a scoring formula needs is missing or unusable
    #[error("Scoring precondition failed for `{field}`: {reason}\nThe run is left unscored; fix the upstream measurement.")]
    ScoringPrecondition {
        /// Property the formula depends on
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// The first plan was reported after the declared time limit
    #[error("First plan at {time}s is past the time limit of {limit}s; agile score is undefined")]
    PlanAfterTimeLimit {
        /// Time to first plan in seconds
        time: f64,
        /// Declared time limit in seconds
        limit: f64,
    },

    /// A required property is absent from the mapping
    #[error("Missing property: {0}")]
    MissingProperty(String),

    /// A property exists but has the wrong shape
    #[error("Invalid property `{key}`: {reason}")]
    InvalidProperty {
        /// Property key
        key: String,
        /// What was expected
        reason: String,
    },

    /// Unrecognized competition track identifier
    #[error("Unknown track: {0} (expected one of opt, sat, agl)")]
    UnknownTrack(String),

    /// Malformed best-known bounds reference data
    #[error("Bounds format error: {0}")]
    BoundsFormat(String),

    /// Invalid evaluator configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Log pattern failed to compile
    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Shorthand for a [`Error::ScoringPrecondition`].
    pub(crate) fn precondition(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ScoringPrecondition {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`Error::InvalidProperty`].
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProperty {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
