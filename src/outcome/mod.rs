//! Run outcome classification
//!
//! The supervisor's flags, the observed counters and the presence of a
//! solution can disagree. [`OutcomeClassifier`] reconciles them into one
//! [`Outcome`] per run and records what it could not resolve.

mod classifier;

pub use classifier::{Ambiguity, Classification, OutcomeClassifier, Provenance, Signals};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final outcome of a run. Exactly one per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A validated plan was found
    Success,
    /// The run hit a time limit
    OutOfTime,
    /// The run hit a memory limit
    OutOfMemory,
    /// No single outcome could be established
    UnexpectedError,
}

impl Outcome {
    /// Tag written to the `error` property.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::OutOfTime => "out_of_time",
            Self::OutOfMemory => "out_of_memory",
            Self::UnexpectedError => "unexpected_error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_tags() {
        assert_eq!(Outcome::Success.as_str(), "success");
        assert_eq!(Outcome::OutOfTime.to_string(), "out_of_time");
        assert_eq!(
            serde_json::to_string(&Outcome::UnexpectedError).unwrap(),
            "\"unexpected_error\""
        );
        let parsed: Outcome = serde_json::from_str("\"out_of_memory\"").unwrap();
        assert_eq!(parsed, Outcome::OutOfMemory);
    }
}
