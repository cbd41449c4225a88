//! Outcome classifier - pure function over a run's evidence

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use super::Outcome;
use crate::measurement::RunMeasurement;
use crate::properties::Properties;
use crate::Error;

/// The three outcome signals after each classification step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    /// A validated plan exists
    pub success: bool,
    /// Time limit hit (flagged or inferred)
    pub out_of_time: bool,
    /// Memory limit hit (flagged or inferred)
    pub out_of_memory: bool,
}

impl Signals {
    const fn count(self) -> u8 {
        self.success as u8 + self.out_of_time as u8 + self.out_of_memory as u8
    }

    const fn any(self) -> bool {
        self.count() > 0
    }
}

/// How the final outcome was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Coverage and supervisor flags agreed as reported
    Reported,
    /// Overage inferred from counters because nothing else was set
    InferredFromCounters,
    /// A solution coexisted with an overage flag; the solution won.
    ///
    /// This assumes the plan was written before the limit fired, which
    /// the logs cannot confirm when both happen at the same instant.
    RaceCorrected,
    /// No single outcome could be established
    Unresolved,
}

/// Why a run ended up as [`Outcome::UnexpectedError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ambiguity {
    /// No solution, no flag, and no counter above a declared limit
    NoSignal,
    /// Both time and memory overage without a solution
    ConflictingOverage,
    /// The first plan appeared after the declared time limit
    PlanAfterTimeLimit {
        /// Seconds to first plan
        time: f64,
        /// Declared limit in seconds
        limit: f64,
    },
    /// The property mapping could not be read
    MalformedMeasurement {
        /// Underlying error text
        reason: String,
    },
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSignal => f.write_str("no outcome reported by the supervisor nor inferred from counters"),
            Self::ConflictingOverage => f.write_str("both out_of_time and out_of_memory set without a solution"),
            Self::PlanAfterTimeLimit { time, limit } => {
                write!(f, "first plan at {time}s is after the {limit}s time limit")
            }
            Self::MalformedMeasurement { reason } => write!(f, "malformed measurement: {reason}"),
        }
    }
}

/// Result of classifying one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    outcome: Outcome,
    signals: Signals,
    provenance: Provenance,
    ambiguity: Option<Ambiguity>,
}

impl Classification {
    /// Get the assigned outcome.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Get the signals after inference and race correction.
    #[must_use]
    pub const fn signals(&self) -> Signals {
        self.signals
    }

    /// Get how the outcome was reached.
    #[must_use]
    pub const fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Get the unresolved ambiguity, if the outcome is `UnexpectedError`.
    #[must_use]
    pub const fn ambiguity(&self) -> Option<&Ambiguity> {
        self.ambiguity.as_ref()
    }

    /// Classification of a run whose measurement could not be read.
    #[must_use]
    pub fn malformed(error: &Error) -> Self {
        Self::unresolved(
            Signals::default(),
            Ambiguity::MalformedMeasurement {
                reason: error.to_string(),
            },
        )
    }

    fn unresolved(signals: Signals, ambiguity: Ambiguity) -> Self {
        Self {
            outcome: Outcome::UnexpectedError,
            signals,
            provenance: Provenance::Unresolved,
            ambiguity: Some(ambiguity),
        }
    }
}

/// Stateless outcome classifier.
///
/// Steps, in order:
/// 1. read `success = coverage` and the supervisor flags (absent = false)
/// 2. with no signal at all, infer time overage from counters, then memory
/// 3. a solution clears any overage flag
/// 4. exactly one signal left decides the outcome, anything else is
///    `UnexpectedError`
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeClassifier;

impl OutcomeClassifier {
    /// Classify a measurement.
    #[must_use]
    pub fn classify(run: &RunMeasurement) -> Classification {
        let flags = run.flags();
        let mut signals = Signals {
            success: run.coverage(),
            out_of_time: flags.out_of_time.unwrap_or(false),
            out_of_memory: flags.out_of_memory.unwrap_or(false),
        };
        let mut provenance = Provenance::Reported;

        if !signals.any() {
            debug!(task = ?run.task(), "no outcome reported by supervisor, checking counters");
            let limits = run.limits();
            if limits.time_exceeded(run.usage()) {
                debug!(task = ?run.task(), "counters above time limit, probably out of time");
                signals.out_of_time = true;
                provenance = Provenance::InferredFromCounters;
            } else if limits.memory_exceeded(run.usage()) {
                debug!(task = ?run.task(), "counters above memory limit, probably out of memory");
                signals.out_of_memory = true;
                provenance = Provenance::InferredFromCounters;
            }
        }

        if signals.success && (signals.out_of_time || signals.out_of_memory) {
            debug!(
                task = ?run.task(),
                out_of_time = signals.out_of_time,
                out_of_memory = signals.out_of_memory,
                "plan found but supervisor recorded an overage, keeping success"
            );
            signals.out_of_time = false;
            signals.out_of_memory = false;
            provenance = Provenance::RaceCorrected;
        }

        let classification = if signals.count() == 1 {
            let outcome = if signals.success {
                Outcome::Success
            } else if signals.out_of_time {
                Outcome::OutOfTime
            } else {
                Outcome::OutOfMemory
            };
            Classification {
                outcome,
                signals,
                provenance,
                ambiguity: None,
            }
        } else if signals.count() == 0 {
            Classification::unresolved(signals, Ambiguity::NoSignal)
        } else {
            Classification::unresolved(signals, Ambiguity::ConflictingOverage)
        };

        let classification = Self::check_plan_time(run, classification);
        if let Some(ambiguity) = classification.ambiguity() {
            warn!(measurement = ?run, %ambiguity, "outcome unresolved, run kept for inspection");
        }
        classification
    }

    /// Classify a raw property mapping. A mapping that cannot be read is
    /// classified as `UnexpectedError` rather than failing.
    #[must_use]
    pub fn classify_properties(props: &Properties) -> Classification {
        match RunMeasurement::from_properties(props) {
            Ok(run) => Self::classify(&run),
            Err(e) => {
                warn!(properties = ?props, error = %e, "cannot read run measurement");
                Classification::malformed(&e)
            }
        }
    }

    fn check_plan_time(run: &RunMeasurement, classification: Classification) -> Classification {
        if classification.outcome != Outcome::Success {
            return classification;
        }
        match (run.first_plan_time(), run.declared_time_limit()) {
            (Some(time), Some(limit)) if time > limit => Classification::unresolved(
                classification.signals,
                Ambiguity::PlanAfterTimeLimit { time, limit },
            ),
            _ => classification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{ResourceLimits, ResourceUsage};

    #[test]
    fn test_success_without_flags() {
        let run = RunMeasurement::builder(true).build();
        let c = OutcomeClassifier::classify(&run);
        assert_eq!(c.outcome(), Outcome::Success);
        assert_eq!(c.provenance(), Provenance::Reported);
        assert!(c.ambiguity().is_none());
    }

    #[test]
    fn test_flagged_out_of_memory() {
        let run = RunMeasurement::builder(false).out_of_memory_flag(true).build();
        let c = OutcomeClassifier::classify(&run);
        assert_eq!(c.outcome(), Outcome::OutOfMemory);
    }

    #[test]
    fn test_time_inference_wins_over_memory() {
        let run = RunMeasurement::builder(false)
            .usage(ResourceUsage {
                cpu_time: Some(1900.0),
                memory: Some(9e6),
                ..ResourceUsage::default()
            })
            .limits(ResourceLimits {
                cpu_time: Some(1800.0),
                memory: Some(8e6),
                ..ResourceLimits::default()
            })
            .build();
        let c = OutcomeClassifier::classify(&run);
        assert_eq!(c.outcome(), Outcome::OutOfTime);
        assert_eq!(c.provenance(), Provenance::InferredFromCounters);
    }

    #[test]
    fn test_race_correction() {
        let run = RunMeasurement::builder(true)
            .out_of_time_flag(true)
            .out_of_memory_flag(true)
            .build();
        let c = OutcomeClassifier::classify(&run);
        assert_eq!(c.outcome(), Outcome::Success);
        assert_eq!(c.provenance(), Provenance::RaceCorrected);
        assert_eq!(
            c.signals(),
            Signals {
                success: true,
                out_of_time: false,
                out_of_memory: false
            }
        );
    }

    #[test]
    fn test_both_overage_flags_unresolved() {
        let run = RunMeasurement::builder(false)
            .out_of_time_flag(true)
            .out_of_memory_flag(true)
            .build();
        let c = OutcomeClassifier::classify(&run);
        assert_eq!(c.outcome(), Outcome::UnexpectedError);
        assert_eq!(c.ambiguity(), Some(&Ambiguity::ConflictingOverage));
    }

    #[test]
    fn test_no_signal_unresolved() {
        let c = OutcomeClassifier::classify(&RunMeasurement::builder(false).build());
        assert_eq!(c.outcome(), Outcome::UnexpectedError);
        assert_eq!(c.ambiguity(), Some(&Ambiguity::NoSignal));
    }

    #[test]
    fn test_plan_after_limit_unresolved() {
        let run = RunMeasurement::builder(true)
            .time_limit(300.0)
            .time_for_first_plan(301.0)
            .build();
        let c = OutcomeClassifier::classify(&run);
        assert_eq!(c.outcome(), Outcome::UnexpectedError);
        assert!(matches!(
            c.ambiguity(),
            Some(Ambiguity::PlanAfterTimeLimit { .. })
        ));
    }

    #[test]
    fn test_malformed_properties() {
        let c = OutcomeClassifier::classify_properties(&Properties::new());
        assert_eq!(c.outcome(), Outcome::UnexpectedError);
        assert!(matches!(
            c.ambiguity(),
            Some(Ambiguity::MalformedMeasurement { .. })
        ));
    }
}
