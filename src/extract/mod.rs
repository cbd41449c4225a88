//! Log extraction
//!
//! Turns a run directory's raw text artifacts into a [`Properties`]
//! mapping the evaluator can consume. Nothing here classifies or scores.
//!
//! [`Properties`]: crate::properties::Properties

mod supervisor;
mod validator;

pub use supervisor::SupervisorLogParser;
pub use validator::{parse_validator_output, record_plans, PlanValidation};
