//! # planrun: outcome classification and scoring for planner benchmark runs
//!
//! Planner images run under a resource supervisor (runsolver) and leave raw
//! logs behind. Once those logs are extracted into a flat property mapping,
//! planrun decides what happened to each run and how it scores:
//!
//! - **Outcome classification**: reconciles supervisor flags, observed
//!   resource counters and the presence of a validated plan into exactly one
//!   of `success`, `out_of_time`, `out_of_memory`, `unexpected_error`
//! - **Scoring**: IPC-style track scores (optimal, satisficing quality,
//!   agile time decay) against per-task best-known bounds
//!
//! Everything is per run and pure. Batches are evaluated in parallel and a
//! broken run never affects its neighbours.
//!
//! ## Example Usage
//!
//! ```rust
//! use planrun::bounds::{BestKnownBounds, TaskBounds, TaskKey};
//! use planrun::evaluator::{Evaluator, EvaluatorConfig};
//! use planrun::properties::Properties;
//! use planrun::score::Track;
//!
//! let mut bounds = BestKnownBounds::new();
//! bounds.insert(TaskKey::new("gripper", "p01.pddl"), TaskBounds::upper_only(11.0));
//!
//! let config = EvaluatorConfig::builder().track(Track::Sat).track(Track::Agl).build();
//! let evaluator = Evaluator::new(config, bounds);
//!
//! let run = Properties::from_json_str(r#"{
//!     "domain": "gripper", "problem": "p01.pddl",
//!     "coverage": 1, "costs": [11], "plan_times": [0.4], "time_limit": 1800
//! }"#)?;
//!
//! let evaluated = evaluator.evaluate(&run);
//! let out = evaluated.output_properties();
//! assert_eq!(out.get_str("error")?, Some("success"));
//! assert_eq!(out.get_f64("quality_score")?, Some(1.0));
//! assert_eq!(out.get_f64("agile_score")?, Some(1.0));
//! # Ok::<(), planrun::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod bounds;
pub mod error;
pub mod evaluator;
pub mod extract;
pub mod measurement;
pub mod outcome;
pub mod properties;
pub mod score;
pub mod telemetry;

pub use error::{Error, Result};
pub use evaluator::{EvaluatedRun, Evaluator, EvaluatorConfig, ScoreStatus};
pub use outcome::{Classification, Outcome, OutcomeClassifier};
pub use score::{Score, ScoreEngine, Track};
