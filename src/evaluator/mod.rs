//! Per-run evaluation pipeline
//!
//! ```text
//! Properties ──> RunMeasurement ──> OutcomeClassifier ──> ScoreEngine ──> EvaluatedRun
//!                                                            ▲
//!                                               BestKnownBounds (read-only)
//! ```
//!
//! Each run is evaluated independently. A run that cannot be read,
//! classified unambiguously or scored still yields an [`EvaluatedRun`];
//! nothing in one run can stop the rest of the batch.
//!
//! ## Usage
//!
//! ```rust
//! use planrun::bounds::BestKnownBounds;
//! use planrun::evaluator::{Evaluator, EvaluatorConfig};
//! use planrun::properties::Properties;
//! use planrun::score::Track;
//!
//! let config = EvaluatorConfig::builder().track(Track::Sat).build();
//! let evaluator = Evaluator::new(config, BestKnownBounds::new());
//!
//! let run = Properties::from_json_str(r#"{"coverage": 1, "cost": 12}"#)?;
//! let out = evaluator.evaluate(&run).output_properties();
//! assert_eq!(out.get_str("error")?, Some("success"));
//! assert_eq!(out.get_f64("quality_score")?, Some(1.0));
//! # Ok::<(), planrun::Error>(())
//! ```

mod config;

pub use config::{EvaluatorConfig, EvaluatorConfigBuilder};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bounds::{BestKnownBounds, MinCostCollector};
use crate::measurement::RunMeasurement;
use crate::outcome::{Ambiguity, Classification, Outcome, OutcomeClassifier};
use crate::properties::Properties;
use crate::score::{Score, ScoreEngine, Track};

/// Scoring result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreStatus {
    /// Scores were computed for the active tracks
    Scored(Score),
    /// The run could not be scored; distinct from a computed zero
    Unscored {
        /// Why scoring was not possible
        reason: String,
    },
    /// No track was active for the run
    NoTrack,
}

impl ScoreStatus {
    /// Get the computed scores, if any.
    #[must_use]
    pub const fn score(&self) -> Option<&Score> {
        match self {
            Self::Scored(score) => Some(score),
            _ => None,
        }
    }
}

/// One evaluated run: the input properties, its classification and scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedRun {
    properties: Properties,
    measurement: Option<RunMeasurement>,
    classification: Classification,
    score: ScoreStatus,
    evaluated_at: DateTime<Utc>,
}

impl EvaluatedRun {
    /// Get the input properties.
    #[must_use]
    pub const fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Get the parsed measurement, `None` if the properties were unreadable.
    #[must_use]
    pub const fn measurement(&self) -> Option<&RunMeasurement> {
        self.measurement.as_ref()
    }

    /// Get the classification.
    #[must_use]
    pub const fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Get the assigned outcome.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.classification.outcome()
    }

    /// Get the scoring result.
    #[must_use]
    pub const fn score(&self) -> &ScoreStatus {
        &self.score
    }

    /// Get the evaluation timestamp.
    #[must_use]
    pub const fn evaluated_at(&self) -> DateTime<Utc> {
        self.evaluated_at
    }

    /// The input properties augmented with the outcome and scores.
    ///
    /// Added keys: `error`, `outcome_diagnostic`, `is_optimal`,
    /// `has_suboptimal_plan`, `quality_score`, `agile_score`, `score`
    /// (only when exactly one track was scored) and `scoring_error`.
    #[must_use]
    pub fn output_properties(&self) -> Properties {
        let mut out = self.properties.clone();
        out.insert("error", self.outcome().as_str());
        if let Some(ambiguity) = self.classification.ambiguity() {
            out.insert("outcome_diagnostic", ambiguity.to_string());
        }
        if let Some(m) = &self.measurement {
            if !out.contains("has_invalid_plans") && !m.costs().is_empty() {
                out.insert_flag("has_invalid_plans", m.has_invalid_plans());
            }
        }

        match &self.score {
            ScoreStatus::Scored(score) => {
                if let Some(optimal) = score.optimal {
                    if let Some(is_optimal) = optimal.is_optimal {
                        out.insert("is_optimal", is_optimal);
                    }
                    if let Some(suboptimal) = optimal.has_suboptimal_plan {
                        out.insert_flag("has_suboptimal_plan", suboptimal);
                    }
                }
                if let Some(quality) = score.quality_score {
                    out.insert("quality_score", quality);
                }
                if let Some(agile) = score.agile_score {
                    out.insert("agile_score", agile);
                }
                if let [track] = score.tracks().as_slice() {
                    if let Some(value) = score.for_track(*track) {
                        out.insert("score", value);
                    }
                }
            }
            ScoreStatus::Unscored { reason } => out.insert("scoring_error", reason.as_str()),
            ScoreStatus::NoTrack => {}
        }
        out
    }
}

/// Outcome and scoring counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Runs evaluated
    pub total: usize,
    /// Runs classified `success`
    pub success: usize,
    /// Runs classified `out_of_time`
    pub out_of_time: usize,
    /// Runs classified `out_of_memory`
    pub out_of_memory: usize,
    /// Runs classified `unexpected_error`
    pub unexpected_error: usize,
    /// Runs that could not be scored
    pub unscored: usize,
}

impl BatchSummary {
    /// Count outcomes and scoring failures.
    #[must_use]
    pub fn from_runs(runs: &[EvaluatedRun]) -> Self {
        let mut summary = Self {
            total: runs.len(),
            ..Self::default()
        };
        for run in runs {
            match run.outcome() {
                Outcome::Success => summary.success += 1,
                Outcome::OutOfTime => summary.out_of_time += 1,
                Outcome::OutOfMemory => summary.out_of_memory += 1,
                Outcome::UnexpectedError => summary.unexpected_error += 1,
            }
            if matches!(run.score(), ScoreStatus::Unscored { .. }) {
                summary.unscored += 1;
            }
        }
        summary
    }
}

/// Classifies and scores runs against a fixed bounds table.
///
/// Holds no mutable state, so one evaluator can be shared by any number
/// of threads.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluatorConfig,
    bounds: BestKnownBounds,
}

impl Evaluator {
    /// Create an evaluator.
    #[must_use]
    pub const fn new(config: EvaluatorConfig, bounds: BestKnownBounds) -> Self {
        Self { config, bounds }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Get the bounds table.
    #[must_use]
    pub const fn bounds(&self) -> &BestKnownBounds {
        &self.bounds
    }

    /// Evaluate one run.
    #[must_use]
    pub fn evaluate(&self, props: &Properties) -> EvaluatedRun {
        let evaluated_at = Utc::now();
        let measurement = match RunMeasurement::from_properties(props) {
            Ok(m) => m,
            Err(e) => {
                warn!(properties = ?props, error = %e, "cannot read run measurement");
                return EvaluatedRun {
                    properties: props.clone(),
                    measurement: None,
                    classification: Classification::malformed(&e),
                    score: ScoreStatus::Unscored {
                        reason: e.to_string(),
                    },
                    evaluated_at,
                };
            }
        };

        let classification = OutcomeClassifier::classify(&measurement);
        let score = self.score(&measurement, &classification);
        if let ScoreStatus::Unscored { reason } = &score {
            warn!(measurement = ?measurement, %reason, "run left unscored");
        }

        EvaluatedRun {
            properties: props.clone(),
            measurement: Some(measurement),
            classification,
            score,
            evaluated_at,
        }
    }

    /// Evaluate a batch. Results keep the input order.
    #[must_use]
    pub fn evaluate_batch(&self, runs: &[Properties]) -> Vec<EvaluatedRun> {
        let results = self.map_runs(runs);
        let summary = BatchSummary::from_runs(&results);
        info!(
            total = summary.total,
            success = summary.success,
            out_of_time = summary.out_of_time,
            out_of_memory = summary.out_of_memory,
            unexpected_error = summary.unexpected_error,
            unscored = summary.unscored,
            "evaluated batch"
        );
        results
    }

    /// Collect per-task minimum costs from evaluated runs, e.g. to refresh
    /// the bounds table after a batch.
    #[must_use]
    pub fn collect_min_costs(&self, runs: &[EvaluatedRun]) -> MinCostCollector {
        let collector = MinCostCollector::new();
        if self.parallel() {
            par::record_all(runs, &collector);
        } else {
            runs.iter()
                .filter_map(EvaluatedRun::measurement)
                .for_each(|m| collector.record(m));
        }
        collector
    }

    fn map_runs(&self, runs: &[Properties]) -> Vec<EvaluatedRun> {
        if self.parallel() {
            par::evaluate_all(self, runs)
        } else {
            runs.iter().map(|p| self.evaluate(p)).collect()
        }
    }

    const fn parallel(&self) -> bool {
        cfg!(feature = "rayon") && self.config.parallel
    }

    fn active_tracks(&self, run: &RunMeasurement) -> crate::Result<Vec<Track>> {
        if !self.config.tracks.is_empty() {
            return Ok(self.config.tracks.clone());
        }
        match run.track() {
            Some(track) => Ok(vec![track.parse()?]),
            None => Ok(Vec::new()),
        }
    }

    fn score(&self, run: &RunMeasurement, classification: &Classification) -> ScoreStatus {
        if let Some(ambiguity @ Ambiguity::PlanAfterTimeLimit { .. }) = classification.ambiguity() {
            return ScoreStatus::Unscored {
                reason: ambiguity.to_string(),
            };
        }
        let tracks = match self.active_tracks(run) {
            Ok(tracks) if tracks.is_empty() => return ScoreStatus::NoTrack,
            Ok(tracks) => tracks,
            Err(e) => {
                return ScoreStatus::Unscored {
                    reason: e.to_string(),
                }
            }
        };
        let bounds = run.task().map(|t| self.bounds.get(t)).unwrap_or_default();
        match ScoreEngine::score(run, bounds, &tracks) {
            Ok(score) => ScoreStatus::Scored(score),
            Err(e) => ScoreStatus::Unscored {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(feature = "rayon")]
mod par {
    use rayon::prelude::*;

    use super::{EvaluatedRun, Evaluator};
    use crate::bounds::MinCostCollector;
    use crate::properties::Properties;

    pub(super) fn evaluate_all(evaluator: &Evaluator, runs: &[Properties]) -> Vec<EvaluatedRun> {
        runs.par_iter().map(|p| evaluator.evaluate(p)).collect()
    }

    pub(super) fn record_all(runs: &[EvaluatedRun], collector: &MinCostCollector) {
        runs.par_iter()
            .filter_map(EvaluatedRun::measurement)
            .for_each(|m| collector.record(m));
    }
}

#[cfg(not(feature = "rayon"))]
mod par {
    use super::{EvaluatedRun, Evaluator};
    use crate::bounds::MinCostCollector;
    use crate::properties::Properties;

    pub(super) fn evaluate_all(evaluator: &Evaluator, runs: &[Properties]) -> Vec<EvaluatedRun> {
        runs.iter().map(|p| evaluator.evaluate(p)).collect()
    }

    pub(super) fn record_all(runs: &[EvaluatedRun], collector: &MinCostCollector) {
        runs.iter()
            .filter_map(EvaluatedRun::measurement)
            .for_each(|m| collector.record(m));
    }
}
