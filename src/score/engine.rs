//! Score engine - pure per-track formulas

use tracing::debug;

use super::{OptimalScore, Score, Track};
use crate::bounds::TaskBounds;
use crate::measurement::RunMeasurement;
use crate::{Error, Result};

/// Plans found within this many seconds get the full agile score.
pub const AGILE_FULL_SCORE_SECONDS: f64 = 1.0;

/// Stateless score engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreEngine;

impl ScoreEngine {
    /// Compute the scores of every active track.
    ///
    /// # Errors
    /// Returns the first precondition failure; a run is either fully
    /// scored for its tracks or not scored at all
    pub fn score(run: &RunMeasurement, bounds: TaskBounds, tracks: &[Track]) -> Result<Score> {
        let mut score = Score::default();
        for track in tracks {
            match track {
                Track::Opt => score.optimal = Some(Self::optimal(run, bounds)?),
                Track::Sat => score.quality_score = Some(Self::quality(run, bounds)?),
                Track::Agl => score.agile_score = Some(Self::agile(run)?),
            }
        }
        debug!(task = ?run.task(), ?score, "scored run");
        Ok(score)
    }

    /// Optimal track: the run must report exactly one cost, and it counts
    /// when it lies within the task's `[lower, upper]` bounds.
    ///
    /// # Errors
    /// Returns [`Error::ScoringPrecondition`] if a covered run has no cost
    /// or does not report exactly one cost matching its best cost
    pub fn optimal(run: &RunMeasurement, bounds: TaskBounds) -> Result<OptimalScore> {
        if !run.coverage() {
            return Ok(OptimalScore::unsolved());
        }
        let cost = covered_cost(run)?;
        match run.costs() {
            [Some(only)] if (*only - cost).abs() < f64::EPSILON => {}
            costs => {
                return Err(Error::precondition(
                    "costs",
                    format!("optimal planners must report exactly one cost equal to {cost}, got {costs:?}"),
                ))
            }
        }

        let within = bounds.lower_or_zero() <= cost && cost <= bounds.upper_or_inf();
        Ok(OptimalScore {
            score: if within { 1.0 } else { 0.0 },
            is_optimal: Some(within),
            has_suboptimal_plan: Some(!within),
        })
    }

    /// Satisficing track: `best_known_upper / cost`, `1` when no finite
    /// upper bound is known.
    ///
    /// A cost below the recorded bound yields a ratio above `1`; updating
    /// the bounds is left to [`crate::bounds::MinCostCollector`].
    ///
    /// # Errors
    /// Returns [`Error::ScoringPrecondition`] if a covered run has no
    /// positive cost
    pub fn quality(run: &RunMeasurement, bounds: TaskBounds) -> Result<f64> {
        if !run.coverage() {
            return Ok(0.0);
        }
        let cost = covered_cost(run)?;
        match bounds.finite_upper() {
            None => Ok(1.0),
            Some(_) if cost <= 0.0 => Err(Error::precondition(
                "cost",
                format!("cannot divide by non-positive cost {cost}"),
            )),
            Some(upper) => Ok(upper / cost),
        }
    }

    /// Agile track: `1 - ln(t) / ln(limit)` for the time `t` to the first
    /// plan, `1` when `t <= 1s`.
    ///
    /// # Errors
    /// Returns [`Error::ScoringPrecondition`] if the first-plan time or the
    /// time limit is missing or unusable, and [`Error::PlanAfterTimeLimit`]
    /// if `t` exceeds the limit
    pub fn agile(run: &RunMeasurement) -> Result<f64> {
        if !run.coverage() {
            return Ok(0.0);
        }
        let time = run.first_plan_time().ok_or_else(|| {
            Error::precondition("plan_times", "covered run has no first-plan time")
        })?;
        let limit = run
            .declared_time_limit()
            .ok_or_else(|| Error::precondition("time_limit", "no time limit declared for the run"))?;

        if limit <= AGILE_FULL_SCORE_SECONDS {
            return Err(Error::precondition(
                "time_limit",
                format!("limit {limit}s must exceed {AGILE_FULL_SCORE_SECONDS}s"),
            ));
        }
        if time < 0.0 || time.is_nan() {
            return Err(Error::precondition("plan_times", format!("invalid time {time}")));
        }
        if time > limit {
            return Err(Error::PlanAfterTimeLimit { time, limit });
        }
        if time <= AGILE_FULL_SCORE_SECONDS {
            return Ok(1.0);
        }
        Ok(1.0 - time.ln() / limit.ln())
    }
}

fn covered_cost(run: &RunMeasurement) -> Result<f64> {
    run.best_cost()
        .ok_or_else(|| Error::precondition("cost", "covered run has no valid plan cost"))
}
