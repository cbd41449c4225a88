//! Track scoring tests
//!
//! Formula-level checks for the optimal, satisficing and agile tracks.

use planrun::bounds::TaskBounds;
use planrun::measurement::RunMeasurement;
use planrun::score::{OptimalScore, ScoreEngine, Track};
use planrun::Error;

fn solved(cost: f64) -> RunMeasurement {
    RunMeasurement::builder(true)
        .costs(vec![Some(cost)])
        .cost(cost)
        .build()
}

fn first_plan_at(t: f64, limit: f64) -> RunMeasurement {
    RunMeasurement::builder(true)
        .costs(vec![Some(1.0)])
        .plan_times(vec![t])
        .time_limit(limit)
        .build()
}

// =============================================================================
// Optimal track
// =============================================================================

#[test]
fn test_opt_cost_at_lower_bound() {
    let s = ScoreEngine::optimal(&solved(20.0), TaskBounds::new(20.0, 24.0)).unwrap();
    assert_eq!(s.is_optimal, Some(true));
    assert!((s.score - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_opt_cost_at_upper_bound() {
    let s = ScoreEngine::optimal(&solved(24.0), TaskBounds::new(20.0, 24.0)).unwrap();
    assert_eq!(s.is_optimal, Some(true));
    assert_eq!(s.has_suboptimal_plan, Some(false));
}

#[test]
fn test_opt_cost_below_lower_bound() {
    let s = ScoreEngine::optimal(&solved(19.0), TaskBounds::new(20.0, 24.0)).unwrap();
    assert_eq!(s.is_optimal, Some(false));
    assert_eq!(s.has_suboptimal_plan, Some(true));
    assert!(s.score.abs() < f64::EPSILON);
}

#[test]
fn test_opt_unknown_bounds_accepts_any_cost() {
    let s = ScoreEngine::optimal(&solved(1234.0), TaskBounds::default()).unwrap();
    assert_eq!(s.is_optimal, Some(true));
}

#[test]
fn test_opt_unsolved() {
    let run = RunMeasurement::builder(false).build();
    assert_eq!(
        ScoreEngine::optimal(&run, TaskBounds::new(1.0, 1.0)).unwrap(),
        OptimalScore::unsolved()
    );
}

#[test]
fn test_opt_cost_sequence_mismatch_fails() {
    let run = RunMeasurement::builder(true)
        .costs(vec![Some(12.0)])
        .cost(11.0)
        .build();
    let err = ScoreEngine::optimal(&run, TaskBounds::default()).unwrap_err();
    assert!(matches!(err, Error::ScoringPrecondition { .. }));
}

// =============================================================================
// Satisficing track
// =============================================================================

#[test]
fn test_sat_cost_equals_bound() {
    let q = ScoreEngine::quality(&solved(10.0), TaskBounds::upper_only(10.0)).unwrap();
    assert!((q - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_sat_cost_twice_bound() {
    let q = ScoreEngine::quality(&solved(20.0), TaskBounds::upper_only(10.0)).unwrap();
    assert!((q - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_sat_unsolved_is_zero() {
    let q = ScoreEngine::quality(&RunMeasurement::builder(false).build(), TaskBounds::upper_only(10.0))
        .unwrap();
    assert!(q.abs() < f64::EPSILON);
}

#[test]
fn test_sat_improving_run_exceeds_one() {
    let q = ScoreEngine::quality(&solved(8.0), TaskBounds::upper_only(10.0)).unwrap();
    assert!(q > 1.0);
}

#[test]
fn test_sat_infinite_bound_is_one() {
    let bounds = TaskBounds {
        lower: None,
        upper: Some(f64::INFINITY),
    };
    let q = ScoreEngine::quality(&solved(55.0), bounds).unwrap();
    assert!((q - 1.0).abs() < f64::EPSILON);
}

// =============================================================================
// Agile track
// =============================================================================

#[test]
fn test_agl_one_second_is_full_score() {
    for limit in [2.0, 300.0, 1800.0] {
        let a = ScoreEngine::agile(&first_plan_at(1.0, limit)).unwrap();
        assert!((a - 1.0).abs() < f64::EPSILON);
    }
}

#[test]
fn test_agl_at_limit_is_zero() {
    let a = ScoreEngine::agile(&first_plan_at(300.0, 300.0)).unwrap();
    assert!(a.abs() < 1e-12);
}

#[test]
fn test_agl_geometric_midpoint_is_half() {
    let a = ScoreEngine::agile(&first_plan_at(300.0_f64.sqrt(), 300.0)).unwrap();
    assert!((a - 0.5).abs() < 1e-9);
}

#[test]
fn test_agl_uses_earliest_plan() {
    let run = RunMeasurement::builder(true)
        .costs(vec![Some(9.0), Some(7.0)])
        .plan_times(vec![30.0, 0.5])
        .time_limit(1800.0)
        .build();
    let a = ScoreEngine::agile(&run).unwrap();
    assert!((a - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_agl_ignores_rejected_early_plan() {
    let run = RunMeasurement::builder(true)
        .costs(vec![None, Some(12.0)])
        .plan_times(vec![0.5, 40.0])
        .time_limit(1800.0)
        .build();
    let a = ScoreEngine::agile(&run).unwrap();
    let expected = 1.0 - 40.0_f64.ln() / 1800.0_f64.ln();
    assert!((a - expected).abs() < 1e-12);
    assert!(a < 1.0);
}

#[test]
fn test_agl_missing_first_plan_time_fails() {
    let run = RunMeasurement::builder(true).time_limit(1800.0).build();
    let err = ScoreEngine::agile(&run).unwrap_err();
    assert!(matches!(err, Error::ScoringPrecondition { ref field, .. } if field == "plan_times"));
}

#[test]
fn test_agl_limit_of_one_second_fails() {
    let err = ScoreEngine::agile(&first_plan_at(0.5, 1.0)).unwrap_err();
    assert!(matches!(err, Error::ScoringPrecondition { .. }));
}

// =============================================================================
// Combined
// =============================================================================

#[test]
fn test_sat_and_agl_scenario() {
    let run = RunMeasurement::builder(true)
        .costs(vec![Some(10.0)])
        .cost(10.0)
        .time_for_first_plan(1.0)
        .time_limit(1800.0)
        .build();
    let score = ScoreEngine::score(&run, TaskBounds::upper_only(10.0), &[Track::Sat, Track::Agl])
        .unwrap();
    assert_eq!(score.quality_score, Some(1.0));
    assert_eq!(score.agile_score, Some(1.0));
    assert!(score.optimal.is_none());
}

#[test]
fn test_unsolved_all_tracks_zero() {
    let run = RunMeasurement::builder(false).out_of_time_flag(true).build();
    let score = ScoreEngine::score(&run, TaskBounds::default(), &Track::ALL).unwrap();
    for track in Track::ALL {
        assert_eq!(score.for_track(track), Some(0.0));
    }
    assert_eq!(score.optimal.unwrap().is_optimal, None);
}
