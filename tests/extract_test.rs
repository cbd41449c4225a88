//! Log extraction into the evaluator
//!
//! Simulates a finished run directory: supervisor logs plus validator
//! output per plan file.

use planrun::extract::{parse_validator_output, record_plans, PlanValidation, SupervisorLogParser};
use planrun::properties::Properties;
use planrun::{Evaluator, EvaluatorConfig, Outcome, Track};

const WATCH_LOG: &str = "\
runsolver Copyright (C) 2010-2013 Olivier ROUSSEL
Enforcing CPUTime limit (soft limit, will send SIGTERM then SIGKILL): 1800 seconds
Enforcing wall clock limit (soft limit, will send SIGTERM then SIGKILL): 1800 seconds
Enforcing VSIZE limit (soft limit, will send SIGTERM then SIGKILL): 8388608 KiB
Enforcing RSS+Swap limit (soft limit, will send SIGTERM then SIGKILL): 8388608 KiB
";

const DRIVER_LOG: &str = "node: tetralith42\nrun-apptainer exit code: 0\nrun-apptainer wall-clock time: 1801.2s\n";

fn values_log(cpu: f64, wall: f64, maxvm: u64, timeout: bool, memout: bool) -> String {
    format!(
        "WCTIME={wall}\nCPUTIME={cpu}\nMAXVM={maxvm}\nMAXMM={maxvm}\nTIMEOUT={timeout}\nMEMOUT={memout}\n"
    )
}

fn run_dir(values: &str, plans: &[&str]) -> Properties {
    run_dir_timed(values, plans, None)
}

fn run_dir_timed(values: &str, plans: &[&str], plan_times: Option<&[f64]>) -> Properties {
    let parser = SupervisorLogParser::new().expect("patterns compile");
    let mut props = Properties::new();
    parser.parse_driver(DRIVER_LOG, &mut props).unwrap();
    parser.parse_limits(WATCH_LOG, &mut props).unwrap();
    parser.parse_values(values, &mut props).unwrap();
    let validations: Vec<PlanValidation> = plans.iter().map(|p| parse_validator_output(p)).collect();
    record_plans(&validations, plan_times, &mut props);
    props.insert("track", "sat");
    props
}

const PLAN_11: &str = "Plan valid\nValue: 11\n";
const PLAN_9: &str = "Plan valid\nValue: 9\n";
const PLAN_BAD: &str = "Plan failed to execute\nPlan invalid\n";

#[test]
fn test_solved_run() {
    let props = run_dir(&values_log(12.3, 12.9, 40_000, false, false), &[PLAN_11, PLAN_9]);
    let run = Evaluator::default().evaluate(&props);

    assert_eq!(run.outcome(), Outcome::Success);
    let out = run.output_properties();
    assert_eq!(out.get_f64("cost").unwrap(), Some(9.0));
    assert_eq!(out.get_str("node").unwrap(), Some("tetralith42"));
    // no bounds known: quality is 1
    assert_eq!(out.get_f64("score").unwrap(), Some(1.0));
}

#[test]
fn test_timeout_reported_by_runsolver() {
    let props = run_dir(&values_log(1800.2, 1801.0, 40_000, true, false), &[]);
    assert_eq!(Evaluator::default().evaluate(&props).outcome(), Outcome::OutOfTime);
}

#[test]
fn test_plan_just_within_limit_despite_timeout() {
    let props = run_dir(&values_log(1800.05, 1800.4, 40_000, true, false), &[PLAN_11]);
    assert_eq!(Evaluator::default().evaluate(&props).outcome(), Outcome::Success);
}

#[test]
fn test_memout_inferred_from_counters() {
    let props = run_dir(&values_log(33.0, 34.0, 9_000_000, false, false), &[]);
    let run = Evaluator::default().evaluate(&props);
    assert_eq!(run.outcome(), Outcome::OutOfMemory);
}

#[test]
fn test_invalid_plan_means_no_coverage() {
    let props = run_dir(&values_log(5.0, 5.5, 40_000, false, false), &[PLAN_11, PLAN_BAD]);
    let evaluator = Evaluator::new(
        EvaluatorConfig::builder().track(Track::Sat).build(),
        planrun::bounds::BestKnownBounds::new(),
    );
    let run = evaluator.evaluate(&props);

    assert_eq!(run.outcome(), Outcome::UnexpectedError);
    let out = run.output_properties();
    assert_eq!(out.get_flag("has_invalid_plans").unwrap(), Some(true));
    assert_eq!(out.get_f64("quality_score").unwrap(), Some(0.0));
}

#[test]
fn test_agile_from_recorded_plan_times() {
    let props = run_dir_timed(
        &values_log(60.0, 61.0, 40_000, false, false),
        &[PLAN_11, PLAN_9],
        Some(&[3.0, 50.0][..]),
    );
    let evaluator = Evaluator::new(
        EvaluatorConfig::builder().track(Track::Agl).build(),
        planrun::bounds::BestKnownBounds::new(),
    );
    let out = evaluator.evaluate(&props).output_properties();

    // no time_limit property: the enforced wall-clock limit is used
    let expected = 1.0 - 3.0_f64.ln() / 1800.0_f64.ln();
    let agile = out.get_f64("agile_score").unwrap().unwrap();
    assert!((agile - expected).abs() < 1e-12);
}
