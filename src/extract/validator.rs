//! Plan validator output extraction

use serde_json::Value;

use crate::properties::{Properties, INVALID_PLAN};

/// Verdict of the plan validator for one plan file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanValidation {
    /// Plan is valid with the given cost
    Valid {
        /// Plan cost reported by the validator
        cost: f64,
    },
    /// Plan was rejected, or no cost was reported
    Invalid,
}

impl PlanValidation {
    /// Cost of a valid plan.
    #[must_use]
    pub const fn cost(&self) -> Option<f64> {
        match self {
            Self::Valid { cost } => Some(*cost),
            Self::Invalid => None,
        }
    }
}

/// Parse the validator's output for one plan.
///
/// A plan is valid when a line reads `Plan valid`; its cost comes from a
/// `Value: <n>` line. A valid plan without a cost line counts as invalid.
#[must_use]
pub fn parse_validator_output(output: &str) -> PlanValidation {
    let mut valid = false;
    let mut cost = None;
    for line in output.lines() {
        if line.trim() == "Plan valid" {
            valid = true;
        } else if let Some(rest) = line.strip_prefix("Value: ") {
            cost = rest.trim().parse::<f64>().ok();
        }
    }
    match (valid, cost) {
        (true, Some(cost)) => PlanValidation::Valid { cost },
        _ => PlanValidation::Invalid,
    }
}

/// Record the validated plans of a run, in the order they were written.
///
/// Sets `costs` (invalid plans marked), `has_invalid_plans`, `coverage`
/// (at least one plan and none invalid) and, when covered, `cost`.
/// `plan_times`, when given, is stored alongside in the same order so the
/// agile score can skip rejected plans.
pub fn record_plans(plans: &[PlanValidation], plan_times: Option<&[f64]>, props: &mut Properties) {
    let costs: Vec<Value> = plans
        .iter()
        .map(|plan| plan.cost().map_or_else(|| Value::from(INVALID_PLAN), Value::from))
        .collect();
    let has_invalid = plans.iter().any(|p| p.cost().is_none());
    let coverage = !plans.is_empty() && !has_invalid;

    props.insert("costs", costs);
    props.insert_flag("has_invalid_plans", has_invalid);
    props.insert_flag("coverage", coverage);
    if let Some(times) = plan_times {
        props.insert("plan_times", times.to_vec());
    }
    if coverage {
        if let Some(best) = plans.iter().filter_map(PlanValidation::cost).reduce(f64::min) {
            props.insert("cost", best);
        }
    }
}
