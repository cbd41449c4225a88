//! Run Measurement - typed view of one run's extracted properties

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ResourceLimits, ResourceUsage};
use crate::bounds::TaskKey;
use crate::properties::Properties;
use crate::{Error, Result};

/// Explicit outcome flags written by the resource supervisor.
///
/// `None` means the supervisor produced no flag, which reads as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorFlags {
    /// Supervisor reported a time limit hit
    pub out_of_time: Option<bool>,
    /// Supervisor reported a memory limit hit
    pub out_of_memory: Option<bool>,
}

/// Run Measurement holds everything extracted from one executed run.
///
/// It is built from the flat [`Properties`] the extraction layer produces
/// and is never re-extracted. Plan costs are kept in the order the plans
/// were written; `None` marks a plan the validator rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeasurement {
    task: Option<TaskKey>,
    track: Option<String>,
    coverage: bool,
    flags: SupervisorFlags,
    usage: ResourceUsage,
    limits: ResourceLimits,
    time_limit: Option<f64>,
    costs: Vec<Option<f64>>,
    cost: Option<f64>,
    plan_times: Vec<f64>,
    time_for_first_plan: Option<f64>,
}

impl RunMeasurement {
    /// Create a builder; `coverage` is the only required field.
    #[must_use]
    pub fn builder(coverage: bool) -> RunMeasurementBuilder {
        RunMeasurementBuilder::new(coverage)
    }

    /// Read a measurement from a run's property mapping.
    ///
    /// # Errors
    /// Returns error if `coverage` is missing or any known key has the wrong shape
    pub fn from_properties(props: &Properties) -> Result<Self> {
        let coverage = props
            .get_flag("coverage")?
            .ok_or_else(|| Error::MissingProperty("coverage".to_string()))?;

        let task = match (props.get_str("domain")?, props.get_str("problem")?) {
            (Some(domain), Some(problem)) => Some(TaskKey::new(domain, problem)),
            _ => None,
        };

        let (costs, scalar_cost) = read_costs(props)?;
        let cost = match props.get_f64("cost")? {
            Some(cost) => Some(cost),
            None => scalar_cost,
        };

        Ok(Self {
            task,
            track: props.get_str("track")?.map(str::to_string),
            coverage,
            flags: SupervisorFlags {
                out_of_time: props.get_flag("out_of_time_flag")?,
                out_of_memory: props.get_flag("out_of_memory_flag")?,
            },
            usage: ResourceUsage::from_properties(props)?,
            limits: ResourceLimits::from_properties(props)?,
            time_limit: props.get_f64("time_limit")?,
            costs,
            cost,
            plan_times: props.get_f64_seq("plan_times")?.unwrap_or_default(),
            time_for_first_plan: props.get_f64("time_for_first_plan")?,
        })
    }

    /// Get the task this run solved, if domain and problem were recorded.
    #[must_use]
    pub const fn task(&self) -> Option<&TaskKey> {
        self.task.as_ref()
    }

    /// Get the raw track identifier declared for the run.
    #[must_use]
    pub fn track(&self) -> Option<&str> {
        self.track.as_deref()
    }

    /// Check if a validated solution was found.
    #[must_use]
    pub const fn coverage(&self) -> bool {
        self.coverage
    }

    /// Get the supervisor flags.
    #[must_use]
    pub const fn flags(&self) -> SupervisorFlags {
        self.flags
    }

    /// Get the observed resource counters.
    #[must_use]
    pub const fn usage(&self) -> &ResourceUsage {
        &self.usage
    }

    /// Get the declared resource limits.
    #[must_use]
    pub const fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Get the per-plan costs in write order (`None` = invalid plan).
    #[must_use]
    pub fn costs(&self) -> &[Option<f64>] {
        &self.costs
    }

    /// Get the plan appearance offsets in seconds.
    #[must_use]
    pub fn plan_times(&self) -> &[f64] {
        &self.plan_times
    }

    /// Best cost of the run: the explicit `cost` if recorded, otherwise
    /// the cheapest valid plan.
    #[must_use]
    pub fn best_cost(&self) -> Option<f64> {
        self.cost
            .or_else(|| self.costs.iter().flatten().copied().reduce(f64::min))
    }

    /// Check if any written plan failed validation.
    #[must_use]
    pub fn has_invalid_plans(&self) -> bool {
        self.costs.iter().any(Option::is_none)
    }

    /// Seconds until the earliest valid plan appeared.
    ///
    /// An explicit `time_for_first_plan` wins. Otherwise, when every plan
    /// time has a matching cost entry, plans the validator rejected are
    /// skipped; without that pairing all plan times count.
    #[must_use]
    pub fn first_plan_time(&self) -> Option<f64> {
        if self.time_for_first_plan.is_some() {
            return self.time_for_first_plan;
        }
        if self.costs.len() == self.plan_times.len() {
            self.plan_times
                .iter()
                .zip(&self.costs)
                .filter(|(_, cost)| cost.is_some())
                .map(|(time, _)| *time)
                .reduce(f64::min)
        } else {
            self.plan_times.iter().copied().reduce(f64::min)
        }
    }

    /// Time limit the agile formula normalizes against: the run's declared
    /// `time_limit`, else its wall-clock limit.
    #[must_use]
    pub fn declared_time_limit(&self) -> Option<f64> {
        self.time_limit.or(self.limits.wall_clock_time)
    }
}

fn read_costs(props: &Properties) -> Result<(Vec<Option<f64>>, Option<f64>)> {
    if let Some(costs) = props.get_cost_seq("costs")? {
        return Ok((costs, None));
    }
    match props.get("plan_cost") {
        Some(Value::Number(_)) => {
            let cost = props.get_f64("plan_cost")?;
            Ok((vec![cost], cost))
        }
        _ => Ok((props.get_cost_seq("plan_cost")?.unwrap_or_default(), None)),
    }
}

/// Builder for `RunMeasurement`.
#[derive(Debug)]
pub struct RunMeasurementBuilder {
    inner: RunMeasurement,
}

impl RunMeasurementBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(coverage: bool) -> Self {
        Self {
            inner: RunMeasurement {
                task: None,
                track: None,
                coverage,
                flags: SupervisorFlags::default(),
                usage: ResourceUsage::default(),
                limits: ResourceLimits::default(),
                time_limit: None,
                costs: Vec::new(),
                cost: None,
                plan_times: Vec::new(),
                time_for_first_plan: None,
            },
        }
    }

    /// Set the task key.
    #[must_use]
    pub fn task(mut self, domain: impl Into<String>, problem: impl Into<String>) -> Self {
        self.inner.task = Some(TaskKey::new(domain, problem));
        self
    }

    /// Set the declared track identifier.
    #[must_use]
    pub fn track(mut self, track: impl Into<String>) -> Self {
        self.inner.track = Some(track.into());
        self
    }

    /// Set the supervisor's out-of-time flag.
    #[must_use]
    pub const fn out_of_time_flag(mut self, flag: bool) -> Self {
        self.inner.flags.out_of_time = Some(flag);
        self
    }

    /// Set the supervisor's out-of-memory flag.
    #[must_use]
    pub const fn out_of_memory_flag(mut self, flag: bool) -> Self {
        self.inner.flags.out_of_memory = Some(flag);
        self
    }

    /// Set the observed resource counters.
    #[must_use]
    pub const fn usage(mut self, usage: ResourceUsage) -> Self {
        self.inner.usage = usage;
        self
    }

    /// Set the declared resource limits.
    #[must_use]
    pub const fn limits(mut self, limits: ResourceLimits) -> Self {
        self.inner.limits = limits;
        self
    }

    /// Set the run's declared time limit in seconds.
    #[must_use]
    pub const fn time_limit(mut self, seconds: f64) -> Self {
        self.inner.time_limit = Some(seconds);
        self
    }

    /// Set the per-plan costs.
    #[must_use]
    pub fn costs(mut self, costs: Vec<Option<f64>>) -> Self {
        self.inner.costs = costs;
        self
    }

    /// Set the run's best cost explicitly.
    #[must_use]
    pub const fn cost(mut self, cost: f64) -> Self {
        self.inner.cost = Some(cost);
        self
    }

    /// Set the plan appearance offsets.
    #[must_use]
    pub fn plan_times(mut self, plan_times: Vec<f64>) -> Self {
        self.inner.plan_times = plan_times;
        self
    }

    /// Set the time to first plan explicitly.
    #[must_use]
    pub const fn time_for_first_plan(mut self, seconds: f64) -> Self {
        self.inner.time_for_first_plan = Some(seconds);
        self
    }

    /// Build the `RunMeasurement`.
    #[must_use]
    pub fn build(self) -> RunMeasurement {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Properties {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_coverage_required() {
        let err = RunMeasurement::from_properties(&props(json!({"cpu_time": 1.0}))).unwrap_err();
        assert!(matches!(err, Error::MissingProperty(key) if key == "coverage"));
    }

    #[test]
    fn test_best_cost_falls_back_to_min_valid() {
        let m = RunMeasurement::from_properties(&props(json!({
            "coverage": 1,
            "costs": [14, 9, null, 11],
        })))
        .unwrap();
        assert_eq!(m.best_cost(), Some(9.0));
        assert!(m.has_invalid_plans());
    }

    #[test]
    fn test_scalar_plan_cost() {
        let m = RunMeasurement::from_properties(&props(json!({
            "coverage": 1,
            "plan_cost": 23,
        })))
        .unwrap();
        assert_eq!(m.costs(), &[Some(23.0)]);
        assert_eq!(m.best_cost(), Some(23.0));
    }

    #[test]
    fn test_first_plan_time_is_earliest() {
        let m = RunMeasurement::builder(true)
            .plan_times(vec![12.0, 3.5, 40.0])
            .build();
        assert_eq!(m.first_plan_time(), Some(3.5));

        let explicit = RunMeasurement::builder(true)
            .plan_times(vec![12.0])
            .time_for_first_plan(2.0)
            .build();
        assert_eq!(explicit.first_plan_time(), Some(2.0));
    }

    #[test]
    fn test_first_plan_time_skips_invalid_plans() {
        let m = RunMeasurement::builder(true)
            .costs(vec![None, Some(12.0), Some(10.0)])
            .plan_times(vec![0.5, 40.0, 90.0])
            .build();
        assert_eq!(m.first_plan_time(), Some(40.0));

        let all_invalid = RunMeasurement::builder(false)
            .costs(vec![None])
            .plan_times(vec![0.5])
            .build();
        assert_eq!(all_invalid.first_plan_time(), None);

        // unpaired plan times cannot be filtered
        let unpaired = RunMeasurement::builder(true)
            .costs(vec![None, Some(12.0)])
            .plan_times(vec![0.5])
            .build();
        assert_eq!(unpaired.first_plan_time(), Some(0.5));
    }

    #[test]
    fn test_declared_time_limit_fallback() {
        let m = RunMeasurement::from_properties(&props(json!({
            "coverage": 0,
            "wall_clock_time_limit": 1800,
        })))
        .unwrap();
        assert_eq!(m.declared_time_limit(), Some(1800.0));
    }

    #[test]
    fn test_task_key_read() {
        let m = RunMeasurement::from_properties(&props(json!({
            "coverage": 0,
            "domain": "gripper",
            "problem": "p01.pddl",
        })))
        .unwrap();
        assert_eq!(m.task(), Some(&TaskKey::new("gripper", "p01.pddl")));
    }
}
