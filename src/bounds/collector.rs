//! Minimum-cost aggregation across runs
//!
//! Collects the cheapest valid plan cost per task while runs are being
//! evaluated in parallel, and turns the result into fresh upper bounds.

use dashmap::DashMap;

use super::{BestKnownBounds, TaskBounds, TaskKey};
use crate::measurement::RunMeasurement;

/// Concurrent collector of per-task minimum plan costs.
///
/// Tasks that were seen but never solved are kept with an unknown bound.
#[derive(Debug, Default)]
pub struct MinCostCollector {
    costs: DashMap<TaskKey, Option<f64>>,
}

impl MinCostCollector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one run. Runs without a task key are ignored.
    pub fn record(&self, run: &RunMeasurement) {
        let Some(task) = run.task() else {
            return;
        };
        let cost = if run.coverage() { run.best_cost() } else { None };
        self.record_cost(task.clone(), cost);
    }

    /// Record a cost (or the absence of one) for a task.
    pub fn record_cost(&self, task: TaskKey, cost: Option<f64>) {
        let mut entry = self.costs.entry(task).or_insert(None);
        if let Some(cost) = cost {
            let best = *entry;
            *entry = Some(best.map_or(cost, |best| best.min(cost)));
        }
    }

    /// Number of tasks seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    /// Check if no task was seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Minimum cost recorded for a task.
    #[must_use]
    pub fn min_cost(&self, task: &TaskKey) -> Option<f64> {
        self.costs.get(task).and_then(|entry| *entry.value())
    }

    /// Turn the collected minima into an upper-bound table.
    #[must_use]
    pub fn into_bounds(self) -> BestKnownBounds {
        self.costs
            .into_iter()
            .map(|(task, cost)| (task, TaskBounds { lower: None, upper: cost }))
            .collect()
    }

    /// Build an updated table: every task of `previous` and of this
    /// collector, with the upper bound lowered wherever a run improved
    /// on it. Lower bounds are carried over unchanged.
    #[must_use]
    pub fn merge_into(&self, previous: &BestKnownBounds) -> BestKnownBounds {
        let mut merged = previous.clone();
        for entry in &self.costs {
            let Some(cost) = *entry.value() else {
                if !merged.contains(entry.key()) {
                    merged.insert(entry.key().clone(), TaskBounds::default());
                }
                continue;
            };
            let old = previous.get(entry.key());
            let upper = old.upper.map_or(cost, |u| u.min(cost));
            merged.insert(
                entry.key().clone(),
                TaskBounds {
                    lower: old.lower,
                    upper: Some(upper),
                },
            );
        }
        merged
    }
}
