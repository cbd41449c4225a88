//! Best-known bounds reference data
//!
//! Per-task `(lower, upper)` cost bounds used to normalize scores. The
//! table is loaded once per batch and only read afterwards, so it is
//! shared across worker threads without locking.
//!
//! ## File format
//!
//! ```json
//! {
//!   "gripper": {
//!     "p01.pddl": [11, 11],
//!     "p02.pddl": 17,
//!     "p03.pddl": [null, 25],
//!     "p04.pddl": null
//!   }
//! }
//! ```
//!
//! A bare number is an upper bound only. `null` components are unknown.

mod collector;

pub use collector::MinCostCollector;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identifies a planning task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskKey {
    /// Domain name
    pub domain: String,
    /// Problem name
    pub problem: String,
}

impl TaskKey {
    /// Create a task key.
    #[must_use]
    pub fn new(domain: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            problem: problem.into(),
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.problem)
    }
}

/// Known cost bounds for one task. Missing components are unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskBounds {
    /// Best known lower bound on the optimal cost
    pub lower: Option<f64>,
    /// Cheapest plan cost ever observed
    pub upper: Option<f64>,
}

impl TaskBounds {
    /// Bounds with both components known.
    #[must_use]
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Bounds with only a best-known upper bound.
    #[must_use]
    pub const fn upper_only(upper: f64) -> Self {
        Self {
            lower: None,
            upper: Some(upper),
        }
    }

    /// Lower bound, with unknown read as `0`.
    #[must_use]
    pub fn lower_or_zero(&self) -> f64 {
        self.lower.unwrap_or(0.0)
    }

    /// Upper bound, with unknown read as `+inf`.
    #[must_use]
    pub fn upper_or_inf(&self) -> f64 {
        self.upper.unwrap_or(f64::INFINITY)
    }

    /// Upper bound if it is known and finite.
    #[must_use]
    pub fn finite_upper(&self) -> Option<f64> {
        self.upper.filter(|u| u.is_finite())
    }
}

/// One entry of the bounds file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum BoundEntry {
    Pair(Option<f64>, Option<f64>),
    Upper(Option<f64>),
}

impl From<BoundEntry> for TaskBounds {
    fn from(entry: BoundEntry) -> Self {
        match entry {
            BoundEntry::Pair(lower, upper) => Self { lower, upper },
            BoundEntry::Upper(upper) => Self { lower: None, upper },
        }
    }
}

impl From<TaskBounds> for BoundEntry {
    fn from(bounds: TaskBounds) -> Self {
        match bounds.lower {
            Some(_) => Self::Pair(bounds.lower, bounds.upper),
            None => Self::Upper(bounds.upper),
        }
    }
}

/// Read-only table of best-known bounds keyed by task.
///
/// Tasks absent from the table get `(0, +inf)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BestKnownBounds {
    table: FxHashMap<TaskKey, TaskBounds>,
}

impl BestKnownBounds {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the nested `domain -> problem -> bound` JSON format.
    ///
    /// # Errors
    /// Returns error if the JSON does not match the bounds format
    pub fn from_json_str(text: &str) -> Result<Self> {
        let nested: BTreeMap<String, BTreeMap<String, BoundEntry>> = serde_json::from_str(text)
            .map_err(|e| Error::BoundsFormat(e.to_string()))?;

        let mut bounds = Self::new();
        for (domain, problems) in nested {
            for (problem, entry) in problems {
                let entry = TaskBounds::from(entry);
                if let (Some(lower), Some(upper)) = (entry.lower, entry.upper) {
                    if lower > upper {
                        return Err(Error::BoundsFormat(format!(
                            "{domain}/{problem}: lower bound {lower} exceeds upper bound {upper}"
                        )));
                    }
                }
                bounds.insert(TaskKey::new(domain.clone(), problem), entry);
            }
        }
        Ok(bounds)
    }

    /// Load a bounds file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Serialize to the nested JSON format, sorted by domain and problem.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_string(&self) -> Result<String> {
        let mut nested: BTreeMap<&str, BTreeMap<&str, BoundEntry>> = BTreeMap::new();
        for (key, bounds) in &self.table {
            nested
                .entry(key.domain.as_str())
                .or_default()
                .insert(key.problem.as_str(), BoundEntry::from(*bounds));
        }
        Ok(serde_json::to_string_pretty(&nested)?)
    }

    /// Insert or replace the bounds of a task.
    pub fn insert(&mut self, key: TaskKey, bounds: TaskBounds) {
        self.table.insert(key, bounds);
    }

    /// Bounds for a task, `(0, +inf)` when unknown.
    #[must_use]
    pub fn get(&self, key: &TaskKey) -> TaskBounds {
        self.table.get(key).copied().unwrap_or_default()
    }

    /// Check if the table has an entry for a task.
    #[must_use]
    pub fn contains(&self, key: &TaskKey) -> bool {
        self.table.contains_key(key)
    }

    /// Number of tasks in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Iterate over entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&TaskKey, &TaskBounds)> {
        self.table.iter()
    }
}

impl FromIterator<(TaskKey, TaskBounds)> for BestKnownBounds {
    fn from_iter<I: IntoIterator<Item = (TaskKey, TaskBounds)>>(iter: I) -> Self {
        Self {
            table: iter.into_iter().collect(),
        }
    }
}
