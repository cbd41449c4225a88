//! Resource counters observed for a run and the limits declared for it

use serde::{Deserialize, Serialize};

use crate::properties::Properties;
use crate::Result;

/// Peak resource counters reported by the supervisor.
///
/// Times are in seconds, memory in KiB. Any counter may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// Total CPU time of the planner and its children
    pub cpu_time: Option<f64>,
    /// Wall-clock time
    pub wall_clock_time: Option<f64>,
    /// Peak virtual memory
    pub virtual_memory: Option<f64>,
    /// Peak resident memory (RSS + swap)
    pub memory: Option<f64>,
}

/// Limits declared for a run. `None` means the dimension was never
/// limited and can never be exceeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// CPU time limit in seconds
    pub cpu_time: Option<f64>,
    /// Wall-clock limit in seconds
    pub wall_clock_time: Option<f64>,
    /// Virtual memory limit in KiB
    pub virtual_memory: Option<f64>,
    /// RSS + swap limit in KiB
    pub memory: Option<f64>,
}

impl ResourceUsage {
    pub(crate) fn from_properties(props: &Properties) -> Result<Self> {
        Ok(Self {
            cpu_time: props.get_f64("cpu_time")?,
            wall_clock_time: props.get_f64("wall_clock_time")?,
            virtual_memory: props.get_f64("virtual_memory")?,
            memory: props.get_f64("memory")?,
        })
    }
}

impl ResourceLimits {
    pub(crate) fn from_properties(props: &Properties) -> Result<Self> {
        Ok(Self {
            cpu_time: props.get_f64("cpu_time_limit")?,
            wall_clock_time: props.get_f64("wall_clock_time_limit")?,
            virtual_memory: props.get_f64("virtual_memory_limit")?,
            memory: props.get_f64("memory_limit")?,
        })
    }

    /// Check if any observed time counter is strictly above its limit.
    #[must_use]
    pub fn time_exceeded(&self, usage: &ResourceUsage) -> bool {
        exceeds(usage.cpu_time, self.cpu_time) || exceeds(usage.wall_clock_time, self.wall_clock_time)
    }

    /// Check if any observed memory counter is strictly above its limit.
    #[must_use]
    pub fn memory_exceeded(&self, usage: &ResourceUsage) -> bool {
        exceeds(usage.virtual_memory, self.virtual_memory) || exceeds(usage.memory, self.memory)
    }
}

fn exceeds(observed: Option<f64>, limit: Option<f64>) -> bool {
    match (observed, limit) {
        (Some(observed), Some(limit)) => observed > limit,
        _ => false,
    }
}
