//! Run measurements
//!
//! Typed view over the properties extracted from one executed run:
//!
//! ```text
//! RunMeasurement
//!     ├── coverage + SupervisorFlags     (outcome evidence)
//!     ├── ResourceUsage / ResourceLimits  (overage inference)
//!     └── costs, plan_times, time_limit   (scoring inputs)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use planrun::measurement::{RunMeasurement, ResourceUsage, ResourceLimits};
//!
//! let run = RunMeasurement::builder(false)
//!     .usage(ResourceUsage { cpu_time: Some(1801.2), ..ResourceUsage::default() })
//!     .limits(ResourceLimits { cpu_time: Some(1800.0), ..ResourceLimits::default() })
//!     .build();
//!
//! assert!(run.limits().time_exceeded(run.usage()));
//! ```

mod resources;
mod run_measurement;

pub use resources::{ResourceLimits, ResourceUsage};
pub use run_measurement::{RunMeasurement, RunMeasurementBuilder, SupervisorFlags};
