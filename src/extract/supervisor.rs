//! Runsolver log extraction
//!
//! Reads the resource supervisor's `values.log` (counters and outcome
//! flags), `watch.log` (enforced limits) and the driver's `driver.log`.

use regex::Regex;

use crate::properties::Properties;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy)]
enum Kind {
    Float,
    Int,
    Text,
}

#[derive(Debug)]
struct Pattern {
    key: &'static str,
    regex: Regex,
    kind: Kind,
}

impl Pattern {
    fn new(key: &'static str, pattern: &str, kind: Kind) -> Result<Self> {
        Ok(Self {
            key,
            regex: Regex::new(pattern)?,
            kind,
        })
    }

    fn apply(&self, content: &str, props: &mut Properties) -> Result<bool> {
        let Some(raw) = self
            .regex
            .captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
        else {
            return Ok(false);
        };
        match self.kind {
            Kind::Float => {
                let value: f64 = raw
                    .parse()
                    .map_err(|_| Error::invalid(self.key, format!("not a number: {raw:?}")))?;
                props.insert(self.key, value);
            }
            Kind::Int => {
                let value: i64 = raw
                    .parse()
                    .map_err(|_| Error::invalid(self.key, format!("not an integer: {raw:?}")))?;
                props.insert(self.key, value);
            }
            Kind::Text => props.insert(self.key, raw),
        }
        Ok(true)
    }
}

/// Compiled patterns for the supervisor's log files.
///
/// Build once per batch and share across workers.
#[derive(Debug)]
pub struct SupervisorLogParser {
    values: Vec<Pattern>,
    limits: Vec<Pattern>,
    driver: Vec<Pattern>,
}

const SOFT_LIMIT: &str = r"\(soft limit, will send SIGTERM then SIGKILL\)";

impl SupervisorLogParser {
    /// Compile all patterns.
    ///
    /// # Errors
    /// Returns error if a pattern fails to compile
    pub fn new() -> Result<Self> {
        Ok(Self {
            values: vec![
                Pattern::new("cpu_time", r"(?m)^CPUTIME=(.+)$", Kind::Float)?,
                Pattern::new("wall_clock_time", r"(?m)^WCTIME=(.+)$", Kind::Float)?,
                Pattern::new("virtual_memory", r"(?m)^MAXVM=(\d+)", Kind::Int)?,
                Pattern::new("memory", r"(?m)^MAXMM=(\d+)", Kind::Int)?,
            ],
            limits: vec![
                Pattern::new(
                    "cpu_time_limit",
                    &format!(r"Enforcing CPUTime limit {SOFT_LIMIT}: (\d+) seconds"),
                    Kind::Int,
                )?,
                Pattern::new(
                    "wall_clock_time_limit",
                    &format!(r"Enforcing wall clock limit {SOFT_LIMIT}: (\d+) seconds"),
                    Kind::Int,
                )?,
                Pattern::new(
                    "virtual_memory_limit",
                    &format!(r"Enforcing VSIZE limit {SOFT_LIMIT}: (\d+) KiB"),
                    Kind::Int,
                )?,
                Pattern::new(
                    "memory_limit",
                    &format!(r"Enforcing RSS\+Swap limit {SOFT_LIMIT}: (\d+) KiB"),
                    Kind::Int,
                )?,
            ],
            driver: vec![
                Pattern::new("node", r"node: (.+)\n", Kind::Text)?,
                Pattern::new("apptainer_exit_code", r"run-apptainer exit code: (.+)\n", Kind::Int)?,
                Pattern::new(
                    "apptainer_wall_clock_time",
                    r"run-apptainer wall-clock time: (.+)s",
                    Kind::Float,
                )?,
            ],
        })
    }

    /// Parse `values.log`: resource counters plus the `TIMEOUT=true` /
    /// `MEMOUT=true` flags. A flag line that is absent reads as `false`.
    ///
    /// # Errors
    /// Returns error if a counter is present but not numeric
    pub fn parse_values(&self, content: &str, props: &mut Properties) -> Result<()> {
        for pattern in &self.values {
            pattern.apply(content, props)?;
        }
        let lines: Vec<&str> = content.lines().map(str::trim_end).collect();
        props.insert("out_of_time_flag", lines.contains(&"TIMEOUT=true"));
        props.insert("out_of_memory_flag", lines.contains(&"MEMOUT=true"));
        Ok(())
    }

    /// Parse `watch.log` for the limits the supervisor enforced. Limits
    /// that were not enforced are left unset.
    ///
    /// # Errors
    /// Returns error if a limit value does not parse
    pub fn parse_limits(&self, content: &str, props: &mut Properties) -> Result<()> {
        for pattern in &self.limits {
            pattern.apply(content, props)?;
        }
        Ok(())
    }

    /// Parse `driver.log` for the node name, container exit code and
    /// container wall-clock time.
    ///
    /// # Errors
    /// Returns error if a numeric field does not parse
    pub fn parse_driver(&self, content: &str, props: &mut Properties) -> Result<()> {
        for pattern in &self.driver {
            pattern.apply(content, props)?;
        }
        Ok(())
    }
}
