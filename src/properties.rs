//! Flat property mapping exchanged with the extraction and report layers
//!
//! A run's properties arrive as a flat JSON object (`coverage`, `cpu_time`,
//! `costs`, ...). This module wraps that object and gives typed, fallible
//! access to the handful of shapes the engine cares about.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Marker some extractors write in place of the cost of an invalid plan.
pub const INVALID_PLAN: &str = "invalid";

/// Flat key/value mapping describing one run.
///
/// Keys are kept sorted so serialized output is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    values: BTreeMap<String, Value>,
}

impl Properties {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a mapping from a JSON object.
    ///
    /// # Errors
    /// Returns error if the text is not a JSON object
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the mapping has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check if a key is present (a JSON `null` counts as present).
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Insert or overwrite a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Store a boolean the way report tables expect it (`0`/`1`).
    pub fn insert_flag(&mut self, key: impl Into<String>, flag: bool) {
        self.insert(key, u8::from(flag));
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Read a numeric value. `null` and absent both read as `None`.
    ///
    /// # Errors
    /// Returns error if the value is present but not a number
    pub fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| Error::invalid(key, format!("{n} is not representable as f64"))),
            Some(other) => Err(Error::invalid(key, format!("expected a number, got {other}"))),
        }
    }

    /// Read a bool-like value: JSON booleans or numbers (non-zero is true).
    ///
    /// # Errors
    /// Returns error if the value is neither a bool nor a number
    pub fn get_flag(&self, key: &str) -> Result<Option<bool>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(|v| Some(v != 0.0))
                .ok_or_else(|| Error::invalid(key, "flag is not numeric")),
            Some(other) => Err(Error::invalid(key, format!("expected 0/1 or bool, got {other}"))),
        }
    }

    /// Read a string value.
    ///
    /// # Errors
    /// Returns error if the value is present but not a string
    pub fn get_str(&self, key: &str) -> Result<Option<&str>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(Error::invalid(key, format!("expected a string, got {other}"))),
        }
    }

    /// Read a sequence of numbers.
    ///
    /// # Errors
    /// Returns error if the value is not an array of numbers
    pub fn get_f64_seq(&self, key: &str) -> Result<Option<Vec<f64>>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_f64()
                        .ok_or_else(|| Error::invalid(key, format!("non-numeric entry {item}")))
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(Error::invalid(key, format!("expected an array, got {other}"))),
        }
    }

    /// Read a sequence of plan costs. Entries that are `null` or the
    /// [`INVALID_PLAN`] marker read as `None`.
    ///
    /// # Errors
    /// Returns error if the value is not an array or an entry has another shape
    pub fn get_cost_seq(&self, key: &str) -> Result<Option<Vec<Option<f64>>>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Null => Ok(None),
                    Value::String(s) if s == INVALID_PLAN => Ok(None),
                    Value::Number(n) => Ok(n.as_f64()),
                    other => Err(Error::invalid(key, format!("unexpected cost entry {other}"))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(Error::invalid(key, format!("expected an array, got {other}"))),
        }
    }
}

impl FromIterator<(String, Value)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, Value>> for Properties {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }
}
