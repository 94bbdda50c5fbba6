//! Named operating-point values of a device instance.

use std::fmt;

use fetsim_core::units::format_value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Operating-point values keyed by name (`"gm"`, `"Cgs"`, ...).
///
/// Keys are unique and the last write wins. Reading a key that was never
/// written is an error, so consumers cannot silently pick up a zero before
/// the device has been evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatingPoint {
    values: IndexMap<String, f64>,
}

impl OperatingPoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: f64) {
        match self.values.get_mut(key) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(key.to_string(), value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Result<f64> {
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| Error::MissingOperatingPoint(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Iterate in first-written order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for OperatingPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            writeln!(f, "{key:>4} = {}", format_value(value))?;
        }
        Ok(())
    }
}
