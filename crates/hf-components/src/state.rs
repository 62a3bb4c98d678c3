//! Component state container with a fixed key set.

use std::collections::BTreeMap;

use hf_core::numeric::first_non_finite;

use crate::error::{ComponentError, ComponentResult};

/// Named numeric state of one component.
///
/// Keys are fixed when the map is built: [`StateMap::set`] rejects unknown
/// keys and there is no insert or remove. Iteration follows declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMap {
    keys: Vec<&'static str>,
    values: Vec<f64>,
}

impl StateMap {
    /// Build a map from `(key, initial value)` pairs. Keys must be unique.
    pub fn with_keys(entries: &[(&'static str, f64)]) -> ComponentResult<Self> {
        let mut keys = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len());
        for &(key, value) in entries {
            if keys.contains(&key) {
                return Err(ComponentError::InvalidArg {
                    what: "state keys must be unique",
                });
            }
            keys.push(key);
            values.push(value);
        }
        Ok(Self { keys, values })
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| *k == key)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.position(key).map(|i| self.values[i])
    }

    /// Overwrite an existing key.
    pub fn set(&mut self, key: &str, value: f64) -> ComponentResult<()> {
        match self.position(key) {
            Some(i) => {
                self.values[i] = value;
                Ok(())
            }
            None => Err(ComponentError::UnknownStateKey {
                key: key.to_string(),
            }),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.keys.iter().copied().zip(self.values.iter().copied())
    }

    /// The first entry holding NaN or an infinity.
    pub fn first_non_finite(&self) -> Option<(&'static str, f64)> {
        first_non_finite(self.iter())
    }

    /// Owned, sorted copy for publishing or reporting.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}
