//! Recorded component trajectories.

use hf_components::PhysicalComponent;
use serde::{Deserialize, Serialize};

/// Column layout of one component in a [`SimRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedComponent {
    pub id: String,
    pub keys: Vec<String>,
}

/// Record of simulation results.
///
/// Row `i` holds every component's state after tick `ticks[i]`, flattened in
/// component registration order and then state key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimRecord {
    pub components: Vec<RecordedComponent>,
    /// Tick boundary of each row.
    pub ticks: Vec<u64>,
    /// Simulated time of each row (seconds).
    pub t: Vec<f64>,
    /// State rows.
    pub x: Vec<Vec<f64>>,
}

impl SimRecord {
    pub(crate) fn for_components(components: &[Box<dyn PhysicalComponent>]) -> Self {
        Self {
            components: components
                .iter()
                .map(|c| RecordedComponent {
                    id: c.id().to_string(),
                    keys: c.state().keys().iter().map(|k| k.to_string()).collect(),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub(crate) fn push(&mut self, tick: u64, t: f64, components: &[Box<dyn PhysicalComponent>]) {
        let row = components
            .iter()
            .flat_map(|c| c.state().iter().map(|(_, v)| v))
            .collect();
        self.ticks.push(tick);
        self.t.push(t);
        self.x.push(row);
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn last_tick(&self) -> Option<u64> {
        self.ticks.last().copied()
    }

    fn column(&self, component: &str, key: &str) -> Option<usize> {
        let mut offset = 0;
        for c in &self.components {
            if c.id == component {
                return c.keys.iter().position(|k| k == key).map(|i| offset + i);
            }
            offset += c.keys.len();
        }
        None
    }

    /// Time series of one state value.
    pub fn series(&self, component: &str, key: &str) -> Option<Vec<f64>> {
        let col = self.column(component, key)?;
        Some(self.x.iter().map(|row| row[col]).collect())
    }
}
