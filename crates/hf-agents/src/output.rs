//! Staged agent effects.

use hf_bus::{Payload, Topic};

/// A value to stage on a component's actuation input.
#[derive(Debug, Clone, PartialEq)]
pub struct Actuation {
    pub component: String,
    pub input: String,
    pub value: f64,
}

/// Publishes and actuations produced by one agent execution.
///
/// Nothing takes effect until the scheduler commits the output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentOutput {
    pub publishes: Vec<(Topic, Payload)>,
    pub actuations: Vec<Actuation>,
}

impl AgentOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, topic: Topic, payload: impl Into<Payload>) {
        self.publishes.push((topic, payload.into()));
    }

    pub fn actuate(&mut self, component: impl Into<String>, input: impl Into<String>, value: f64) {
        self.actuations.push(Actuation {
            component: component.into(),
            input: input.into(),
            value,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.publishes.is_empty() && self.actuations.is_empty()
    }
}
