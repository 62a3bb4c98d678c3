//! Read-only view handed to agents.

use std::collections::BTreeMap;

use hf_bus::{MessageBus, Topic};
use hf_components::StateMap;
use hf_core::TickContext;

/// Read access to component states by identifier.
pub trait ComponentView: Sync {
    fn state_of(&self, component: &str) -> Option<&StateMap>;
}

impl ComponentView for BTreeMap<String, StateMap> {
    fn state_of(&self, component: &str) -> Option<&StateMap> {
        self.get(component)
    }
}

/// Everything an agent may observe during one tick.
#[derive(Clone, Copy)]
pub struct AgentContext<'a> {
    pub tick: TickContext,
    pub bus: &'a MessageBus,
    pub components: &'a dyn ComponentView,
}

impl<'a> AgentContext<'a> {
    pub fn new(tick: TickContext, bus: &'a MessageBus, components: &'a dyn ComponentView) -> Self {
        Self {
            tick,
            bus,
            components,
        }
    }

    /// Value named `key` in the newest visible message on `topic`.
    pub fn read_value(&self, topic: &Topic, key: &str) -> Option<f64> {
        self.bus
            .subscribe(topic)
            .latest()
            .and_then(|m| m.payload.value_of(key))
    }

    /// Setpoint carried by the newest visible message on `topic`.
    pub fn read_setpoint(&self, topic: &Topic) -> Option<f64> {
        self.bus
            .subscribe(topic)
            .latest()
            .and_then(|m| m.payload.as_setpoint())
    }

    pub fn component_value(&self, component: &str, key: &str) -> Option<f64> {
        self.components.state_of(component)?.get(key)
    }
}
