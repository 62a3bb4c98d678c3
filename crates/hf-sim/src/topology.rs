//! Topology assembly: components, links, agents and queue topics.

use hf_agents::Agent;
use hf_bus::Topic;
use hf_components::PhysicalComponent;

use crate::error::{SimError, SimResult};

/// Everything a run needs besides the clock. Validated by [`crate::start`].
#[derive(Default)]
pub struct Topology {
    pub components: Vec<Box<dyn PhysicalComponent>>,
    /// `(from, to)` component ids.
    pub links: Vec<(String, String)>,
    pub agents: Vec<Agent>,
    pub queue_topics: Vec<Topic>,
}

impl Topology {
    pub fn component_ids(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.id())
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(Agent::id)
    }
}

impl std::fmt::Debug for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topology")
            .field("components", &self.component_ids().collect::<Vec<_>>())
            .field("links", &self.links)
            .field("agents", &self.agents)
            .field("queue_topics", &self.queue_topics)
            .finish()
    }
}

/// Builder for a [`Topology`].
///
/// Registration order of components is their update order; registration
/// order of agents breaks ties within a layer.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    topology: Topology,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn component(mut self, component: impl PhysicalComponent + 'static) -> Self {
        self.topology.components.push(Box::new(component));
        self
    }

    pub fn boxed_component(mut self, component: Box<dyn PhysicalComponent>) -> Self {
        self.topology.components.push(component);
        self
    }

    pub fn link(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.topology.links.push((from.into(), to.into()));
        self
    }

    pub fn agent(mut self, agent: impl Into<Agent>) -> Self {
        self.topology.agents.push(agent.into());
        self
    }

    pub fn queue_topic(mut self, topic: Topic) -> Self {
        self.topology.queue_topics.push(topic);
        self
    }

    /// Declare a queue topic by name; malformed names are rejected.
    pub fn queue_topic_str(self, topic: &str) -> SimResult<Self> {
        let parsed = Topic::new(topic).map_err(|source| SimError::MessageBus {
            entity: topic.to_string(),
            tick: 0,
            source,
        })?;
        Ok(self.queue_topic(parsed))
    }

    pub fn build(self) -> Topology {
        self.topology
    }
}
