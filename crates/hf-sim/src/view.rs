//! Read-only component view handed to agents.

use hf_agents::ComponentView;
use hf_components::{PhysicalComponent, StateMap};
use hf_graph::LinkGraph;

pub(crate) struct ComponentStates<'a> {
    pub(crate) graph: &'a LinkGraph,
    pub(crate) components: &'a [Box<dyn PhysicalComponent>],
}

impl ComponentView for ComponentStates<'_> {
    fn state_of(&self, component: &str) -> Option<&StateMap> {
        let id = self.graph.id(component)?;
        self.components.get(id.slot()).map(|c| c.state())
    }
}
