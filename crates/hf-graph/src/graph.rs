//! Core link graph data structures.

use hf_core::{CompId, LinkId, NameIndex};

/// Directed physical link: `from`'s outflow feeds `to`'s inflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub id: LinkId,
    pub from: CompId,
    pub to: CompId,
}

/// A validated, immutable link graph.
///
/// Stores:
/// - component names in registration order (the scheduler's update order)
/// - links in declaration order
/// - compact upstream adjacency: component i's feeders are in
///   `upstream[upstream_offsets[i]..upstream_offsets[i+1]]`, in link order
#[derive(Debug, Clone)]
pub struct LinkGraph {
    pub(crate) names: NameIndex,
    pub(crate) links: Vec<Link>,
    pub(crate) upstream_offsets: Vec<usize>,
    pub(crate) upstream: Vec<CompId>,
    pub(crate) topo_order: Vec<CompId>,
}

impl LinkGraph {
    pub fn component_count(&self) -> usize {
        self.names.len()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Component id for a name.
    pub fn id(&self, name: &str) -> Option<CompId> {
        self.names.get(name)
    }

    pub fn name(&self, id: CompId) -> Option<&str> {
        self.names.name(id)
    }

    /// Components in registration order.
    pub fn components(&self) -> impl Iterator<Item = (CompId, &str)> {
        self.names.iter()
    }

    /// Components whose outflow feeds `id`, in link declaration order.
    pub fn upstream(&self, id: CompId) -> &[CompId] {
        let idx = id.slot();
        if idx + 1 >= self.upstream_offsets.len() {
            return &[];
        }
        &self.upstream[self.upstream_offsets[idx]..self.upstream_offsets[idx + 1]]
    }

    /// Components fed by `id`, in link declaration order.
    pub fn downstream(&self, id: CompId) -> impl Iterator<Item = CompId> + '_ {
        self.links.iter().filter(move |l| l.from == id).map(|l| l.to)
    }

    /// A source-to-sink ordering of the components.
    pub fn topological_order(&self) -> &[CompId] {
        &self.topo_order
    }

    /// Components with no upstream links.
    pub fn sources(&self) -> impl Iterator<Item = CompId> + '_ {
        self.names
            .iter()
            .map(|(id, _)| id)
            .filter(|&id| self.upstream(id).is_empty())
    }
}
