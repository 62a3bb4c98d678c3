//! Incremental link graph builder.

use hf_core::{CompId, LinkId, NameIndex};

use crate::error::GraphError;
use crate::graph::{Link, LinkGraph};
use crate::validate;

/// Builder for a link graph.
///
/// Register components with `add_component`, declare links, then call
/// `build()` to validate and freeze into an immutable [`LinkGraph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    names: NameIndex,
    links: Vec<Link>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component and return its id. Registration order is update order.
    pub fn add_component(&mut self, name: impl Into<String>) -> Result<CompId, GraphError> {
        Ok(self.names.insert(name)?)
    }

    /// Declare a link between registered components. Checked in `build()`.
    pub fn add_link(&mut self, from: CompId, to: CompId) -> LinkId {
        let id = LinkId::from_index(self.links.len() as u32);
        self.links.push(Link { id, from, to });
        id
    }

    /// Declare a link by component names.
    pub fn link_by_name(&mut self, from: &str, to: &str) -> Result<LinkId, GraphError> {
        let from = self.names.require(from)?;
        let to = self.names.require(to)?;
        Ok(self.add_link(from, to))
    }

    pub fn component_id(&self, name: &str) -> Option<CompId> {
        self.names.get(name)
    }

    /// Validate and build the graph.
    pub fn build(self) -> Result<LinkGraph, GraphError> {
        validate::validate_links(&self.names, &self.links)?;
        let topo_order = validate::topological_order(&self.names, &self.links)?;
        let (upstream_offsets, upstream) = Self::build_upstream(self.names.len(), &self.links);

        Ok(LinkGraph {
            names: self.names,
            links: self.links,
            upstream_offsets,
            upstream,
            topo_order,
        })
    }

    fn build_upstream(count: usize, links: &[Link]) -> (Vec<usize>, Vec<CompId>) {
        let mut per_comp: Vec<Vec<CompId>> = vec![Vec::new(); count];
        for link in links {
            per_comp[link.to.slot()].push(link.from);
        }

        let mut offsets = Vec::with_capacity(count + 1);
        let mut flat = Vec::with_capacity(links.len());
        offsets.push(0);
        for feeders in per_comp {
            flat.extend(feeders);
            offsets.push(flat.len());
        }
        (offsets, flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_assigns_ids_in_order() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_component("res1").unwrap();
        let b = builder.add_component("g1").unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(builder.component_id("g1"), Some(b));
    }

    #[test]
    fn builder_rejects_duplicate_names() {
        let mut builder = GraphBuilder::new();
        builder.add_component("res1").unwrap();
        assert_eq!(
            builder.add_component("res1"),
            Err(GraphError::DuplicateComponent {
                name: "res1".into()
            })
        );
    }

    #[test]
    fn upstream_adjacency_follows_link_order() {
        // Branched network: res1 -> g1 -> trib, res2 -> g2, trib -> main, g2 -> main
        let mut builder = GraphBuilder::new();
        for name in ["res1", "g1", "res2", "g2", "trib", "main"] {
            builder.add_component(name).unwrap();
        }
        for (from, to) in [
            ("res1", "g1"),
            ("g1", "trib"),
            ("res2", "g2"),
            ("trib", "main"),
            ("g2", "main"),
        ] {
            builder.link_by_name(from, to).unwrap();
        }
        let graph = builder.build().unwrap();
        let main = graph.id("main").unwrap();
        let feeders: Vec<&str> = graph
            .upstream(main)
            .iter()
            .map(|&id| graph.name(id).unwrap())
            .collect();
        assert_eq!(feeders, vec!["trib", "g2"]);

        let sources: Vec<&str> = graph.sources().map(|id| graph.name(id).unwrap()).collect();
        assert_eq!(sources, vec!["res1", "res2"]);
        assert_eq!(graph.topological_order().len(), 6);
    }

    #[test]
    fn link_by_unknown_name_fails() {
        let mut builder = GraphBuilder::new();
        builder.add_component("res1").unwrap();
        assert!(matches!(
            builder.link_by_name("res1", "lake"),
            Err(GraphError::UnknownComponent { .. })
        ));
    }
}
