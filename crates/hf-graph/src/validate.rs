//! Link graph validation.

use std::collections::HashSet;

use hf_core::{CompId, NameIndex};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::GraphError;
use crate::graph::Link;

fn display_name(names: &NameIndex, id: CompId) -> String {
    names
        .name(id)
        .map_or_else(|| id.to_string(), str::to_string)
}

/// Check link endpoints, self links and duplicates.
pub(crate) fn validate_links(names: &NameIndex, links: &[Link]) -> Result<(), GraphError> {
    let mut seen: HashSet<(CompId, CompId)> = HashSet::new();

    for link in links {
        for end in [link.from, link.to] {
            if end.slot() >= names.len() {
                return Err(GraphError::InvalidCompRef { comp: end });
            }
        }
        if link.from == link.to {
            return Err(GraphError::SelfLink {
                name: display_name(names, link.from),
            });
        }
        if !seen.insert((link.from, link.to)) {
            return Err(GraphError::DuplicateLink {
                from: display_name(names, link.from),
                to: display_name(names, link.to),
            });
        }
    }

    Ok(())
}

/// Order components source-to-sink, rejecting cycles.
pub(crate) fn topological_order(
    names: &NameIndex,
    links: &[Link],
) -> Result<Vec<CompId>, GraphError> {
    let mut graph: DiGraph<CompId, ()> = DiGraph::with_capacity(names.len(), links.len());
    for (id, _) in names.iter() {
        graph.add_node(id);
    }
    for link in links {
        graph.add_edge(
            NodeIndex::new(link.from.slot()),
            NodeIndex::new(link.to.slot()),
            (),
        );
    }

    toposort(&graph, None)
        .map(|order| order.into_iter().map(|n| graph[n]).collect())
        .map_err(|cycle| GraphError::Cycle {
            through: display_name(names, graph[cycle.node_id()]),
        })
}
