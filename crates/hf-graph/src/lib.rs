//! hf-graph: physical link topology for hydroflow.
//!
//! Provides:
//! - Link graph over component ids (A → B: A's outflow feeds B's inflow)
//! - Incremental builder with validation (no self links, no duplicates, acyclic)
//! - Deterministic upstream adjacency for the scheduler's inflow summation
//!
//! # Example
//!
//! ```
//! use hf_graph::GraphBuilder;
//!
//! let mut builder = GraphBuilder::new();
//! let res = builder.add_component("reservoir_1").unwrap();
//! let gate = builder.add_component("gate_1").unwrap();
//! builder.add_link(res, gate);
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.upstream(gate), &[res]);
//! assert!(graph.upstream(res).is_empty());
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub(crate) mod validate;

pub use builder::GraphBuilder;
pub use error::GraphError;
pub use graph::{Link, LinkGraph};
