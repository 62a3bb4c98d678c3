//! The physical component plugin contract.

use std::collections::BTreeMap;

use hf_core::TickContext;
use serde::{Deserialize, Serialize};

use crate::error::ComponentResult;
use crate::state::StateMap;

/// Inputs gathered by the scheduler from the link graph.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExternalInputs {
    /// Sum of the previous tick's outflow of every upstream component.
    pub inflow: f64,
    /// Number of upstream links. Zero means the component is a source.
    pub upstream_count: usize,
}

impl ExternalInputs {
    pub fn new(inflow: f64, upstream_count: usize) -> Self {
        Self {
            inflow,
            upstream_count,
        }
    }

    pub fn has_upstream(&self) -> bool {
        self.upstream_count > 0
    }
}

/// Immutable parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            ParamValue::Text(_) => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

pub type Params = BTreeMap<String, ParamValue>;

/// A physical model the scheduler updates once per tick.
///
/// Implementations must be deterministic functions of their state, staged
/// inputs and the tick context. The scheduler checks state finiteness after
/// every update.
pub trait PhysicalComponent: Send + Sync {
    /// Unique identifier within a topology.
    fn id(&self) -> &str;

    /// Model name, e.g. "reservoir".
    fn kind(&self) -> &'static str;

    fn state(&self) -> &StateMap;

    fn params(&self) -> &Params;

    /// Advance one tick.
    fn update(&mut self, ctx: &TickContext, inputs: &ExternalInputs) -> ComponentResult<()>;

    /// Flow passed to downstream components (m^3/s).
    fn outflow(&self) -> f64 {
        self.state().get("outflow").unwrap_or(0.0)
    }

    /// Names accepted by [`PhysicalComponent::stage_input`].
    fn actuation_inputs(&self) -> &[&'static str];

    /// Stage an actuation value for the next update.
    fn stage_input(&mut self, name: &str, value: f64) -> ComponentResult<()>;
}
