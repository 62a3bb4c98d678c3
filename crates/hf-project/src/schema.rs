//! Scenario schema definitions.

use hf_agents::{CentralDispatcherConfig, DigitalTwinConfig, LocalControlConfig};
use hf_bus::Topic;
use hf_components::{CanalParams, GateParams, ReservoirParams};
use hf_core::ClockConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDef {
    pub version: u32,
    pub name: String,
    pub clock: ClockConfig,
    #[serde(default)]
    pub options: OptionsDef,
    /// Topics delivered in queue mode. All others keep only the latest value.
    #[serde(default)]
    pub queue_topics: Vec<Topic>,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default)]
    pub links: Vec<LinkDef>,
    #[serde(default)]
    pub agents: Vec<AgentDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentFaultsDef {
    #[default]
    Isolate,
    Fatal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionDef {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptionsDef {
    pub agent_faults: AgentFaultsDef,
    pub execution: ExecutionDef,
    /// Record every N-th tick. 0 disables recording.
    pub record_every: usize,
}

impl Default for OptionsDef {
    fn default() -> Self {
        Self {
            agent_faults: AgentFaultsDef::default(),
            execution: ExecutionDef::default(),
            record_every: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ComponentDef {
    Reservoir {
        id: String,
        #[serde(flatten)]
        params: ReservoirParams,
        initial_volume: f64,
    },
    Gate {
        id: String,
        #[serde(flatten)]
        params: GateParams,
        #[serde(default)]
        initial_opening: f64,
    },
    Canal {
        id: String,
        #[serde(flatten)]
        params: CanalParams,
        #[serde(default)]
        initial_volume: f64,
    },
}

impl ComponentDef {
    pub fn id(&self) -> &str {
        match self {
            ComponentDef::Reservoir { id, .. }
            | ComponentDef::Gate { id, .. }
            | ComponentDef::Canal { id, .. } => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ComponentDef::Reservoir { .. } => "reservoir",
            ComponentDef::Gate { .. } => "gate",
            ComponentDef::Canal { .. } => "canal",
        }
    }

    /// Actuation inputs the built component will accept.
    pub fn actuation_inputs(&self) -> &'static [&'static str] {
        match self {
            ComponentDef::Reservoir { .. } => &["release"],
            ComponentDef::Gate { .. } => &["target_opening"],
            ComponentDef::Canal { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkDef {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum AgentDef {
    DigitalTwin(DigitalTwinConfig),
    LocalControl(LocalControlConfig),
    CentralDispatcher(CentralDispatcherConfig),
}

impl AgentDef {
    pub fn id(&self) -> &str {
        match self {
            AgentDef::DigitalTwin(c) => &c.id,
            AgentDef::LocalControl(c) => &c.id,
            AgentDef::CentralDispatcher(c) => &c.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AgentDef::DigitalTwin(_) => "digital_twin",
            AgentDef::LocalControl(_) => "local_control",
            AgentDef::CentralDispatcher(_) => "central_dispatcher",
        }
    }
}
