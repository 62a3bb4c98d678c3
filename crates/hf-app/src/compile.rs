//! Scenario compilation: schema definitions into runtime objects.

use hf_agents::{Agent, CentralDispatcherAgent, DigitalTwinAgent, LocalControlAgent};
use hf_components::{Canal, Gate, PhysicalComponent, Reservoir};
use hf_core::ClockConfig;
use hf_project::{AgentDef, AgentFaultsDef, ComponentDef, ExecutionDef, OptionsDef, ScenarioDef};
use hf_sim::{AgentFaultPolicy, ExecutionMode, RunOptions, Topology, TopologyBuilder};

use crate::error::{AppError, AppResult};

/// A scenario ready to hand to [`hf_sim::start`].
#[derive(Debug)]
pub struct CompiledScenario {
    pub topology: Topology,
    pub clock: ClockConfig,
    pub options: RunOptions,
}

fn compile_error(entity: &str, err: impl ToString) -> AppError {
    AppError::Compile {
        entity: entity.to_string(),
        message: err.to_string(),
    }
}

pub fn build_component(def: &ComponentDef) -> AppResult<Box<dyn PhysicalComponent>> {
    let built: Box<dyn PhysicalComponent> = match def {
        ComponentDef::Reservoir {
            id,
            params,
            initial_volume,
        } => Box::new(
            Reservoir::new(id.clone(), *params, *initial_volume)
                .map_err(|e| compile_error(id, e))?,
        ),
        ComponentDef::Gate {
            id,
            params,
            initial_opening,
        } => Box::new(
            Gate::new(id.clone(), *params, *initial_opening).map_err(|e| compile_error(id, e))?,
        ),
        ComponentDef::Canal {
            id,
            params,
            initial_volume,
        } => Box::new(
            Canal::new(id.clone(), *params, *initial_volume).map_err(|e| compile_error(id, e))?,
        ),
    };
    Ok(built)
}

pub fn build_agent(def: &AgentDef) -> AppResult<Agent> {
    let id = def.id();
    let agent = match def {
        AgentDef::DigitalTwin(cfg) => DigitalTwinAgent::new(cfg.clone())
            .map_err(|e| compile_error(id, e))?
            .into(),
        AgentDef::LocalControl(cfg) => LocalControlAgent::new(cfg.clone())
            .map_err(|e| compile_error(id, e))?
            .into(),
        AgentDef::CentralDispatcher(cfg) => CentralDispatcherAgent::new(cfg.clone())
            .map_err(|e| compile_error(id, e))?
            .into(),
    };
    Ok(agent)
}

fn run_options(def: &OptionsDef) -> RunOptions {
    RunOptions {
        agent_faults: match def.agent_faults {
            AgentFaultsDef::Isolate => AgentFaultPolicy::Isolate,
            AgentFaultsDef::Fatal => AgentFaultPolicy::Fatal,
        },
        execution: match def.execution {
            ExecutionDef::Sequential => ExecutionMode::Sequential,
            ExecutionDef::Parallel => ExecutionMode::Parallel,
        },
        record_every: def.record_every,
    }
}

/// Validate a scenario and build its topology, clock and run options.
pub fn compile_scenario(scenario: &ScenarioDef) -> AppResult<CompiledScenario> {
    hf_project::validate_scenario(scenario)?;

    let mut builder = TopologyBuilder::new();
    for def in &scenario.components {
        builder = builder.boxed_component(build_component(def)?);
    }
    for link in &scenario.links {
        builder = builder.link(link.from.clone(), link.to.clone());
    }
    for def in &scenario.agents {
        builder = builder.agent(build_agent(def)?);
    }
    for topic in &scenario.queue_topics {
        builder = builder.queue_topic(topic.clone());
    }

    Ok(CompiledScenario {
        topology: builder.build(),
        clock: scenario.clock,
        options: run_options(&scenario.options),
    })
}
