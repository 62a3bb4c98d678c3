//! Scenario loading, validation and introspection.

use std::path::Path;

use hf_project::{AgentDef, ScenarioDef};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// One component line of a [`ScenarioSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSummary {
    pub id: String,
    pub kind: String,
    pub actuation_inputs: Vec<String>,
}

/// One agent line of a [`ScenarioSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSummary {
    pub id: String,
    pub kind: String,
    pub subscribes: Vec<String>,
    pub publishes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub dt: f64,
    pub end_tick: u64,
    pub components: Vec<ComponentSummary>,
    pub links: Vec<(String, String)>,
    pub agents: Vec<AgentSummary>,
    pub queue_topics: Vec<String>,
}

/// Load and validate a scenario (`.json` or YAML).
pub fn load_scenario(path: &Path) -> AppResult<ScenarioDef> {
    if !path.exists() {
        return Err(AppError::ScenarioFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(hf_project::load_scenario(path)?)
}

/// Load a scenario and check that it also compiles into a runnable topology.
pub fn validate_scenario_file(path: &Path) -> AppResult<ScenarioDef> {
    let scenario = load_scenario(path)?;
    crate::compile::compile_scenario(&scenario)?;
    Ok(scenario)
}

fn agent_topics(def: &AgentDef) -> (Vec<String>, Vec<String>) {
    let mut subscribes = Vec::new();
    let mut publishes = Vec::new();
    match def {
        AgentDef::DigitalTwin(cfg) => publishes.push(cfg.state_topic.to_string()),
        AgentDef::LocalControl(cfg) => {
            subscribes.extend(cfg.setpoint.topic().map(ToString::to_string));
            subscribes.extend(cfg.process_variable.topic().map(ToString::to_string));
            publishes.extend(cfg.output_topic.as_ref().map(ToString::to_string));
        }
        AgentDef::CentralDispatcher(cfg) => {
            for rule in &cfg.rules {
                subscribes.push(rule.watch_topic.to_string());
                publishes.push(rule.command_topic.to_string());
            }
        }
    }
    subscribes.sort();
    subscribes.dedup();
    publishes.sort();
    publishes.dedup();
    (subscribes, publishes)
}

pub fn summarize(scenario: &ScenarioDef) -> ScenarioSummary {
    ScenarioSummary {
        name: scenario.name.clone(),
        dt: scenario.clock.dt,
        end_tick: scenario.clock.end_tick,
        components: scenario
            .components
            .iter()
            .map(|c| ComponentSummary {
                id: c.id().to_string(),
                kind: c.kind().to_string(),
                actuation_inputs: c.actuation_inputs().iter().map(|s| s.to_string()).collect(),
            })
            .collect(),
        links: scenario
            .links
            .iter()
            .map(|l| (l.from.clone(), l.to.clone()))
            .collect(),
        agents: scenario
            .agents
            .iter()
            .map(|a| {
                let (subscribes, publishes) = agent_topics(a);
                AgentSummary {
                    id: a.id().to_string(),
                    kind: a.kind().to_string(),
                    subscribes,
                    publishes,
                }
            })
            .collect(),
        queue_topics: scenario.queue_topics.iter().map(ToString::to_string).collect(),
    }
}
