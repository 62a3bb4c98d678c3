//! Scenario validation logic.

use std::collections::{HashMap, HashSet};

use hf_agents::PvSource;
use hf_controls::ControlError;

use crate::LATEST_VERSION;
use crate::schema::{AgentDef, ComponentDef, ScenarioDef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn control_error(field: String, err: ControlError) -> ValidationError {
    invalid(field, "", &err.to_string())
}

fn positive(field: String, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, value, "must be positive and finite"));
    }
    Ok(())
}

fn non_negative(field: String, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, value, "must be non-negative and finite"));
    }
    Ok(())
}

pub fn validate_scenario(scenario: &ScenarioDef) -> Result<(), ValidationError> {
    if scenario.version == 0 || scenario.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(invalid("name", "", "must not be empty"));
    }
    positive("clock.dt".into(), scenario.clock.dt)?;

    let mut components: HashMap<&str, &ComponentDef> = HashMap::new();
    for component in &scenario.components {
        let id = component.id();
        if id.trim().is_empty() {
            return Err(invalid("components.id", id, "must not be empty"));
        }
        if components.insert(id, component).is_some() {
            return Err(ValidationError::DuplicateId {
                id: id.to_string(),
                context: "components".to_string(),
            });
        }
        validate_component(component)?;
    }

    let mut links = HashSet::new();
    for link in &scenario.links {
        for end in [&link.from, &link.to] {
            if !components.contains_key(end.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: end.clone(),
                    context: "links".to_string(),
                });
            }
        }
        if link.from == link.to {
            return Err(invalid("links", &link.from, "component cannot link to itself"));
        }
        if !links.insert((&link.from, &link.to)) {
            return Err(ValidationError::DuplicateId {
                id: format!("{} -> {}", link.from, link.to),
                context: "links".to_string(),
            });
        }
    }

    let mut agent_ids = HashSet::new();
    for agent in &scenario.agents {
        let id = agent.id();
        if id.trim().is_empty() {
            return Err(invalid("agents.id", id, "must not be empty"));
        }
        if !agent_ids.insert(id) {
            return Err(ValidationError::DuplicateId {
                id: id.to_string(),
                context: "agents".to_string(),
            });
        }
        validate_agent(agent, &components)?;
    }

    let mut queues = HashSet::new();
    for topic in &scenario.queue_topics {
        if !queues.insert(topic) {
            return Err(ValidationError::DuplicateId {
                id: topic.to_string(),
                context: "queue_topics".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_component(component: &ComponentDef) -> Result<(), ValidationError> {
    let id = component.id();
    let field = |name: &str| format!("components.{}.{}", id, name);
    match component {
        ComponentDef::Reservoir {
            params,
            initial_volume,
            ..
        } => {
            positive(field("surface_area"), params.surface_area)?;
            non_negative(field("release"), params.release)?;
            non_negative(field("initial_volume"), *initial_volume)?;
        }
        ComponentDef::Gate {
            params,
            initial_opening,
            ..
        } => {
            positive(field("max_opening"), params.max_opening)?;
            positive(field("max_rate_of_change"), params.max_rate_of_change)?;
            non_negative(field("max_flow_rate"), params.max_flow_rate)?;
            non_negative(field("initial_opening"), *initial_opening)?;
            if *initial_opening > params.max_opening {
                return Err(invalid(
                    field("initial_opening"),
                    initial_opening,
                    "exceeds max_opening",
                ));
            }
        }
        ComponentDef::Canal {
            params,
            initial_volume,
            ..
        } => {
            positive(field("k"), params.k)?;
            positive(field("surface_area"), params.surface_area)?;
            non_negative(field("initial_volume"), *initial_volume)?;
        }
    }
    Ok(())
}

fn require_component<'a>(
    components: &HashMap<&str, &'a ComponentDef>,
    id: &str,
    context: &str,
) -> Result<&'a ComponentDef, ValidationError> {
    components
        .get(id)
        .copied()
        .ok_or_else(|| ValidationError::MissingReference {
            id: id.to_string(),
            context: context.to_string(),
        })
}

fn validate_agent(
    agent: &AgentDef,
    components: &HashMap<&str, &ComponentDef>,
) -> Result<(), ValidationError> {
    let id = agent.id();
    match agent {
        AgentDef::DigitalTwin(cfg) => {
            require_component(components, &cfg.component, &format!("agent {} component", id))?;
            cfg.filter
                .validate()
                .map_err(|e| control_error(format!("agents.{}.filter", id), e))?;
        }
        AgentDef::LocalControl(cfg) => {
            if let PvSource::Component { component, .. } = &cfg.process_variable {
                require_component(components, component, &format!("agent {} process_variable", id))?;
            }
            let target = require_component(
                components,
                &cfg.actuator.component,
                &format!("agent {} actuator", id),
            )?;
            if !target.actuation_inputs().contains(&cfg.actuator.input.as_str()) {
                return Err(invalid(
                    format!("agents.{}.actuator.input", id),
                    &cfg.actuator.input,
                    "not an actuation input of the target component",
                ));
            }
            cfg.pid
                .validate()
                .map_err(|e| control_error(format!("agents.{}.pid", id), e))?;
        }
        AgentDef::CentralDispatcher(cfg) => {
            if cfg.rules.is_empty() {
                return Err(invalid(format!("agents.{}.rules", id), "[]", "must not be empty"));
            }
            for (i, rule) in cfg.rules.iter().enumerate() {
                rule.band
                    .validate()
                    .map_err(|e| control_error(format!("agents.{}.rules[{}]", id, i), e))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LinkDef, OptionsDef};
    use hf_agents::{
        ActuatorTarget, CentralDispatcherConfig, DigitalTwinConfig, DispatchRule,
        LocalControlConfig, SetpointSource,
    };
    use hf_bus::Topic;
    use hf_components::{GateParams, ReservoirParams};
    use hf_controls::{HysteresisBand, PidConfig, TwinFilter};
    use hf_core::ClockConfig;

    fn scenario() -> ScenarioDef {
        ScenarioDef {
            version: 1,
            name: "test".into(),
            clock: ClockConfig::new(1.0, 10),
            options: OptionsDef::default(),
            queue_topics: vec![],
            components: vec![
                ComponentDef::Gate {
                    id: "gate1".into(),
                    params: GateParams {
                        max_opening: 1.0,
                        max_rate_of_change: 0.1,
                        max_flow_rate: 10.0,
                    },
                    initial_opening: 0.2,
                },
                ComponentDef::Reservoir {
                    id: "res1".into(),
                    params: ReservoirParams {
                        surface_area: 100.0,
                        release: 2.0,
                    },
                    initial_volume: 500.0,
                },
            ],
            links: vec![LinkDef {
                from: "gate1".into(),
                to: "res1".into(),
            }],
            agents: vec![
                AgentDef::DigitalTwin(DigitalTwinConfig {
                    id: "twin".into(),
                    component: "res1".into(),
                    state_topic: Topic::new("state/res1").unwrap(),
                    keys: None,
                    filter: TwinFilter::Raw,
                }),
                AgentDef::LocalControl(LocalControlConfig {
                    id: "lca".into(),
                    pid: PidConfig {
                        kp: 0.5,
                        ki: 0.0,
                        kd: 0.0,
                        output_min: 0.0,
                        output_max: 1.0,
                    },
                    setpoint: SetpointSource::Constant { value: 9.0 },
                    process_variable: PvSource::Component {
                        component: "res1".into(),
                        key: "water_level".into(),
                    },
                    actuator: ActuatorTarget {
                        component: "gate1".into(),
                        input: "target_opening".into(),
                    },
                    output_topic: None,
                    delayed_feedback: false,
                }),
            ],
        }
    }

    #[test]
    fn valid_scenario_passes() {
        validate_scenario(&scenario()).unwrap();
    }

    #[test]
    fn unsupported_version() {
        let mut s = scenario();
        s.version = 7;
        assert_eq!(
            validate_scenario(&s),
            Err(ValidationError::UnsupportedVersion { version: 7 })
        );
    }

    #[test]
    fn duplicate_component_id() {
        let mut s = scenario();
        let dup = s.components[1].clone();
        s.components.push(dup);
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn dangling_link_and_self_link() {
        let mut s = scenario();
        s.links.push(LinkDef {
            from: "res1".into(),
            to: "lake".into(),
        });
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::MissingReference { .. })
        ));

        let mut s = scenario();
        s.links = vec![LinkDef {
            from: "res1".into(),
            to: "res1".into(),
        }];
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn bad_clock() {
        let mut s = scenario();
        s.clock.dt = 0.0;
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn actuator_input_must_exist() {
        let mut s = scenario();
        if let AgentDef::LocalControl(cfg) = &mut s.agents[1] {
            cfg.actuator.input = "release".into();
        }
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn inverted_band_rejected() {
        let mut s = scenario();
        s.agents.push(AgentDef::CentralDispatcher(CentralDispatcherConfig {
            id: "cda".into(),
            tier: 0,
            rules: vec![DispatchRule {
                watch_topic: Topic::new("state/res1").unwrap(),
                observation_key: "water_level".into(),
                band: HysteresisBand {
                    low_level: 10.0,
                    high_level: 8.0,
                    low_setpoint: 0.2,
                    high_setpoint: 0.8,
                },
                command_topic: Topic::new("command/res1").unwrap(),
            }],
            delayed_feedback: false,
        }));
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn missing_twin_component() {
        let mut s = scenario();
        if let AgentDef::DigitalTwin(cfg) = &mut s.agents[0] {
            cfg.component = "lake".into();
        }
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::MissingReference { .. })
        ));
    }
}
