//! Shared fixtures for scheduler integration tests.
#![allow(dead_code)]

use hf_agents::{
    ActuatorTarget, CentralDispatcherAgent, CentralDispatcherConfig, DigitalTwinAgent,
    DigitalTwinConfig, DispatchRule, LocalControlAgent, LocalControlConfig, PvSource,
    SetpointSource,
};
use hf_bus::Topic;
use hf_components::{Canal, CanalParams, Gate, GateParams, Reservoir, ReservoirParams};
use hf_controls::{HysteresisBand, PidConfig, TwinFilter};
use hf_sim::{Topology, TopologyBuilder};

pub fn topic(s: &str) -> Topic {
    Topic::new(s).unwrap()
}

/// Intake gate feeding a reservoir. A twin observes the reservoir, a local
/// controller drives the gate toward the commanded level, a dispatcher
/// commands the level from a hysteresis band.
pub fn closed_loop(extra_canal_twin: bool) -> Topology {
    let gate = Gate::new(
        "gate1",
        GateParams {
            max_opening: 1.0,
            max_rate_of_change: 0.1,
            max_flow_rate: 10.0,
        },
        0.2,
    )
    .unwrap();
    let reservoir = Reservoir::new(
        "res1",
        ReservoirParams {
            surface_area: 100.0,
            release: 2.0,
        },
        500.0,
    )
    .unwrap();

    let twin = DigitalTwinAgent::new(DigitalTwinConfig {
        id: "twin_res1".into(),
        component: "res1".into(),
        state_topic: topic("state/res1"),
        keys: Some(vec!["water_level".into(), "volume".into()]),
        filter: TwinFilter::Raw,
    })
    .unwrap();

    let lca = LocalControlAgent::new(LocalControlConfig {
        id: "lca_gate1".into(),
        pid: PidConfig {
            kp: 0.5,
            ki: 0.01,
            kd: 0.0,
            output_min: 0.0,
            output_max: 1.0,
        },
        setpoint: SetpointSource::Topic {
            topic: topic("command/res1/level"),
            initial: None,
        },
        process_variable: PvSource::Topic {
            topic: topic("state/res1"),
            key: "water_level".into(),
        },
        actuator: ActuatorTarget {
            component: "gate1".into(),
            input: "target_opening".into(),
        },
        output_topic: Some(topic("control/gate1")),
        delayed_feedback: false,
    })
    .unwrap();

    let cda = CentralDispatcherAgent::new(CentralDispatcherConfig {
        id: "cda".into(),
        tier: 0,
        rules: vec![DispatchRule {
            watch_topic: topic("state/res1"),
            observation_key: "water_level".into(),
            band: HysteresisBand::new(8.0, 10.0, 8.5, 9.5).unwrap(),
            command_topic: topic("command/res1/level"),
        }],
        delayed_feedback: false,
    })
    .unwrap();

    // Registered out of layer order on purpose.
    let mut builder = TopologyBuilder::new()
        .component(gate)
        .component(reservoir)
        .link("gate1", "res1")
        .agent(cda)
        .agent(lca)
        .agent(twin)
        .queue_topic(topic("command/res1/level"));

    if extra_canal_twin {
        let canal = Canal::new(
            "reach1",
            CanalParams {
                k: 0.05,
                surface_area: 50.0,
            },
            200.0,
        )
        .unwrap();
        let canal_twin = DigitalTwinAgent::new(DigitalTwinConfig {
            id: "twin_reach1".into(),
            component: "reach1".into(),
            state_topic: topic("state/reach1"),
            keys: None,
            filter: TwinFilter::Ema { alpha: 0.3 },
        })
        .unwrap();
        builder = builder
            .component(canal)
            .link("res1", "reach1")
            .agent(canal_twin);
    }

    builder.build()
}
