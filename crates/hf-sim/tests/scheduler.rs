//! Scheduler state machine and per-tick ordering.

mod common;

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use common::topic;
use hf_agents::{AgentContext, AgentError, AgentLayer, AgentOutput, AgentResult, CustomAgent};
use hf_bus::{Payload, Topic};
use hf_components::{
    ComponentResult, ExternalInputs, Gate, GateParams, Params, PhysicalComponent, StateMap,
};
use hf_core::{ClockConfig, TickContext};
use hf_sim::{AgentFaultPolicy, RunOptions, RunState, SimError, Topology, TopologyBuilder, start};

/// Publishes the current tick on its topic every tick.
struct Ticker {
    out: Topic,
}

impl CustomAgent for Ticker {
    fn id(&self) -> &str {
        "ticker"
    }
    fn layer(&self) -> AgentLayer {
        AgentLayer::Control
    }
    fn subscriptions(&self) -> BTreeSet<Topic> {
        BTreeSet::new()
    }
    fn publishes(&self) -> BTreeSet<Topic> {
        BTreeSet::from([self.out.clone()])
    }
    fn execute(&mut self, ctx: &AgentContext<'_>) -> AgentResult<AgentOutput> {
        let mut out = AgentOutput::new();
        out.publish(self.out.clone(), Payload::scalar(ctx.tick.tick as f64));
        Ok(out)
    }
}

/// Records `(tick, visible published_at)` for one topic.
struct Watcher {
    watch: Topic,
    seen: Arc<Mutex<Vec<(u64, Option<u64>)>>>,
}

impl CustomAgent for Watcher {
    fn id(&self) -> &str {
        "watcher"
    }
    fn layer(&self) -> AgentLayer {
        AgentLayer::Control
    }
    fn subscriptions(&self) -> BTreeSet<Topic> {
        BTreeSet::from([self.watch.clone()])
    }
    fn publishes(&self) -> BTreeSet<Topic> {
        BTreeSet::new()
    }
    fn execute(&mut self, ctx: &AgentContext<'_>) -> AgentResult<AgentOutput> {
        let stamp = ctx.bus.subscribe(&self.watch).latest().map(|m| m.published_at);
        self.seen.lock().unwrap().push((ctx.tick.tick, stamp));
        Ok(AgentOutput::new())
    }
}

/// Fails on one tick, publishes otherwise.
struct Flaky {
    fail_at: u64,
}

impl CustomAgent for Flaky {
    fn id(&self) -> &str {
        "flaky"
    }
    fn layer(&self) -> AgentLayer {
        AgentLayer::Supervision { tier: 0 }
    }
    fn subscriptions(&self) -> BTreeSet<Topic> {
        BTreeSet::new()
    }
    fn publishes(&self) -> BTreeSet<Topic> {
        BTreeSet::from([topic("flaky/out")])
    }
    fn execute(&mut self, ctx: &AgentContext<'_>) -> AgentResult<AgentOutput> {
        if ctx.tick.tick == self.fail_at {
            return Err(AgentError::Failed {
                what: "sensor dropout".into(),
            });
        }
        let mut out = AgentOutput::new();
        out.publish(topic("flaky/out"), 1.0);
        Ok(out)
    }
}

/// Publishes a status and stages one fixed actuation every tick.
struct Actuator {
    component: &'static str,
    input: &'static str,
    value: f64,
}

impl CustomAgent for Actuator {
    fn id(&self) -> &str {
        "actuator"
    }
    fn layer(&self) -> AgentLayer {
        AgentLayer::Control
    }
    fn subscriptions(&self) -> BTreeSet<Topic> {
        BTreeSet::new()
    }
    fn publishes(&self) -> BTreeSet<Topic> {
        BTreeSet::from([topic("actuator/status")])
    }
    fn execute(&mut self, _ctx: &AgentContext<'_>) -> AgentResult<AgentOutput> {
        let mut out = AgentOutput::new();
        out.publish(topic("actuator/status"), 1.0);
        out.actuate(self.component, self.input, self.value);
        Ok(out)
    }
}

fn gate_with(agent: Actuator) -> Topology {
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
    TopologyBuilder::new()
        .component(gate)
        .agent(Box::new(agent) as Box<dyn CustomAgent>)
        .build()
}

/// Component whose state turns NaN at a given tick.
struct Exploder {
    at: u64,
    state: StateMap,
    params: Params,
}

impl Exploder {
    fn new(at: u64) -> Self {
        Self {
            at,
            state: StateMap::with_keys(&[("volume", 1.0), ("outflow", 0.0)]).unwrap(),
            params: Params::new(),
        }
    }
}

impl PhysicalComponent for Exploder {
    fn id(&self) -> &str {
        "exploder"
    }
    fn kind(&self) -> &'static str {
        "test"
    }
    fn state(&self) -> &StateMap {
        &self.state
    }
    fn params(&self) -> &Params {
        &self.params
    }
    fn update(&mut self, ctx: &TickContext, _inputs: &ExternalInputs) -> ComponentResult<()> {
        if ctx.tick == self.at {
            self.state.set("volume", f64::NAN)?;
        }
        Ok(())
    }
    fn actuation_inputs(&self) -> &[&'static str] {
        &[]
    }
    fn stage_input(&mut self, name: &str, _value: f64) -> ComponentResult<()> {
        Err(hf_components::ComponentError::UnknownInput {
            name: name.to_string(),
        })
    }
}

#[test]
fn nothing_published_is_visible_in_the_same_tick() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let topo = TopologyBuilder::new()
        .agent(Box::new(Ticker { out: topic("tick") }) as Box<dyn CustomAgent>)
        .agent(Box::new(Watcher {
            watch: topic("tick"),
            seen: Arc::clone(&seen),
        }) as Box<dyn CustomAgent>)
        .build();
    let mut run = start(topo, ClockConfig::new(1.0, 4), RunOptions::default()).unwrap();
    run.run_to_completion().unwrap();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![(0, None), (1, Some(0)), (2, Some(1)), (3, Some(2))]
    );
}

#[test]
fn completes_after_exactly_end_tick_ticks() {
    let topo = TopologyBuilder::new()
        .agent(Box::new(Ticker { out: topic("tick") }) as Box<dyn CustomAgent>)
        .build();
    let mut run = start(topo, ClockConfig::new(0.5, 7), RunOptions::default()).unwrap();
    assert_eq!(run.state(), RunState::Running);

    let mut ticks = Vec::new();
    let result = run.run_with_progress(|t| ticks.push(t.tick)).unwrap();
    assert_eq!(result.state, RunState::Completed);
    assert_eq!(result.ticks_executed, 7);
    assert_eq!(result.final_tick, 7);
    assert_eq!(ticks, (0..7).collect::<Vec<_>>());
    assert_eq!(run.clock().time(), 3.5);

    assert!(matches!(
        run.step(),
        Err(SimError::InvalidState {
            state: RunState::Completed,
            ..
        })
    ));
}

#[test]
fn zero_end_tick_completes_on_start() {
    let run = start(
        TopologyBuilder::new().build(),
        ClockConfig::new(1.0, 0),
        RunOptions::default(),
    )
    .unwrap();
    assert_eq!(run.state(), RunState::Completed);
    assert_eq!(run.current_tick(), 0);
}

#[test]
fn non_finite_state_fails_the_run() {
    let topo = TopologyBuilder::new().component(Exploder::new(3)).build();
    let mut run = start(topo, ClockConfig::new(1.0, 10), RunOptions::default()).unwrap();

    let err = run.run_to_completion().unwrap_err();
    match &err {
        SimError::ComponentUpdate { entity, tick, .. } => {
            assert_eq!(entity, "exploder");
            assert_eq!(*tick, 3);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(run.state(), RunState::Failed);
    assert_eq!(run.current_tick(), 3);
    assert_eq!(run.failure(), Some(&err));
    assert!(run.step().is_err());
    assert_eq!(run.current_tick(), 3);
}

#[test]
fn isolated_agent_fault_is_recorded_and_run_continues() {
    let topo = TopologyBuilder::new()
        .agent(Box::new(Flaky { fail_at: 2 }) as Box<dyn CustomAgent>)
        .build();
    let mut run = start(topo, ClockConfig::new(1.0, 5), RunOptions::default()).unwrap();

    let mut per_tick = Vec::new();
    let result = run
        .run_with_progress(|t| per_tick.push((t.published, t.warnings.len())))
        .unwrap();
    assert_eq!(result.state, RunState::Completed);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].agent, "flaky");
    assert_eq!(result.warnings[0].tick, 2);
    assert_eq!(per_tick[2], (0, 1));
    assert_eq!(result.published_total, 4);
}

#[test]
fn fatal_agent_fault_fails_the_run() {
    let topo = TopologyBuilder::new()
        .agent(Box::new(Flaky { fail_at: 1 }) as Box<dyn CustomAgent>)
        .build();
    let options = RunOptions {
        agent_faults: AgentFaultPolicy::Fatal,
        ..RunOptions::default()
    };
    let mut run = start(topo, ClockConfig::new(1.0, 5), options).unwrap();

    let err = run.run_to_completion().unwrap_err();
    assert!(matches!(err, SimError::AgentExecution { tick: 1, .. }));
    assert_eq!(run.state(), RunState::Failed);
}

#[test]
fn stop_between_ticks_is_terminal() {
    let topo = TopologyBuilder::new()
        .agent(Box::new(Ticker { out: topic("tick") }) as Box<dyn CustomAgent>)
        .build();
    let mut run = start(topo, ClockConfig::new(1.0, 100), RunOptions::default()).unwrap();
    run.step().unwrap();
    run.step().unwrap();
    run.stop();
    assert_eq!(run.state(), RunState::Stopped);
    assert!(run.step().is_err());

    let result = run.run_to_completion().unwrap();
    assert_eq!(result.state, RunState::Stopped);
    assert_eq!(result.ticks_executed, 2);
    assert_eq!(run.record().last_tick(), Some(2));
}

#[test]
fn configuration_errors_reported_at_start() {
    let bad_clock = start(
        TopologyBuilder::new().build(),
        ClockConfig::new(0.0, 5),
        RunOptions::default(),
    );
    assert!(matches!(bad_clock, Err(SimError::Configuration { .. })));

    let self_link = TopologyBuilder::new()
        .component(Exploder::new(99))
        .link("exploder", "exploder")
        .build();
    assert!(matches!(
        start(self_link, ClockConfig::new(1.0, 5), RunOptions::default()),
        Err(SimError::Configuration { .. })
    ));

    let dangling = TopologyBuilder::new()
        .component(Exploder::new(99))
        .link("exploder", "lake")
        .build();
    assert!(matches!(
        start(dangling, ClockConfig::new(1.0, 5), RunOptions::default()),
        Err(SimError::Configuration { .. })
    ));

    let duplicate_agents = TopologyBuilder::new()
        .agent(Box::new(Ticker { out: topic("a") }) as Box<dyn CustomAgent>)
        .agent(Box::new(Ticker { out: topic("b") }) as Box<dyn CustomAgent>)
        .build();
    let err = start(duplicate_agents, ClockConfig::new(1.0, 5), RunOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("ticker"));
}

#[test]
fn rejected_actuation_discards_the_whole_output() {
    let cases = [
        ("gate1", "bogus", 1.0),
        ("gate1", "target_opening", f64::NAN),
        ("gate9", "target_opening", 0.5),
    ];
    for (component, input, value) in cases {
        let topo = gate_with(Actuator {
            component,
            input,
            value,
        });
        let mut run = start(topo, ClockConfig::new(1.0, 3), RunOptions::default()).unwrap();

        let mut per_tick = Vec::new();
        let result = run
            .run_with_progress(|t| per_tick.push((t.published, t.actuations, t.warnings.len())))
            .unwrap();

        assert_eq!(result.state, RunState::Completed);
        assert_eq!(per_tick, vec![(0, 0, 1); 3], "{component}.{input}");
        assert_eq!(result.warnings.len(), 3);
        assert!(result.warnings.iter().all(|w| w.agent == "actuator"));
        assert_eq!(result.published_total, 0);

        let gate = run.component("gate1").unwrap();
        assert_eq!(gate.state().get("opening"), Some(0.2));
        assert_eq!(gate.state().get("target_opening"), Some(0.2));
    }
}

#[test]
fn rejected_actuation_is_fatal_under_fatal_policy() {
    let topo = gate_with(Actuator {
        component: "gate1",
        input: "bogus",
        value: 1.0,
    });
    let options = RunOptions {
        agent_faults: AgentFaultPolicy::Fatal,
        ..RunOptions::default()
    };
    let mut run = start(topo, ClockConfig::new(1.0, 3), options).unwrap();

    let err = run.run_to_completion().unwrap_err();
    match &err {
        SimError::AgentExecution { entity, tick, .. } => {
            assert_eq!(entity, "actuator");
            assert_eq!(*tick, 0);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("bogus"));
    assert_eq!(run.state(), RunState::Failed);
    assert_eq!(run.bus().published_total(), 0);
}
