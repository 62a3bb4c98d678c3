//! Run state machine and the per-tick loop.
//!
//! Each tick runs four phases:
//! 1. every component is updated in registration order from the previous
//!    tick's upstream outflows, then checked for non-finite state
//! 2. the bus promotes last tick's publishes
//! 3. agents execute in layer order against the bus and a read-only view of
//!    component state, each returning an output
//! 4. outputs are committed in agent order; the clock advances

use std::collections::BTreeSet;
use std::fmt;

use hf_agents::{Agent, AgentContext, AgentError, AgentOutput, AgentResult, PvSource};
use hf_bus::{DeliveryMode, MessageBus, Topic};
use hf_components::{ComponentResult, ExternalInputs, PhysicalComponent};
use hf_core::{ClockConfig, SimulationClock, TickContext};
use hf_graph::{GraphBuilder, LinkGraph};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{SimError, SimResult};
use crate::options::{AgentFaultPolicy, ExecutionMode, RunOptions};
use crate::record::SimRecord;
use crate::topology::Topology;
use crate::view::ComponentStates;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Failed,
    /// Stopped between ticks by the caller.
    Stopped,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Failed | RunState::Stopped
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
            RunState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// An isolated agent fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentWarning {
    pub agent: String,
    pub tick: u64,
    pub message: String,
}

/// Outcome of one executed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    /// Index of the executed tick.
    pub tick: u64,
    /// Simulated time at the start of the tick.
    pub time: f64,
    /// Run state after the tick.
    pub state: RunState,
    /// Messages committed to the bus.
    pub published: usize,
    /// Actuation values staged on components.
    pub actuations: usize,
    /// Messages that became visible at the start of the tick.
    pub promoted: usize,
    pub warnings: Vec<AgentWarning>,
}

/// Outcome of a finished (or stopped) run.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalResult {
    pub state: RunState,
    pub ticks_executed: u64,
    pub final_tick: u64,
    pub warnings: Vec<AgentWarning>,
    pub published_total: u64,
}

/// A started run. Drive it with [`RunHandle::step`] or
/// [`RunHandle::run_to_completion`].
pub struct RunHandle {
    clock: SimulationClock,
    options: RunOptions,
    state: RunState,
    graph: LinkGraph,
    components: Vec<Box<dyn PhysicalComponent>>,
    agents: Vec<Agent>,
    queue_subscriptions: Vec<Vec<Topic>>,
    bus: MessageBus,
    record: SimRecord,
    warnings: Vec<AgentWarning>,
    ticks_executed: u64,
    failure: Option<SimError>,
}

/// Validate a topology and start a run.
///
/// Configuration errors are reported here and never later. A clock with
/// `end_tick == 0` yields a run that is already `Completed`.
pub fn start(topology: Topology, clock: ClockConfig, options: RunOptions) -> SimResult<RunHandle> {
    let clock = SimulationClock::new(clock).map_err(|e| SimError::config("clock", e))?;
    let Topology {
        components,
        links,
        mut agents,
        queue_topics,
    } = topology;

    let graph = build_graph(&components, &links)?;
    check_initial_states(&components)?;
    check_agents(&agents, &graph, &components)?;

    // Stable: registration order breaks ties within a layer.
    agents.sort_by_key(Agent::layer);

    let mut bus = MessageBus::new();
    for topic in queue_topics {
        bus.configure_queue(topic);
    }
    let queue_subscriptions = agents
        .iter()
        .map(|a| {
            a.subscriptions()
                .into_iter()
                .filter(|t| bus.mode(t) == DeliveryMode::Queue)
                .collect()
        })
        .collect();

    let mut record = SimRecord::for_components(&components);
    if options.record_every > 0 {
        record.push(0, 0.0, &components);
    }

    let mut handle = RunHandle {
        clock,
        options,
        state: RunState::Idle,
        graph,
        components,
        agents,
        queue_subscriptions,
        bus,
        record,
        warnings: Vec::new(),
        ticks_executed: 0,
        failure: None,
    };

    info!(
        components = handle.components.len(),
        links = handle.graph.links().len(),
        agents = handle.agents.len(),
        dt = handle.clock.dt(),
        end_tick = handle.clock.end_tick(),
        "run started"
    );
    handle.state = RunState::Running;
    if handle.clock.is_finished() {
        handle.state = RunState::Completed;
        info!(ticks = 0, "run completed");
    }
    Ok(handle)
}

fn build_graph(
    components: &[Box<dyn PhysicalComponent>],
    links: &[(String, String)],
) -> SimResult<LinkGraph> {
    let mut builder = GraphBuilder::new();
    for component in components {
        builder
            .add_component(component.id())
            .map_err(|e| SimError::config(component.id(), e))?;
    }
    for (from, to) in links {
        builder
            .link_by_name(from, to)
            .map_err(|e| SimError::config(format!("{} -> {}", from, to), e))?;
    }
    builder.build().map_err(|e| SimError::config("topology", e))
}

fn check_initial_states(components: &[Box<dyn PhysicalComponent>]) -> SimResult<()> {
    for component in components {
        if let Some((key, value)) = component.state().first_non_finite() {
            return Err(SimError::config(
                component.id(),
                format!("initial state '{}' is non-finite ({})", key, value),
            ));
        }
    }
    Ok(())
}

fn lookup<'a>(
    graph: &LinkGraph,
    components: &'a [Box<dyn PhysicalComponent>],
    agent: &str,
    name: &str,
) -> SimResult<&'a dyn PhysicalComponent> {
    graph
        .id(name)
        .and_then(|id| components.get(id.slot()))
        .map(|c| c.as_ref())
        .ok_or_else(|| SimError::config(agent, format!("unknown component '{}'", name)))
}

fn check_agents(
    agents: &[Agent],
    graph: &LinkGraph,
    components: &[Box<dyn PhysicalComponent>],
) -> SimResult<()> {
    let mut seen = BTreeSet::new();
    for agent in agents {
        let id = agent.id();
        agent.validate().map_err(|e| SimError::config(id, e))?;
        if !seen.insert(id) {
            return Err(SimError::config(id, "duplicate agent id"));
        }

        match agent {
            Agent::DigitalTwin(twin) => {
                lookup(graph, components, id, &twin.config().component)?;
            }
            Agent::LocalControl(lca) => {
                let cfg = lca.config();
                if let PvSource::Component { component, key } = &cfg.process_variable {
                    let comp = lookup(graph, components, id, component)?;
                    if !comp.state().contains(key) {
                        return Err(SimError::config(
                            id,
                            format!("component '{}' has no state '{}'", component, key),
                        ));
                    }
                }
                let target = lookup(graph, components, id, &cfg.actuator.component)?;
                if !target
                    .actuation_inputs()
                    .contains(&cfg.actuator.input.as_str())
                {
                    return Err(SimError::config(
                        id,
                        format!(
                            "component '{}' has no actuation input '{}'",
                            cfg.actuator.component, cfg.actuator.input
                        ),
                    ));
                }
            }
            Agent::CentralDispatcher(_) | Agent::Custom(_) => {}
        }
    }
    Ok(())
}

impl RunHandle {
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn current_tick(&self) -> u64 {
        self.clock.current_tick()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn record(&self) -> &SimRecord {
        &self.record
    }

    pub fn into_record(self) -> SimRecord {
        self.record
    }

    pub fn warnings(&self) -> &[AgentWarning] {
        &self.warnings
    }

    /// The error that failed the run, if any.
    pub fn failure(&self) -> Option<&SimError> {
        self.failure.as_ref()
    }

    pub fn component(&self, id: &str) -> Option<&dyn PhysicalComponent> {
        let cid = self.graph.id(id)?;
        self.components.get(cid.slot()).map(|c| c.as_ref())
    }

    /// Components in registration order.
    pub fn components(&self) -> impl Iterator<Item = &dyn PhysicalComponent> {
        self.components.iter().map(|c| c.as_ref())
    }

    /// Agent ids in execution order.
    pub fn agent_order(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(Agent::id)
    }

    /// Stop between ticks. Terminal; later `step` calls fail.
    pub fn stop(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = RunState::Stopped;
        self.record_final();
        info!(tick = self.clock.current_tick(), "run stopped");
    }

    /// Execute one tick.
    pub fn step(&mut self) -> SimResult<TickResult> {
        if self.state != RunState::Running {
            return Err(SimError::InvalidState {
                tick: self.clock.current_tick(),
                state: self.state,
            });
        }
        let ctx = self.clock.context();

        if let Err(e) = self.update_components(&ctx) {
            return Err(self.fail(e));
        }

        let stats = self.bus.advance_tick();
        let outputs = self.execute_agents(&ctx);

        let mut result = TickResult {
            tick: ctx.tick,
            time: ctx.time,
            state: RunState::Running,
            published: 0,
            actuations: 0,
            promoted: stats.promoted,
            warnings: Vec::new(),
        };

        for (index, output) in outputs.into_iter().enumerate() {
            let committed = output
                .and_then(|out| self.check_actuations(&out).map(|()| out))
                .and_then(|out| self.commit(index, out, ctx.tick, &mut result));
            if let Err(err) = committed {
                self.agent_fault(index, err, ctx.tick, &mut result)?;
            }
        }

        self.clock.advance();
        self.ticks_executed += 1;
        self.record_tick();

        if self.clock.is_finished() {
            self.state = RunState::Completed;
            info!(
                ticks = self.ticks_executed,
                warnings = self.warnings.len(),
                published = self.bus.published_total(),
                "run completed"
            );
        }
        result.state = self.state;

        debug!(
            tick = ctx.tick,
            published = result.published,
            actuations = result.actuations,
            promoted = result.promoted,
            warnings = result.warnings.len(),
            "tick complete"
        );
        Ok(result)
    }

    /// Step until the run leaves `Running`.
    pub fn run_to_completion(&mut self) -> SimResult<FinalResult> {
        self.run_with_progress(|_| {})
    }

    /// Step until the run leaves `Running`, reporting every tick.
    pub fn run_with_progress(
        &mut self,
        mut on_tick: impl FnMut(&TickResult),
    ) -> SimResult<FinalResult> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        while self.state == RunState::Running {
            let result = self.step()?;
            on_tick(&result);
        }
        Ok(self.final_result())
    }

    pub fn final_result(&self) -> FinalResult {
        FinalResult {
            state: self.state,
            ticks_executed: self.ticks_executed,
            final_tick: self.clock.current_tick(),
            warnings: self.warnings.clone(),
            published_total: self.bus.published_total(),
        }
    }

    fn update_components(&mut self, ctx: &TickContext) -> SimResult<()> {
        // Captured before any update so update order cannot change results.
        let outflows: Vec<f64> = self.components.iter().map(|c| c.outflow()).collect();
        let inputs: Vec<ExternalInputs> = self
            .graph
            .components()
            .map(|(id, _)| {
                let upstream = self.graph.upstream(id);
                let inflow: f64 = upstream.iter().map(|u| outflows[u.slot()]).sum();
                ExternalInputs::new(inflow, upstream.len())
            })
            .collect();

        let results: Vec<ComponentResult<()>> = match self.options.execution {
            ExecutionMode::Sequential => self
                .components
                .iter_mut()
                .zip(&inputs)
                .map(|(c, input)| c.update(ctx, input))
                .collect(),
            ExecutionMode::Parallel => self
                .components
                .par_iter_mut()
                .zip(inputs.par_iter())
                .map(|(c, input)| c.update(ctx, input))
                .collect(),
        };

        for (component, result) in self.components.iter().zip(results) {
            let failed = |what: String| SimError::ComponentUpdate {
                entity: component.id().to_string(),
                tick: ctx.tick,
                what,
            };
            result.map_err(|e| failed(e.to_string()))?;
            if let Some((key, value)) = component.state().first_non_finite() {
                return Err(failed(format!("state '{}' is non-finite ({})", key, value)));
            }
            let outflow = component.outflow();
            if !outflow.is_finite() {
                return Err(failed(format!("outflow is non-finite ({})", outflow)));
            }
        }
        Ok(())
    }

    fn execute_agents(&mut self, ctx: &TickContext) -> Vec<AgentResult<AgentOutput>> {
        let view = ComponentStates {
            graph: &self.graph,
            components: &self.components,
        };
        let agent_ctx = AgentContext::new(*ctx, &self.bus, &view);
        match self.options.execution {
            ExecutionMode::Sequential => self
                .agents
                .iter_mut()
                .map(|a| a.execute(&agent_ctx))
                .collect(),
            ExecutionMode::Parallel => self
                .agents
                .par_iter_mut()
                .map(|a| a.execute(&agent_ctx))
                .collect(),
        }
    }

    fn check_actuations(&self, out: &AgentOutput) -> AgentResult<()> {
        for act in &out.actuations {
            let invalid = |what| AgentError::InvalidActuation {
                component: act.component.clone(),
                input: act.input.clone(),
                what,
            };
            let Some(component) = self.component(&act.component) else {
                return Err(AgentError::UnknownComponent {
                    component: act.component.clone(),
                });
            };
            if !component.actuation_inputs().contains(&act.input.as_str()) {
                return Err(invalid("input not declared by the component"));
            }
            if !act.value.is_finite() {
                return Err(invalid("value is non-finite"));
            }
        }
        Ok(())
    }

    fn commit(
        &mut self,
        index: usize,
        out: AgentOutput,
        tick: u64,
        result: &mut TickResult,
    ) -> AgentResult<()> {
        for act in out.actuations {
            let slot = self
                .graph
                .id(&act.component)
                .map(|id| id.slot())
                .ok_or_else(|| AgentError::UnknownComponent {
                    component: act.component.clone(),
                })?;
            self.components[slot]
                .stage_input(&act.input, act.value)
                .map_err(|e| AgentError::Failed {
                    what: e.to_string(),
                })?;
            result.actuations += 1;
        }
        for (topic, payload) in out.publishes {
            self.bus.publish(topic, payload, tick);
            result.published += 1;
        }
        for topic in &self.queue_subscriptions[index] {
            self.bus.mark_consumed(topic);
        }
        Ok(())
    }

    fn agent_fault(
        &mut self,
        index: usize,
        err: AgentError,
        tick: u64,
        result: &mut TickResult,
    ) -> SimResult<()> {
        let agent = self.agents[index].id().to_string();
        match self.options.agent_faults {
            AgentFaultPolicy::Isolate => {
                warn!(agent = %agent, tick, error = %err, "agent output discarded");
                let warning = AgentWarning {
                    agent,
                    tick,
                    message: err.to_string(),
                };
                self.warnings.push(warning.clone());
                result.warnings.push(warning);
                Ok(())
            }
            AgentFaultPolicy::Fatal => Err(self.fail(SimError::AgentExecution {
                entity: agent,
                tick,
                what: err.to_string(),
            })),
        }
    }

    fn fail(&mut self, err: SimError) -> SimError {
        self.state = RunState::Failed;
        error!(tick = err.tick(), error = %err, "run failed");
        self.failure = Some(err.clone());
        err
    }

    fn record_tick(&mut self) {
        let every = self.options.record_every as u64;
        if every == 0 {
            return;
        }
        let tick = self.clock.current_tick();
        if tick % every == 0 || self.clock.is_finished() {
            self.record.push(tick, self.clock.time(), &self.components);
        }
    }

    fn record_final(&mut self) {
        let tick = self.clock.current_tick();
        if self.options.record_every > 0 && self.record.last_tick() != Some(tick) {
            self.record.push(tick, self.clock.time(), &self.components);
        }
    }
}

impl fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunHandle")
            .field("state", &self.state)
            .field("tick", &self.clock.current_tick())
            .field("end_tick", &self.clock.end_tick())
            .field("agents", &self.agents)
            .finish()
    }
}
