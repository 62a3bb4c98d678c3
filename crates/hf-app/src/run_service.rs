//! Run execution service.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use hf_project::ScenarioDef;
use hf_sim::{AgentWarning, ExecutionMode, RunState, SimRecord, TickResult};
use serde::Serialize;
use tracing::{info, warn};

use crate::compile::compile_scenario;
use crate::digest::scenario_hash;
use crate::error::{AppError, AppResult};
use crate::scenario_service::load_scenario;

/// Command-line style adjustments applied on top of a scenario file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub end_tick: Option<u64>,
    pub dt: Option<f64>,
    /// Force the parallel execution mode.
    pub parallel: bool,
}

impl RunOverrides {
    fn apply(&self, scenario: &mut ScenarioDef) -> AppResult<()> {
        if let Some(dt) = self.dt {
            if !dt.is_finite() || dt <= 0.0 {
                return Err(AppError::InvalidInput(format!(
                    "dt override must be positive and finite, got {}",
                    dt
                )));
            }
            scenario.clock.dt = dt;
        }
        if let Some(end_tick) = self.end_tick {
            scenario.clock.end_tick = end_tick;
        }
        Ok(())
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub scenario: String,
    pub scenario_hash: String,
    /// Wall-clock start, RFC 3339.
    pub started_at: String,
    pub elapsed_s: f64,
    pub final_state: RunState,
    pub ticks_executed: u64,
    pub final_tick: u64,
    pub published_total: u64,
    pub warnings: Vec<AgentWarning>,
    /// Error that failed the run, if any.
    pub failure: Option<String>,
    /// Component id -> state key -> value at the end of the run.
    pub final_states: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    pub summary: RunSummary,
    pub record: SimRecord,
}

/// Load a scenario file and run it to completion.
pub fn run_scenario(path: &Path, overrides: &RunOverrides) -> AppResult<RunResponse> {
    run_scenario_with_progress(path, overrides, |_| {})
}

/// Load a scenario file and run it, reporting every tick.
pub fn run_scenario_with_progress(
    path: &Path,
    overrides: &RunOverrides,
    on_tick: impl FnMut(&TickResult),
) -> AppResult<RunResponse> {
    let scenario = load_scenario(path)?;
    execute(scenario, overrides, on_tick)
}

/// Run an in-memory scenario to completion.
pub fn run_scenario_def(scenario: &ScenarioDef, overrides: &RunOverrides) -> AppResult<RunResponse> {
    execute(scenario.clone(), overrides, |_| {})
}

fn execute(
    mut scenario: ScenarioDef,
    overrides: &RunOverrides,
    on_tick: impl FnMut(&TickResult),
) -> AppResult<RunResponse> {
    overrides.apply(&mut scenario)?;

    let run_id = uuid::Uuid::new_v4().to_string();
    let started_at = chrono::Utc::now().to_rfc3339();
    let started = Instant::now();

    let mut compiled = compile_scenario(&scenario)?;
    if overrides.parallel {
        compiled.options.execution = ExecutionMode::Parallel;
    }
    info!(
        run_id = %run_id,
        scenario = %scenario.name,
        end_tick = compiled.clock.end_tick,
        "starting run"
    );

    let mut handle = hf_sim::start(compiled.topology, compiled.clock, compiled.options)?;
    let final_result = match handle.run_with_progress(on_tick) {
        Ok(result) => result,
        Err(err) if handle.state() == RunState::Failed => {
            warn!(run_id = %run_id, error = %err, "run ended in failure");
            handle.final_result()
        }
        Err(err) => return Err(err.into()),
    };

    let final_states = handle
        .components()
        .map(|c| (c.id().to_string(), c.state().to_map()))
        .collect();
    let failure = handle.failure().map(ToString::to_string);
    let elapsed_s = started.elapsed().as_secs_f64();

    info!(
        run_id = %run_id,
        state = %final_result.state,
        ticks = final_result.ticks_executed,
        elapsed_s,
        "run finished"
    );

    let summary = RunSummary {
        run_id,
        scenario: scenario.name.clone(),
        scenario_hash: scenario_hash(&scenario),
        started_at,
        elapsed_s,
        final_state: final_result.state,
        ticks_executed: final_result.ticks_executed,
        final_tick: final_result.final_tick,
        published_total: final_result.published_total,
        warnings: final_result.warnings,
        failure,
        final_states,
    };

    Ok(RunResponse {
        summary,
        record: handle.into_record(),
    })
}
