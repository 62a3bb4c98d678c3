//! Shared application service layer for hydroflow.
//!
//! Frontends go through this crate to load and validate scenarios, compile
//! them into a runnable topology, execute runs and fingerprint the results.

pub mod compile;
pub mod digest;
pub mod error;
pub mod run_service;
pub mod scenario_service;

pub use compile::{CompiledScenario, build_agent, build_component, compile_scenario};
pub use digest::{scenario_hash, trajectory_digest};
pub use error::{AppError, AppResult};
pub use run_service::{
    RunOverrides, RunResponse, RunSummary, run_scenario, run_scenario_def,
    run_scenario_with_progress,
};
pub use scenario_service::{
    AgentSummary, ComponentSummary, ScenarioSummary, load_scenario, summarize,
    validate_scenario_file,
};
