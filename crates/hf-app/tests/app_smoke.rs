use std::path::{Path, PathBuf};

use hf_app::{RunOverrides, run_scenario, summarize, trajectory_digest, validate_scenario_file};
use hf_sim::RunState;

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos").join(name)
}

#[test]
fn level_loop_runs_to_completion() {
    let response = run_scenario(&demo("01_reservoir_level_loop.yaml"), &RunOverrides::default())
        .expect("run failed");
    let summary = &response.summary;

    assert_eq!(summary.final_state, RunState::Completed);
    assert_eq!(summary.ticks_executed, 600);
    assert_eq!(summary.final_tick, 600);
    assert!(summary.warnings.is_empty());
    assert!(summary.failure.is_none());
    assert!(uuid::Uuid::parse_str(&summary.run_id).is_ok());
    assert!(chrono::DateTime::parse_from_rfc3339(&summary.started_at).is_ok());

    let level = summary.final_states["res1"]["water_level"];
    assert!((8.0..=10.0).contains(&level), "level {} outside band", level);

    // Tick 0 plus one row per tick.
    assert_eq!(response.record.len(), 601);
}

#[test]
fn overrides_shorten_the_run() {
    let overrides = RunOverrides {
        end_tick: Some(25),
        dt: Some(0.5),
        parallel: false,
    };
    let response = run_scenario(&demo("01_reservoir_level_loop.yaml"), &overrides).unwrap();
    assert_eq!(response.summary.ticks_executed, 25);
    assert_eq!(response.record.t.last().copied(), Some(12.5));
}

#[test]
fn bad_dt_override_is_rejected() {
    let overrides = RunOverrides {
        dt: Some(-1.0),
        ..RunOverrides::default()
    };
    let err = run_scenario(&demo("01_reservoir_level_loop.yaml"), &overrides).unwrap_err();
    assert!(matches!(err, hf_app::AppError::InvalidInput(_)));
}

#[test]
fn repeated_runs_share_a_digest() {
    let path = demo("01_reservoir_level_loop.yaml");
    let first = run_scenario(&path, &RunOverrides::default()).unwrap();
    let second = run_scenario(&path, &RunOverrides::default()).unwrap();

    assert_ne!(first.summary.run_id, second.summary.run_id);
    assert_eq!(first.summary.scenario_hash, second.summary.scenario_hash);
    assert_eq!(trajectory_digest(&first.record), trajectory_digest(&second.record));
}

#[test]
fn parallel_matches_sequential() {
    let path = demo("01_reservoir_level_loop.yaml");
    let sequential = run_scenario(&path, &RunOverrides::default()).unwrap();
    let parallel = run_scenario(
        &path,
        &RunOverrides {
            parallel: true,
            ..RunOverrides::default()
        },
    )
    .unwrap();
    assert_eq!(
        trajectory_digest(&sequential.record),
        trajectory_digest(&parallel.record)
    );
    assert_eq!(sequential.summary.final_states, parallel.summary.final_states);
}

#[test]
fn canal_demo_records_decimated_rows() {
    let response = run_scenario(&demo("02_reservoir_canal_reach.yaml"), &RunOverrides::default())
        .unwrap();
    assert_eq!(response.summary.final_state, RunState::Completed);
    // Ticks 0, 10, ..., 300.
    assert_eq!(response.record.len(), 31);
    assert_eq!(response.record.last_tick(), Some(300));
    let volumes = response.record.series("reach1", "volume").unwrap();
    assert!(volumes.iter().all(|v| *v >= 0.0));
}

#[test]
fn summary_lists_topology() {
    let scenario = validate_scenario_file(&demo("01_reservoir_level_loop.yaml")).unwrap();
    let summary = summarize(&scenario);

    let ids: Vec<_> = summary.components.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["gate1", "res1"]);
    assert_eq!(summary.links, vec![("gate1".to_string(), "res1".to_string())]);

    let lca = summary.agents.iter().find(|a| a.id == "lca_gate1").unwrap();
    assert_eq!(lca.kind, "local_control");
    assert_eq!(lca.subscribes, ["command/res1/level", "state/res1"]);
    assert_eq!(lca.publishes, ["control/gate1"]);
    assert_eq!(summary.queue_topics, ["command/res1/level"]);
}

#[test]
fn missing_file_reports_path() {
    let err = validate_scenario_file(&demo("does_not_exist.yaml")).unwrap_err();
    assert!(err.to_string().contains("does_not_exist.yaml"));
}
