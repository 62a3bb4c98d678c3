use clap::{Parser, Subcommand};
use hf_app::{AppError, AppResult, RunOverrides, RunResponse};
use hf_sim::{RunState, TickResult};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hf-cli")]
#[command(about = "HydroFlow CLI - agent-controlled water network simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax, references and compilation
    Validate {
        /// Path to the scenario file (YAML or JSON)
        scenario: PathBuf,
    },
    /// Run a scenario to completion
    Run {
        /// Path to the scenario file (YAML or JSON)
        scenario: PathBuf,
        /// Override the number of ticks
        #[arg(long)]
        end_tick: Option<u64>,
        /// Override the step size in seconds
        #[arg(long)]
        dt: Option<f64>,
        /// Execute the update and agent phases on the rayon pool
        #[arg(long)]
        parallel: bool,
        /// Print the trajectory digest
        #[arg(long)]
        digest: bool,
    },
    /// List components, links and agents of a scenario
    Summary {
        /// Path to the scenario file (YAML or JSON)
        scenario: PathBuf,
    },
    /// Run a scenario and export one state series as CSV
    ExportSeries {
        /// Path to the scenario file (YAML or JSON)
        scenario: PathBuf,
        /// Component id
        component: String,
        /// State key (e.g., volume, water_level, opening)
        key: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario } => cmd_validate(&scenario),
        Commands::Run {
            scenario,
            end_tick,
            dt,
            parallel,
            digest,
        } => cmd_run(
            &scenario,
            &RunOverrides {
                end_tick,
                dt,
                parallel,
            },
            digest,
        ),
        Commands::Summary { scenario } => cmd_summary(&scenario),
        Commands::ExportSeries {
            scenario,
            component,
            key,
            output,
        } => cmd_export_series(&scenario, &component, &key, output.as_deref()),
    }
}

fn cmd_validate(path: &Path) -> AppResult<()> {
    info!(scenario = %path.display(), "validate");
    println!("Validating scenario: {}", path.display());
    let scenario = hf_app::validate_scenario_file(path)?;
    println!(
        "✓ Scenario '{}' is valid ({} components, {} agents)",
        scenario.name,
        scenario.components.len(),
        scenario.agents.len()
    );
    Ok(())
}

fn cmd_summary(path: &Path) -> AppResult<()> {
    info!(scenario = %path.display(), "summary");
    let scenario = hf_app::load_scenario(path)?;
    let summary = hf_app::summarize(&scenario);

    println!("Scenario: {}", summary.name);
    println!("  dt = {:.3} s, end_tick = {}", summary.dt, summary.end_tick);

    println!("Components:");
    for c in &summary.components {
        if c.actuation_inputs.is_empty() {
            println!("  {} ({})", c.id, c.kind);
        } else {
            println!("  {} ({}) inputs: {}", c.id, c.kind, c.actuation_inputs.join(", "));
        }
    }

    println!("Links:");
    if summary.links.is_empty() {
        println!("  (none)");
    }
    for (from, to) in &summary.links {
        println!("  {} -> {}", from, to);
    }

    println!("Agents:");
    for a in &summary.agents {
        println!("  {} ({})", a.id, a.kind);
        if !a.subscribes.is_empty() {
            println!("    subscribes: {}", a.subscribes.join(", "));
        }
        if !a.publishes.is_empty() {
            println!("    publishes:  {}", a.publishes.join(", "));
        }
    }

    if !summary.queue_topics.is_empty() {
        println!("Queue topics: {}", summary.queue_topics.join(", "));
    }
    Ok(())
}

fn run_with_progress(path: &Path, overrides: &RunOverrides) -> AppResult<RunResponse> {
    let mut last_emit = Instant::now();
    let response = hf_app::run_scenario_with_progress(path, overrides, |tick| {
        if last_emit.elapsed().as_millis() >= 100 {
            render_cli_progress(tick);
            last_emit = Instant::now();
        }
    })?;
    clear_progress_line();
    Ok(response)
}

fn cmd_run(path: &Path, overrides: &RunOverrides, digest: bool) -> AppResult<()> {
    info!(
        scenario = %path.display(),
        end_tick = ?overrides.end_tick,
        dt = ?overrides.dt,
        parallel = overrides.parallel,
        "run"
    );
    println!("Running scenario: {}", path.display());
    let response = run_with_progress(path, overrides)?;
    let summary = &response.summary;

    match summary.final_state {
        RunState::Completed => println!("✓ Run completed: {}", summary.run_id),
        state => println!("✗ Run ended {}: {}", state, summary.run_id),
    }
    println!("  Started: {}", summary.started_at);
    println!(
        "  Ticks: {} (final tick {}), wall time {:.3} s",
        summary.ticks_executed, summary.final_tick, summary.elapsed_s
    );
    println!("  Messages published: {}", summary.published_total);
    println!("  Recorded rows: {}", response.record.len());

    if !summary.warnings.is_empty() {
        println!("  Agent warnings: {}", summary.warnings.len());
        for w in summary.warnings.iter().take(10) {
            println!("    tick {} {}: {}", w.tick, w.agent, w.message);
        }
    }
    if let Some(failure) = &summary.failure {
        println!("  Failure: {}", failure);
    }

    println!("Final states:");
    for (id, state) in &summary.final_states {
        let values: Vec<String> = state.iter().map(|(k, v)| format!("{}={:.4}", k, v)).collect();
        println!("  {}: {}", id, values.join(", "));
    }

    if digest {
        println!("Trajectory digest: {}", hf_app::trajectory_digest(&response.record));
    }

    if summary.final_state == RunState::Failed {
        return Err(AppError::Simulation(
            summary.failure.clone().unwrap_or_else(|| "run failed".to_string()),
        ));
    }
    Ok(())
}

fn cmd_export_series(
    path: &Path,
    component: &str,
    key: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    info!(scenario = %path.display(), component, key, "export series");
    let response = run_with_progress(path, &RunOverrides::default())?;
    let record = &response.record;

    let series = record.series(component, key).ok_or_else(|| {
        AppError::InvalidInput(format!("No recorded series {}.{}", component, key))
    })?;

    let mut csv = String::from("tick,time_s,value\n");
    for ((tick, t), value) in record.ticks.iter().zip(&record.t).zip(&series) {
        csv.push_str(&format!("{},{},{}\n", tick, t, value));
    }

    if let Some(out) = output {
        std::fs::write(out, csv)?;
        println!("✓ Exported {} data points to {}", series.len(), out.display());
    } else {
        print!("{}", csv);
    }
    Ok(())
}

fn render_cli_progress(tick: &TickResult) {
    let line = format!(
        "[tick {}] t={:.2} s published={} actuations={}",
        tick.tick + 1,
        tick.time,
        tick.published,
        tick.actuations
    );
    print!("\r{:<80}", line);
    let _ = io::stdout().flush();
}

fn clear_progress_line() {
    print!("\r{:<80}\r", "");
    let _ = io::stdout().flush();
}
