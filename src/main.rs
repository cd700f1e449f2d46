//! task-sched - CPU scheduling policy simulator
//!
//! Installs the named policies, then runs the same workload under each one
//! and writes `<policy>.log` and `<policy>.json` reports.
//!
//! Usage: task-sched fcfs rr prr srtn oddeven

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use task_sched::dispatching::{registry, Dispatcher};
use task_sched::logger;
use task_sched::report;
use task_sched::simulation::{Simulation, SimulationConfig, TaskSpec};

#[derive(Parser)]
#[command(name = "task-sched")]
#[command(about = "Simulates a workload under pluggable CPU scheduling policies")]
struct Args {
    /// Policy modules to install (e.g. fcfs, rr, prr, srtn, oddeven)
    policies: Vec<String>,

    /// Simulation config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Explicit task set (JSON array of tasks) instead of a generated one
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// Generator seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of generated tasks
    #[arg(long = "count")]
    task_count: Option<usize>,

    /// Directory for report files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Skip writing report files
    #[arg(long)]
    no_report: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(logger::level_for_verbosity(args.verbose)).context("Failed to set logger")?;

    if args.policies.is_empty() {
        eprintln!(
            "No scheduling policy given. Available: {}",
            registry::builtin_names().join(", ")
        );
        process::exit(-1);
    }

    let mut dispatcher = Dispatcher::new();
    for identifier in &args.policies {
        let installed = registry::load(identifier)
            .and_then(|descriptor| dispatcher.install_policy(descriptor));
        if let Err(err) = installed {
            eprintln!("Could not install policy '{identifier}': {err}");
            process::exit(-1);
        }
    }

    let config = load_config(&args)?;
    let simulation = match &args.tasks {
        Some(path) => Simulation::with_tasks(config, read_tasks(path)?)?,
        None => Simulation::new(config)?,
    };

    for name in dispatcher.list_policy_names() {
        println!("Found algorithm: {name}");
        let report = simulation
            .run(&mut dispatcher, &name)
            .with_context(|| format!("Simulation under '{name}' failed"))?;
        println!(
            "  makespan {}, mean response {:.3}, mean norm response {:.3}, context switches {}",
            report.makespan,
            report.mean_response,
            report.mean_normalized_response,
            report.context_switches
        );
        if !args.no_report {
            report::write_reports(&report, &args.output_dir)
                .with_context(|| format!("Failed to write reports for '{name}'"))?;
        }
    }

    dispatcher.teardown();
    Ok(())
}

/// Defaults, then the config file, then command-line overrides.
fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid config in {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(count) = args.task_count {
        config = config.with_task_count(count);
    }
    Ok(config)
}

fn read_tasks(path: &Path) -> Result<Vec<TaskSpec>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid task set in {}", path.display()))
}
