//! agreement-sim - command-line front end
//!
//! Reads scenario and session files as JSON, runs the engines, and prints
//! JSON results to stdout. Logs go to stderr.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use agreement_simulator_core_rs::bargaining::Session;
use agreement_simulator_core_rs::orchestrator::{run_ensemble, simulate, SimulationConfig};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Agreement stress simulator
#[derive(Parser)]
#[command(name = "agreement-sim")]
#[command(about = "Stress-test agreements over disputed areas", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level
    #[arg(long, env = "AGREEMENT_SIM_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "AGREEMENT_SIM_LOG_JSON", global = true)]
    json_logs: bool,

    /// Pretty-print output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a conflict simulation
    Simulate {
        /// Scenario file (SimulationConfig JSON)
        #[arg(short, long)]
        scenario: PathBuf,

        /// Override the scenario seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the scenario step count
        #[arg(long)]
        steps: Option<usize>,

        /// Print flat incident rows instead of the full result
        #[arg(long)]
        rows: bool,
    },

    /// Run one scenario under several seeds
    Ensemble {
        /// Scenario file (SimulationConfig JSON)
        #[arg(short, long)]
        scenario: PathBuf,

        /// Comma-separated seeds
        #[arg(long, value_delimiter = ',', required = true)]
        seeds: Vec<u64>,
    },

    /// Evaluate a scripted negotiation session
    Evaluate {
        /// Session file (config, parties, proposals)
        #[arg(short = 'S', long)]
        session: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    match cli.command {
        Command::Simulate {
            scenario,
            seed,
            steps,
            rows,
        } => {
            let mut config: SimulationConfig = read_json(&scenario)?;
            if let Some(seed) = seed {
                config.seed = Some(seed);
            }
            if let Some(steps) = steps {
                config.steps = steps;
            }

            let result = simulate(config)
                .with_context(|| format!("simulation of {} failed", scenario.display()))?;
            info!(
                seed = result.seed,
                incidents = result.incidents.len(),
                "Writing simulation output"
            );

            if rows {
                write_json(&result.rows(), cli.pretty)
            } else {
                write_json(&result, cli.pretty)
            }
        }

        Command::Ensemble { scenario, seeds } => {
            let config: SimulationConfig = read_json(&scenario)?;
            if seeds.is_empty() {
                bail!("at least one seed is required");
            }
            let report = run_ensemble(&config, &seeds)
                .with_context(|| format!("ensemble over {} failed", scenario.display()))?;
            write_json(&report, cli.pretty)
        }

        Command::Evaluate { session } => {
            let parsed: Session = read_json(&session)?;
            let outcomes = parsed
                .run()
                .with_context(|| format!("evaluation of {} failed", session.display()))?;
            write_json(&outcomes, cli.pretty)
        }
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| log_level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
