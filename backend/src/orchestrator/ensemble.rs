//! Multi-seed ensembles
//!
//! Runs one config under several seeds and aggregates the outcomes. Runs are
//! independent, so the report depends only on the config and the seed list.

use crate::orchestrator::engine::{
    simulate, validate_config, SimulationConfig, SimulationError, SimulationResult,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Per-run line of an ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleRun {
    pub seed: u64,
    pub incidents: usize,
    pub final_pressure: f64,
    pub final_risk: f64,
    pub digest: String,
}

/// Aggregate over an ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleReport {
    pub runs: Vec<EnsembleRun>,
    pub mean_incidents: f64,
    pub mean_final_pressure: f64,
    pub mean_final_risk: f64,
    /// Share of runs ending with escalation risk >= 0.6
    pub escalated_share: f64,
}

impl EnsembleReport {
    fn from_results(results: &[SimulationResult]) -> Result<Self, SimulationError> {
        let runs = results
            .iter()
            .map(|result| {
                Ok(EnsembleRun {
                    seed: result.seed,
                    incidents: result.incidents.len(),
                    final_pressure: result.final_pressure,
                    final_risk: result.final_risk,
                    digest: result.digest()?,
                })
            })
            .collect::<Result<Vec<_>, SimulationError>>()?;

        let n = results.len() as f64;
        let mean = |f: fn(&EnsembleRun) -> f64| runs.iter().map(f).sum::<f64>() / n;

        Ok(Self {
            mean_incidents: mean(|r| r.incidents as f64),
            mean_final_pressure: mean(|r| r.final_pressure),
            mean_final_risk: mean(|r| r.final_risk),
            escalated_share: results.iter().filter(|r| r.escalated()).count() as f64 / n,
            runs,
        })
    }
}

/// Run `config` once per seed, overriding any seed it carries
pub fn run_ensemble(
    config: &SimulationConfig,
    seeds: &[u64],
) -> Result<EnsembleReport, SimulationError> {
    if seeds.is_empty() {
        return Err(SimulationError::InvalidConfig(
            "Ensemble needs at least one seed".to_string(),
        ));
    }
    validate_config(config)?;

    let results = seeds
        .iter()
        .map(|&seed| simulate(config.clone().with_seed(seed)))
        .collect::<Result<Vec<_>, _>>()?;

    let report = EnsembleReport::from_results(&results)?;
    info!(
        runs = report.runs.len(),
        mean_incidents = report.mean_incidents,
        mean_final_risk = report.mean_final_risk,
        escalated_share = report.escalated_share,
        "Ensemble complete"
    );
    Ok(report)
}
