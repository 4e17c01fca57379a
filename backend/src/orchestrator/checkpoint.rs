//! Checkpoint - Save/Load Simulation State
//!
//! Enables serialization and deserialization of complete simulator state
//! for pause/resume between steps, plus the fingerprints used to compare
//! runs.
//!
//! # Critical Invariants
//!
//! - **Determinism**: a restored run continues exactly as the original would
//! - **History Integrity**: incident steps non-decreasing and in the past
//! - **Config Matching**: state can only be loaded with matching config
//! - **Bounds**: restored scalars sit inside the ranges the step rules keep

use crate::models::agent::{Agent, AGGRESSION_CEILING, AGGRESSION_FLOOR};
use crate::models::incident::{Incident, IncidentLog};
use crate::models::state::{ProcessState, PRESSURE_CEILING, PRESSURE_FLOOR};
use crate::orchestrator::engine::{ConflictSimulator, ProcessSnapshot, SimulationConfig};
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

// ============================================================================
// Snapshot Structure
// ============================================================================

/// Complete simulator state snapshot
///
/// Captures everything needed to resume a run from the step boundary at
/// which it was taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub run_id: String,

    /// Steps already executed
    pub current_step: usize,

    /// Seed the run started from
    pub seed: u64,

    /// Generator state at the step boundary (CRITICAL for determinism)
    pub rng_state: u64,

    pub agents: Vec<Agent>,
    pub process: ProcessState,
    pub incidents: IncidentLog,
    pub trajectory: Vec<ProcessSnapshot>,

    /// SHA256 hash of the config with the seed stripped (for validation)
    pub config_hash: String,
}

impl ConflictSimulator {
    /// Capture current state
    pub fn save_state(&self) -> Result<StateSnapshot, SimulationError> {
        Ok(StateSnapshot {
            run_id: self.run_id().to_string(),
            current_step: self.current_step(),
            seed: self.seed(),
            rng_state: self.rng_state(),
            agents: self.agents().to_vec(),
            process: *self.process(),
            incidents: self.incident_log().clone(),
            trajectory: self.trajectory().to_vec(),
            config_hash: config_fingerprint(self.config())?,
        })
    }

    /// Capture current state as JSON
    pub fn save_state_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string(&self.save_state()?)
            .map_err(|e| SimulationError::SerializationError(e.to_string()))
    }

    /// Resume a run from a snapshot taken under the same config
    pub fn load_state(
        config: SimulationConfig,
        snapshot: StateSnapshot,
    ) -> Result<Self, SimulationError> {
        let expected = config_fingerprint(&config)?;
        if snapshot.config_hash != expected {
            return Err(SimulationError::StateValidationError(
                "Config hash mismatch: snapshot was taken under a different config".to_string(),
            ));
        }
        validate_snapshot(&snapshot, &config)?;

        info!(
            run_id = %snapshot.run_id,
            step = snapshot.current_step,
            incidents = snapshot.incidents.len(),
            "Restoring simulation from checkpoint"
        );

        ConflictSimulator::from_parts(config, snapshot)
    }

    /// Resume a run from JSON produced by [`ConflictSimulator::save_state_json`]
    pub fn load_state_json(config: SimulationConfig, json: &str) -> Result<Self, SimulationError> {
        let snapshot: StateSnapshot = serde_json::from_str(json)
            .map_err(|e| SimulationError::SerializationError(e.to_string()))?;
        Self::load_state(config, snapshot)
    }
}

/// Hash of a config ignoring its seed, which the snapshot carries itself
fn config_fingerprint(config: &SimulationConfig) -> Result<String, SimulationError> {
    let mut unseeded = config.clone();
    unseeded.seed = None;
    compute_config_hash(&unseeded)
}

// ============================================================================
// Hashing
// ============================================================================

/// Compute deterministic SHA256 hash of config
///
/// Uses canonical JSON serialization with sorted keys so the hash does not
/// depend on map iteration order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// SHA256 fingerprint of an incident sequence
///
/// Two runs with the same seed and config produce the same digest.
pub fn run_digest(incidents: &[Incident]) -> Result<String, SimulationError> {
    let json = serde_json::to_string(incidents).map_err(|e| {
        SimulationError::SerializationError(format!("Incident serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation
// ============================================================================

/// Validate snapshot integrity against the config it is restored under
///
/// Checks:
/// - Step position within the configured horizon
/// - One trajectory point per executed step
/// - Incidents in the past, steps non-decreasing
/// - Roster size unchanged
/// - Aggression, pressure, risk and severity within their bounds
pub fn validate_snapshot(
    snapshot: &StateSnapshot,
    config: &SimulationConfig,
) -> Result<(), SimulationError> {
    if snapshot.current_step > config.steps {
        return Err(SimulationError::StateValidationError(format!(
            "Snapshot step {} beyond configured {} steps",
            snapshot.current_step, config.steps
        )));
    }

    if snapshot.trajectory.len() != snapshot.current_step {
        return Err(SimulationError::StateValidationError(format!(
            "Trajectory has {} points for {} executed steps",
            snapshot.trajectory.len(),
            snapshot.current_step
        )));
    }

    let mut last_step = 0;
    for incident in &snapshot.incidents {
        if incident.step() >= snapshot.current_step {
            return Err(SimulationError::StateValidationError(format!(
                "Incident at step {} recorded before step {} executed",
                incident.step(),
                snapshot.current_step
            )));
        }
        if incident.step() < last_step {
            return Err(SimulationError::StateValidationError(
                "Incident steps out of order".to_string(),
            ));
        }
        last_step = incident.step();
        check_bounds("incident severity", incident.severity(), 0.0, 1.0)?;
    }

    check_bounds(
        "incident pressure",
        snapshot.process.incident_pressure(),
        PRESSURE_FLOOR,
        PRESSURE_CEILING,
    )?;
    check_bounds("escalation risk", snapshot.process.escalation_risk(), 0.0, 1.0)?;
    for agent in &snapshot.agents {
        check_bounds(
            &format!("aggression of {}", agent.id()),
            agent.aggression(),
            AGGRESSION_FLOOR,
            AGGRESSION_CEILING,
        )?;
    }

    let expected_agents = match (&config.roster, config.domain.parse::<crate::domains::Domain>()) {
        (Some(roster), _) => roster.len(),
        (None, Ok(domain)) => domain.default_roster().len(),
        (None, Err(_)) => return Err(SimulationError::UnknownDomain(config.domain.clone())),
    };
    if snapshot.agents.len() != expected_agents {
        return Err(SimulationError::StateValidationError(format!(
            "Snapshot has {} agents, config expects {}",
            snapshot.agents.len(),
            expected_agents
        )));
    }

    Ok(())
}

fn check_bounds(what: &str, value: f64, min: f64, max: f64) -> Result<(), SimulationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SimulationError::StateValidationError(format!(
            "Snapshot {} {} outside [{}, {}]",
            what, value, min, max
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_config_hash_deterministic() {
        let config1 = SimulationConfig::new(100, "maritime").with_seed(42);
        let config2 = SimulationConfig::new(100, "maritime").with_seed(42);

        assert_eq!(
            compute_config_hash(&config1).unwrap(),
            compute_config_hash(&config2).unwrap(),
            "Same config should produce same hash"
        );
    }

    #[test]
    fn test_compute_config_hash_different_for_different_configs() {
        let config1 = SimulationConfig::new(100, "maritime");
        let config2 = SimulationConfig::new(100, "resource");

        assert_ne!(
            compute_config_hash(&config1).unwrap(),
            compute_config_hash(&config2).unwrap(),
            "Different configs should produce different hashes"
        );
    }

    #[test]
    fn test_run_digest_of_empty_history_is_stable() {
        assert_eq!(run_digest(&[]).unwrap(), run_digest(&[]).unwrap());
    }

    #[test]
    fn test_snapshot_rejected_under_other_config() {
        let mut simulator =
            ConflictSimulator::new(SimulationConfig::new(20, "maritime").with_seed(3)).unwrap();
        simulator.step();
        let snapshot = simulator.save_state().unwrap();

        let result =
            ConflictSimulator::load_state(SimulationConfig::new(20, "territorial"), snapshot);
        assert!(matches!(result, Err(SimulationError::StateValidationError(_))));
    }
}
