//! Conflict Simulator Engine
//!
//! Main simulation loop advancing a friction population through discrete
//! steps under an optional agreement.
//!
//! # Architecture
//!
//! ```text
//! For each step t:
//!   For each agent (roster order):
//!     1. Belief update (process scalars, recent activity, agreement confidence)
//!     2. Threshold adjustment (agreement terms, domain effects, context)
//!     3. Incident decision (uniform roll vs aggression, weighted type, severity)
//!     4. Aggression update (decay, pressure, contagion, de-escalation, weather)
//!   5. Process update (pressure drift/damping, escalation risk trend)
//!   6. Record trajectory point, advance clock
//! ```
//!
//! # Example
//!
//! ```rust
//! use agreement_simulator_core_rs::models::{Agreement, TermValue};
//! use agreement_simulator_core_rs::orchestrator::{ConflictSimulator, SimulationConfig};
//!
//! let agreement = Agreement::new()
//!     .with_term("resupply_SOP", [("standoff_nm", TermValue::from(5.0))]);
//!
//! let config = SimulationConfig::new(50, "maritime")
//!     .with_seed(42)
//!     .with_agreement(agreement);
//!
//! let mut simulator = ConflictSimulator::new(config).unwrap();
//! let result = simulator.run();
//! assert_eq!(result.steps, 50);
//! assert!(result.final_pressure >= 0.01 && result.final_pressure <= 0.95);
//! ```

use crate::context::EnvironmentContext;
use crate::core::time::StepClock;
use crate::domains::{agreement_threshold_factor, Domain, IncidentType};
use crate::models::agent::{Agent, AgentProfile};
use crate::models::agreement::Agreement;
use crate::models::incident::{Incident, IncidentLog, IncidentRow};
use crate::models::state::{agreement_effectiveness, ProcessState, StepContext};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};

/// Largest step count accepted for one run
pub const MAX_STEPS: usize = 1_000_000;

/// Threshold multiplier under heightened political tension
pub const HIGH_TENSION_FACTOR: f64 = 0.8;

/// Threshold multiplier under active monitoring
pub const ACTIVE_MONITORING_FACTOR: f64 = 1.2;

/// Risk at or above which a run counts as escalated
pub const ESCALATED_RISK: f64 = 0.6;

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete simulation configuration
///
/// Everything but `steps` has a default, so a minimal JSON config is
/// `{"steps": 200}` (maritime domain, calm context, no agreement, fresh seed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of steps to simulate (1..=MAX_STEPS)
    pub steps: usize,

    /// Domain label: "maritime", "territorial" or "resource"
    #[serde(default = "default_domain")]
    pub domain: String,

    #[serde(default)]
    pub context: EnvironmentContext,

    /// Agreement damping friction (None = no agreement in force)
    #[serde(default)]
    pub agreement: Option<Agreement>,

    /// RNG seed (None = fresh entropy, reported in the result)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Replaces the domain's default roster
    #[serde(default)]
    pub roster: Option<Vec<AgentProfile>>,

    /// Replaces the domain's incident-type catalog
    #[serde(default)]
    pub incident_catalog: Option<Vec<IncidentType>>,
}

fn default_domain() -> String {
    Domain::Maritime.as_str().to_string()
}

impl SimulationConfig {
    pub fn new(steps: usize, domain: impl Into<String>) -> Self {
        Self {
            steps,
            domain: domain.into(),
            context: EnvironmentContext::default(),
            agreement: None,
            seed: None,
            roster: None,
            incident_catalog: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_agreement(mut self, agreement: Agreement) -> Self {
        self.agreement = Some(agreement);
        self
    }

    pub fn with_context(mut self, context: EnvironmentContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_roster(mut self, roster: Vec<AgentProfile>) -> Self {
        self.roster = Some(roster);
        self
    }

    pub fn with_incident_catalog(mut self, catalog: Vec<IncidentType>) -> Self {
        self.incident_catalog = Some(catalog);
        self
    }
}

/// Simulation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Configuration validation error
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Domain label not in the catalog
    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    /// Snapshot or digest serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Checkpoint does not belong to the supplied config
    #[error("State validation error: {0}")]
    StateValidationError(String),
}

// ============================================================================
// Results
// ============================================================================

/// Result of a single step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step: usize,
    pub num_incidents: usize,
    pub incident_pressure: f64,
    pub escalation_risk: f64,
}

/// Process scalars after a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub step: usize,
    pub incident_pressure: f64,
    pub escalation_risk: f64,
    pub incidents: usize,
}

/// Aggregate view of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub total_incidents: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub mean_severity: f64,
    pub max_severity: f64,
    pub peak_pressure: f64,
    pub peak_risk: f64,
}

impl SimulationSummary {
    pub fn from_run(incidents: &[Incident], trajectory: &[ProcessSnapshot]) -> Self {
        let mut summary = SimulationSummary {
            total_incidents: incidents.len(),
            ..Default::default()
        };

        let mut severity_sum = 0.0;
        for incident in incidents {
            *summary
                .by_type
                .entry(incident.incident_type().to_string())
                .or_insert(0) += 1;
            *summary
                .by_category
                .entry(incident.category().to_string())
                .or_insert(0) += 1;
            severity_sum += incident.severity();
            summary.max_severity = summary.max_severity.max(incident.severity());
        }
        if !incidents.is_empty() {
            summary.mean_severity = severity_sum / incidents.len() as f64;
        }

        for point in trajectory {
            summary.peak_pressure = summary.peak_pressure.max(point.incident_pressure);
            summary.peak_risk = summary.peak_risk.max(point.escalation_risk);
        }
        summary
    }
}

/// Everything a completed (or paused) run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub run_id: String,
    pub seed: u64,
    pub domain: Domain,
    /// Steps actually executed
    pub steps: usize,
    pub incidents: Vec<Incident>,
    pub final_pressure: f64,
    pub final_risk: f64,
    pub trajectory: Vec<ProcessSnapshot>,
    pub summary: SimulationSummary,
}

impl SimulationResult {
    /// Incidents as flat rows
    pub fn rows(&self) -> Vec<IncidentRow> {
        self.incidents.iter().map(Incident::to_row).collect()
    }

    /// SHA-256 fingerprint of the incident sequence
    pub fn digest(&self) -> Result<String, SimulationError> {
        super::checkpoint::run_digest(&self.incidents)
    }

    pub fn escalated(&self) -> bool {
        self.final_risk >= ESCALATED_RISK
    }
}

// ============================================================================
// Simulator
// ============================================================================

/// Conflict simulator owning one run's roster, RNG and history
///
/// # Determinism
///
/// All randomness is drawn from one seeded xorshift64* generator in a fixed
/// order (agents in roster order, then process update). Same seed + same
/// config = identical incident sequence.
#[derive(Debug, Clone)]
pub struct ConflictSimulator {
    run_id: String,
    config: SimulationConfig,
    seed: u64,
    domain: Domain,
    clock: StepClock,
    rng: RngManager,
    agents: Vec<Agent>,
    catalog: Vec<IncidentType>,
    environment: EnvironmentContext,
    agreement: Option<Agreement>,
    /// Agreement and context multiplier on every agent's threshold
    threshold_factor: f64,
    process: ProcessState,
    incident_log: IncidentLog,
    trajectory: Vec<ProcessSnapshot>,
}

impl ConflictSimulator {
    /// Create a simulator from configuration
    ///
    /// Validation happens here; an invalid config never reaches the step loop.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        let domain = validate_config(&config)?;

        let roster = config
            .roster
            .clone()
            .unwrap_or_else(|| domain.default_roster());
        let catalog = config
            .incident_catalog
            .clone()
            .unwrap_or_else(|| domain.incident_catalog());

        // An empty agreement damps nothing; treat it as absent
        let agreement = config.agreement.clone().filter(|a| !a.is_empty());

        let mut threshold_factor = agreement
            .as_ref()
            .map(|a| agreement_threshold_factor(a, &domain.term_effects()))
            .unwrap_or(1.0);
        if config.context.high_tension {
            threshold_factor *= HIGH_TENSION_FACTOR;
        }
        if config.context.active_monitoring {
            threshold_factor *= ACTIVE_MONITORING_FACTOR;
        }

        let seed = config.seed.unwrap_or_else(RngManager::entropy_seed);
        let run_id = uuid::Uuid::new_v4().to_string();

        info!(
            %run_id,
            domain = %domain,
            steps = config.steps,
            seed,
            agents = roster.len(),
            agreement_terms = agreement.as_ref().map_or(0, Agreement::term_count),
            threshold_factor,
            "Simulation initialized"
        );

        Ok(Self {
            run_id,
            seed,
            domain,
            clock: StepClock::new(config.steps),
            rng: RngManager::new(seed),
            agents: roster.iter().map(Agent::from_profile).collect(),
            catalog,
            environment: config.context.clone(),
            agreement,
            threshold_factor,
            process: ProcessState::new(),
            incident_log: IncidentLog::new(),
            trajectory: Vec::with_capacity(config.steps.min(4096)),
            config,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Steps executed so far
    pub fn current_step(&self) -> usize {
        self.clock.current_step()
    }

    pub fn is_complete(&self) -> bool {
        self.clock.is_complete()
    }

    pub fn process(&self) -> &ProcessState {
        &self.process
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn incident_log(&self) -> &IncidentLog {
        &self.incident_log
    }

    pub fn trajectory(&self) -> &[ProcessSnapshot] {
        &self.trajectory
    }

    pub fn threshold_factor(&self) -> f64 {
        self.threshold_factor
    }

    // ========================================================================
    // Step Loop
    // ========================================================================

    /// Execute one step; `None` once the configured step count is reached
    pub fn step(&mut self) -> Option<StepResult> {
        if self.clock.is_complete() {
            return None;
        }

        let step = self.clock.current_step();
        let recorded_before = self.incident_log.len();
        let agreement = self.agreement.as_ref();

        for agent in self.agents.iter_mut() {
            let ctx = StepContext {
                step,
                process: self.process,
                log: &self.incident_log,
                agreement,
                environment: &self.environment,
                catalog: &self.catalog,
                threshold_factor: self.threshold_factor,
            };
            let incident = agent.act(&ctx, &mut self.rng);

            if let Some(incident) = incident {
                self.incident_log.record(incident);
            }

            let ctx = StepContext {
                step,
                process: self.process,
                log: &self.incident_log,
                agreement,
                environment: &self.environment,
                catalog: &self.catalog,
                threshold_factor: self.threshold_factor,
            };
            agent.update_aggression(&ctx);
        }

        self.process.update(
            step,
            &self.incident_log,
            agreement.map(agreement_effectiveness),
            &self.environment,
        );

        let num_incidents = self.incident_log.len() - recorded_before;
        self.trajectory.push(ProcessSnapshot {
            step,
            incident_pressure: self.process.incident_pressure(),
            escalation_risk: self.process.escalation_risk(),
            incidents: num_incidents,
        });
        self.clock.advance();

        debug!(
            step,
            num_incidents,
            pressure = self.process.incident_pressure(),
            risk = self.process.escalation_risk(),
            "Step complete"
        );

        Some(StepResult {
            step,
            num_incidents,
            incident_pressure: self.process.incident_pressure(),
            escalation_risk: self.process.escalation_risk(),
        })
    }

    /// Run all remaining steps and return the result
    pub fn run(&mut self) -> SimulationResult {
        while self.step().is_some() {}

        info!(
            run_id = %self.run_id,
            steps = self.clock.current_step(),
            incidents = self.incident_log.len(),
            final_pressure = self.process.incident_pressure(),
            final_risk = self.process.escalation_risk(),
            "Simulation complete"
        );

        self.result()
    }

    /// Result as of the current step
    pub fn result(&self) -> SimulationResult {
        let incidents = self.incident_log.as_slice().to_vec();
        let summary = SimulationSummary::from_run(&incidents, &self.trajectory);
        SimulationResult {
            run_id: self.run_id.clone(),
            seed: self.seed,
            domain: self.domain,
            steps: self.clock.current_step(),
            incidents,
            final_pressure: self.process.incident_pressure(),
            final_risk: self.process.escalation_risk(),
            trajectory: self.trajectory.clone(),
            summary,
        }
    }

    /// Rebuild a simulator mid-run from checkpointed parts
    pub(crate) fn from_parts(
        config: SimulationConfig,
        parts: super::checkpoint::StateSnapshot,
    ) -> Result<Self, SimulationError> {
        let mut simulator = Self::new(config.with_seed(parts.seed))?;
        for _ in 0..parts.current_step {
            simulator.clock.advance();
        }
        simulator.run_id = parts.run_id;
        simulator.rng = RngManager::new(parts.rng_state);
        simulator.agents = parts.agents;
        simulator.process = parts.process;
        simulator.incident_log = parts.incidents;
        simulator.trajectory = parts.trajectory;
        Ok(simulator)
    }

    pub(crate) fn rng_state(&self) -> u64 {
        self.rng.get_state()
    }
}

/// Validate and run a configuration to completion
pub fn simulate(config: SimulationConfig) -> Result<SimulationResult, SimulationError> {
    let mut simulator = ConflictSimulator::new(config)?;
    Ok(simulator.run())
}

// ============================================================================
// Validation
// ============================================================================

/// Validate configuration, returning the parsed domain
pub fn validate_config(config: &SimulationConfig) -> Result<Domain, SimulationError> {
    if config.steps == 0 {
        return Err(SimulationError::InvalidConfig(
            "steps must be > 0".to_string(),
        ));
    }

    if config.steps > MAX_STEPS {
        return Err(SimulationError::InvalidConfig(format!(
            "steps must be <= {}, got {}",
            MAX_STEPS, config.steps
        )));
    }

    let domain: Domain = config
        .domain
        .parse()
        .map_err(|_| SimulationError::UnknownDomain(config.domain.clone()))?;

    if let Some(roster) = &config.roster {
        validate_roster(roster)?;
    }

    if let Some(catalog) = &config.incident_catalog {
        validate_catalog(catalog)?;
    }

    Ok(domain)
}

fn validate_roster(roster: &[AgentProfile]) -> Result<(), SimulationError> {
    if roster.is_empty() {
        return Err(SimulationError::InvalidConfig(
            "Roster override must have at least one agent".to_string(),
        ));
    }

    let mut ids = HashSet::new();
    for profile in roster {
        if profile.id.trim().is_empty() {
            return Err(SimulationError::InvalidConfig(
                "Agent id must not be empty".to_string(),
            ));
        }
        if !ids.insert(profile.id.as_str()) {
            return Err(SimulationError::InvalidConfig(format!(
                "Duplicate agent ID: {}",
                profile.id
            )));
        }
        if profile.category.trim().is_empty() {
            return Err(SimulationError::InvalidConfig(format!(
                "Agent {} has an empty category",
                profile.id
            )));
        }
        if !(profile.base_aggression.is_finite()
            && profile.base_aggression > 0.0
            && profile.base_aggression <= 0.95)
        {
            return Err(SimulationError::InvalidConfig(format!(
                "Agent {}: base_aggression must be in (0, 0.95], got {}",
                profile.id, profile.base_aggression
            )));
        }
        for (name, value) in [
            ("risk_tolerance", profile.risk_tolerance),
            ("rule_following", profile.rule_following),
            ("response_threshold", profile.response_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimulationError::InvalidConfig(format!(
                    "Agent {}: {} must be in [0, 1], got {}",
                    profile.id, name, value
                )));
            }
        }
    }

    Ok(())
}

fn validate_catalog(catalog: &[IncidentType]) -> Result<(), SimulationError> {
    if catalog.is_empty() {
        return Err(SimulationError::InvalidConfig(
            "Incident catalog override must not be empty".to_string(),
        ));
    }

    for entry in catalog {
        if entry.label.trim().is_empty() {
            return Err(SimulationError::InvalidConfig(
                "Incident type label must not be empty".to_string(),
            ));
        }
        if !(entry.weight.is_finite() && entry.weight >= 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "Incident type {}: weight must be finite and >= 0",
                entry.label
            )));
        }
        if !(0.0 <= entry.severity_min
            && entry.severity_min <= entry.severity_max
            && entry.severity_max <= 1.0)
        {
            return Err(SimulationError::InvalidConfig(format!(
                "Incident type {}: severity range must satisfy 0 <= min <= max <= 1",
                entry.label
            )));
        }
    }

    if !catalog.iter().any(|entry| entry.weight > 0.0) {
        return Err(SimulationError::InvalidConfig(
            "Incident catalog needs at least one positive weight".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn militia(id: &str) -> AgentProfile {
        AgentProfile {
            id: id.to_string(),
            category: "maritime_militia".to_string(),
            base_aggression: 0.6,
            risk_tolerance: 0.7,
            rule_following: 0.3,
            response_threshold: 0.2,
        }
    }

    #[test]
    fn test_simulator_creation() {
        let simulator =
            ConflictSimulator::new(SimulationConfig::new(10, "maritime").with_seed(1)).unwrap();
        assert_eq!(simulator.current_step(), 0);
        assert_eq!(simulator.domain(), Domain::Maritime);
        assert_eq!(simulator.agents().len(), Domain::Maritime.default_roster().len());
        assert_eq!(simulator.threshold_factor(), 1.0);
    }

    #[test]
    fn test_validate_config_zero_steps() {
        let result = ConflictSimulator::new(SimulationConfig::new(0, "maritime"));
        assert!(matches!(result, Err(SimulationError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_config_unknown_domain() {
        let result = ConflictSimulator::new(SimulationConfig::new(10, "arctic"));
        assert_eq!(
            result.unwrap_err(),
            SimulationError::UnknownDomain("arctic".to_string())
        );
    }

    #[test]
    fn test_validate_config_duplicate_agent_ids() {
        let config = SimulationConfig::new(10, "maritime")
            .with_roster(vec![militia("m1"), militia("m1")]);
        let err = ConflictSimulator::new(config).unwrap_err();
        assert!(err.to_string().contains("Duplicate agent ID"));
    }

    #[test]
    fn test_validate_config_bad_aggression() {
        let mut bad = militia("m1");
        bad.base_aggression = 0.0;
        let config = SimulationConfig::new(10, "maritime").with_roster(vec![bad]);
        assert!(matches!(
            ConflictSimulator::new(config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_config_zero_weight_catalog() {
        let config = SimulationConfig::new(10, "maritime")
            .with_incident_catalog(vec![IncidentType::new("ramming", 0.0, 0.6, 0.9)]);
        assert!(matches!(
            ConflictSimulator::new(config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_context_flags_scale_threshold_factor() {
        let context = EnvironmentContext {
            high_tension: true,
            active_monitoring: true,
            ..Default::default()
        };
        let config = SimulationConfig::new(5, "maritime").with_context(context);
        let simulator = ConflictSimulator::new(config).unwrap();
        assert!((simulator.threshold_factor() - 0.8 * 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_step_returns_none_after_horizon() {
        let mut simulator =
            ConflictSimulator::new(SimulationConfig::new(3, "territorial").with_seed(9)).unwrap();
        for expected in 0..3 {
            assert_eq!(simulator.step().unwrap().step, expected);
        }
        assert!(simulator.step().is_none());
        assert_eq!(simulator.trajectory().len(), 3);
    }

    #[test]
    fn test_empty_agreement_is_inactive() {
        let simulator = ConflictSimulator::new(
            SimulationConfig::new(5, "maritime").with_agreement(Agreement::new()),
        )
        .unwrap();
        assert_eq!(simulator.threshold_factor(), 1.0);
    }

    #[test]
    fn test_summary_counts_match_incidents() {
        let result = simulate(
            SimulationConfig::new(100, "maritime")
                .with_seed(5)
                .with_roster(vec![militia("m1"), militia("m2")]),
        )
        .unwrap();
        let summary = &result.summary;
        assert_eq!(summary.total_incidents, result.incidents.len());
        assert_eq!(summary.by_type.values().sum::<usize>(), result.incidents.len());
        assert_eq!(
            summary.by_category.get("maritime_militia").copied().unwrap_or(0),
            result.incidents.len()
        );
    }
}
