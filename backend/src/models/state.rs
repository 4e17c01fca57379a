//! Process-wide simulation state
//!
//! Two scalars summarize the whole friction process:
//!
//! - **incident pressure** in [0.01, 0.95]: accumulated tension
//! - **escalation risk** in [0, 1]: likelihood that friction intensifies
//!
//! Both are recomputed once per step, after every agent has acted, from the
//! incident history and the active agreement.
//!
//! [`StepContext`] is the read-only view agents receive while acting. It
//! borrows the log and agreement from the engine for the duration of one
//! agent's turn; agents never keep it.

use crate::context::EnvironmentContext;
use crate::domains::IncidentType;
use crate::models::agreement::Agreement;
use crate::models::incident::IncidentLog;
use serde::{Deserialize, Serialize};

pub const PRESSURE_FLOOR: f64 = 0.01;
pub const PRESSURE_CEILING: f64 = 0.95;
pub const INITIAL_PRESSURE: f64 = 0.1;

/// Risk before enough incidents exist to measure a trend
pub const BASELINE_RISK: f64 = 0.3;

/// Per-step natural pressure drift
pub const PRESSURE_DRIFT: f64 = 0.01;

/// Pressure added per incident in the last 10 steps
pub const PRESSURE_PER_RECENT_INCIDENT: f64 = 0.002;

/// Incidents required before risk tracks the trend
pub const RISK_MIN_INCIDENTS: usize = 10;

/// Window for trend comparison and severity averaging
pub const RISK_WINDOW: usize = 10;

const RISK_RISE: f64 = 0.05;
const RISK_DECAY: f64 = 0.02;
const RISK_CAP: f64 = 0.9;
const RISK_FLOOR: f64 = 0.1;
const SEVERE_MEAN: f64 = 0.6;
const SEVERITY_RISK_BUMP: f64 = 0.03;

/// Pressure/risk pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessState {
    incident_pressure: f64,
    escalation_risk: f64,
}

impl Default for ProcessState {
    fn default() -> Self {
        Self {
            incident_pressure: INITIAL_PRESSURE,
            escalation_risk: BASELINE_RISK,
        }
    }
}

impl ProcessState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incident_pressure(&self) -> f64 {
        self.incident_pressure
    }

    pub fn escalation_risk(&self) -> f64 {
        self.escalation_risk
    }

    /// End-of-step update
    ///
    /// `agreement_effectiveness` is `Some` only while an agreement is active.
    pub fn update(
        &mut self,
        step: usize,
        log: &IncidentLog,
        agreement_effectiveness: Option<f64>,
        environment: &EnvironmentContext,
    ) {
        let mut pressure = self.incident_pressure + PRESSURE_DRIFT;
        if let Some(effectiveness) = agreement_effectiveness {
            pressure *= 1.0 - effectiveness * 0.05;
        }
        if environment.adverse_weather() {
            pressure *= 1.05;
        }
        if environment.high_media_visibility() {
            pressure *= 0.98;
        }
        pressure += PRESSURE_PER_RECENT_INCIDENT * log.count_recent(step, RISK_WINDOW) as f64;
        self.incident_pressure = pressure.clamp(PRESSURE_FLOOR, PRESSURE_CEILING);

        self.escalation_risk = next_escalation_risk(self.escalation_risk, step, log);
    }
}

/// Trend-following escalation risk
///
/// Below [`RISK_MIN_INCIDENTS`] recorded incidents risk is pinned at the
/// baseline. Otherwise it rises when the last 10 steps saw more than 20%
/// more incidents than the 10 before, decays otherwise, and takes a further
/// bump when the last 10 incidents were severe on average.
pub fn next_escalation_risk(current_risk: f64, step: usize, log: &IncidentLog) -> f64 {
    if log.len() < RISK_MIN_INCIDENTS {
        return BASELINE_RISK;
    }

    let recent = log.count_between_ages(step, 0, RISK_WINDOW) as f64;
    let prior = log.count_between_ages(step, RISK_WINDOW, 2 * RISK_WINDOW) as f64;

    let mut risk = if recent > prior * 1.2 {
        (current_risk + RISK_RISE).min(RISK_CAP)
    } else {
        (current_risk - RISK_DECAY).max(RISK_FLOOR)
    };

    if log
        .mean_recent_severity(RISK_WINDOW)
        .is_some_and(|mean| mean > SEVERE_MEAN)
    {
        risk = (risk + SEVERITY_RISK_BUMP).min(RISK_CAP);
    }

    risk.clamp(0.0, 1.0)
}

/// Agreement effectiveness used by the pressure update:
/// min(1.0, 0.5 + 0.05 × number of top-level terms)
pub fn agreement_effectiveness(agreement: &Agreement) -> f64 {
    (0.5 + 0.05 * agreement.term_count() as f64).min(1.0)
}

/// Read-only view of the simulation handed to an agent for one turn
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub step: usize,
    pub process: ProcessState,
    pub log: &'a IncidentLog,
    pub agreement: Option<&'a Agreement>,
    pub environment: &'a EnvironmentContext,
    pub catalog: &'a [IncidentType],
    /// Combined agreement and context multiplier on response thresholds
    pub threshold_factor: f64,
}

impl StepContext<'_> {
    pub fn agreement_active(&self) -> bool {
        self.agreement.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::incident::{BeliefSnapshot, Incident};

    fn log_with(steps_and_severity: &[(usize, f64)]) -> IncidentLog {
        let mut log = IncidentLog::new();
        for &(step, severity) in steps_and_severity {
            log.record(Incident::new(
                step,
                "a".to_string(),
                "c".to_string(),
                "t".to_string(),
                severity,
                BeliefSnapshot {
                    aggression: 0.5,
                    perceived_pressure: 0.1,
                    perceived_risk: 0.3,
                    recent_activity: 0.0,
                    perceived_effectiveness: 0.0,
                },
            ));
        }
        log
    }

    #[test]
    fn test_risk_pinned_below_min_incidents() {
        let log = log_with(&[(1, 0.9), (2, 0.9)]);
        assert_eq!(next_escalation_risk(0.8, 2, &log), BASELINE_RISK);
    }

    #[test]
    fn test_risk_rises_on_accelerating_trend() {
        // 2 incidents in steps 1..=10, 10 in steps 11..=20
        let mut entries = vec![(2, 0.2), (5, 0.2)];
        entries.extend((11..=20).map(|s| (s, 0.2)));
        let log = log_with(&entries);
        let risk = next_escalation_risk(0.3, 20, &log);
        assert!((risk - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_risk_decays_and_severity_bumps() {
        // Flat trend (6 vs 6), severe incidents
        let mut entries: Vec<(usize, f64)> = (5..=10).map(|s| (s, 0.9)).collect();
        entries.extend((15..=20).map(|s| (s, 0.9)));
        let log = log_with(&entries);
        let risk = next_escalation_risk(0.5, 20, &log);
        assert!((risk - (0.5 - 0.02 + 0.03)).abs() < 1e-12);
    }

    #[test]
    fn test_risk_respects_cap_and_floor() {
        let entries: Vec<(usize, f64)> = (11..=20).map(|s| (s, 0.9)).collect();
        let log = log_with(&entries);
        assert_eq!(next_escalation_risk(0.9, 20, &log), 0.9);

        let calm: Vec<(usize, f64)> = (1..=10).map(|s| (s, 0.1)).collect();
        let log = log_with(&calm);
        assert_eq!(next_escalation_risk(0.1, 40, &log), 0.1);
    }

    #[test]
    fn test_pressure_update_without_agreement() {
        let mut state = ProcessState::new();
        let log = IncidentLog::new();
        state.update(0, &log, None, &EnvironmentContext::default());
        assert!((state.incident_pressure() - 0.11).abs() < 1e-12);
        assert_eq!(state.escalation_risk(), BASELINE_RISK);
    }

    #[test]
    fn test_agreement_effectiveness_caps_at_one() {
        let mut agreement = Agreement::new();
        assert_eq!(agreement_effectiveness(&agreement), 0.5);
        for i in 0..15 {
            agreement.insert_term(format!("term_{}", i), Default::default());
        }
        assert_eq!(agreement_effectiveness(&agreement), 1.0);
    }
}
