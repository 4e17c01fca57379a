//! Incident records and the append-only incident log
//!
//! An incident is emitted by one agent at one step and never changes
//! afterwards. The log only grows, and because agents act in step order the
//! steps it holds are non-decreasing. Window queries walk the log backwards
//! and stop as soon as they leave the window.

use serde::{Deserialize, Serialize};

/// Emitting agent's state at the moment of the incident
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeliefSnapshot {
    pub aggression: f64,
    pub perceived_pressure: f64,
    pub perceived_risk: f64,
    pub recent_activity: f64,
    pub perceived_effectiveness: f64,
}

/// One friction incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    step: usize,
    agent_id: String,
    category: String,
    incident_type: String,
    severity: f64,
    snapshot: BeliefSnapshot,
}

impl Incident {
    pub fn new(
        step: usize,
        agent_id: String,
        category: String,
        incident_type: String,
        severity: f64,
        snapshot: BeliefSnapshot,
    ) -> Self {
        Self {
            step,
            agent_id,
            category,
            incident_type,
            severity,
            snapshot,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn incident_type(&self) -> &str {
        &self.incident_type
    }

    /// Severity in [0, 1]
    pub fn severity(&self) -> f64 {
        self.severity
    }

    pub fn snapshot(&self) -> &BeliefSnapshot {
        &self.snapshot
    }

    /// Flatten into a single tabular row
    pub fn to_row(&self) -> IncidentRow {
        IncidentRow {
            step: self.step,
            agent_id: self.agent_id.clone(),
            category: self.category.clone(),
            incident_type: self.incident_type.clone(),
            severity: self.severity,
            aggression: self.snapshot.aggression,
            perceived_pressure: self.snapshot.perceived_pressure,
            perceived_risk: self.snapshot.perceived_risk,
            recent_activity: self.snapshot.recent_activity,
            perceived_effectiveness: self.snapshot.perceived_effectiveness,
        }
    }
}

/// Flat incident row for tabular analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRow {
    pub step: usize,
    pub agent_id: String,
    pub category: String,
    pub incident_type: String,
    pub severity: f64,
    pub aggression: f64,
    pub perceived_pressure: f64,
    pub perceived_risk: f64,
    pub recent_activity: f64,
    pub perceived_effectiveness: f64,
}

/// Append-only, step-ordered incident history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncidentLog {
    incidents: Vec<Incident>,
}

impl IncidentLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an incident
    ///
    /// # Panics
    /// Panics if the incident's step is earlier than the last recorded step.
    pub fn record(&mut self, incident: Incident) {
        if let Some(last) = self.incidents.last() {
            assert!(
                incident.step() >= last.step(),
                "incident log steps must be non-decreasing"
            );
        }
        self.incidents.push(incident);
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Incident> {
        self.incidents.iter()
    }

    pub fn as_slice(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn into_vec(self) -> Vec<Incident> {
        self.incidents
    }

    /// Incidents whose age `current - step` lies in `[min_age, max_age)`
    pub fn count_between_ages(&self, current: usize, min_age: usize, max_age: usize) -> usize {
        let mut count = 0;
        for incident in self.incidents.iter().rev() {
            let age = current.saturating_sub(incident.step());
            if age >= max_age {
                break;
            }
            if age >= min_age {
                count += 1;
            }
        }
        count
    }

    /// Incidents in the last `window` steps, counting `current` itself
    ///
    /// # Example
    /// ```
    /// use agreement_simulator_core_rs::models::IncidentLog;
    ///
    /// let log = IncidentLog::new();
    /// assert_eq!(log.count_recent(50, 10), 0);
    /// ```
    pub fn count_recent(&self, current: usize, window: usize) -> usize {
        self.count_between_ages(current, 0, window)
    }

    /// Mean severity of the last `n` incidents (None when the log is empty)
    pub fn mean_recent_severity(&self, n: usize) -> Option<f64> {
        let take = n.min(self.incidents.len());
        if take == 0 {
            return None;
        }
        let sum: f64 = self.incidents[self.incidents.len() - take..]
            .iter()
            .map(Incident::severity)
            .sum();
        Some(sum / take as f64)
    }
}

impl<'a> IntoIterator for &'a IncidentLog {
    type Item = &'a Incident;
    type IntoIter = std::slice::Iter<'a, Incident>;

    fn into_iter(self) -> Self::IntoIter {
        self.incidents.iter()
    }
}
