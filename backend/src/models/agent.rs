//! Friction agent model
//!
//! An agent is one member of the friction population: a coast guard cutter,
//! a militia boat, a fishing fleet. Each agent carries fixed behavioral
//! parameters from its profile plus two pieces of mutable state:
//!
//! - `aggression`: current propensity to act, bounded to [0.01, 0.95]
//! - `beliefs`: the agent's private reading of the process-wide situation
//!
//! Agents never hold references into the simulation. Each step the engine
//! hands them a read-only [`StepContext`]; they update their own state and
//! return at most one [`Incident`] for the engine to record.

use crate::models::incident::{BeliefSnapshot, Incident};
use crate::models::state::StepContext;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Lower bound on current aggression
pub const AGGRESSION_FLOOR: f64 = 0.01;

/// Upper bound on current aggression
pub const AGGRESSION_CEILING: f64 = 0.95;

/// Per-step multiplicative decay of aggression
pub const AGGRESSION_DECAY: f64 = 0.98;

/// Weight of process pressure in the aggression update
pub const PRESSURE_CONTRIBUTION: f64 = 0.02;

/// Aggression added per incident in the contagion window
pub const CONTAGION_PER_INCIDENT: f64 = 0.01;

/// Contagion window (steps)
pub const CONTAGION_WINDOW: usize = 5;

/// Window used for the recent-activity belief (steps)
pub const ACTIVITY_WINDOW: usize = 10;

/// Perceived effectiveness above which agents de-escalate
pub const DEESCALATION_CONFIDENCE: f64 = 0.6;

/// Multiplier applied when an agent de-escalates
pub const DEESCALATION_FACTOR: f64 = 0.95;

/// Multiplier applied to aggression under adverse weather
pub const WEATHER_AGGRESSION_FACTOR: f64 = 1.05;

/// Severity multiplier under adverse weather
pub const WEATHER_SEVERITY_FACTOR: f64 = 1.2;

/// Severity multiplier when media are present
pub const MEDIA_SEVERITY_FACTOR: f64 = 0.8;

/// Static behavioral profile of an agent
///
/// Profiles come from a domain's default roster or from a caller-supplied
/// override list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique agent identifier (e.g., "coast_guard_1")
    pub id: String,

    /// Category label (e.g., "coast_guard", "maritime_militia")
    pub category: String,

    /// Baseline aggression, (0, 0.95]
    pub base_aggression: f64,

    /// Willingness to accept risk, [0, 1]
    #[serde(default = "default_half")]
    pub risk_tolerance: f64,

    /// Propensity to follow rules of engagement, [0, 1]
    #[serde(default = "default_half")]
    pub rule_following: f64,

    /// Aggression an agent must exceed before acting, [0, 1]
    pub response_threshold: f64,
}

fn default_half() -> f64 {
    0.5
}

/// An agent's private reading of the situation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Beliefs {
    pub perceived_pressure: f64,
    pub perceived_risk: f64,
    /// Incidents in the last 10 steps ÷ 10
    pub recent_activity: f64,
    /// Confidence that the agreement is holding, [0, 1]
    pub perceived_effectiveness: f64,
}

/// A member of the friction population
///
/// # Example
/// ```
/// use agreement_simulator_core_rs::models::{Agent, AgentProfile};
///
/// let agent = Agent::from_profile(&AgentProfile {
///     id: "coast_guard_1".to_string(),
///     category: "coast_guard".to_string(),
///     base_aggression: 0.4,
///     risk_tolerance: 0.5,
///     rule_following: 0.7,
///     response_threshold: 0.3,
/// });
///
/// assert_eq!(agent.id(), "coast_guard_1");
/// assert_eq!(agent.aggression(), 0.4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    profile: AgentProfile,

    /// Current aggression, always within [AGGRESSION_FLOOR, AGGRESSION_CEILING]
    aggression: f64,

    beliefs: Beliefs,
}

impl Agent {
    /// Create an agent at its baseline aggression
    pub fn from_profile(profile: &AgentProfile) -> Self {
        Self {
            aggression: profile
                .base_aggression
                .clamp(AGGRESSION_FLOOR, AGGRESSION_CEILING),
            profile: profile.clone(),
            beliefs: Beliefs::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.profile.id
    }

    pub fn category(&self) -> &str {
        &self.profile.category
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn base_aggression(&self) -> f64 {
        self.profile.base_aggression
    }

    pub fn aggression(&self) -> f64 {
        self.aggression
    }

    pub fn beliefs(&self) -> &Beliefs {
        &self.beliefs
    }

    /// Copy process state into beliefs and re-read recent activity
    pub fn update_beliefs(&mut self, ctx: &StepContext<'_>) {
        let recent = ctx.log.count_recent(ctx.step, ACTIVITY_WINDOW);

        self.beliefs.perceived_pressure = ctx.process.incident_pressure();
        self.beliefs.perceived_risk = ctx.process.escalation_risk();
        self.beliefs.recent_activity = recent as f64 / ACTIVITY_WINDOW as f64;
        self.beliefs.perceived_effectiveness = if ctx.agreement_active() {
            perceived_effectiveness(ctx.log.len())
        } else {
            0.0
        };
    }

    /// Response threshold after agreement and context adjustments
    pub fn adjusted_threshold(&self, ctx: &StepContext<'_>) -> f64 {
        self.profile.response_threshold * ctx.threshold_factor
    }

    /// Belief update, threshold adjustment and incident decision
    ///
    /// Exactly one uniform draw is consumed for the decision; two more
    /// (type and severity) only when an incident fires.
    pub fn act(&mut self, ctx: &StepContext<'_>, rng: &mut RngManager) -> Option<Incident> {
        self.update_beliefs(ctx);
        let threshold = self.adjusted_threshold(ctx);

        let roll = rng.next_f64();
        if !(roll < self.aggression && self.aggression > threshold) {
            return None;
        }

        let weights: Vec<f64> = ctx.catalog.iter().map(|t| t.weight).collect();
        let incident_type = &ctx.catalog[rng.weighted_index(&weights)?];

        let mut severity = rng.uniform(incident_type.severity_min, incident_type.severity_max);
        severity *= self.aggression / self.profile.base_aggression;
        if ctx.environment.adverse_weather() {
            severity *= WEATHER_SEVERITY_FACTOR;
        }
        if ctx.environment.media_present() {
            severity *= MEDIA_SEVERITY_FACTOR;
        }

        Some(Incident::new(
            ctx.step,
            self.profile.id.clone(),
            self.profile.category.clone(),
            incident_type.label.clone(),
            severity.clamp(0.0, 1.0),
            self.snapshot(),
        ))
    }

    /// End-of-turn aggression update; runs every step whether or not the
    /// agent acted.
    pub fn update_aggression(&mut self, ctx: &StepContext<'_>) {
        let contagion = ctx.log.count_recent(ctx.step, CONTAGION_WINDOW);

        let mut aggression = self.aggression * AGGRESSION_DECAY;
        aggression += PRESSURE_CONTRIBUTION * ctx.process.incident_pressure();
        aggression += CONTAGION_PER_INCIDENT * contagion as f64;

        let confident = self.beliefs.perceived_effectiveness > DEESCALATION_CONFIDENCE;
        if ctx.agreement_active() && confident {
            aggression *= DEESCALATION_FACTOR;
        }
        if ctx.environment.adverse_weather() {
            aggression *= WEATHER_AGGRESSION_FACTOR;
        }

        self.aggression = aggression.clamp(AGGRESSION_FLOOR, AGGRESSION_CEILING);
    }

    /// Current aggression and beliefs as an immutable record
    pub fn snapshot(&self) -> BeliefSnapshot {
        BeliefSnapshot {
            aggression: self.aggression,
            perceived_pressure: self.beliefs.perceived_pressure,
            perceived_risk: self.beliefs.perceived_risk,
            recent_activity: self.beliefs.recent_activity,
            perceived_effectiveness: self.beliefs.perceived_effectiveness,
        }
    }
}

/// Confidence in an active agreement given how many incidents it has
/// already absorbed: high while fresh, low once friction has piled up.
pub fn perceived_effectiveness(recorded_incidents: usize) -> f64 {
    if recorded_incidents < 5 {
        0.8
    } else if recorded_incidents > 20 {
        0.3
    } else {
        0.5
    }
}
