//! Domain catalogs
//!
//! Each dispute domain contributes data, not code: a default agent roster,
//! a weighted incident-type catalog, and the agreement terms that raise
//! agents' response thresholds in that domain. Adding a domain means adding
//! a variant and its tables here; the step loop never branches on domain.

use crate::models::agent::AgentProfile;
use crate::models::agreement::Agreement;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod catalogs;

/// Generic agreement-quality factors applied to every agent's threshold
/// when the named top-level term is present.
pub const GENERIC_TERM_FACTORS: [(&str, f64); 4] = [
    ("confidence_building_measures", 1.3),
    ("communication_protocol", 1.2),
    ("monitoring_mechanism", 1.25),
    ("penalty_provisions", 1.15),
];

/// Dispute domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Maritime,
    Territorial,
    Resource,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Maritime, Domain::Territorial, Domain::Resource];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Maritime => "maritime",
            Domain::Territorial => "territorial",
            Domain::Resource => "resource",
        }
    }

    /// Default agent roster for this domain
    pub fn default_roster(&self) -> Vec<AgentProfile> {
        let table = match self {
            Domain::Maritime => catalogs::MARITIME_ROSTER,
            Domain::Territorial => catalogs::TERRITORIAL_ROSTER,
            Domain::Resource => catalogs::RESOURCE_ROSTER,
        };
        catalogs::expand_roster(table)
    }

    /// Incident-type catalog for this domain
    pub fn incident_catalog(&self) -> Vec<IncidentType> {
        let table = match self {
            Domain::Maritime => catalogs::MARITIME_INCIDENTS,
            Domain::Territorial => catalogs::TERRITORIAL_INCIDENTS,
            Domain::Resource => catalogs::RESOURCE_INCIDENTS,
        };
        table
            .iter()
            .map(|&(label, weight, min, max)| IncidentType::new(label, weight, min, max))
            .collect()
    }

    /// Domain-specific term effects
    pub fn term_effects(&self) -> Vec<TermEffect> {
        match self {
            Domain::Maritime => catalogs::maritime_effects(),
            Domain::Territorial => catalogs::territorial_effects(),
            Domain::Resource => catalogs::resource_effects(),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label did not name a known domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let normalized = label.trim().to_ascii_lowercase();
        Domain::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| UnknownDomain(label.to_string()))
    }
}

/// One entry of an incident-type catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentType {
    pub label: String,
    /// Relative probability (catalog weights need not sum to one)
    pub weight: f64,
    pub severity_min: f64,
    pub severity_max: f64,
}

impl IncidentType {
    pub fn new(
        label: impl Into<String>,
        weight: f64,
        severity_min: f64,
        severity_max: f64,
    ) -> Self {
        Self {
            label: label.into(),
            weight,
            severity_min,
            severity_max,
        }
    }
}

/// How an agreement term moves response thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TermEffect {
    /// threshold × (1 + per_unit × min(value, cap)) for a numeric term
    Scaled { path: String, per_unit: f64, cap: f64 },
    /// threshold × factor when the term is truthy
    Flag { path: String, factor: f64 },
}

impl TermEffect {
    /// Multiplicative factor this effect contributes for `agreement`
    pub fn factor(&self, agreement: &Agreement) -> f64 {
        match self {
            TermEffect::Scaled { path, per_unit, cap } => match agreement.number(path) {
                Some(value) if value.is_finite() && value > 0.0 => {
                    1.0 + per_unit * value.min(*cap)
                }
                _ => 1.0,
            },
            TermEffect::Flag { path, factor } => match agreement.get(path) {
                Some(value) if value.is_truthy() => *factor,
                _ => 1.0,
            },
        }
    }
}

/// Combined threshold multiplier of the generic factors and `effects`
///
/// # Example
/// ```
/// use agreement_simulator_core_rs::domains::{agreement_threshold_factor, Domain};
/// use agreement_simulator_core_rs::models::Agreement;
///
/// let agreement = Agreement::new()
///     .with_term("communication_protocol", [("hotline", true)])
///     .with_term("resupply_SOP", [("standoff_nm", 5.0)]);
///
/// let factor = agreement_threshold_factor(&agreement, &Domain::Maritime.term_effects());
/// assert!((factor - 1.2 * 1.15).abs() < 1e-12);
/// ```
pub fn agreement_threshold_factor(agreement: &Agreement, effects: &[TermEffect]) -> f64 {
    let generic: f64 = GENERIC_TERM_FACTORS
        .iter()
        .filter(|(term, _)| agreement.has_term(term))
        .map(|(_, factor)| factor)
        .product();
    let specific: f64 = effects.iter().map(|e| e.factor(agreement)).product();
    generic * specific
}
