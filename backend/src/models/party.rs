//! Negotiating party model
//!
//! A party values an agreement through a set of weighted attributes, each
//! reading one value out of the agreement by dotted path. Prospect-theory
//! coefficients and pressure scalars shape how that value is perceived and
//! how far the party is willing to concede.
//!
//! Parties are plain serde records so collaborators can author them as JSON.
//! The only state the evaluator mutates is `utility_history` (one append per
//! round) and, on request, `trust_level`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default loss-aversion multiplier (Kahneman-Tversky estimate)
pub const DEFAULT_LOSS_AVERSION: f64 = 2.25;

/// Default risk-attitude exponent (Kahneman-Tversky estimate)
pub const DEFAULT_RISK_ATTITUDE: f64 = 0.88;

/// Default starting trust
pub const DEFAULT_TRUST_LEVEL: f64 = 0.5;

/// Value-function shape of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// Diminishing returns: `x^r`
    #[default]
    Concave,
    /// Increasing returns: `1 - (1 - x)^r`
    Convex,
}

/// One valued dimension of an agreement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name (referenced by interactions)
    pub name: String,

    /// Dotted agreement path this attribute reads (`issue.field`)
    pub path: String,

    /// Relative importance (non-negative)
    pub weight: f64,

    #[serde(default)]
    pub shape: ValueShape,

    /// Lower end of the declared range (raw units)
    #[serde(default)]
    pub min: f64,

    /// Upper end of the declared range (raw units)
    #[serde(default = "default_max")]
    pub max: f64,

    /// Reference point in raw units; defaults to the range midpoint
    #[serde(default)]
    pub reference_point: Option<f64>,

    /// Aspiration point in raw units; defaults to 80% of the range
    #[serde(default)]
    pub aspiration_point: Option<f64>,

    /// Past this raw value further gains are attenuated
    #[serde(default)]
    pub satiation_point: Option<f64>,

    /// Raw values for enumerated string choices
    #[serde(default)]
    pub choices: BTreeMap<String, f64>,
}

fn default_max() -> f64 {
    1.0
}

impl Attribute {
    /// New concave attribute over [0, 1]
    pub fn new(name: impl Into<String>, path: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            weight,
            shape: ValueShape::Concave,
            min: 0.0,
            max: 1.0,
            reference_point: None,
            aspiration_point: None,
            satiation_point: None,
            choices: BTreeMap::new(),
        }
    }

    pub fn with_shape(mut self, shape: ValueShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_reference_point(mut self, value: f64) -> Self {
        self.reference_point = Some(value);
        self
    }

    pub fn with_aspiration_point(mut self, value: f64) -> Self {
        self.aspiration_point = Some(value);
        self
    }

    pub fn with_satiation_point(mut self, value: f64) -> Self {
        self.satiation_point = Some(value);
        self
    }

    pub fn with_choice(mut self, label: impl Into<String>, value: f64) -> Self {
        self.choices.insert(label.into(), value);
        self
    }

    /// Map a raw value into [0, 1] against the declared range
    ///
    /// A degenerate range (max <= min) yields the neutral 0.5.
    pub fn normalize(&self, raw: f64) -> f64 {
        let span = self.max - self.min;
        if !span.is_finite() || span <= 0.0 || !raw.is_finite() {
            return 0.5;
        }
        ((raw - self.min) / span).clamp(0.0, 1.0)
    }

    /// Reference point in raw units
    pub fn reference_raw(&self) -> f64 {
        self.reference_point
            .unwrap_or(self.min + 0.5 * (self.max - self.min))
    }

    /// Aspiration point in raw units
    pub fn aspiration_raw(&self) -> f64 {
        self.aspiration_point
            .unwrap_or(self.min + 0.8 * (self.max - self.min))
    }
}

/// Pairwise complementarity between two attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeInteraction {
    pub first: String,
    pub second: String,
    pub weight: f64,
}

/// A negotiating actor
///
/// # Example
/// ```
/// use agreement_simulator_core_rs::models::{Attribute, Party};
///
/// let party = Party::new("coastal_state", 0.4)
///     .with_attribute(Attribute::new("access", "fishing_arrangement.quota_share", 1.0))
///     .with_domestic_constraints(0.3);
///
/// assert_eq!(party.id, "coastal_state");
/// assert!(party.utility_history().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub attributes: Vec<Attribute>,

    #[serde(default)]
    pub interactions: Vec<AttributeInteraction>,

    /// Walk-away utility (BATNA)
    pub batna_value: f64,

    /// Confidence in the BATNA, (0, 1]
    #[serde(default = "default_certainty")]
    pub batna_certainty: f64,

    #[serde(default = "default_loss_aversion")]
    pub loss_aversion: f64,

    /// Risk-attitude exponent `r` (> 0)
    #[serde(default = "default_risk_attitude")]
    pub risk_attitude: f64,

    /// Domestic political rigidity, [0, 1]
    #[serde(default)]
    pub domestic_constraints: f64,

    /// Deadline pressure, [0, 1]
    #[serde(default)]
    pub time_pressure: f64,

    #[serde(default = "default_trust")]
    pub trust_level: f64,

    #[serde(default)]
    utility_history: Vec<f64>,
}

fn default_certainty() -> f64 {
    1.0
}

fn default_loss_aversion() -> f64 {
    DEFAULT_LOSS_AVERSION
}

fn default_risk_attitude() -> f64 {
    DEFAULT_RISK_ATTITUDE
}

fn default_trust() -> f64 {
    DEFAULT_TRUST_LEVEL
}

impl Party {
    pub fn new(id: impl Into<String>, batna_value: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            attributes: Vec::new(),
            interactions: Vec::new(),
            batna_value,
            batna_certainty: 1.0,
            loss_aversion: DEFAULT_LOSS_AVERSION,
            risk_attitude: DEFAULT_RISK_ATTITUDE,
            domestic_constraints: 0.0,
            time_pressure: 0.0,
            trust_level: DEFAULT_TRUST_LEVEL,
            utility_history: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_interaction(
        mut self,
        first: impl Into<String>,
        second: impl Into<String>,
        weight: f64,
    ) -> Self {
        self.interactions.push(AttributeInteraction {
            first: first.into(),
            second: second.into(),
            weight,
        });
        self
    }

    pub fn with_batna_certainty(mut self, certainty: f64) -> Self {
        self.batna_certainty = certainty;
        self
    }

    pub fn with_loss_aversion(mut self, lambda: f64) -> Self {
        self.loss_aversion = lambda;
        self
    }

    pub fn with_risk_attitude(mut self, exponent: f64) -> Self {
        self.risk_attitude = exponent;
        self
    }

    pub fn with_domestic_constraints(mut self, value: f64) -> Self {
        self.domestic_constraints = value;
        self
    }

    pub fn with_time_pressure(mut self, value: f64) -> Self {
        self.time_pressure = value;
        self
    }

    pub fn with_trust_level(mut self, value: f64) -> Self {
        self.trust_level = value;
        self
    }

    /// Utilities received in past rounds, oldest first
    pub fn utility_history(&self) -> &[f64] {
        &self.utility_history
    }

    /// Mean of the most recent `n` utilities, if at least `n` are recorded
    pub fn recent_mean_utility(&self, n: usize) -> Option<f64> {
        if n == 0 || self.utility_history.len() < n {
            return None;
        }
        let tail = &self.utility_history[self.utility_history.len() - n..];
        Some(tail.iter().sum::<f64>() / n as f64)
    }

    pub(crate) fn record_utility(&mut self, utility: f64) {
        self.utility_history.push(utility);
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_clamps_and_handles_degenerate_range() {
        let attr =
            Attribute::new("standoff", "resupply_SOP.standoff_nm", 1.0).with_range(0.0, 10.0);
        assert_eq!(attr.normalize(5.0), 0.5);
        assert_eq!(attr.normalize(-3.0), 0.0);
        assert_eq!(attr.normalize(25.0), 1.0);

        let flat = Attribute::new("flat", "x.y", 1.0).with_range(2.0, 2.0);
        assert_eq!(flat.normalize(2.0), 0.5);
    }

    #[test]
    fn test_recent_mean_requires_full_window() {
        let mut party = Party::new("a", 0.3);
        party.record_utility(0.2);
        party.record_utility(0.4);
        assert_eq!(party.recent_mean_utility(3), None);

        party.record_utility(0.6);
        party.record_utility(0.8);
        let mean = party.recent_mean_utility(3).unwrap();
        assert!((mean - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_party_json_defaults() {
        let json = r#"{"id": "claimant_b", "batna_value": 0.35}"#;
        let party: Party = serde_json::from_str(json).unwrap();
        assert_eq!(party.batna_certainty, 1.0);
        assert_eq!(party.loss_aversion, DEFAULT_LOSS_AVERSION);
        assert_eq!(party.risk_attitude, DEFAULT_RISK_ATTITUDE);
        assert_eq!(party.trust_level, DEFAULT_TRUST_LEVEL);
        assert!(party.attributes.is_empty());
    }
}
