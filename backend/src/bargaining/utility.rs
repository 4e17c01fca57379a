//! Prospect-theory utility
//!
//! Pure functions from (party, agreement, framing) to utility. The evaluator
//! adds per-round noise and clamps; everything here is deterministic.

use crate::models::agreement::{Agreement, TermValue};
use crate::models::party::{Attribute, Party, ValueShape};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Neutral value used when nothing better is known
pub const NEUTRAL_VALUE: f64 = 0.5;

/// Share of marginal value kept past the satiation point
pub const SATIATION_RETENTION: f64 = 0.8;

/// Scale applied to interaction terms
pub const INTERACTION_SCALE: f64 = 0.1;

/// How a proposal is presented to the parties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// Outcomes read as gains over the reference point
    Gain,
    /// Outcomes read as losses against the aspiration point
    Loss,
    #[default]
    Neutral,
}

impl Framing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framing::Gain => "gain",
            Framing::Loss => "loss",
            Framing::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized framing label
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown framing '{0}'")]
pub struct UnknownFraming(pub String);

impl FromStr for Framing {
    type Err = UnknownFraming;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gain" => Ok(Framing::Gain),
            "loss" => Ok(Framing::Loss),
            "neutral" | "" => Ok(Framing::Neutral),
            other => Err(UnknownFraming(other.to_string())),
        }
    }
}

/// Normalized [0, 1] reading of one attribute from an agreement
///
/// Missing values fall back to the attribute's reference point. Strings
/// resolve through `choices`; unknown strings and nested maps read as the
/// neutral 0.5 without further normalization.
pub fn normalized_value(attribute: &Attribute, agreement: &Agreement) -> f64 {
    match agreement.get(&attribute.path) {
        None => attribute.normalize(attribute.reference_raw()),
        Some(TermValue::Number(n)) => attribute.normalize(*n),
        Some(TermValue::Bool(b)) => attribute.normalize(if *b { 1.0 } else { 0.0 }),
        Some(TermValue::Text(label)) => match attribute.choices.get(label) {
            Some(raw) => attribute.normalize(*raw),
            None => NEUTRAL_VALUE,
        },
        Some(TermValue::Nested(_)) => NEUTRAL_VALUE,
    }
}

/// Value function without framing: concave `x^r` or convex `1 - (1 - x)^r`
pub fn shaped_value(x: f64, shape: ValueShape, r: f64) -> f64 {
    match shape {
        ValueShape::Concave => x.powf(r),
        ValueShape::Convex => 1.0 - (1.0 - x).powf(r),
    }
}

/// Neutral value with satiation
///
/// Past the normalized satiation point `s`, only 80% of the further gain
/// counts: `v(s) + 0.8 (v(x) - v(s))`.
pub fn neutral_value(x: f64, shape: ValueShape, r: f64, satiation: Option<f64>) -> f64 {
    let v = shaped_value(x, shape, r);
    match satiation {
        Some(s) if x > s => {
            let vs = shaped_value(s, shape, r);
            vs + SATIATION_RETENTION * (v - vs)
        }
        _ => v,
    }
}

/// Reference-dependent value
///
/// Gains over `reference` are compressed by the exponent; shortfalls are
/// amplified by `loss_aversion` and floored at zero.
///
/// # Example
/// ```
/// use agreement_simulator_core_rs::bargaining::utility::framed_value;
///
/// // At the reference point the value is the reference itself
/// assert!((framed_value(0.5, 0.5, 0.88, 2.25) - 0.5).abs() < 1e-12);
/// // Deep shortfalls bottom out at zero
/// assert_eq!(framed_value(0.0, 0.5, 0.88, 2.25), 0.0);
/// ```
pub fn framed_value(x: f64, reference: f64, r: f64, loss_aversion: f64) -> f64 {
    if x >= reference {
        if reference >= 1.0 {
            return 1.0;
        }
        reference + (1.0 - reference) * ((x - reference) / (1.0 - reference)).powf(r)
    } else {
        (reference - loss_aversion * (reference - x).powf(r)).max(0.0)
    }
}

/// Perceived value of one attribute under a framing
pub fn attribute_value(
    party: &Party,
    attribute: &Attribute,
    agreement: &Agreement,
    framing: Framing,
) -> f64 {
    let x = normalized_value(attribute, agreement);
    let r = party.risk_attitude;
    match framing {
        Framing::Neutral => {
            let satiation = attribute.satiation_point.map(|s| attribute.normalize(s));
            neutral_value(x, attribute.shape, r, satiation)
        }
        Framing::Gain => {
            let reference = attribute.normalize(attribute.reference_raw());
            framed_value(x, reference, r, party.loss_aversion)
        }
        Framing::Loss => {
            let reference = attribute.normalize(attribute.aspiration_raw());
            framed_value(x, reference, r, party.loss_aversion)
        }
    }
}

/// Weighted utility plus interaction terms, before noise and clamping
///
/// Zero total attribute weight (including no attributes) yields the
/// neutral 0.5 before interactions. The result is unclamped and may leave
/// [0, 1] through interaction terms.
pub fn base_utility(party: &Party, agreement: &Agreement, framing: Framing) -> f64 {
    let values: Vec<f64> = party
        .attributes
        .iter()
        .map(|attribute| attribute_value(party, attribute, agreement, framing))
        .collect();

    // Weights are rescaled by the largest one so huge weights cannot overflow
    let max_weight = party
        .attributes
        .iter()
        .map(|a| a.weight)
        .fold(0.0_f64, f64::max);
    let mut utility = if max_weight > 0.0 {
        let scaled: Vec<f64> = party.attributes.iter().map(|a| a.weight / max_weight).collect();
        let total: f64 = scaled.iter().sum();
        scaled.iter().zip(&values).map(|(w, v)| w * v).sum::<f64>() / total
    } else {
        warn!(party_id = %party.id, "Zero total attribute weight; using neutral utility");
        NEUTRAL_VALUE
    };

    let value_of = |name: &str| {
        party
            .attributes
            .iter()
            .position(|a| a.name == name)
            .map(|i| values[i])
    };
    for interaction in &party.interactions {
        let pair = (value_of(&interaction.first), value_of(&interaction.second));
        if let (Some(v1), Some(v2)) = pair {
            utility += interaction.weight * v1 * v2 * INTERACTION_SCALE;
        }
    }

    utility
}
