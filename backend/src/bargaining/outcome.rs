//! Round outcome and bargaining-round indicators

use crate::bargaining::utility::Framing;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aspiration level used by the Pareto proxy
pub const PARETO_ASPIRATION: f64 = 0.7;

/// Fraction of the aspiration some party must reach
pub const PARETO_PROXIMITY: f64 = 0.9;

/// Acceptance probability at which a party counts as accepting
pub const ACCEPTANCE_CUTOFF: f64 = 0.5;

/// Zone of possible agreement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zopa {
    /// Lowest threshold among parties
    pub lower: f64,
    /// Highest utility among parties
    pub upper: f64,
    pub exists: bool,
}

impl Zopa {
    /// Neutral zone reported for an empty registry
    pub fn neutral() -> Self {
        Self {
            lower: 0.5,
            upper: 0.5,
            exists: false,
        }
    }

    /// (min threshold, max utility); exists iff max utility >= min threshold
    pub fn from_round(
        utilities: &BTreeMap<String, f64>,
        thresholds: &BTreeMap<String, f64>,
    ) -> Self {
        if utilities.is_empty() || thresholds.is_empty() {
            return Self::neutral();
        }
        let lower = thresholds.values().copied().fold(f64::INFINITY, f64::min);
        let upper = utilities.values().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            lower,
            upper,
            exists: upper >= lower,
        }
    }
}

/// Everything one evaluation round reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Round counter after this call's increment
    pub round: usize,
    pub proposer: String,
    pub framing: Framing,
    pub utilities: BTreeMap<String, f64>,
    pub thresholds: BTreeMap<String, f64>,
    pub acceptance_probabilities: BTreeMap<String, f64>,
    pub surpluses: BTreeMap<String, f64>,
    /// Proxy: everyone clears their threshold and someone nears the aspiration
    pub pareto_efficient: bool,
    pub nash_product: f64,
    pub zopa: Zopa,
    /// Product of per-party acceptance probabilities
    pub overall_acceptance: f64,
}

impl RoundOutcome {
    /// Outcome for a round with no registered parties
    pub fn neutral(round: usize, proposer: impl Into<String>, framing: Framing) -> Self {
        Self {
            round,
            proposer: proposer.into(),
            framing,
            utilities: BTreeMap::new(),
            thresholds: BTreeMap::new(),
            acceptance_probabilities: BTreeMap::new(),
            surpluses: BTreeMap::new(),
            pareto_efficient: false,
            nash_product: 0.0,
            zopa: Zopa::neutral(),
            overall_acceptance: 0.5,
        }
    }

    /// Spread between the best- and worst-off party
    pub fn fairness_spread(&self) -> f64 {
        if self.utilities.is_empty() {
            return 0.0;
        }
        let max = self.utilities.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = self.utilities.values().copied().fold(f64::INFINITY, f64::min);
        max - min
    }

    /// Parties whose acceptance probability is at least one half
    pub fn accepted_by(&self) -> Vec<&str> {
        self.acceptance_probabilities
            .iter()
            .filter(|(_, &p)| p >= ACCEPTANCE_CUTOFF)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Pareto proxy over a round's utilities and thresholds
pub fn pareto_efficient(
    utilities: &BTreeMap<String, f64>,
    thresholds: &BTreeMap<String, f64>,
) -> bool {
    if utilities.is_empty() {
        return false;
    }
    let all_clear = utilities
        .iter()
        .all(|(id, u)| thresholds.get(id).is_some_and(|t| u >= t));
    let near_aspiration = utilities
        .values()
        .any(|&u| u >= PARETO_PROXIMITY * PARETO_ASPIRATION);
    all_clear && near_aspiration
}

/// Product of strictly positive surpluses (0 when none is positive)
pub fn nash_product(surpluses: &BTreeMap<String, f64>) -> f64 {
    let positive: Vec<f64> = surpluses.values().copied().filter(|&s| s > 0.0).collect();
    if positive.is_empty() {
        0.0
    } else {
        positive.iter().product()
    }
}
