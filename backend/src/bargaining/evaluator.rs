//! Bargaining Evaluator
//!
//! Scores a proposed agreement for every registered party and reports
//! round-level indicators.
//!
//! # Round
//!
//! ```text
//! 1. Advance round counter (always, even if the call then fails)
//! 2. Resolve proposer
//! 3. Per party (id order):
//!      utility   = weighted prospect-theory value + interactions + noise
//!      threshold = BATNA adjusted for certainty, time pressure, politics
//!      surplus   = utility - threshold
//!      P(accept) = 1 for the proposer, trust-scaled logistic otherwise
//! 4. Append utilities to histories
//! 5. Pareto proxy, Nash product, ZOPA, overall acceptance
//! ```
//!
//! # Example
//!
//! ```rust
//! use agreement_simulator_core_rs::bargaining::{BargainingEvaluator, EvaluatorConfig, Framing};
//! use agreement_simulator_core_rs::models::{Agreement, Attribute, Party, TermValue};
//!
//! let mut evaluator = BargainingEvaluator::new(EvaluatorConfig::default().with_seed(7)).unwrap();
//! evaluator
//!     .register_party(
//!         Party::new("coastal_state", 0.3)
//!             .with_attribute(
//!                 Attribute::new("standoff", "resupply_SOP.standoff_nm", 1.0)
//!                     .with_range(0.0, 10.0),
//!             ),
//!     )
//!     .unwrap();
//!
//! let agreement = Agreement::new()
//!     .with_term("resupply_SOP", [("standoff_nm", TermValue::from(8.0))]);
//! let outcome = evaluator.evaluate("coastal_state", &agreement, Framing::Neutral).unwrap();
//!
//! assert_eq!(outcome.round, 1);
//! assert_eq!(outcome.acceptance_probabilities["coastal_state"], 1.0);
//! ```

use crate::bargaining::outcome::{nash_product, pareto_efficient, RoundOutcome, Zopa};
use crate::bargaining::utility::{base_utility, Framing, NEUTRAL_VALUE};
use crate::core::time::StepClock;
use crate::models::agreement::Agreement;
use crate::models::party::Party;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default number of rounds over which time pressure builds
pub const DEFAULT_MAX_ROUNDS: usize = 10;

/// Default standard deviation of per-round utility noise
pub const DEFAULT_NOISE_STD: f64 = 0.02;

/// Maximum threshold reduction from time pressure
pub const TIME_PRESSURE_CONCESSION: f64 = 0.15;

/// Threshold increase per unit of domestic constraint
pub const DOMESTIC_RIGIDITY: f64 = 0.1;

/// Logistic steepness of the acceptance curve
pub const ACCEPTANCE_STEEPNESS: f64 = 10.0;

/// Bonus for an offer that beats the recent trend
pub const IMPROVEMENT_BONUS: f64 = 1.1;

/// History length needed for the improvement bonus
pub const IMPROVEMENT_WINDOW: usize = 3;

// ============================================================================
// Configuration
// ============================================================================

/// Evaluator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Rounds over which time pressure reaches full effect (> 0)
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    /// Utility noise std (0 disables noise)
    #[serde(default = "default_noise_std")]
    pub noise_std: f64,

    /// RNG seed (None = fresh entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_max_rounds() -> usize {
    DEFAULT_MAX_ROUNDS
}

fn default_noise_std() -> f64 {
    DEFAULT_NOISE_STD
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            noise_std: DEFAULT_NOISE_STD,
            seed: None,
        }
    }
}

impl EvaluatorConfig {
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_noise_std(mut self, noise_std: f64) -> Self {
        self.noise_std = noise_std;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Evaluation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid party {party_id}: {reason}")]
    InvalidParty { party_id: String, reason: String },

    #[error("Duplicate party ID: {0}")]
    DuplicateParty(String),

    #[error("Party not found: {0}")]
    PartyNotFound(String),
}

// ============================================================================
// Evaluator
// ============================================================================

/// Stateful evaluator over a registry of parties
///
/// State carried between calls: the round counter, each party's utility
/// history and trust level, and the noise generator.
#[derive(Debug, Clone)]
pub struct BargainingEvaluator {
    config: EvaluatorConfig,
    parties: BTreeMap<String, Party>,
    rounds: StepClock,
    rng: RngManager,
}

impl BargainingEvaluator {
    pub fn new(config: EvaluatorConfig) -> Result<Self, EvaluationError> {
        if config.max_rounds == 0 {
            return Err(EvaluationError::InvalidConfig(
                "max_rounds must be > 0".to_string(),
            ));
        }
        if !(config.noise_std.is_finite() && config.noise_std >= 0.0) {
            return Err(EvaluationError::InvalidConfig(format!(
                "noise_std must be finite and >= 0, got {}",
                config.noise_std
            )));
        }

        let seed = config.seed.unwrap_or_else(RngManager::entropy_seed);
        info!(
            max_rounds = config.max_rounds,
            noise_std = config.noise_std,
            seed,
            "Bargaining evaluator initialized"
        );

        Ok(Self {
            rounds: StepClock::new(config.max_rounds),
            rng: RngManager::new(seed),
            parties: BTreeMap::new(),
            config,
        })
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Validate and add a party
    pub fn register_party(&mut self, party: Party) -> Result<(), EvaluationError> {
        validate_party(&party)?;
        if self.parties.contains_key(&party.id) {
            return Err(EvaluationError::DuplicateParty(party.id));
        }
        debug!(party_id = %party.id, attributes = party.attributes.len(), "Party registered");
        self.parties.insert(party.id.clone(), party);
        Ok(())
    }

    pub fn party(&self, party_id: &str) -> Option<&Party> {
        self.parties.get(party_id)
    }

    /// Registered parties in id order
    pub fn parties(&self) -> impl Iterator<Item = &Party> {
        self.parties.values()
    }

    /// Rounds evaluated so far (including failed calls)
    pub fn current_round(&self) -> usize {
        self.rounds.current_step()
    }

    /// Shift a party's trust, clamped to [0, 1]; returns the new level
    pub fn adjust_trust(&mut self, party_id: &str, delta: f64) -> Result<f64, EvaluationError> {
        let party = self
            .parties
            .get_mut(party_id)
            .ok_or_else(|| EvaluationError::PartyNotFound(party_id.to_string()))?;
        if !delta.is_finite() {
            return Err(EvaluationError::InvalidConfig(format!(
                "trust delta must be finite, got {}",
                delta
            )));
        }
        party.trust_level = (party.trust_level + delta).clamp(0.0, 1.0);
        Ok(party.trust_level)
    }

    /// Utility of `agreement` for `party`, with this evaluator's noise
    ///
    /// Consumes one normal draw when noise is enabled.
    pub fn calculate_utility(
        &mut self,
        party: &Party,
        agreement: &Agreement,
        framing: Framing,
    ) -> f64 {
        noisy_utility(&mut self.rng, self.config.noise_std, party, agreement, framing)
    }

    /// Acceptance threshold of `party` at the current round
    pub fn dynamic_threshold(&self, party: &Party) -> f64 {
        let mut threshold = party.batna_value;
        if party.batna_certainty < 1.0 {
            threshold *= party.batna_certainty.powf(1.0 / party.risk_attitude);
        }
        threshold -= party.time_pressure * self.rounds.progress() * TIME_PRESSURE_CONCESSION;
        threshold += party.domestic_constraints * DOMESTIC_RIGIDITY;
        threshold.clamp(0.0, 1.0)
    }

    /// Evaluate one proposal
    pub fn evaluate(
        &mut self,
        proposer: &str,
        agreement: &Agreement,
        framing: Framing,
    ) -> Result<RoundOutcome, EvaluationError> {
        self.rounds.advance();
        let round = self.rounds.current_step();

        if self.parties.is_empty() {
            warn!(round, proposer, "No parties registered; returning neutral outcome");
            return Ok(RoundOutcome::neutral(round, proposer, framing));
        }
        if !self.parties.contains_key(proposer) {
            return Err(EvaluationError::PartyNotFound(proposer.to_string()));
        }

        let mut utilities = BTreeMap::new();
        let mut thresholds = BTreeMap::new();
        let mut surpluses = BTreeMap::new();
        let mut probabilities = BTreeMap::new();

        for (id, party) in &self.parties {
            let threshold = self.dynamic_threshold(party);
            let utility =
                noisy_utility(&mut self.rng, self.config.noise_std, party, agreement, framing);
            let surplus = utility - threshold;

            let probability = if id == proposer {
                1.0
            } else {
                acceptance_probability(
                    surplus,
                    party.recent_mean_utility(IMPROVEMENT_WINDOW),
                    party.trust_level,
                )
            };

            utilities.insert(id.clone(), utility);
            thresholds.insert(id.clone(), threshold);
            surpluses.insert(id.clone(), surplus);
            probabilities.insert(id.clone(), probability);
        }

        for (id, party) in self.parties.iter_mut() {
            if let Some(&utility) = utilities.get(id) {
                party.record_utility(utility);
            }
        }

        let outcome = RoundOutcome {
            round,
            proposer: proposer.to_string(),
            framing,
            pareto_efficient: pareto_efficient(&utilities, &thresholds),
            nash_product: nash_product(&surpluses),
            zopa: Zopa::from_round(&utilities, &thresholds),
            overall_acceptance: probabilities.values().product(),
            utilities,
            thresholds,
            acceptance_probabilities: probabilities,
            surpluses,
        };

        debug!(
            round,
            proposer,
            framing = %framing,
            pareto = outcome.pareto_efficient,
            nash = outcome.nash_product,
            zopa_exists = outcome.zopa.exists,
            overall_acceptance = outcome.overall_acceptance,
            "Round evaluated"
        );

        Ok(outcome)
    }
}

/// Base utility plus one noise draw, clamped to [0, 1]
///
/// A non-finite sum falls back to the neutral value.
fn noisy_utility(
    rng: &mut RngManager,
    noise_std: f64,
    party: &Party,
    agreement: &Agreement,
    framing: Framing,
) -> f64 {
    let noise = rng.normal(0.0, noise_std);
    let utility = base_utility(party, agreement, framing) + noise;
    if utility.is_finite() {
        utility.clamp(0.0, 1.0)
    } else {
        NEUTRAL_VALUE
    }
}

/// Acceptance probability of a non-proposing party
///
/// Logistic in surplus, boosted when the offer beats the mean of the last
/// three utilities, scaled by trust.
pub fn acceptance_probability(surplus: f64, recent_mean: Option<f64>, trust: f64) -> f64 {
    let mut probability = 1.0 / (1.0 + (-ACCEPTANCE_STEEPNESS * surplus).exp());
    if recent_mean.is_some_and(|mean| mean < surplus) {
        probability *= IMPROVEMENT_BONUS;
    }
    probability *= 0.5 + 0.5 * trust;
    probability.clamp(0.0, 1.0)
}

// ============================================================================
// Validation
// ============================================================================

fn invalid(party: &Party, reason: impl Into<String>) -> EvaluationError {
    EvaluationError::InvalidParty {
        party_id: party.id.clone(),
        reason: reason.into(),
    }
}

fn check_unit(party: &Party, name: &str, value: f64) -> Result<(), EvaluationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(party, format!("{} must be in [0, 1], got {}", name, value)))
    }
}

/// Validate a party before registration
pub fn validate_party(party: &Party) -> Result<(), EvaluationError> {
    if party.id.trim().is_empty() {
        return Err(invalid(party, "id must not be empty"));
    }

    check_unit(party, "batna_value", party.batna_value)?;
    check_unit(party, "domestic_constraints", party.domestic_constraints)?;
    check_unit(party, "time_pressure", party.time_pressure)?;
    check_unit(party, "trust_level", party.trust_level)?;

    if !(party.batna_certainty > 0.0 && party.batna_certainty <= 1.0) {
        return Err(invalid(
            party,
            format!("batna_certainty must be in (0, 1], got {}", party.batna_certainty),
        ));
    }
    if !(party.risk_attitude.is_finite() && party.risk_attitude > 0.0) {
        return Err(invalid(
            party,
            format!("risk_attitude must be finite and > 0, got {}", party.risk_attitude),
        ));
    }
    if !(party.loss_aversion.is_finite() && party.loss_aversion >= 0.0) {
        return Err(invalid(
            party,
            format!("loss_aversion must be finite and >= 0, got {}", party.loss_aversion),
        ));
    }

    let mut names = HashSet::new();
    for attribute in &party.attributes {
        if attribute.name.trim().is_empty() {
            return Err(invalid(party, "attribute name must not be empty"));
        }
        if !names.insert(attribute.name.as_str()) {
            return Err(invalid(party, format!("duplicate attribute {}", attribute.name)));
        }
        if !(attribute.weight.is_finite() && attribute.weight >= 0.0) {
            return Err(invalid(
                party,
                format!("attribute {}: weight must be finite and >= 0", attribute.name),
            ));
        }
        let range_ok =
            attribute.min.is_finite() && attribute.max.is_finite() && attribute.min < attribute.max;
        if !range_ok {
            return Err(invalid(
                party,
                format!("attribute {}: range must satisfy min < max", attribute.name),
            ));
        }
        let points = [
            attribute.reference_point,
            attribute.aspiration_point,
            attribute.satiation_point,
        ];
        if points.iter().flatten().any(|p| !p.is_finite())
            || attribute.choices.values().any(|v| !v.is_finite())
        {
            return Err(invalid(
                party,
                format!("attribute {}: reference values must be finite", attribute.name),
            ));
        }
    }

    for interaction in &party.interactions {
        for name in [&interaction.first, &interaction.second] {
            if !names.contains(name.as_str()) {
                return Err(invalid(
                    party,
                    format!("interaction references undeclared attribute {}", name),
                ));
            }
        }
        if !interaction.weight.is_finite() {
            return Err(invalid(party, "interaction weight must be finite"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::party::Attribute;

    fn quiet() -> EvaluatorConfig {
        EvaluatorConfig::default().with_noise_std(0.0).with_seed(1)
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            BargainingEvaluator::new(EvaluatorConfig::default().with_max_rounds(0)),
            Err(EvaluationError::InvalidConfig(_))
        ));
        assert!(matches!(
            BargainingEvaluator::new(EvaluatorConfig::default().with_noise_std(-0.1)),
            Err(EvaluationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_duplicate_party_rejected() {
        let mut evaluator = BargainingEvaluator::new(quiet()).unwrap();
        evaluator.register_party(Party::new("a", 0.3)).unwrap();
        assert_eq!(
            evaluator.register_party(Party::new("a", 0.4)),
            Err(EvaluationError::DuplicateParty("a".to_string()))
        );
    }

    #[test]
    fn test_interaction_must_reference_declared_attributes() {
        let party = Party::new("a", 0.3)
            .with_attribute(Attribute::new("x", "t.x", 1.0))
            .with_interaction("x", "ghost", 1.0);
        assert!(matches!(
            validate_party(&party),
            Err(EvaluationError::InvalidParty { .. })
        ));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let party = Party::new("a", 0.3).with_attribute(Attribute::new("x", "t.x", -1.0));
        assert!(validate_party(&party).is_err());
    }

    #[test]
    fn test_unknown_proposer_leaves_history_untouched() {
        let mut evaluator = BargainingEvaluator::new(quiet()).unwrap();
        evaluator.register_party(Party::new("a", 0.3)).unwrap();

        let result = evaluator.evaluate("nobody", &Agreement::new(), Framing::Neutral);
        assert_eq!(result, Err(EvaluationError::PartyNotFound("nobody".to_string())));
        assert!(evaluator.party("a").unwrap().utility_history().is_empty());
        // Counter still advanced
        assert_eq!(evaluator.current_round(), 1);
    }

    #[test]
    fn test_empty_registry_is_neutral() {
        let mut evaluator = BargainingEvaluator::new(quiet()).unwrap();
        let outcome = evaluator.evaluate("anyone", &Agreement::new(), Framing::Gain).unwrap();
        assert!(outcome.utilities.is_empty());
        assert_eq!(outcome.zopa, Zopa::neutral());
        assert_eq!(outcome.nash_product, 0.0);
        assert_eq!(outcome.overall_acceptance, 0.5);
    }

    #[test]
    fn test_threshold_adjustments() {
        let mut evaluator = BargainingEvaluator::new(quiet().with_max_rounds(4)).unwrap();
        let party = Party::new("a", 0.6)
            .with_batna_certainty(0.25)
            .with_risk_attitude(0.5)
            .with_time_pressure(1.0)
            .with_domestic_constraints(0.5);

        // Round 0: 0.6 * 0.25^2 + 0.05
        assert!((evaluator.dynamic_threshold(&party) - (0.0375 + 0.05)).abs() < 1e-12);

        evaluator.rounds.advance();
        evaluator.rounds.advance();
        // Half way: minus 0.075
        assert!((evaluator.dynamic_threshold(&party) - 0.0125).abs() < 1e-12);
    }

    #[test]
    fn test_acceptance_probability_shape() {
        assert!((acceptance_probability(0.0, None, 1.0) - 0.5).abs() < 1e-12);
        assert!((acceptance_probability(0.0, None, 0.0) - 0.25).abs() < 1e-12);
        // Bonus only when the recent mean is below the surplus
        let boosted = acceptance_probability(0.2, Some(0.1), 0.5);
        let plain = acceptance_probability(0.2, Some(0.3), 0.5);
        assert!((boosted - plain * 1.1).abs() < 1e-12);
        assert!(acceptance_probability(1.0, Some(0.0), 1.0) <= 1.0);
    }

    #[test]
    fn test_adjust_trust_clamps() {
        let mut evaluator = BargainingEvaluator::new(quiet()).unwrap();
        evaluator.register_party(Party::new("a", 0.3)).unwrap();
        assert_eq!(evaluator.adjust_trust("a", 0.9).unwrap(), 1.0);
        assert_eq!(evaluator.adjust_trust("a", -2.0).unwrap(), 0.0);
        assert!(evaluator.adjust_trust("b", 0.1).is_err());
    }

    #[test]
    fn test_adjust_trust_rejects_non_finite_delta() {
        let mut evaluator = BargainingEvaluator::new(quiet()).unwrap();
        evaluator.register_party(Party::new("a", 0.3)).unwrap();
        assert!(matches!(
            evaluator.adjust_trust("a", f64::NAN),
            Err(EvaluationError::InvalidConfig(_))
        ));
        assert!(evaluator.adjust_trust("a", f64::INFINITY).is_err());
        assert_eq!(evaluator.party("a").unwrap().trust_level, 0.5);
    }

    #[test]
    fn test_history_grows_once_per_round() {
        let mut evaluator = BargainingEvaluator::new(quiet()).unwrap();
        evaluator.register_party(Party::new("a", 0.3)).unwrap();
        evaluator.register_party(Party::new("b", 0.3)).unwrap();
        for _ in 0..3 {
            evaluator.evaluate("a", &Agreement::new(), Framing::Neutral).unwrap();
        }
        assert_eq!(evaluator.party("a").unwrap().utility_history().len(), 3);
        assert_eq!(evaluator.party("b").unwrap().utility_history(), &[0.5, 0.5, 0.5]);
    }
}
