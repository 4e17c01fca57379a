//! Scripted negotiation sessions
//!
//! A session bundles an evaluator config, the parties, and an ordered list of
//! proposals. It is the JSON shape the CLI and the Python bindings accept.

use crate::bargaining::evaluator::{BargainingEvaluator, EvaluationError, EvaluatorConfig};
use crate::bargaining::outcome::RoundOutcome;
use crate::bargaining::utility::Framing;
use crate::models::agreement::Agreement;
use crate::models::party::Party;
use serde::{Deserialize, Serialize};

/// One proposal put to the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub proposer: String,
    pub agreement: Agreement,
    #[serde(default)]
    pub framing: Framing,
    /// Trust shifts applied after this round, by party id
    #[serde(default)]
    pub trust_adjustments: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub config: EvaluatorConfig,
    pub parties: Vec<Party>,
    #[serde(default)]
    pub proposals: Vec<Proposal>,
}

impl Session {
    /// Register every party and evaluate the proposals in order
    ///
    /// Trust adjustments are checked before their round is evaluated, so a
    /// bad adjustment never leaves an evaluated round unreported.
    pub fn run(&self) -> Result<Vec<RoundOutcome>, EvaluationError> {
        let mut evaluator = BargainingEvaluator::new(self.config.clone())?;
        for party in &self.parties {
            evaluator.register_party(party.clone())?;
        }

        let mut outcomes = Vec::with_capacity(self.proposals.len());
        for proposal in &self.proposals {
            for (party_id, delta) in &proposal.trust_adjustments {
                if evaluator.party(party_id).is_none() {
                    return Err(EvaluationError::PartyNotFound(party_id.clone()));
                }
                if !delta.is_finite() {
                    return Err(EvaluationError::InvalidConfig(format!(
                        "trust delta for {} must be finite, got {}",
                        party_id, delta
                    )));
                }
            }
            outcomes.push(evaluator.evaluate(
                &proposal.proposer,
                &proposal.agreement,
                proposal.framing,
            )?);
            for (party_id, delta) in &proposal.trust_adjustments {
                evaluator.adjust_trust(party_id, *delta)?;
            }
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_json() {
        let json = r#"{
            "config": {"noise_std": 0.0, "seed": 3},
            "parties": [
                {"id": "a", "batna_value": 0.3},
                {"id": "b", "batna_value": 0.6}
            ],
            "proposals": [
                {"proposer": "a", "agreement": {}},
                {"proposer": "b", "agreement": {}, "framing": "loss",
                 "trust_adjustments": [["a", 0.2]]}
            ]
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        let outcomes = session.run().unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].round, 2);
        assert_eq!(outcomes[1].framing, Framing::Loss);
        assert_eq!(outcomes[0].utilities["a"], 0.5);
    }

    #[test]
    fn test_session_rejects_bad_adjustment_before_evaluating() {
        let session = Session {
            config: EvaluatorConfig::default().with_seed(1),
            parties: vec![Party::new("a", 0.3), Party::new("b", 0.4)],
            proposals: vec![Proposal {
                proposer: "a".to_string(),
                agreement: Agreement::new(),
                framing: Framing::Neutral,
                trust_adjustments: vec![("ghost".to_string(), 0.1)],
            }],
        };
        assert_eq!(
            session.run(),
            Err(EvaluationError::PartyNotFound("ghost".to_string()))
        );

        let mut nan_delta = session.clone();
        nan_delta.proposals[0].trust_adjustments = vec![("b".to_string(), f64::NAN)];
        assert!(matches!(nan_delta.run(), Err(EvaluationError::InvalidConfig(_))));
    }

    #[test]
    fn test_session_propagates_unknown_proposer() {
        let session = Session {
            config: EvaluatorConfig::default().with_seed(1),
            parties: vec![Party::new("a", 0.3)],
            proposals: vec![Proposal {
                proposer: "z".to_string(),
                agreement: Agreement::new(),
                framing: Framing::Neutral,
                trust_adjustments: Vec::new(),
            }],
        };
        assert_eq!(
            session.run(),
            Err(EvaluationError::PartyNotFound("z".to_string()))
        );
    }
}
