//! Bargaining Evaluator
//!
//! Prospect-theory scoring of proposed agreements for a registry of parties.
//! Independent of the conflict simulator.

pub mod evaluator;
pub mod outcome;
pub mod session;
pub mod utility;

pub use evaluator::{
    acceptance_probability, validate_party, BargainingEvaluator, EvaluationError, EvaluatorConfig,
};
pub use outcome::{RoundOutcome, Zopa};
pub use session::{Proposal, Session};
pub use utility::{base_utility, Framing};
