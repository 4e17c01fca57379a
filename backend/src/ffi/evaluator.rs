//! PyO3 wrapper for the bargaining evaluator

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use super::types::{evaluation_err, from_json, to_json, EvaluatorSetup};
use crate::bargaining::{BargainingEvaluator, Framing};
use crate::models::{Agreement, Party};

/// Python wrapper for [`BargainingEvaluator`]
///
/// # Example (from Python)
///
/// ```python
/// from agreement_simulator_core_rs import Evaluator
///
/// ev = Evaluator(json.dumps({"config": {"seed": 7}, "parties": parties}))
/// outcome = json.loads(ev.evaluate("claimant_a", json.dumps(agreement), "gain"))
/// print(outcome["zopa"])
/// ```
#[pyclass(name = "Evaluator")]
pub struct PyEvaluator {
    inner: BargainingEvaluator,
}

#[pymethods]
impl PyEvaluator {
    /// Create an evaluator from `{"config": {...}, "parties": [...]}`
    #[new]
    fn new(setup_json: &str) -> PyResult<Self> {
        let setup: EvaluatorSetup = from_json("evaluator setup", setup_json)?;
        let mut inner = BargainingEvaluator::new(setup.config).map_err(evaluation_err)?;
        for party in setup.parties {
            inner.register_party(party).map_err(evaluation_err)?;
        }
        Ok(PyEvaluator { inner })
    }

    fn register_party(&mut self, party_json: &str) -> PyResult<()> {
        let party: Party = from_json("party", party_json)?;
        self.inner.register_party(party).map_err(evaluation_err)
    }

    /// Evaluate one proposal; returns the round outcome as JSON
    ///
    /// `framing` is "gain", "loss" or "neutral" (default).
    #[pyo3(signature = (proposer, agreement_json, framing = None))]
    fn evaluate(
        &mut self,
        proposer: &str,
        agreement_json: &str,
        framing: Option<&str>,
    ) -> PyResult<String> {
        let agreement: Agreement = from_json("agreement", agreement_json)?;
        let framing: Framing = framing
            .unwrap_or_default()
            .parse()
            .map_err(|e| PyValueError::new_err(format!("{}", e)))?;
        let outcome = self
            .inner
            .evaluate(proposer, &agreement, framing)
            .map_err(evaluation_err)?;
        to_json(&outcome)
    }

    fn adjust_trust(&mut self, party_id: &str, delta: f64) -> PyResult<f64> {
        self.inner.adjust_trust(party_id, delta).map_err(evaluation_err)
    }

    fn current_round(&self) -> usize {
        self.inner.current_round()
    }

    /// Party (with utility history) as JSON, or None if unknown
    fn party(&self, party_id: &str) -> PyResult<Option<String>> {
        self.inner.party(party_id).map(to_json).transpose()
    }
}
