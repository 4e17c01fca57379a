//! Conversion helpers for the FFI boundary

use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::PyErr;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::bargaining::{EvaluationError, EvaluatorConfig};
use crate::models::Party;
use crate::orchestrator::SimulationError;

/// Constructor payload for `Evaluator(json)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorSetup {
    #[serde(default)]
    pub config: EvaluatorConfig,
    #[serde(default)]
    pub parties: Vec<Party>,
}

/// Parse a JSON argument, naming it in the error
pub fn from_json<T: DeserializeOwned>(what: &str, json: &str) -> Result<T, PyErr> {
    serde_json::from_str(json)
        .map_err(|e| PyValueError::new_err(format!("Invalid {} JSON: {}", what, e)))
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, PyErr> {
    serde_json::to_string(value)
        .map_err(|e| PyRuntimeError::new_err(format!("Serialization failed: {}", e)))
}

/// Configuration problems become ValueError, everything else RuntimeError
pub fn simulation_err(error: SimulationError) -> PyErr {
    match error {
        SimulationError::InvalidConfig(_) | SimulationError::UnknownDomain(_) => {
            PyValueError::new_err(error.to_string())
        }
        SimulationError::SerializationError(_) | SimulationError::StateValidationError(_) => {
            PyRuntimeError::new_err(error.to_string())
        }
    }
}

/// Lookup failures become KeyError, validation failures ValueError
pub fn evaluation_err(error: EvaluationError) -> PyErr {
    match error {
        EvaluationError::PartyNotFound(_) => PyKeyError::new_err(error.to_string()),
        _ => PyValueError::new_err(error.to_string()),
    }
}
