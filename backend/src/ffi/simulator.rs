//! PyO3 wrapper for the conflict simulator

use pyo3::prelude::*;

use super::types::{from_json, simulation_err, to_json};
use crate::orchestrator::{ConflictSimulator, SimulationConfig};

/// Python wrapper for [`ConflictSimulator`]
///
/// # Example (from Python)
///
/// ```python
/// from agreement_simulator_core_rs import Simulator
///
/// sim = Simulator('{"steps": 200, "domain": "maritime", "seed": 42}')
/// result = json.loads(sim.run())
/// print(result["summary"]["total_incidents"])
/// ```
#[pyclass(name = "Simulator")]
pub struct PySimulator {
    inner: ConflictSimulator,
}

#[pymethods]
impl PySimulator {
    /// Create a simulator from a JSON `SimulationConfig`
    ///
    /// Raises ValueError on malformed JSON or invalid configuration.
    #[new]
    fn new(config_json: &str) -> PyResult<Self> {
        let config: SimulationConfig = from_json("simulation config", config_json)?;
        let inner = ConflictSimulator::new(config).map_err(simulation_err)?;
        Ok(PySimulator { inner })
    }

    /// Execute one step; returns the step result as JSON, or None when done
    fn step(&mut self) -> PyResult<Option<String>> {
        self.inner.step().map(|result| to_json(&result)).transpose()
    }

    /// Run all remaining steps; returns the simulation result as JSON
    fn run(&mut self) -> PyResult<String> {
        to_json(&self.inner.run())
    }

    /// Incidents so far as a JSON array of flat rows
    fn rows(&self) -> PyResult<String> {
        to_json(&self.inner.result().rows())
    }

    fn current_step(&self) -> usize {
        self.inner.current_step()
    }

    fn seed(&self) -> u64 {
        self.inner.seed()
    }

    fn is_complete(&self) -> bool {
        self.inner.is_complete()
    }

    /// Checkpoint as JSON
    fn save_state(&self) -> PyResult<String> {
        self.inner.save_state_json().map_err(simulation_err)
    }

    /// Resume from a checkpoint taken under the same config
    #[staticmethod]
    fn load_state(config_json: &str, state_json: &str) -> PyResult<Self> {
        let config: SimulationConfig = from_json("simulation config", config_json)?;
        let inner = ConflictSimulator::load_state_json(config, state_json).map_err(simulation_err)?;
        Ok(PySimulator { inner })
    }
}
