//! Agreement Simulator Core - Rust Engine
//!
//! Two independent engines for stress-testing agreements over disputed
//! maritime, territorial and resource areas:
//!
//! - a **conflict simulator** that runs a population of friction agents
//!   step by step, optionally damped by an agreement, and records incidents
//! - a **bargaining evaluator** that scores a proposed agreement for each
//!   negotiating party with a prospect-theory utility model
//!
//! # Architecture
//!
//! - **core**: Step clock
//! - **models**: Domain types (Agreement, Agent, Incident, Party, ProcessState)
//! - **domains**: Rosters, incident catalogs and term effects per domain
//! - **context**: Environmental conditions
//! - **orchestrator**: Simulation loop, checkpoints, ensembles
//! - **bargaining**: Utility, thresholds, acceptance, round indicators
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (one seeded RNG per engine)
//! 2. Aggression, pressure, risk, severity and utility stay in bounds
//! 3. Incident history only grows, in step order

// Module declarations
pub mod bargaining;
pub mod context;
pub mod core;
pub mod domains;
pub mod models;
pub mod orchestrator;
pub mod rng;

// Re-exports for convenience
pub use bargaining::{
    BargainingEvaluator, EvaluationError, EvaluatorConfig, Framing, RoundOutcome, Zopa,
};
pub use context::{EnvironmentContext, MediaVisibility, Weather};
pub use core::time::StepClock;
pub use domains::Domain;
pub use models::{
    Agent, AgentProfile, Agreement, Attribute, Incident, IncidentLog, IncidentRow, Party,
    ProcessState, TermValue,
};
pub use orchestrator::{
    run_ensemble, simulate, ConflictSimulator, EnsembleReport, SimulationConfig, SimulationError,
    SimulationResult, StepResult,
};
pub use rng::RngManager;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn agreement_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::simulator::PySimulator>()?;
    m.add_class::<ffi::evaluator::PyEvaluator>()?;
    Ok(())
}
