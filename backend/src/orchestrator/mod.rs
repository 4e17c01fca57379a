//! Orchestrator - conflict simulation loop
//!
//! Drives the friction population step by step under an optional agreement.
//!
//! See `engine.rs` for the step loop, `checkpoint.rs` for pause/resume and
//! fingerprints, `ensemble.rs` for multi-seed runs.

pub mod checkpoint;
pub mod engine;
pub mod ensemble;

// Re-export main types for convenience
pub use engine::{
    simulate, validate_config, ConflictSimulator, ProcessSnapshot, SimulationConfig,
    SimulationError, SimulationResult, SimulationSummary, StepResult, MAX_STEPS,
};

pub use checkpoint::{compute_config_hash, run_digest, StateSnapshot};
pub use ensemble::{run_ensemble, EnsembleReport, EnsembleRun};
