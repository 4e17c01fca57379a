//! Python bindings (feature `pyo3`)
//!
//! JSON strings cross the boundary in both directions; the serde shapes are
//! the same ones the CLI reads and writes.

pub mod evaluator;
pub mod simulator;
pub mod types;
