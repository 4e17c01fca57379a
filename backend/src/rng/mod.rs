//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, deterministic random number generation.
//! CRITICAL: All randomness in both engines MUST go through this module.
//! There is no ambient global generator; each engine instance owns one.

mod xorshift;

pub use xorshift::RngManager;
