//! xorshift64* random number generator
//!
//! Fast, deterministic PRNG used for every stochastic draw in both engines:
//! incident decisions, incident-type choice, severity draws and the
//! bounded-rationality noise added to utilities.
//!
//! # Determinism
//!
//! Same seed → same sequence of draws → byte-identical incident logs.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use agreement_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let roll = rng.next_f64(); // [0.0, 1.0)
/// assert!(roll < 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is remapped to 1 (xorshift cannot leave the all-zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Draw a fresh seed from OS entropy.
    ///
    /// Used when a caller does not supply a seed. The returned seed is
    /// reported back in run results so the run can be replayed.
    pub fn entropy_seed() -> u64 {
        let (high, low) = uuid::Uuid::new_v4().as_u64_pair();
        high ^ low.rotate_left(17)
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Get current RNG state (for checkpointing/replay)
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    ///
    /// # Example
    /// ```
    /// use agreement_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let probability = rng.next_f64();
    /// assert!(probability >= 0.0 && probability < 1.0);
    /// ```
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Top 53 bits → [0.0, 1.0)
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform draw in [min, max). Returns `min` when the interval is empty.
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        let u = self.next_f64();
        if max <= min {
            return min;
        }
        min + u * (max - min)
    }

    /// Standard normal draw via Box-Muller.
    pub fn standard_normal(&mut self) -> f64 {
        // Shift u1 into (0, 1] so ln() stays finite
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Normal draw with the given mean and standard deviation.
    ///
    /// A non-positive `std_dev` returns `mean` without consuming a draw.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev <= 0.0 {
            return mean;
        }
        mean + std_dev * self.standard_normal()
    }

    /// Pick an index with probability proportional to `weights`.
    ///
    /// Weights are relative and need not sum to one. Negative and
    /// non-finite weights count as zero. Returns `None` when no weight is
    /// positive.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let usable = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let total: f64 = weights.iter().copied().map(usable).sum();
        if total <= 0.0 {
            return None;
        }

        let mut target = self.next_f64() * total;
        let mut last_positive = None;
        for (idx, weight) in weights.iter().copied().map(usable).enumerate() {
            if weight <= 0.0 {
                continue;
            }
            last_positive = Some(idx);
            target -= weight;
            if target < 0.0 {
                return Some(idx);
            }
        }

        // Rounding can leave a sliver of target; it belongs to the last bucket
        last_positive
    }
}
