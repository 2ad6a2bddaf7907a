//! Series indicators.
//!
//! Indicators are pure functions: a value series in, a series of the same
//! length out. Positions without enough history are `None`.

pub mod sma;

pub use sma::Sma;

/// Trait for indicators over a plain value series.
///
/// # Look-ahead guard
/// The output at index t may only depend on inputs at indices ≤ t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20").
    fn name(&self) -> &str;

    /// Number of leading positions that stay undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire series.
    ///
    /// Returns a `Vec` of the same length as `values`; the first
    /// `lookback()` entries are `None`.
    fn compute(&self, values: &[f64]) -> Vec<Option<f64>>;
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
