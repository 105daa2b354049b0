//! NaN-aware weighted aggregation.
//!
//! Auxiliary quantities (limiting magnitude, radiant geometry, angular velocity) are undefined
//! in bins where a station saw nothing, and are stored as NaN. Every weighted average in the
//! crate goes through [`WeightedMean`], which applies one explicit rule: NaN values (or NaN
//! weights) do not contribute, and the result is NaN only when nothing contributed.

/// Running `Σ value·weight` / `Σ weight` accumulator that skips undefined contributors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedMean {
    weighted_sum: f64,
    weight: f64,
    contributors: usize,
}

impl WeightedMean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one contributor. Ignored when either `value` or `weight` is NaN.
    pub fn add(&mut self, value: f64, weight: f64) {
        if value.is_nan() || weight.is_nan() {
            return;
        }
        self.weighted_sum += value * weight;
        self.weight += weight;
        self.contributors += 1;
    }

    /// Number of defined contributors seen so far.
    pub fn contributors(&self) -> usize {
        self.contributors
    }

    /// `Σ value·weight` over the defined contributors.
    pub fn weighted_sum(&self) -> f64 {
        self.weighted_sum
    }

    /// Weighted mean over the defined contributors.
    ///
    /// NaN if nothing contributed or if the contributing weight is zero.
    pub fn mean(&self) -> f64 {
        if self.contributors == 0 || self.weight == 0.0 {
            return f64::NAN;
        }
        self.weighted_sum / self.weight
    }

    /// `Σ value·weight` divided by an externally supplied normalizer.
    ///
    /// NaN if nothing contributed or if `normalizer` is zero.
    pub fn mean_over(&self, normalizer: f64) -> f64 {
        if self.contributors == 0 || normalizer == 0.0 {
            return f64::NAN;
        }
        self.weighted_sum / normalizer
    }
}

/// Sum ignoring NaN entries (0 for an empty or all-NaN slice).
pub fn nansum(values: &[f64]) -> f64 {
    values.iter().filter(|v| !v.is_nan()).sum()
}
