//! # Adaptive bin merging parameters
//!
//! This module defines [`MergeParams`] and its validating builder. The parameters drive
//! [`combine_bins`](crate::merge::engine::combine_bins), which walks the global grid from left
//! to right and merges consecutive fine bins until every output bin is statistically
//! significant.
//!
//! ## Pipeline overview
//!
//! 1. **Accumulation**
//!    Fine bins are added to the current run until the run holds at least `min_meteors`
//!    meteors, at least `min_tap` × 1000 km²·h of time-area product and spans at least
//!    `min_bin_duration` hours. The run is then emitted as one output bin.
//!
//! 2. **Discard**
//!    A run that reaches `max_bin_duration` hours without becoming significant is abandoned.
//!
//! 3. **Trailing run**
//!    When the grid is exhausted, the unfinished run is handled according to
//!    [`TrailingRunPolicy`].
//!
//! 4. **Flux**
//!    Each output bin gets a flux and a Poisson confidence interval at level `ci`
//!    (see [`poisson`]).
//!
//! ## Example
//!
//! ```rust,no_run
//! use fluxbatch::merge::{MergeParams, TrailingRunPolicy};
//!
//! let params = MergeParams::builder()
//!     .min_meteors(30)
//!     .min_tap(3.0)
//!     .max_bin_duration(24.0)
//!     .trailing_run(TrailingRunPolicy::Drop)
//!     .build()
//!     .unwrap();
//! ```
use std::cmp::Ordering::{Equal, Greater, Less};

use serde::{Deserialize, Serialize};

use crate::fluxbatch_errors::FluxBatchError;

pub mod engine;
pub mod poisson;

/// What to do with the run still accumulating when the end of the grid is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrailingRunPolicy {
    /// Emit the run as a final bin regardless of the thresholds; it is flagged as forced.
    #[default]
    ForceEmit,
    /// Drop the run; only its starting edge survives as the closing edge.
    Drop,
}

/// Thresholds controlling [`combine_bins`](crate::merge::engine::combine_bins).
///
/// Fields
/// -----------------
/// * `min_meteors` – minimum number of meteors in an output bin.
/// * `ci` – confidence level of the flux interval, in `(0, 1)`.
/// * `min_tap` – minimum time-area product, in 1000 km²·h.
/// * `min_bin_duration` – minimum bin duration in hours.
/// * `max_bin_duration` – a run reaching this duration (hours) without becoming significant is
///   discarded.
/// * `trailing_run` – policy for the run left over at the end of the grid.
///
/// Defaults
/// -----------------
/// * `min_meteors`: 50
/// * `ci`: 0.95
/// * `min_tap`: 2.0
/// * `min_bin_duration`: 0.5 h
/// * `max_bin_duration`: 12.0 h
/// * `trailing_run`: [`TrailingRunPolicy::ForceEmit`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeParams {
    pub min_meteors: u64,
    pub ci: f64,
    pub min_tap: f64,
    pub min_bin_duration: f64,
    pub max_bin_duration: f64,
    pub trailing_run: TrailingRunPolicy,
}

impl MergeParams {
    /// Equivalent to [`MergeParams::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`MergeParamsBuilder`] initialized with the default values.
    pub fn builder() -> MergeParamsBuilder {
        MergeParamsBuilder::new()
    }
}

impl Default for MergeParams {
    fn default() -> Self {
        MergeParams {
            min_meteors: 50,
            ci: 0.95,
            min_tap: 2.0,
            min_bin_duration: 0.5,
            max_bin_duration: 12.0,
            trailing_run: TrailingRunPolicy::ForceEmit,
        }
    }
}

/// Builder for [`MergeParams`], with validation.
#[derive(Debug, Clone)]
pub struct MergeParamsBuilder {
    params: MergeParams,
}

impl Default for MergeParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: MergeParams::default(),
        }
    }

    pub fn min_meteors(mut self, v: u64) -> Self {
        self.params.min_meteors = v;
        self
    }
    pub fn ci(mut self, v: f64) -> Self {
        self.params.ci = v;
        self
    }
    pub fn min_tap(mut self, v: f64) -> Self {
        self.params.min_tap = v;
        self
    }
    pub fn min_bin_duration(mut self, v: f64) -> Self {
        self.params.min_bin_duration = v;
        self
    }
    pub fn max_bin_duration(mut self, v: f64) -> Self {
        self.params.max_bin_duration = v;
        self
    }
    pub fn trailing_run(mut self, v: TrailingRunPolicy) -> Self {
        self.params.trailing_run = v;
        self
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Return true iff a <= b and comparable (i.e., not NaN).
    #[inline]
    fn le(a: f64, b: f64) -> bool {
        matches!(a.partial_cmp(&b), Some(Less) | Some(Equal))
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `0 < ci < 1`
    /// * `min_tap >= 0`
    /// * `0 <= min_bin_duration <= max_bin_duration`
    ///
    /// Returns
    /// -----------------
    /// * `Ok(MergeParams)` if all values are valid,
    /// * `Err(FluxBatchError::InvalidMergeParameter)` otherwise.
    pub fn build(self) -> Result<MergeParams, FluxBatchError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl MergeParams {
    /// Apply the [`MergeParamsBuilder::build`] rules to an existing value
    /// (e.g. one deserialized from a configuration file).
    pub fn validate(&self) -> Result<(), FluxBatchError> {
        if self.ci.is_nan() || self.ci <= 0.0 || self.ci >= 1.0 {
            return Err(FluxBatchError::InvalidMergeParameter(format!(
                "ci must be in (0, 1), got {}",
                self.ci
            )));
        }
        if !MergeParamsBuilder::ge0(self.min_tap) {
            return Err(FluxBatchError::InvalidMergeParameter(
                "min_tap must be non-negative".into(),
            ));
        }
        if !MergeParamsBuilder::ge0(self.min_bin_duration) {
            return Err(FluxBatchError::InvalidMergeParameter(
                "min_bin_duration must be non-negative".into(),
            ));
        }
        if !MergeParamsBuilder::le(self.min_bin_duration, self.max_bin_duration) {
            return Err(FluxBatchError::InvalidMergeParameter(
                "min_bin_duration must not exceed max_bin_duration".into(),
            ));
        }
        Ok(())
    }
}
