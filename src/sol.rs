//! # Solar-longitude bin grids
//!
//! Solar longitude is the time axis of every shower-flux computation. This module holds the
//! validated bin-edge grid shared by all stations ([`FixedBinGrid`]) together with the small
//! helpers that convert solar-longitude spans to durations and unwrap values across the
//! 0°/360° discontinuity.
//!
//! Grids are unit-agnostic: a grid is either in degrees or in radians ([`AngleUnit`]) and every
//! helper takes the unit into account when it needs a full turn.

use hifitime::Duration;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DPI, HOURS_PER_DAY, RADEG, TROPICAL_YEAR_DAYS},
    fluxbatch_errors::FluxBatchError,
};

/// Unit of the solar-longitude values held by a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

impl AngleUnit {
    /// One full turn expressed in this unit (2π or 360).
    pub fn full_turn(self) -> f64 {
        match self {
            AngleUnit::Radians => DPI,
            AngleUnit::Degrees => 360.0,
        }
    }

    /// Convert a value expressed in this unit to degrees.
    pub fn to_degrees(self, value: f64) -> f64 {
        match self {
            AngleUnit::Radians => value / RADEG,
            AngleUnit::Degrees => value,
        }
    }
}

/// Globally shared, non-wrapping grid of solar-longitude bin edges.
///
/// A grid with `N + 1` edges defines `N` bins. Edges are finite and strictly increasing; this
/// is checked once at construction so that downstream code can index freely.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedBinGrid {
    edges: Vec<f64>,
    unit: AngleUnit,
}

impl FixedBinGrid {
    /// Build a grid from its bin edges.
    ///
    /// Arguments
    /// -----------------
    /// * `edges`: strictly increasing solar-longitude edges (at least two).
    /// * `unit`: unit of the edge values.
    ///
    /// Return
    /// ----------
    /// * The validated grid, or [`FluxBatchError::EmptyGrid`] /
    ///   [`FluxBatchError::NonMonotonicEdges`] on structurally invalid input.
    pub fn new(edges: Vec<f64>, unit: AngleUnit) -> Result<Self, FluxBatchError> {
        check_edges(&edges)?;
        Ok(FixedBinGrid { edges, unit })
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn unit(&self) -> AngleUnit {
        self.unit
    }

    /// Number of bins (one less than the number of edges).
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Solar longitude at the middle of every bin.
    pub fn midpoints(&self) -> Vec<f64> {
        midpoints(&self.edges)
    }
}

/// Check that `edges` can serve as a bin grid: at least two finite, strictly increasing values.
pub fn check_edges(edges: &[f64]) -> Result<(), FluxBatchError> {
    if edges.len() < 2 {
        return Err(FluxBatchError::EmptyGrid);
    }
    if let Some(index) = edges.iter().position(|e| !e.is_finite()) {
        return Err(FluxBatchError::NonMonotonicEdges { index });
    }
    match edges.iter().tuple_windows().position(|(a, b)| b <= a) {
        Some(i) => Err(FluxBatchError::NonMonotonicEdges { index: i + 1 }),
        None => Ok(()),
    }
}

/// Middle of every consecutive pair of edges.
pub fn midpoints(edges: &[f64]) -> Vec<f64> {
    edges
        .iter()
        .tuple_windows()
        .map(|(a, b)| (a + b) / 2.0)
        .collect()
}

/// Duration covered by the Earth while travelling `span` of solar longitude.
///
/// The conversion uses the mean length of the tropical year (365.24219 days), so it is only
/// meaningful for spans well below a full turn.
pub fn sol_span_to_duration(span: f64, unit: AngleUnit) -> Duration {
    Duration::from_days(span / unit.full_turn() * TROPICAL_YEAR_DAYS)
}

/// Same conversion as [`sol_span_to_duration`], in hours, without the nanosecond rounding of
/// [`Duration`]. Merge thresholds are compared against this value.
pub fn sol_span_to_hours(span: f64, unit: AngleUnit) -> f64 {
    span / unit.full_turn() * TROPICAL_YEAR_DAYS * HOURS_PER_DAY
}

/// Bring `value` into the `[start, end]` window when it only falls outside because of the
/// 0°/360° discontinuity.
///
/// A value below `start` is shifted by one full turn if that places it inside the window;
/// any other value is returned unchanged.
pub fn unwrap_sol(value: f64, start: f64, end: f64, unit: AngleUnit) -> f64 {
    if value < start {
        let shifted = value + unit.full_turn();
        if shifted >= start && shifted <= end {
            return shifted;
        }
    }
    value
}
