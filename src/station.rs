//! # Per-station bin records
//!
//! A [`StationBins`] is what the single-station flux computation hands over for one
//! station-night: a local solar-longitude grid that is a contiguous slice of the global
//! [`FixedBinGrid`](crate::sol::FixedBinGrid), and one value per local bin for meteor count,
//! collecting area, observing time and the auxiliary quantities.
//!
//! After alignment the same data lives on the global grid as an [`AlignedStationBins`].
//!
//! Units
//! -----------------
//! * collecting area: m² (already corrected to the reference limiting magnitude)
//! * observing time: hours
//! * limiting magnitude: mag, radiant elevation/distance: degrees, angular velocity: deg/s
//!
//! Auxiliary quantities may be NaN in bins where they are undefined.

use crate::{
    constants::StationId,
    fluxbatch_errors::FluxBatchError,
    sol::{check_edges, midpoints},
};

/// One station-night of locally binned observations.
#[derive(Debug, Clone, PartialEq)]
pub struct StationBins {
    pub station_id: StationId,
    /// Local solar-longitude bin edges (`n + 1` values for `n` bins).
    pub sol_edges: Vec<f64>,
    pub meteor_count: Vec<u64>,
    pub collecting_area: Vec<f64>,
    pub observing_time: Vec<f64>,
    pub limiting_magnitude: Vec<f64>,
    pub radiant_elevation: Vec<f64>,
    pub radiant_distance: Vec<f64>,
    pub angular_velocity: Vec<f64>,
    /// Population index used by the single-station flux computation, if known.
    pub population_index: Option<f64>,
}

impl StationBins {
    /// Build a record with the exposure data only; auxiliary fields start undefined.
    ///
    /// Arguments
    /// -----------------
    /// * `station_id`: camera station identifier.
    /// * `sol_edges`: local bin edges, one more than the number of bins.
    /// * `meteor_count`, `collecting_area`, `observing_time`: one value per local bin.
    ///
    /// Return
    /// ----------
    /// * The record, or an error if the shapes or exposure values are invalid
    ///   (see [`StationBins::validate`]).
    pub fn new(
        station_id: impl Into<StationId>,
        sol_edges: Vec<f64>,
        meteor_count: Vec<u64>,
        collecting_area: Vec<f64>,
        observing_time: Vec<f64>,
    ) -> Result<Self, FluxBatchError> {
        let n = sol_edges.len().saturating_sub(1);
        let bins = StationBins {
            station_id: station_id.into(),
            sol_edges,
            meteor_count,
            collecting_area,
            observing_time,
            limiting_magnitude: vec![f64::NAN; n],
            radiant_elevation: vec![f64::NAN; n],
            radiant_distance: vec![f64::NAN; n],
            angular_velocity: vec![f64::NAN; n],
            population_index: None,
        };
        bins.validate()?;
        Ok(bins)
    }

    pub fn with_limiting_magnitude(mut self, values: Vec<f64>) -> Self {
        self.limiting_magnitude = values;
        self
    }

    pub fn with_radiant_elevation(mut self, values: Vec<f64>) -> Self {
        self.radiant_elevation = values;
        self
    }

    pub fn with_radiant_distance(mut self, values: Vec<f64>) -> Self {
        self.radiant_distance = values;
        self
    }

    pub fn with_angular_velocity(mut self, values: Vec<f64>) -> Self {
        self.angular_velocity = values;
        self
    }

    pub fn with_population_index(mut self, r: f64) -> Self {
        self.population_index = Some(r);
        self
    }

    /// Number of local bins.
    pub fn n_bins(&self) -> usize {
        self.sol_edges.len().saturating_sub(1)
    }

    /// Solar longitude at the middle of every local bin.
    pub fn sol_midpoints(&self) -> Vec<f64> {
        midpoints(&self.sol_edges)
    }

    /// Meteor counts with every bin of zero area or zero time forced to zero.
    ///
    /// An interval without exposure cannot contribute meteors.
    pub fn effective_meteor_count(&self) -> Vec<u64> {
        effective_meteor_count(
            &self.meteor_count,
            &self.collecting_area,
            &self.observing_time,
        )
    }

    /// Check the structural invariants of the record.
    ///
    /// * the local edges form a valid grid,
    /// * every per-bin array has one value per local bin,
    /// * collecting area and observing time are finite and non-negative.
    pub fn validate(&self) -> Result<(), FluxBatchError> {
        check_edges(&self.sol_edges)?;
        let n = self.n_bins();

        check_len("meteor_count", n, self.meteor_count.len())?;
        check_len("collecting_area", n, self.collecting_area.len())?;
        check_len("observing_time", n, self.observing_time.len())?;
        check_len("limiting_magnitude", n, self.limiting_magnitude.len())?;
        check_len("radiant_elevation", n, self.radiant_elevation.len())?;
        check_len("radiant_distance", n, self.radiant_distance.len())?;
        check_len("angular_velocity", n, self.angular_velocity.len())?;

        let bad_exposure = self
            .collecting_area
            .iter()
            .zip(&self.observing_time)
            .position(|(&a, &t)| !(a.is_finite() && a >= 0.0 && t.is_finite() && t >= 0.0));
        if let Some(index) = bad_exposure {
            return Err(FluxBatchError::InvalidExposure {
                station: self.station_id.clone(),
                index,
            });
        }
        Ok(())
    }
}

/// A station-night re-indexed onto the global grid.
///
/// Outside the station's coverage the exposure arrays hold zeros and the auxiliary arrays NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedStationBins {
    pub station_id: StationId,
    /// Global bin index of the first local bin.
    pub offset: usize,
    pub meteor_count: Vec<u64>,
    pub collecting_area: Vec<f64>,
    pub observing_time: Vec<f64>,
    pub limiting_magnitude: Vec<f64>,
    pub radiant_elevation: Vec<f64>,
    pub radiant_distance: Vec<f64>,
    pub angular_velocity: Vec<f64>,
}

impl AlignedStationBins {
    /// Number of global bins covered by the arrays.
    pub fn n_bins(&self) -> usize {
        self.meteor_count.len()
    }

    /// Per-bin time-area product `area × time` (m²·h).
    pub fn time_area_product(&self) -> Vec<f64> {
        self.collecting_area
            .iter()
            .zip(&self.observing_time)
            .map(|(a, t)| a * t)
            .collect()
    }
}

/// Zero every meteor count whose bin has zero collecting area or zero observing time.
pub(crate) fn effective_meteor_count(meteors: &[u64], area: &[f64], time: &[f64]) -> Vec<u64> {
    meteors
        .iter()
        .zip(area.iter().zip(time))
        .map(|(&m, (&a, &t))| if a == 0.0 || t == 0.0 { 0 } else { m })
        .collect()
}

pub(crate) fn check_len(
    field: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), FluxBatchError> {
    if expected != found {
        return Err(FluxBatchError::LengthMismatch {
            field,
            expected,
            found,
        });
    }
    Ok(())
}
