//! # Bin alignment
//!
//! Places one station-night's locally indexed bin arrays onto the global solar-longitude grid.
//!
//! The local edges must be a contiguous slice of the global edges, possibly shifted by one full
//! turn when the global grid starts before the 0°/360° boundary and the local grid after it.
//! The offset is found with an absolute tolerance of [`SOL_TOLERANCE`] because both grids come
//! out of floating ephemeris computations. A local grid that does not match is a precondition
//! violation and is reported as an error instead of silently misplacing data.
//!
//! Outside the local coverage, the aligned exposure arrays are zero and the auxiliary arrays
//! NaN. Meteor counts are zeroed wherever the aligned area or time is zero.

use tracing::debug;

use crate::{
    constants::SOL_TOLERANCE,
    fluxbatch_errors::FluxBatchError,
    sol::{check_edges, FixedBinGrid},
    station::{effective_meteor_count, AlignedStationBins, StationBins},
};

/// Find the global bin index of the first local edge.
///
/// Arguments
/// -----------------
/// * `grid`: the global bin grid.
/// * `station`: the station-night whose `sol_edges` must be located.
///
/// Return
/// ----------
/// * `Ok(i)` such that `grid.edges()[i..i + n + 1]` matches the local edges (after the optional
///   full-turn shift) within [`SOL_TOLERANCE`].
/// * [`FluxBatchError::MisalignedGrid`] if no such slice exists, or
///   [`FluxBatchError::LocalGridOutOfRange`] if it would run past the end of the grid.
pub fn find_offset(grid: &FixedBinGrid, station: &StationBins) -> Result<usize, FluxBatchError> {
    check_edges(&station.sol_edges)?;
    let global = grid.edges();
    let local = &station.sol_edges;
    let misaligned = || FluxBatchError::MisalignedGrid {
        station: station.station_id.clone(),
        first_edge: local[0],
    };

    // The global grid starts before the wrap while the local one starts after it.
    // A local first edge within tolerance of global[0] is not a wrap.
    let shift = if global[0] - local[0] > SOL_TOLERANCE {
        grid.unit().full_turn()
    } else {
        0.0
    };

    let offset = global
        .iter()
        .position(|g| (g - (local[0] + shift)).abs() <= SOL_TOLERANCE)
        .ok_or_else(misaligned)?;

    let n_local = station.n_bins();
    if offset + n_local > grid.n_bins() {
        return Err(FluxBatchError::LocalGridOutOfRange {
            station: station.station_id.clone(),
            offset,
            len: n_local,
            grid_bins: grid.n_bins(),
        });
    }

    let matches = local
        .iter()
        .zip(&global[offset..])
        .all(|(l, g)| (g - (l + shift)).abs() <= SOL_TOLERANCE);
    if !matches {
        return Err(misaligned());
    }

    Ok(offset)
}

/// Re-index one station-night onto the global grid.
///
/// Arguments
/// -----------------
/// * `grid`: the global bin grid (`N` bins).
/// * `station`: the station-night to align. It is validated first and never modified.
///
/// Return
/// ----------
/// * The aligned arrays, each of length `N`.
pub fn align_station(
    grid: &FixedBinGrid,
    station: &StationBins,
) -> Result<AlignedStationBins, FluxBatchError> {
    station.validate()?;
    let offset = find_offset(grid, station)?;
    let n = grid.n_bins();

    debug!(
        station = %station.station_id,
        offset,
        bins = station.n_bins(),
        "aligned station bins onto global grid"
    );

    let collecting_area = place(n, offset, 0.0, &station.collecting_area);
    let observing_time = place(n, offset, 0.0, &station.observing_time);
    let meteor_count = effective_meteor_count(
        &place(n, offset, 0, &station.meteor_count),
        &collecting_area,
        &observing_time,
    );

    Ok(AlignedStationBins {
        station_id: station.station_id.clone(),
        offset,
        meteor_count,
        collecting_area,
        observing_time,
        limiting_magnitude: place(n, offset, f64::NAN, &station.limiting_magnitude),
        radiant_elevation: place(n, offset, f64::NAN, &station.radiant_elevation),
        radiant_distance: place(n, offset, f64::NAN, &station.radiant_distance),
        angular_velocity: place(n, offset, f64::NAN, &station.angular_velocity),
    })
}

/// Align every station-night, failing on the first structurally invalid one.
pub fn align_stations(
    grid: &FixedBinGrid,
    stations: &[StationBins],
) -> Result<Vec<AlignedStationBins>, FluxBatchError> {
    stations.iter().map(|s| align_station(grid, s)).collect()
}

/// `n` copies of `fill` with `values` written starting at `offset`.
fn place<T: Copy>(n: usize, offset: usize, fill: T, values: &[T]) -> Vec<T> {
    let mut out = vec![fill; n];
    out[offset..offset + values.len()].copy_from_slice(values);
    out
}
