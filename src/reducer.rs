//! # Cross-station reduction
//!
//! Combines the aligned arrays of every station-night into grid-wide totals:
//!
//! * meteor count: elementwise sum,
//! * time-area product: elementwise sum of `area × time`,
//! * auxiliary fields: TAP-weighted means `Σ(field·area·time) / Σ(area·time)` where the sums run
//!   over the stations whose field is defined in that bin (see [`WeightedMean`]).
//!
//! A bin without any contributing station gets NaN auxiliary values; the merger handles them.

use tracing::debug;

use crate::{
    fluxbatch_errors::FluxBatchError,
    station::{check_len, AlignedStationBins},
    weighted::WeightedMean,
};

/// Grid-wide totals, one value per global bin.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTotals {
    pub meteor_count: Vec<u64>,
    /// Σ area × time in m²·h
    pub time_area_product: Vec<f64>,
    pub limiting_magnitude: Vec<f64>,
    pub radiant_elevation: Vec<f64>,
    pub radiant_distance: Vec<f64>,
    pub angular_velocity: Vec<f64>,
}

impl GridTotals {
    pub fn n_bins(&self) -> usize {
        self.meteor_count.len()
    }

    /// Check that every series has `n` entries.
    pub fn check_shape(&self, n: usize) -> Result<(), FluxBatchError> {
        check_len("meteor_count", n, self.meteor_count.len())?;
        check_len("time_area_product", n, self.time_area_product.len())?;
        check_len("limiting_magnitude", n, self.limiting_magnitude.len())?;
        check_len("radiant_elevation", n, self.radiant_elevation.len())?;
        check_len("radiant_distance", n, self.radiant_distance.len())?;
        check_len("angular_velocity", n, self.angular_velocity.len())
    }
}

/// Sum aligned station arrays into [`GridTotals`] over `n_bins` global bins.
///
/// Arguments
/// -----------------
/// * `aligned`: aligned station-nights, each with `n_bins` entries per array.
/// * `n_bins`: number of bins in the global grid.
///
/// Return
/// ----------
/// * The totals, or [`FluxBatchError::LengthMismatch`] if any station has the wrong shape.
pub fn reduce_stations(
    aligned: &[AlignedStationBins],
    n_bins: usize,
) -> Result<GridTotals, FluxBatchError> {
    let mut meteor_count = vec![0_u64; n_bins];
    let mut time_area_product = vec![0.0; n_bins];
    let mut lm = vec![WeightedMean::new(); n_bins];
    let mut elev = vec![WeightedMean::new(); n_bins];
    let mut dist = vec![WeightedMean::new(); n_bins];
    let mut vel = vec![WeightedMean::new(); n_bins];

    for station in aligned {
        check_station_shape(station, n_bins)?;

        for (i, tap) in station.time_area_product().into_iter().enumerate() {
            meteor_count[i] += station.meteor_count[i];
            time_area_product[i] += tap;
            lm[i].add(station.limiting_magnitude[i], tap);
            elev[i].add(station.radiant_elevation[i], tap);
            dist[i].add(station.radiant_distance[i], tap);
            vel[i].add(station.angular_velocity[i], tap);
        }
    }

    debug!(
        stations = aligned.len(),
        bins = n_bins,
        meteors = meteor_count.iter().sum::<u64>(),
        "reduced station bins"
    );

    let means = |acc: Vec<WeightedMean>| -> Vec<f64> { acc.iter().map(WeightedMean::mean).collect() };
    Ok(GridTotals {
        meteor_count,
        time_area_product,
        limiting_magnitude: means(lm),
        radiant_elevation: means(elev),
        radiant_distance: means(dist),
        angular_velocity: means(vel),
    })
}

fn check_station_shape(station: &AlignedStationBins, n: usize) -> Result<(), FluxBatchError> {
    check_len("meteor_count", n, station.meteor_count.len())?;
    check_len("collecting_area", n, station.collecting_area.len())?;
    check_len("observing_time", n, station.observing_time.len())?;
    check_len("limiting_magnitude", n, station.limiting_magnitude.len())?;
    check_len("radiant_elevation", n, station.radiant_elevation.len())?;
    check_len("radiant_distance", n, station.radiant_distance.len())?;
    check_len("angular_velocity", n, station.angular_velocity.len())
}
