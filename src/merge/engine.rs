//! # Adaptive bin merger and flux engine
//!
//! Converts the `N` fine bins of the global grid into `M ≤ N` output bins that each satisfy the
//! significance thresholds of [`MergeParams`], and computes the flux with its Poisson confidence
//! interval plus the TAP-weighted auxiliary quantities of every output bin.
//!
//! ## Walk
//!
//! A single greedy pass from left to right keeps a run start `s`. For every candidate end
//! `e = 1..=N` the run `[s, e)` is
//!
//! * **emitted** when its meteor count, its TAP (in 1000 km²·h) and its duration all reach the
//!   minimums; the walk then restarts at `s = e`,
//! * **discarded** when it is not significant yet but already spans `max_bin_duration`;
//!   the walk restarts at `s = e` without output,
//! * otherwise left to grow.
//!
//! Durations are computed from the solar longitude of the bin *midpoints*, converted with the
//! length of the tropical year, so they stay correct across the year boundary. For `e = N`,
//! which has no midpoint, the closing edge plus half of the last bin width is used.
//!
//! Whatever is left when the grid is exhausted is handled by
//! [`TrailingRunPolicy`](crate::merge::TrailingRunPolicy).
//!
//! ## Flux
//!
//! For an output bin with `n` meteors and time-area product `T` (m²·h):
//!
//! ```text
//! flux       = 1e9 · n / T
//! flux_lower = 1e9 · lower(n) / T
//! flux_upper = 1e9 · upper(n) / T
//! ```
//!
//! where `lower`/`upper` come from [`poisson_interval`]. A bin with `T = 0` reports NaN flux,
//! NaN bounds and NaN auxiliary values.

use std::ops::Range;

use hifitime::{Duration, Unit};
use tracing::{debug, info};

use crate::{
    constants::TAP_SCALE,
    fluxbatch_errors::FluxBatchError,
    merge::{poisson::poisson_interval, MergeParams, TrailingRunPolicy},
    reducer::GridTotals,
    sol::{sol_span_to_duration, sol_span_to_hours, AngleUnit, FixedBinGrid},
    weighted::{nansum, WeightedMean},
};

/// One output bin: a contiguous run of global bins collapsed into one.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedBin {
    /// Global bin indices covered by this output bin.
    pub bins: Range<usize>,
    /// Solar longitude of the first edge.
    pub start: f64,
    /// Solar longitude of the last edge.
    pub end: f64,
    /// Plain mean of the covered bin midpoints.
    pub mean_sol: f64,
    /// Midpoint-to-midpoint duration used by the merge thresholds.
    pub duration: Duration,
    pub meteor_count: u64,
    /// Σ time-area product in m²·h
    pub time_area_product: f64,
    /// Meteoroids per 1000 km²·h
    pub flux: f64,
    pub flux_lower: f64,
    pub flux_upper: f64,
    pub limiting_magnitude: f64,
    pub radiant_elevation: f64,
    pub radiant_distance: f64,
    pub angular_velocity: f64,
    /// True when the bin was closed by the end of the grid rather than by the thresholds.
    pub forced: bool,
}

impl MergedBin {
    /// Bin duration in hours.
    pub fn duration_hours(&self) -> f64 {
        self.duration.to_unit(Unit::Hour)
    }
}

/// Result of [`combine_bins`].
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedFlux {
    pub bins: Vec<MergedBin>,
    /// Edge closing the bin sequence (edge at the final run start).
    pub closing_edge: f64,
    /// Runs abandoned without output, as ranges of global bin indices.
    pub discarded: Vec<Range<usize>>,
    pub unit: AngleUnit,
}

impl CombinedFlux {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Bin start edges followed by the closing edge (one more value than there are bins).
    pub fn edges(&self) -> Vec<f64> {
        self.bins
            .iter()
            .map(|b| b.start)
            .chain(std::iter::once(self.closing_edge))
            .collect()
    }

    /// Mean solar longitude of every output bin.
    pub fn mean_sol(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.mean_sol).collect()
    }
}

/// Merge the global bins into significant output bins and compute their flux.
///
/// Arguments
/// -----------------
/// * `grid`: the global grid (`N` bins).
/// * `totals`: cross-station totals, `N` entries per series.
/// * `params`: merge thresholds and confidence level.
///
/// Return
/// ----------
/// * The output bins with their closing edge and the list of discarded runs.
/// * [`FluxBatchError::LengthMismatch`] if `totals` does not match the grid, or
///   [`FluxBatchError::InvalidMergeParameter`] if `params` are invalid.
pub fn combine_bins(
    grid: &FixedBinGrid,
    totals: &GridTotals,
    params: &MergeParams,
) -> Result<CombinedFlux, FluxBatchError> {
    let n = grid.n_bins();
    totals.check_shape(n)?;
    params.validate()?;

    let edges = grid.edges();
    let unit = grid.unit();
    let mut mid = grid.midpoints();
    mid.push(edges[n] + (edges[n] - edges[n - 1]) / 2.0);

    let mut bins = Vec::new();
    let mut discarded = Vec::new();
    let mut s = 0;

    for e in 1..=n {
        let run = s..e;
        let hours = sol_span_to_hours(mid[e] - mid[s], unit);
        let meteors: u64 = totals.meteor_count[run.clone()].iter().sum();
        let tap = nansum(&totals.time_area_product[run.clone()]);

        if meteors >= params.min_meteors
            && tap / TAP_SCALE >= params.min_tap
            && hours >= params.min_bin_duration
        {
            bins.push(build_bin(edges, &mid, unit, totals, run, params.ci, false)?);
            s = e;
        } else if hours >= params.max_bin_duration {
            debug!(
                start = edges[s],
                end = edges[e],
                meteors,
                tap,
                hours,
                "discarding run that never became significant"
            );
            discarded.push(run);
            s = e;
        }
    }

    if s < n {
        match params.trailing_run {
            TrailingRunPolicy::ForceEmit => {
                bins.push(build_bin(edges, &mid, unit, totals, s..n, params.ci, true)?);
                s = n;
            }
            TrailingRunPolicy::Drop => {
                debug!(start = edges[s], "dropping trailing run");
                discarded.push(s..n);
            }
        }
    }

    info!(
        input_bins = n,
        output_bins = bins.len(),
        discarded_runs = discarded.len(),
        "combined fixed bins"
    );

    Ok(CombinedFlux {
        bins,
        closing_edge: edges[s],
        discarded,
        unit,
    })
}

fn build_bin(
    edges: &[f64],
    mid: &[f64],
    unit: AngleUnit,
    totals: &GridTotals,
    run: Range<usize>,
    ci: f64,
    forced: bool,
) -> Result<MergedBin, FluxBatchError> {
    let meteor_count: u64 = totals.meteor_count[run.clone()].iter().sum();
    let tap_run = &totals.time_area_product[run.clone()];
    let time_area_product = nansum(tap_run);
    let mean_sol = mid[run.clone()].iter().sum::<f64>() / run.len() as f64;

    let mut bin = MergedBin {
        bins: run.clone(),
        start: edges[run.start],
        end: edges[run.end],
        mean_sol,
        duration: sol_span_to_duration(mid[run.end] - mid[run.start], unit),
        meteor_count,
        time_area_product,
        flux: f64::NAN,
        flux_lower: f64::NAN,
        flux_upper: f64::NAN,
        limiting_magnitude: f64::NAN,
        radiant_elevation: f64::NAN,
        radiant_distance: f64::NAN,
        angular_velocity: f64::NAN,
        forced,
    };

    // Zero exposure: no measurable flux
    if time_area_product == 0.0 {
        return Ok(bin);
    }

    let interval = poisson_interval(meteor_count, ci)?;
    bin.flux = TAP_SCALE * meteor_count as f64 / time_area_product;
    bin.flux_lower = TAP_SCALE * interval.lower / time_area_product;
    bin.flux_upper = TAP_SCALE * interval.upper / time_area_product;

    let tap_weighted = |field: &[f64]| {
        let mut acc = WeightedMean::new();
        for (&v, &t) in field[run.clone()].iter().zip(tap_run) {
            acc.add(v, t);
        }
        acc.mean_over(time_area_product)
    };
    bin.limiting_magnitude = tap_weighted(&totals.limiting_magnitude);
    bin.radiant_elevation = tap_weighted(&totals.radiant_elevation);
    bin.radiant_distance = tap_weighted(&totals.radiant_distance);
    bin.angular_velocity = tap_weighted(&totals.angular_velocity);

    Ok(bin)
}
