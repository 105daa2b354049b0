//! # Camera tally
//!
//! Attributes the meteors and the time-area product of every merged output bin to the
//! stations that contributed them, and ranks the stations per bin.
//!
//! The tally works from the raw per-station bins ([`StationBins`]), not from the reduced grid:
//! output bin `i` covers `[edges[i], edges[i + 1]]` of the merged edge sequence
//! ([`CombinedFlux::edges`]), and every station's local sub-bins whose midpoint falls inside
//! that range (after unwrapping across 0°/360°) are summed into the station's entry.
//!
//! The range reaches the start of the next output bin (or the closing edge), so sub-bins of a
//! run discarded by the merger are attributed to the output bin preceding it.
//!
//! Accumulation and ranking are two separate passes: entries are first collected in
//! first-seen order, then two read-only views are materialized, one sorted by meteor count and
//! one by TAP (both descending, ties kept in first-seen order).
//!
//! A station that has no sub-bin inside an output bin does not appear in that bin's tally.
//! Several nights of the same station accumulate into a single entry.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{
    constants::StationId,
    fluxbatch_errors::FluxBatchError,
    merge::engine::CombinedFlux,
    sol::{unwrap_sol, AngleUnit},
    station::StationBins,
};

pub mod display;

/// Contribution of one station to one output bin.
#[derive(Debug, Clone, PartialEq)]
pub struct StationContribution {
    pub station_id: StationId,
    pub meteors: u64,
    /// Σ area × time in m²·h
    pub tap: f64,
}

/// Ranked contributions for one output bin.
#[derive(Debug, Clone, PartialEq)]
pub struct BinTally {
    pub mean_sol: f64,
    /// Tally range: this bin's start edge up to the next edge of the merged sequence.
    pub start: f64,
    pub end: f64,
    /// Stations by descending meteor count.
    pub by_meteors: Vec<StationContribution>,
    /// Stations by descending time-area product.
    pub by_tap: Vec<StationContribution>,
}

/// Per-bin station rankings, in output-bin order.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraTally {
    pub bins: Vec<BinTally>,
    pub unit: AngleUnit,
}

impl CameraTally {
    /// Look up the tally of the output bin whose mean solar longitude is `mean_sol`.
    pub fn get(&self, mean_sol: f64) -> Option<&BinTally> {
        self.bins.iter().find(|b| b.mean_sol == mean_sol)
    }
}

/// Tally the per-station contributions to every bin of `combined`.
///
/// Arguments
/// -----------------
/// * `combined`: output of [`combine_bins`](crate::merge::engine::combine_bins).
/// * `stations`: raw station-nights, with solar longitudes in the same unit as `combined`.
///
/// Return
/// ----------
/// * The tally, or an error if a station record is structurally invalid.
pub fn camera_tally(
    combined: &CombinedFlux,
    stations: &[StationBins],
) -> Result<CameraTally, FluxBatchError> {
    for station in stations {
        station.validate()?;
    }

    // Per-station data independent of the output bin
    let prepared: Vec<_> = stations
        .iter()
        .map(|s| {
            let tap: Vec<f64> = s
                .collecting_area
                .iter()
                .zip(&s.observing_time)
                .map(|(a, t)| a * t)
                .collect();
            (s, s.sol_midpoints(), s.effective_meteor_count(), tap)
        })
        .collect();

    let edges = combined.edges();
    let bins = combined
        .bins
        .iter()
        .zip(edges.windows(2))
        .map(|(bin, range)| {
            let (start, end) = (range[0], range[1]);
            let mut entries: Vec<StationContribution> = Vec::new();
            let mut index: HashMap<&str, usize> = HashMap::new();

            for (station, mids, meteors, tap) in &prepared {
                let selected: Vec<usize> = mids
                    .iter()
                    .enumerate()
                    .filter(|&(_, &m)| {
                        let u = unwrap_sol(m, start, end, combined.unit);
                        u >= start && u <= end
                    })
                    .map(|(k, _)| k)
                    .collect();

                if selected.is_empty() {
                    continue;
                }

                let slot = *index.entry(station.station_id.as_str()).or_insert_with(|| {
                    entries.push(StationContribution {
                        station_id: station.station_id.clone(),
                        meteors: 0,
                        tap: 0.0,
                    });
                    entries.len() - 1
                });
                let entry = &mut entries[slot];
                for k in selected {
                    entry.meteors += meteors[k];
                    entry.tap += tap[k];
                }
            }

            let mut by_meteors = entries.clone();
            by_meteors.sort_by(|a, b| b.meteors.cmp(&a.meteors));

            let mut by_tap = entries;
            by_tap.sort_by(|a, b| b.tap.partial_cmp(&a.tap).unwrap_or(Ordering::Equal));

            BinTally {
                mean_sol: bin.mean_sol,
                start,
                end,
                by_meteors,
                by_tap,
            }
        })
        .collect();

    Ok(CameraTally {
        bins,
        unit: combined.unit,
    })
}
