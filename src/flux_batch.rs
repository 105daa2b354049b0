//! # FluxBatch: multi-station flux pipeline
//!
//! This module defines [`FluxBatch`], the façade that wires together the four stages of the
//! multi-station flux computation:
//!
//! 1. **Alignment** ([`align_stations`]): every station-night is placed on the global grid.
//! 2. **Reduction** ([`reduce_stations`]): counts and TAP are summed, auxiliary fields
//!    TAP-weighted, across stations.
//! 3. **Merging** ([`combine_bins`]): fine bins are merged until significant, flux and
//!    confidence bounds are computed per output bin.
//! 4. **Tally** ([`camera_tally`]): per-station contributions to each output bin are ranked.
//!
//! When the station records carry a population index, a shower-level [`FluxSummary`]
//! (LM-adjusted flux, ZHR) is added to the result.
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use fluxbatch::flux_batch::FluxBatch;
//! use fluxbatch::merge::MergeParams;
//! use fluxbatch::sol::{AngleUnit, FixedBinGrid};
//! use fluxbatch::station::StationBins;
//!
//! let grid = FixedBinGrid::new(vec![2.30, 2.31, 2.32, 2.33], AngleUnit::Radians).unwrap();
//! let mut batch = FluxBatch::new(grid, MergeParams::default()).with_shower_code("PER");
//!
//! let night = StationBins::new(
//!     "CA0001",
//!     vec![2.31, 2.32, 2.33],
//!     vec![12, 20],
//!     vec![3.0e8, 3.2e8],
//!     vec![0.08, 0.08],
//! )
//! .unwrap();
//! batch.add_station(night).unwrap();
//!
//! let result = batch.compute().unwrap();
//! println!("{}", result.tally.show());
//! ```

use tracing::{info, warn};

use crate::{
    aligner::align_stations,
    fluxbatch_errors::FluxBatchError,
    merge::{
        engine::{combine_bins, CombinedFlux},
        MergeParams,
    },
    reducer::{reduce_stations, GridTotals},
    report::CombinedReport,
    shower::{mean_population_index, FluxSummary},
    sol::FixedBinGrid,
    station::StationBins,
    style::StationStyles,
    tally::{camera_tally, CameraTally},
};

/// Collected station-nights sharing one global grid and one set of merge thresholds.
#[derive(Debug, Clone)]
pub struct FluxBatch {
    grid: FixedBinGrid,
    params: MergeParams,
    stations: Vec<StationBins>,
    shower_code: Option<String>,
}

/// Everything produced by [`FluxBatch::compute`].
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub totals: GridTotals,
    pub combined: CombinedFlux,
    pub tally: CameraTally,
    pub summary: Option<FluxSummary>,
}

impl FluxBatch {
    pub fn new(grid: FixedBinGrid, params: MergeParams) -> Self {
        FluxBatch {
            grid,
            params,
            stations: Vec::new(),
            shower_code: None,
        }
    }

    pub fn with_shower_code(mut self, code: impl Into<String>) -> Self {
        self.shower_code = Some(code.into());
        self
    }

    pub fn grid(&self) -> &FixedBinGrid {
        &self.grid
    }

    pub fn params(&self) -> &MergeParams {
        &self.params
    }

    pub fn stations(&self) -> &[StationBins] {
        &self.stations
    }

    /// Add one station-night.
    ///
    /// Records without any bin are skipped (the single-station computation found nothing to
    /// bin). Other records are validated immediately so that shape errors point at the
    /// offending station rather than surfacing later in the pipeline.
    pub fn add_station(&mut self, station: StationBins) -> Result<(), FluxBatchError> {
        if station.n_bins() == 0 {
            warn!(station = %station.station_id, "skipping station-night without bins");
            return Ok(());
        }
        station.validate()?;
        self.stations.push(station);
        Ok(())
    }

    /// Run the full pipeline over the collected station-nights.
    pub fn compute(&self) -> Result<BatchResult, FluxBatchError> {
        info!(
            stations = self.stations.len(),
            bins = self.grid.n_bins(),
            "computing multi-station flux"
        );

        let aligned = align_stations(&self.grid, &self.stations)?;
        let totals = reduce_stations(&aligned, self.grid.n_bins())?;
        let combined = combine_bins(&self.grid, &totals, &self.params)?;
        let tally = camera_tally(&combined, &self.stations)?;

        let indices: Vec<f64> = self
            .stations
            .iter()
            .filter_map(|s| s.population_index)
            .collect();
        let summary =
            mean_population_index(&indices).map(|r| FluxSummary::compute(&combined, r));

        if let Some(s) = &summary {
            info!(
                population_index = s.population_index,
                lm_mean = s.lm_mean,
                "mean TAP-weighted meteor limiting magnitude"
            );
        }

        Ok(BatchResult {
            totals,
            combined,
            tally,
            summary,
        })
    }

    /// Plot styles of the collected stations, assigned in the order they were added.
    pub fn station_styles(&self) -> StationStyles {
        let mut styles = StationStyles::new();
        for station in &self.stations {
            styles.style(&station.station_id);
        }
        styles
    }

    /// CSV report of `result`, using this batch's parameters and shower code.
    pub fn report<'a>(&'a self, result: &'a BatchResult) -> CombinedReport<'a> {
        CombinedReport {
            combined: &result.combined,
            summary: result.summary.as_ref(),
            params: &self.params,
            shower_code: self.shower_code.as_deref(),
        }
    }
}
