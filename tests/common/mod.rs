#![allow(dead_code)]

use fluxbatch::{
    merge::{engine::MergedBin, MergeParams, TrailingRunPolicy},
    sol::{AngleUnit, FixedBinGrid},
    station::StationBins,
};

/// Route `tracing` output to the test harness; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn degree_grid(edges: &[f64]) -> FixedBinGrid {
    FixedBinGrid::new(edges.to_vec(), AngleUnit::Degrees).unwrap()
}

/// Station-night with a constant time-area product `tap` (m²·h) in every bin.
pub fn uniform_station(id: &str, edges: &[f64], meteors: &[u64], tap: f64) -> StationBins {
    let n = meteors.len();
    StationBins::new(id, edges.to_vec(), meteors.to_vec(), vec![tap; n], vec![1.0; n]).unwrap()
}

/// Thresholds that only look at meteors and TAP, with no duration limits.
pub fn count_only_params(min_meteors: u64, min_tap: f64) -> MergeParams {
    MergeParams::builder()
        .min_meteors(min_meteors)
        .min_tap(min_tap)
        .min_bin_duration(0.0)
        .max_bin_duration(1e6)
        .trailing_run(TrailingRunPolicy::ForceEmit)
        .build()
        .unwrap()
}

pub fn assert_bounds_ordered(bin: &MergedBin) {
    if bin.time_area_product > 0.0 {
        assert!(
            bin.flux_lower <= bin.flux && bin.flux <= bin.flux_upper,
            "unordered bounds in bin {:?}",
            bin.bins
        );
    }
}
