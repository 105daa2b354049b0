use approx::assert_relative_eq;
use fluxbatch::{
    constants::TAP_SCALE,
    flux_batch::FluxBatch,
    fluxbatch_errors::FluxBatchError,
    merge::MergeParams,
    shower::zhr,
    station::StationBins,
};

mod common;
use common::{assert_bounds_ordered, count_only_params, degree_grid, init_tracing, uniform_station};

#[test]
fn greedy_merge_over_two_stations() {
    init_tracing();
    let grid = degree_grid(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    let mut batch = FluxBatch::new(grid, count_only_params(30, 2.0));

    // Summed: meteors [10, 15, 20, 10, 5], TAP 1e9 in every bin
    batch
        .add_station(uniform_station("CA0001", &[0.0, 1.0, 2.0, 3.0], &[4, 5, 8], 0.5e9))
        .unwrap();
    batch
        .add_station(uniform_station(
            "CA0002",
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            &[6, 10, 12, 10, 5],
            0.5e9,
        ))
        .unwrap();

    let result = batch.compute().unwrap();
    assert_eq!(result.totals.meteor_count, vec![10, 15, 20, 10, 5]);
    assert_eq!(result.totals.time_area_product, vec![1e9; 5]);

    let combined = &result.combined;
    assert_eq!(combined.edges(), vec![0.0, 3.0, 5.0]);

    let first = &combined.bins[0];
    assert_eq!(first.meteor_count, 45);
    assert_relative_eq!(first.flux, 15.0);
    assert!(!first.forced);

    let last = &combined.bins[1];
    assert_eq!(last.meteor_count, 15);
    assert!(last.forced);

    // Only CA0002 observed after sol 3
    let tally = &result.tally;
    assert_eq!(tally.bins[0].by_meteors[0].station_id, "CA0002");
    assert_eq!(tally.bins[0].by_meteors[0].meteors, 28);
    assert_eq!(tally.bins[0].by_meteors[1].meteors, 17);
    assert_eq!(tally.bins[1].by_meteors.len(), 1);
    assert_eq!(tally.bins[1].by_tap[0].station_id, "CA0002");
}

#[test]
fn tally_ranks_by_meteors_and_tap() {
    let grid = degree_grid(&[10.0, 11.0]);
    let mut batch = FluxBatch::new(grid, count_only_params(1, 0.0));
    batch
        .add_station(uniform_station("A", &[10.0, 11.0], &[3], 1e8))
        .unwrap();
    batch
        .add_station(uniform_station("B", &[10.0, 11.0], &[7], 4e8))
        .unwrap();

    let result = batch.compute().unwrap();
    assert_eq!(result.combined.len(), 1);
    assert_eq!(result.combined.bins[0].meteor_count, 10);
    assert_relative_eq!(result.combined.bins[0].time_area_product, 5e8);

    let bin = &result.tally.bins[0];
    let by_meteors: Vec<_> = bin.by_meteors.iter().map(|c| c.station_id.as_str()).collect();
    let by_tap: Vec<_> = bin.by_tap.iter().map(|c| c.station_id.as_str()).collect();
    assert_eq!(by_meteors, vec!["B", "A"]);
    assert_eq!(by_tap, vec!["B", "A"]);
    assert_relative_eq!(bin.by_tap[0].tap, 4e8);

    let shown = result.tally.show().to_string();
    assert!(shown.contains("Camera tally per bin:"));
    assert!(shown.contains("Top 5 by meteor number:"));
}

#[test]
fn zero_meteors_give_zero_flux_and_positive_upper_bound() {
    let grid = degree_grid(&[0.0, 1.0]);
    let mut batch = FluxBatch::new(grid, count_only_params(0, 0.0));
    batch
        .add_station(uniform_station("CA0001", &[0.0, 1.0], &[0], 5e9))
        .unwrap();

    let bin = &batch.compute().unwrap().combined.bins[0];
    assert_eq!(bin.flux, 0.0);
    assert_eq!(bin.flux_lower, 0.0);
    assert!(bin.flux_upper > 0.0);
}

#[test]
fn uncovered_bin_propagates_nan() {
    let grid = degree_grid(&[0.0, 1.0, 2.0]);
    let mut batch = FluxBatch::new(grid, count_only_params(0, 0.0));
    let night = uniform_station("CA0001", &[1.0, 2.0], &[12], 2e9)
        .with_limiting_magnitude(vec![5.8])
        .with_radiant_elevation(vec![45.0]);
    batch.add_station(night).unwrap();

    let result = batch.compute().unwrap();
    let empty = &result.combined.bins[0];
    assert_eq!(empty.time_area_product, 0.0);
    assert!(empty.flux.is_nan() && empty.flux_lower.is_nan() && empty.flux_upper.is_nan());
    assert!(empty.limiting_magnitude.is_nan());
    assert!(empty.radiant_elevation.is_nan());

    let covered = &result.combined.bins[1];
    assert_relative_eq!(covered.flux, 6.0);
    assert_relative_eq!(covered.limiting_magnitude, 5.8);
    assert_relative_eq!(covered.radiant_elevation, 45.0);
}

#[test]
fn station_after_year_wrap_is_aligned_and_tallied() {
    let grid = degree_grid(&[358.0, 359.0, 360.0, 361.0, 362.0]);
    let mut batch = FluxBatch::new(grid, count_only_params(1, 0.0));
    batch
        .add_station(uniform_station("BEFORE", &[358.0, 359.0, 360.0], &[4, 6], 1e9))
        .unwrap();
    batch
        .add_station(uniform_station("AFTER", &[0.0, 1.0, 2.0], &[8, 9], 1e9))
        .unwrap();

    let result = batch.compute().unwrap();
    assert_eq!(result.totals.meteor_count, vec![4, 6, 8, 9]);
    assert_eq!(result.combined.len(), 4);

    let third = &result.tally.bins[2];
    assert_eq!(third.by_meteors.len(), 1);
    assert_eq!(third.by_meteors[0].station_id, "AFTER");
    assert_eq!(third.by_meteors[0].meteors, 8);
}

#[test]
fn noisy_edges_near_year_wrap_round_trip() {
    let grid = degree_grid(&[358.0, 359.0, 360.0, 361.0, 362.0]);
    let mut batch = FluxBatch::new(grid, count_only_params(1, 0.0));
    // Edges off by ephemeris noise on both sides of the global ones
    batch
        .add_station(uniform_station(
            "BEFORE",
            &[358.0 - 1e-9, 359.0 + 1e-9, 360.0 - 1e-9],
            &[4, 6],
            1e9,
        ))
        .unwrap();
    batch
        .add_station(uniform_station("AFTER", &[1e-9, 1.0 - 1e-9, 2.0], &[8, 9], 1e9))
        .unwrap();

    let result = batch.compute().unwrap();
    assert_eq!(result.totals.meteor_count, vec![4, 6, 8, 9]);
    assert_eq!(result.totals.time_area_product, vec![1e9; 4]);
    assert_eq!(result.tally.bins[0].by_meteors[0].station_id, "BEFORE");
    assert_eq!(result.tally.bins[3].by_meteors[0].station_id, "AFTER");
}

#[test]
fn discarded_run_is_tallied_with_preceding_bin() {
    let grid = degree_grid(&[0.0, 1.0, 2.0, 3.0, 4.0]);
    // One-degree bins last ~24 h: the two sparse bins are discarded under the 12 h cap
    let mut batch = FluxBatch::new(grid, MergeParams::default());
    batch
        .add_station(uniform_station(
            "CA0001",
            &[0.0, 1.0, 2.0, 3.0, 4.0],
            &[60, 1, 1, 60],
            5e9,
        ))
        .unwrap();

    let result = batch.compute().unwrap();
    let combined = &result.combined;
    assert_eq!(combined.edges(), vec![0.0, 3.0, 4.0]);
    assert_eq!(combined.discarded, vec![1..2, 2..3]);
    assert_eq!(combined.bins[0].meteor_count, 60);

    let first = &result.tally.bins[0];
    assert_eq!((first.start, first.end), (0.0, 3.0));
    assert_eq!(first.by_meteors[0].meteors, 62);
    assert_relative_eq!(first.by_tap[0].tap, 15e9);
    assert_eq!(result.tally.bins[1].by_meteors[0].meteors, 60);
}

#[test]
fn every_bin_is_emitted_or_discarded_once() {
    // 0.1° bins (~2.4 h) under the default thresholds
    let n = 60;
    let edges: Vec<f64> = (0..=n).map(|i| 140.0 + 0.1 * i as f64).collect();
    let meteors: Vec<u64> = (0..n).map(|i| 3 * ((i * 7) % 13) as u64).collect();
    let area: Vec<f64> = (0..n).map(|i| if i % 11 == 5 { 0.0 } else { 1e9 }).collect();

    let grid = degree_grid(&edges);
    let params = MergeParams::default();
    let mut batch = FluxBatch::new(grid, params.clone());
    batch
        .add_station(
            StationBins::new("CA0001", edges.clone(), meteors, area, vec![1.0; n]).unwrap(),
        )
        .unwrap();
    let result = batch.compute().unwrap();
    let combined = &result.combined;

    let mut seen = vec![0; n];
    for run in combined.bins.iter().map(|b| b.bins.clone()).chain(combined.discarded.clone()) {
        for i in run {
            seen[i] += 1;
        }
    }
    assert!(seen.iter().all(|&c| c == 1));

    let out_edges = combined.edges();
    assert!(out_edges.windows(2).all(|w| w[0] < w[1]));
    assert!(out_edges
        .iter()
        .all(|e| edges.iter().any(|g| (g - e).abs() < 1e-12)));

    for bin in &combined.bins {
        assert_bounds_ordered(bin);
        if !bin.forced {
            assert!(bin.meteor_count >= params.min_meteors);
            assert!(bin.time_area_product / TAP_SCALE >= params.min_tap);
            assert!(bin.duration_hours() >= params.min_bin_duration);
        }
    }
    assert!(combined.len() <= n);
}

#[test]
fn misaligned_station_is_rejected() {
    let grid = degree_grid(&[0.0, 1.0, 2.0]);
    let mut batch = FluxBatch::new(grid, MergeParams::default());
    batch
        .add_station(uniform_station("CA0001", &[0.25, 1.25], &[3], 1e9))
        .unwrap();

    assert_eq!(
        batch.compute(),
        Err(FluxBatchError::MisalignedGrid {
            station: "CA0001".into(),
            first_edge: 0.25,
        })
    );
}

#[test]
fn shower_summary_uses_mean_population_index() {
    let grid = degree_grid(&[0.0, 1.0]);
    let mut batch = FluxBatch::new(grid, count_only_params(1, 0.0));
    batch
        .add_station(
            uniform_station("A", &[0.0, 1.0], &[20], 2e9)
                .with_limiting_magnitude(vec![6.0])
                .with_population_index(2.0),
        )
        .unwrap();
    batch
        .add_station(
            uniform_station("B", &[0.0, 1.0], &[20], 2e9)
                .with_limiting_magnitude(vec![6.0])
                .with_population_index(2.4),
        )
        .unwrap();

    let result = batch.compute().unwrap();
    let summary = result.summary.as_ref().unwrap();
    let bin = &result.combined.bins[0];

    assert_relative_eq!(summary.population_index, 2.2);
    assert_relative_eq!(summary.lm_mean, 6.0);
    assert_relative_eq!(summary.bins[0].zhr, zhr(bin.flux, 2.2).unwrap());
    assert_relative_eq!(summary.bins[0].flux_lm, bin.flux / 2.2_f64.powf(0.5));
}
