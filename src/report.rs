//! # Combined-flux CSV report
//!
//! Writes the merged bins in the layout expected by the plotting and archival tools:
//!
//! 1. a `#`-prefixed comment block with the shower and binning parameters,
//! 2. a `#`-prefixed column description line,
//! 3. one row per merged bin:
//!    bin start, mean sol, flux, flux CI low/high, LM-adjusted flux and CI, ZHR and CI,
//!    meteor count, TAP, mean LM, radiant elevation, radiant distance, angular velocity,
//! 4. a trailer row holding only the closing bin edge.
//!
//! Solar longitudes are written in degrees, TAP in 1000 km²·h. Undefined values (NaN) are
//! written as empty cells, as are the columns derived from the shower summary when no summary
//! is available.

use std::fs::File;
use std::io::{BufWriter, Write};

use camino::Utf8Path;
use tracing::info;

use crate::{
    constants::TAP_SCALE,
    fluxbatch_errors::FluxBatchError,
    merge::{engine::CombinedFlux, MergeParams},
    shower::FluxSummary,
};

const N_COLUMNS: usize = 17;

/// Everything needed to write the combined CSV.
#[derive(Debug, Clone, Copy)]
pub struct CombinedReport<'a> {
    pub combined: &'a CombinedFlux,
    pub summary: Option<&'a FluxSummary>,
    pub params: &'a MergeParams,
    pub shower_code: Option<&'a str>,
}

impl CombinedReport<'_> {
    /// Write the report to any writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), FluxBatchError> {
        self.write_header(&mut writer)?;

        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        let unit = self.combined.unit;
        for (i, bin) in self.combined.bins.iter().enumerate() {
            let derived = self.summary.and_then(|s| s.bins.get(i));
            let opt = |v: Option<f64>| v.map(|x| cell(x, 3)).unwrap_or_default();

            csv.write_record([
                cell(unit.to_degrees(bin.start), 8),
                cell(unit.to_degrees(bin.mean_sol), 8),
                cell(bin.flux, 3),
                cell(bin.flux_lower, 3),
                cell(bin.flux_upper, 3),
                opt(derived.map(|d| d.flux_lm)),
                opt(derived.map(|d| d.flux_lm_lower)),
                opt(derived.map(|d| d.flux_lm_upper)),
                opt(derived.map(|d| d.zhr)),
                opt(derived.map(|d| d.zhr_lower)),
                opt(derived.map(|d| d.zhr_upper)),
                bin.meteor_count.to_string(),
                cell(bin.time_area_product / TAP_SCALE, 3),
                cell(bin.limiting_magnitude, 2),
                cell(bin.radiant_elevation, 2),
                cell(bin.radiant_distance, 2),
                cell(bin.angular_velocity, 2),
            ])?;
        }

        let mut trailer = vec![String::new(); N_COLUMNS];
        trailer[0] = cell(unit.to_degrees(self.combined.closing_edge), 8);
        csv.write_record(&trailer)?;
        csv.flush()?;
        Ok(())
    }

    /// Write the report to `path`, replacing any existing file.
    pub fn write_file(&self, path: &Utf8Path) -> Result<(), FluxBatchError> {
        let file = BufWriter::new(File::create(path)?);
        self.write_to(file)?;
        info!(%path, bins = self.combined.len(), "combined flux written");
        Ok(())
    }

    fn write_header<W: Write>(&self, w: &mut W) -> Result<(), FluxBatchError> {
        let p = self.params;
        let lm_mean = self.summary.map(|s| s.lm_mean);

        writeln!(w, "# Shower parameters:")?;
        writeln!(w, "# Shower         = {}", self.shower_code.unwrap_or("-"))?;
        if let Some(s) = self.summary {
            writeln!(w, "# r              = {:.2}", s.population_index)?;
            writeln!(w, "# s              = {:.2}", s.mass_index)?;
            writeln!(w, "# Met LM mean    = {:+.2}", s.lm_mean)?;
        }
        writeln!(w, "# CI int.        = {:.1} %", 100.0 * p.ci)?;
        writeln!(w, "# Binning parameters:")?;
        writeln!(w, "# Min. meteors     = {}", p.min_meteors)?;
        writeln!(w, "# Min TAP          = {:.2} x 1000 km^2 h", p.min_tap)?;
        writeln!(w, "# Min bin duration = {:.2} h", p.min_bin_duration)?;
        writeln!(w, "# Max bin duration = {:.2} h", p.max_bin_duration)?;
        writeln!(
            w,
            "# Sol bin start (deg), Mean Sol (deg), Flux@+6.5M (met / 1000 km^2 h), Flux CI low, \
             Flux CI high, Flux@{}M (met / 1000 km^2 h), Flux CI low, Flux CI high, ZHR, ZHR CI low, \
             ZHR CI high, Meteor Count, Time-area product (corrected to +6.5M) (1000 km^2 h), \
             Meteor LM, Radiant elev (deg), Radiant dist (deg), Ang vel (deg/s)",
            lm_mean
                .map(|lm| format!("{lm:+.2}"))
                .unwrap_or_else(|| "LM".to_string())
        )?;
        Ok(())
    }
}

/// Fixed-precision cell, empty for an undefined value.
fn cell(value: f64, precision: usize) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value:.precision$}")
    }
}

#[cfg(test)]
mod report_test {
    use super::*;
    use crate::{merge::engine::MergedBin, sol::AngleUnit};
    use hifitime::Duration;

    fn merged(start: f64, end: f64, meteors: u64, tap: f64) -> MergedBin {
        MergedBin {
            bins: 0..1,
            start,
            end,
            mean_sol: (start + end) / 2.0,
            duration: Duration::ZERO,
            meteor_count: meteors,
            time_area_product: tap,
            flux: 1e9 * meteors as f64 / tap,
            flux_lower: 1.0,
            flux_upper: 2.0,
            limiting_magnitude: 5.5,
            radiant_elevation: 40.0,
            radiant_distance: 50.0,
            angular_velocity: 20.0,
            forced: false,
        }
    }

    fn render(report: &CombinedReport<'_>) -> String {
        let mut buf = Vec::new();
        report.write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_layout_without_summary() {
        let combined = CombinedFlux {
            bins: vec![merged(140.0, 141.0, 60, 4e9), merged(141.0, 142.5, 55, 5e9)],
            closing_edge: 142.5,
            discarded: vec![],
            unit: AngleUnit::Degrees,
        };
        let params = MergeParams::default();
        let out = render(&CombinedReport {
            combined: &combined,
            summary: None,
            params: &params,
            shower_code: Some("PER"),
        });

        let rows: Vec<&str> = out.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            "140.00000000,140.50000000,15.000,1.000,2.000,,,,,,,60,4.000,5.50,40.00,50.00,20.00"
        );
        assert_eq!(rows[2], "142.50000000,,,,,,,,,,,,,,,,");
        assert!(out.contains("# Shower         = PER"));
        assert!(out.contains("# Min. meteors     = 50"));
    }

    #[test]
    fn test_radian_grid_written_in_degrees() {
        let combined = CombinedFlux {
            bins: vec![merged(std::f64::consts::PI, std::f64::consts::PI + 0.1, 10, 1e9)],
            closing_edge: std::f64::consts::PI + 0.1,
            discarded: vec![],
            unit: AngleUnit::Radians,
        };
        let params = MergeParams::default();
        let out = render(&CombinedReport {
            combined: &combined,
            summary: None,
            params: &params,
            shower_code: None,
        });
        let first = out.lines().find(|l| !l.starts_with('#')).unwrap();
        assert!(first.starts_with("180.00000000,"));
    }
}
