//! # Shower-level flux summary
//!
//! Derived quantities that depend on the magnitude distribution of the shower:
//!
//! * conversions between population index `r` and mass index `s`,
//! * the Zenithal Hourly Rate (ZHR) equivalent of a flux at +6.5 mag,
//! * [`FluxSummary`]: flux rescaled to the mean TAP-weighted meteor limiting magnitude of the
//!   merged bins, and ZHR with bounds for every output bin.
//!
//! Relations
//! -----------------
//! ```text
//! r   = 10^((s − 1) / 2.5)
//! s   = 1 + 2.5 · log10(r)
//! ZHR = flux₆.₅ · 37200 / ((13.1·r − 16.5) · (r − 1.3)^0.748)
//! flux_LM = flux₆.₅ / r^(6.5 − LM)
//! ```

use tracing::warn;

use crate::{
    constants::REFERENCE_LM, fluxbatch_errors::FluxBatchError, merge::engine::CombinedFlux,
    weighted::WeightedMean,
};

/// Population index from mass index.
pub fn population_index(mass_index: f64) -> f64 {
    10_f64.powf((mass_index - 1.0) / 2.5)
}

/// Mass index from population index.
pub fn mass_index(population_index: f64) -> f64 {
    1.0 + 2.5 * population_index.log10()
}

/// ZHR corresponding to a flux at +6.5 mag (meteoroids / 1000 km²·h).
///
/// The relation is only defined for `r > 1.3`; other values return
/// [`FluxBatchError::InvalidPopulationIndex`].
pub fn zhr(flux_lm_6_5: f64, population_index: f64) -> Result<f64, FluxBatchError> {
    let r = population_index;
    if r.is_nan() || r <= 1.3 {
        return Err(FluxBatchError::InvalidPopulationIndex(r));
    }
    Ok(flux_lm_6_5 * 37200.0 / ((13.1 * r - 16.5) * (r - 1.3).powf(0.748)))
}

/// Arithmetic mean of the per-station population indices, `None` if there are none.
pub fn mean_population_index(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Derived series of one output bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinSummary {
    pub flux_lm: f64,
    pub flux_lm_lower: f64,
    pub flux_lm_upper: f64,
    pub zhr: f64,
    pub zhr_lower: f64,
    pub zhr_upper: f64,
}

/// Shower-level summary of a [`CombinedFlux`].
#[derive(Debug, Clone, PartialEq)]
pub struct FluxSummary {
    pub population_index: f64,
    pub mass_index: f64,
    /// TAP-weighted mean meteor limiting magnitude over the output bins.
    pub lm_mean: f64,
    /// `r^(6.5 − lm_mean)`: flux at +6.5 divided by this gives the flux at `lm_mean`.
    pub lm_factor: f64,
    /// One entry per output bin, same order as `CombinedFlux::bins`.
    pub bins: Vec<BinSummary>,
}

impl FluxSummary {
    /// Compute the summary of `combined` for a shower of population index `population_index`.
    ///
    /// Bins with NaN flux (zero exposure) get NaN derived values. The mean limiting magnitude
    /// ignores bins whose magnitude is undefined. A population index outside the domain of
    /// [`zhr`] (`r ≤ 1.3` or NaN) leaves the ZHR columns NaN; the flux columns are still
    /// computed.
    pub fn compute(combined: &CombinedFlux, population_index: f64) -> Self {
        let r = population_index;

        let mut lm = WeightedMean::new();
        for bin in &combined.bins {
            lm.add(bin.limiting_magnitude, bin.time_area_product);
        }
        let lm_mean = lm.mean();
        let lm_factor = r.powf(REFERENCE_LM - lm_mean);

        let zhr_defined = zhr(1.0, r).is_ok();
        if !zhr_defined {
            warn!(population_index = r, "population index out of range, ZHR left undefined");
        }
        let to_zhr = |flux: f64| zhr(flux, r).unwrap_or(f64::NAN);

        let bins = combined
            .bins
            .iter()
            .map(|b| BinSummary {
                flux_lm: b.flux / lm_factor,
                flux_lm_lower: b.flux_lower / lm_factor,
                flux_lm_upper: b.flux_upper / lm_factor,
                zhr: to_zhr(b.flux),
                zhr_lower: to_zhr(b.flux_lower),
                zhr_upper: to_zhr(b.flux_upper),
            })
            .collect();

        FluxSummary {
            population_index: r,
            mass_index: mass_index(r),
            lm_mean,
            lm_factor,
            bins,
        }
    }
}
