//! # Constants and type definitions for fluxbatch
//!
//! Physical constants, unit conversions and the small type aliases shared by the binning,
//! merging and tally modules.
//!
//! ## Overview
//!
//! - Angular conversions (degrees ↔ radians, full turns)
//! - Calendar constants used to turn solar-longitude spans into durations
//! - Scaling factors for the time-area product (TAP) and flux units
//! - Type alias for station identifiers

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, one full turn in radians
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Length of the tropical year in days, used to convert solar longitude into time
pub const TROPICAL_YEAR_DAYS: f64 = 365.24219;

/// Number of hours in a day
pub const HOURS_PER_DAY: f64 = 24.0;

/// Absolute tolerance when matching solar-longitude bin edges.
///
/// Edges come out of floating ephemeris computations, so two grids built from the same
/// forced bins only agree to this level.
pub const SOL_TOLERANCE: f64 = 1e-7;

/// TAP is accumulated in m²·h; thresholds and flux are expressed per 1000 km²·h
pub const TAP_SCALE: f64 = 1e9;

/// TAP in m²·h → km²·h
pub const M2_TO_KM2: f64 = 1e6;

/// Reference meteor limiting magnitude at which flux is reported
pub const REFERENCE_LM: f64 = 6.5;

// -------------------------------------------------------------------------------------------------
// Type definitions
// -------------------------------------------------------------------------------------------------

/// Identifier of a camera station (e.g. `"CA0001"`)
pub type StationId = String;
