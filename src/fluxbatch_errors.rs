use thiserror::Error;

#[derive(Error, Debug)]
pub enum FluxBatchError {
    #[error("Solar longitude bin grid must contain at least two edges")]
    EmptyGrid,

    #[error("Solar longitude bin edges are not strictly increasing at index {index}")]
    NonMonotonicEdges { index: usize },

    #[error("Length mismatch for {field}: expected {expected}, found {found}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Station {station}: local bin edges starting at {first_edge} are not a sub-range of the global grid")]
    MisalignedGrid { station: String, first_edge: f64 },

    #[error("Station {station}: {len} local bins at offset {offset} overflow the {grid_bins} global bins")]
    LocalGridOutOfRange {
        station: String,
        offset: usize,
        len: usize,
        grid_bins: usize,
    },

    #[error("Station {station}: invalid collecting area or observing time in bin {index}")]
    InvalidExposure { station: String, index: usize },

    #[error("Invalid merge parameter: {0}")]
    InvalidMergeParameter(String),

    #[error("Invalid population index (must be > 1.3): {0}")]
    InvalidPopulationIndex(f64),

    #[error("Statistical distribution error: {0}")]
    Statistics(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl PartialEq for FluxBatchError {
    fn eq(&self, other: &Self) -> bool {
        use FluxBatchError::*;
        match (self, other) {
            (EmptyGrid, EmptyGrid) => true,
            (NonMonotonicEdges { index: a }, NonMonotonicEdges { index: b }) => a == b,
            (
                LengthMismatch {
                    field: fa,
                    expected: ea,
                    found: na,
                },
                LengthMismatch {
                    field: fb,
                    expected: eb,
                    found: nb,
                },
            ) => fa == fb && ea == eb && na == nb,
            (
                MisalignedGrid {
                    station: sa,
                    first_edge: fa,
                },
                MisalignedGrid {
                    station: sb,
                    first_edge: fb,
                },
            ) => sa == sb && fa == fb,
            (
                LocalGridOutOfRange {
                    station: sa,
                    offset: oa,
                    len: la,
                    grid_bins: ga,
                },
                LocalGridOutOfRange {
                    station: sb,
                    offset: ob,
                    len: lb,
                    grid_bins: gb,
                },
            ) => sa == sb && oa == ob && la == lb && ga == gb,
            (
                InvalidExposure {
                    station: sa,
                    index: ia,
                },
                InvalidExposure {
                    station: sb,
                    index: ib,
                },
            ) => sa == sb && ia == ib,
            (InvalidMergeParameter(a), InvalidMergeParameter(b)) => a == b,
            (InvalidPopulationIndex(a), InvalidPopulationIndex(b)) => a == b,
            (Statistics(a), Statistics(b)) => a == b,

            // Not comparable: equal when the variant matches
            (Csv(_), Csv(_)) => true,
            (IoError(_), IoError(_)) => true,

            _ => false,
        }
    }
}
