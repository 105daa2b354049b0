pub mod aligner;
pub mod constants;
pub mod flux_batch;
pub mod fluxbatch_errors;
pub mod merge;
pub mod reducer;
pub mod report;
pub mod shower;
pub mod sol;
pub mod station;
pub mod style;
pub mod tally;
pub mod weighted;
