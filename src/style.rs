//! Deterministic per-station plot styles.
//!
//! Each station gets a colour from the 10-entry `tab10` palette in first-seen order and a
//! marker that advances every 10 stations. Assignments are memoized so that every night of a
//! station is drawn the same way.

use std::collections::HashMap;

use crate::constants::StationId;

/// `tab10` colour cycle
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub const MARKERS: [char; 3] = ['o', 'x', '+'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationStyle {
    pub color: &'static str,
    pub marker: char,
}

/// Owned station → style table.
#[derive(Debug, Clone, Default)]
pub struct StationStyles {
    table: HashMap<StationId, StationStyle>,
}

impl StationStyles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Style of `station`, assigned on first request.
    pub fn style(&mut self, station: &str) -> StationStyle {
        let n = self.table.len();
        *self
            .table
            .entry(station.to_string())
            .or_insert_with(|| StationStyle {
                color: PALETTE[n % PALETTE.len()],
                marker: MARKERS[(n / PALETTE.len()) % MARKERS.len()],
            })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
