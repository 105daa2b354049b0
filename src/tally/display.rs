//! # Tabular display for the camera tally
//!
//! [`CameraTallyDisplay`] borrows a [`CameraTally`] and renders, for every output bin, the top
//! stations by meteor count and by time-area product as two `comfy-table` tables.
//!
//! ```rust,ignore
//! println!("{}", tally.show().with_top_n(3));
//! ```
//!
//! Solar longitudes are printed in degrees whatever the unit of the tally, TAP in km²·h.

use std::fmt;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};

use crate::{
    constants::M2_TO_KM2,
    tally::{CameraTally, StationContribution},
};

/// Display adaptor printing the top `top_n` stations of every output bin.
pub struct CameraTallyDisplay<'a> {
    tally: &'a CameraTally,
    top_n: usize,
}

impl<'a> CameraTallyDisplay<'a> {
    pub fn new(tally: &'a CameraTally) -> Self {
        Self { tally, top_n: 5 }
    }

    /// Number of stations listed per ranking (default 5).
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    fn table(&self, ranking: &[StationContribution]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Station"),
            Cell::new("Meteors"),
            Cell::new("TAP [km² h]"),
        ]);
        for c in ranking.iter().take(self.top_n) {
            table.add_row(Row::from(vec![
                Cell::new(&c.station_id),
                Cell::new(c.meteors).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", c.tap / M2_TO_KM2)).set_alignment(CellAlignment::Right),
            ]));
        }
        table
    }
}

impl CameraTally {
    /// Borrowing display adaptor, see [`CameraTallyDisplay`].
    pub fn show(&self) -> CameraTallyDisplay<'_> {
        CameraTallyDisplay::new(self)
    }
}

impl fmt::Display for CameraTallyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Camera tally per bin:")?;
        writeln!(f, "---------------------")?;
        for bin in &self.tally.bins {
            writeln!(f)?;
            writeln!(f, "Sol = {:.4} deg", self.tally.unit.to_degrees(bin.mean_sol))?;
            writeln!(f, "Top {} by meteor number:", self.top_n)?;
            writeln!(f, "{}", self.table(&bin.by_meteors))?;
            writeln!(f, "Top {} by TAP:", self.top_n)?;
            writeln!(f, "{}", self.table(&bin.by_tap))?;
        }
        Ok(())
    }
}
