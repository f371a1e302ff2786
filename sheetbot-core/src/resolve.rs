use time::Date;
use tracing::debug;

use crate::dates::header_label;
use crate::grid::Grid;
use crate::profile::{HeaderMatch, SheetProfile};

/// Marker of weekly-summary columns interleaved with the daily ones.
pub const WEEKLY_MARKER: &str = "нед.";

/// Column holding `date` in the profile's header row, scanning left to right.
pub fn resolve_column(grid: &Grid, profile: &SheetProfile, date: Date) -> Option<usize> {
    let header = grid.row(profile.date_row)?;
    let label = header_label(date);
    let found = header
        .iter()
        .enumerate()
        .skip(profile.date_start_column)
        .find(|(_, cell)| header_matches(cell, &label, profile.header_match))
        .map(|(idx, _)| idx);
    match found {
        Some(idx) => debug!(%label, column = idx, "resolved date column"),
        None => debug!(%label, "date not present in header"),
    }
    found
}

fn header_matches(cell: &str, label: &str, mode: HeaderMatch) -> bool {
    match mode {
        HeaderMatch::Exact => {
            let cell = cell.trim();
            if cell.contains(' ') || cell.contains(WEEKLY_MARKER) {
                return false;
            }
            cell == label
        }
        HeaderMatch::Contains => cell.contains(label),
    }
}
