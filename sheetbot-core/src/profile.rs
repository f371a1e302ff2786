use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Bump when a profile field changes meaning so stale config files are rejected.
pub const PROFILE_VERSION: u32 = 1;

pub const DEPOSIT_LABEL: &str = "Остаток депозита";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKind {
    Primary,
    Secondary,
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetKind::Primary => f.write_str("primary"),
            SheetKind::Secondary => f.write_str("secondary"),
        }
    }
}

/// How a header cell is matched against a `dd.mm.yy` label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMatch {
    /// Trimmed cell equals the label; weekly-summary cells are skipped.
    Exact,
    /// Cell contains the label somewhere in a longer caption.
    Contains,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositLocator {
    /// First-cell text of the row holding the balance.
    pub label: String,
    /// Column of the value within that row.
    pub column: usize,
}

/// Fixed layout of one sheet. All indices are zero-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetProfile {
    pub version: u32,
    pub sheet_name: String,
    /// A1 range requested from the source.
    pub range: String,
    pub date_row: usize,
    pub verify_row: Option<usize>,
    pub data_start_row: usize,
    /// Exclusive; `None` reads to the end of the grid.
    pub data_end_row: Option<usize>,
    /// First column that may hold a date header.
    pub date_start_column: usize,
    pub header_match: HeaderMatch,
    pub project_column: usize,
    pub status_column: Option<usize>,
    pub total_column: Option<usize>,
    pub volume_column: Option<usize>,
    pub remaining_column: Option<usize>,
    pub total_issued_column: Option<usize>,
    pub deposit: Option<DepositLocator>,
}

impl SheetProfile {
    /// Daily accounting sheet: name, phase and running total in A..C, dates from D,
    /// data rows 3..=237, deposit balance in column C of its labelled row.
    pub fn primary() -> Self {
        Self {
            version: PROFILE_VERSION,
            sheet_name: "[учет данных] 2025".to_string(),
            range: "A1:ZZ1000".to_string(),
            date_row: 0,
            verify_row: Some(1),
            data_start_row: 2,
            data_end_row: Some(237),
            date_start_column: 3,
            header_match: HeaderMatch::Exact,
            project_column: 0,
            status_column: None,
            total_column: Some(2),
            volume_column: None,
            remaining_column: None,
            total_issued_column: None,
            deposit: Some(DepositLocator {
                label: DEPOSIT_LABEL.to_string(),
                column: 2,
            }),
        }
    }

    /// Tariff sheet: name, status, volume, remaining, issued in A..E, dated captions from G.
    pub fn secondary() -> Self {
        Self {
            version: PROFILE_VERSION,
            sheet_name: "[учет данных] 2025".to_string(),
            range: "A1:ZZ1000".to_string(),
            date_row: 0,
            verify_row: None,
            data_start_row: 1,
            data_end_row: None,
            date_start_column: 6,
            header_match: HeaderMatch::Contains,
            project_column: 0,
            status_column: Some(1),
            total_column: None,
            volume_column: Some(2),
            remaining_column: Some(3),
            total_issued_column: Some(4),
            deposit: None,
        }
    }

    pub fn data_rows<'g>(&self, grid: &'g Grid) -> impl Iterator<Item = (usize, &'g [String])> {
        grid.rows_between(self.data_start_row, self.data_end_row)
    }

    pub fn validate(&self, kind: SheetKind) -> Result<(), String> {
        if self.version != PROFILE_VERSION {
            return Err(format!(
                "{kind} profile version {} is not supported (expected {PROFILE_VERSION})",
                self.version
            ));
        }
        if self.data_start_row <= self.date_row {
            return Err(format!(
                "{kind} profile: data_start_row must come after date_row"
            ));
        }
        if let Some(end) = self.data_end_row
            && end < self.data_start_row
        {
            return Err(format!(
                "{kind} profile: data_end_row {end} is before data_start_row {}",
                self.data_start_row
            ));
        }
        if kind == SheetKind::Secondary && self.status_column.is_none() {
            return Err("secondary profile needs a status_column".to_string());
        }
        Ok(())
    }
}
