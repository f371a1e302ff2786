use time::Date;
use tracing::{debug, warn};

use crate::dates::DateRange;
use crate::domain::{ProjectSnapshot, Warning};
use crate::error::{ParseError, ReportError};
use crate::grid::Grid;
use crate::parse::{clean, parse_amount, parse_count, parse_flag, truncate_amount};
use crate::profile::SheetProfile;
use crate::resolve::resolve_column;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailyTotals {
    pub date: Date,
    pub column: usize,
    pub count: u64,
    pub verified: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayTotal {
    pub date: Date,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeriodTotals {
    pub range: DateRange,
    pub total: u64,
    pub per_day: Vec<DayTotal>,
    pub warning: Option<Warning>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectTotals {
    pub project_name: String,
    pub range: DateRange,
    pub total: u64,
    pub per_day: Vec<DayTotal>,
    pub warning: Option<Warning>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecondarySnapshot {
    pub date: Date,
    pub column: usize,
    pub projects: Vec<ProjectSnapshot>,
    pub skipped_rows: usize,
}

pub fn aggregate_daily(
    grid: &Grid,
    profile: &SheetProfile,
    date: Date,
) -> Result<DailyTotals, ReportError> {
    let column = resolve_column(grid, profile, date).ok_or(ReportError::NoDataForDate(date))?;
    let count = column_sum(grid, profile, column);
    let verified = profile
        .verify_row
        .is_some_and(|row| parse_flag(grid.cell(row, column)));
    debug!(%date, column, count, verified, "daily totals");
    Ok(DailyTotals {
        date,
        column,
        count,
        verified,
    })
}

/// Days without a column are skipped; an all-zero period carries a warning instead of failing.
pub fn aggregate_period(grid: &Grid, profile: &SheetProfile, range: DateRange) -> PeriodTotals {
    let per_day: Vec<DayTotal> = range
        .days()
        .filter_map(|date| {
            let column = resolve_column(grid, profile, date)?;
            let count = column_sum(grid, profile, column);
            debug!(%date, count, "period day");
            Some(DayTotal { date, count })
        })
        .collect();
    let total = sum_days(&per_day);
    PeriodTotals {
        range,
        total,
        per_day,
        warning: zero_warning(total),
    }
}

pub fn aggregate_project(
    grid: &Grid,
    profile: &SheetProfile,
    tag: &str,
    range: DateRange,
) -> Result<ProjectTotals, ReportError> {
    let tag = tag.trim();
    let row = (!tag.is_empty())
        .then(|| {
            profile
                .data_rows(grid)
                .map(|(_, row)| row)
                .find(|row| cell_at(row, Some(profile.project_column)).starts_with(tag))
        })
        .flatten()
        .ok_or_else(|| ReportError::UnknownProject(tag.to_string()))?;

    let per_day: Vec<DayTotal> = range
        .days()
        .filter_map(|date| {
            let column = resolve_column(grid, profile, date)?;
            let count = row.get(column).and_then(|c| parse_count(c)).unwrap_or(0);
            Some(DayTotal { date, count })
        })
        .collect();
    let total = sum_days(&per_day);
    Ok(ProjectTotals {
        project_name: cell_at(row, Some(profile.project_column)).to_string(),
        range,
        total,
        per_day,
        warning: zero_warning(total),
    })
}

/// Snapshot of every active row for `date`. Rows with unparsable figures are dropped.
pub fn aggregate_secondary(
    grid: &Grid,
    profile: &SheetProfile,
    date: Date,
) -> Result<SecondarySnapshot, ReportError> {
    let column = resolve_column(grid, profile, date).ok_or(ReportError::NoDataForDate(date))?;
    let mut projects = Vec::new();
    let mut skipped_rows = 0;
    for (idx, row) in profile.data_rows(grid) {
        let active = profile
            .status_column
            .is_some_and(|c| parse_flag(cell_at(row, Some(c))));
        if !active {
            continue;
        }
        match snapshot_row(row, profile, column) {
            Ok(snapshot) => projects.push(snapshot),
            Err(e) => {
                warn!(row = idx, error = %e, "skipping secondary row");
                skipped_rows += 1;
            }
        }
    }
    debug!(%date, column, active = projects.len(), skipped_rows, "secondary snapshot");
    Ok(SecondarySnapshot {
        date,
        column,
        projects,
        skipped_rows,
    })
}

/// Balance from the labelled deposit row; 0 whenever it cannot be read.
pub fn extract_deposit(grid: &Grid, profile: &SheetProfile) -> i64 {
    let Some(locator) = &profile.deposit else {
        return 0;
    };
    let Some(row) = grid
        .rows()
        .find(|row| row.first().is_some_and(|c| c.trim() == locator.label))
    else {
        warn!(label = %locator.label, "deposit row not found");
        return 0;
    };
    let Some(raw) = row.get(locator.column) else {
        warn!(column = locator.column, "deposit row has no value column");
        return 0;
    };
    match parse_amount(raw) {
        Ok(value) => truncate_amount(value),
        Err(e) => {
            warn!(error = %e, "deposit value unreadable");
            0
        }
    }
}

fn column_sum(grid: &Grid, profile: &SheetProfile, column: usize) -> u64 {
    profile
        .data_rows(grid)
        .filter_map(|(idx, row)| {
            let raw = row.get(column)?;
            let count = parse_count(raw);
            if count.is_none() && !clean(raw).is_empty() {
                debug!(row = idx, column, raw = %raw, "non-numeric cell skipped");
            }
            count
        })
        .fold(0u64, u64::saturating_add)
}

fn sum_days(days: &[DayTotal]) -> u64 {
    days.iter().map(|d| d.count).fold(0, u64::saturating_add)
}

fn zero_warning(total: u64) -> Option<Warning> {
    (total == 0).then_some(Warning::NoDataInRange)
}

fn cell_at(row: &[String], column: Option<usize>) -> &str {
    column
        .and_then(|c| row.get(c))
        .map(String::as_str)
        .unwrap_or("")
}

fn snapshot_row(
    row: &[String],
    profile: &SheetProfile,
    day_column: usize,
) -> Result<ProjectSnapshot, ParseError> {
    Ok(ProjectSnapshot {
        name: cell_at(row, Some(profile.project_column)).trim().to_string(),
        total_volume: amount_or_zero(cell_at(row, profile.volume_column))?,
        tariff_remaining: amount_or_zero(cell_at(row, profile.remaining_column))?,
        total_issued: amount_or_zero(cell_at(row, profile.total_issued_column))?,
        yesterday_issued: count_or_zero(cell_at(row, Some(day_column)))?,
    })
}

fn amount_or_zero(raw: &str) -> Result<i64, ParseError> {
    if clean(raw).is_empty() {
        return Ok(0);
    }
    parse_amount(raw).map(truncate_amount)
}

fn count_or_zero(raw: &str) -> Result<u64, ParseError> {
    if clean(raw).is_empty() {
        return Ok(0);
    }
    parse_count(raw).ok_or_else(|| ParseError::new(raw))
}
