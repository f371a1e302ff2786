use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::ReportError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    Daily,
    Period,
    Project,
    Secondary,
    Catalog,
}

/// Non-fatal note attached to an otherwise successful report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Warning {
    NoDataInRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailyReport {
    pub date: Date,
    pub records: u64,
    pub deposit: i64,
    pub verified: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeriodReport {
    pub start_date: Date,
    pub end_date: Date,
    pub total_records: u64,
    pub warning: Option<Warning>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectReport {
    pub project: String,
    pub start_date: Date,
    pub end_date: Date,
    pub records: u64,
    pub warning: Option<Warning>,
}

/// One active row of the secondary sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectSnapshot {
    pub name: String,
    pub total_volume: i64,
    pub tariff_remaining: i64,
    pub total_issued: i64,
    pub yesterday_issued: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecondaryReport {
    pub date: Date,
    pub projects: Vec<ProjectSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub tag: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Report {
    Daily(DailyReport),
    Period(PeriodReport),
    Project(ProjectReport),
    Secondary(SecondaryReport),
    Catalog(Vec<CatalogEntry>),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Daily(_) => ReportKind::Daily,
            Report::Period(_) => ReportKind::Period,
            Report::Project(_) => ReportKind::Project,
            Report::Secondary(_) => ReportKind::Secondary,
            Report::Catalog(_) => ReportKind::Catalog,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportResult {
    Success(Report),
    Failure { kind: ReportKind, error: ReportError },
}

impl ReportResult {
    pub fn failure(kind: ReportKind, error: ReportError) -> Self {
        ReportResult::Failure { kind, error }
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            ReportResult::Success(r) => r.kind(),
            ReportResult::Failure { kind, .. } => *kind,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ReportResult::Success(_))
    }

    pub fn error(&self) -> Option<&ReportError> {
        match self {
            ReportResult::Success(_) => None,
            ReportResult::Failure { error, .. } => Some(error),
        }
    }
}
