//! Aggregator output to report records. Every function here is total.

use crate::aggregate::{DailyTotals, PeriodTotals, ProjectTotals, SecondarySnapshot};
use crate::domain::{
    CatalogEntry, DailyReport, PeriodReport, ProjectReport, Report, ReportKind, ReportResult,
    SecondaryReport,
};
use crate::error::ReportError;

pub fn compose_daily(totals: Result<DailyTotals, ReportError>, deposit: i64) -> ReportResult {
    match totals {
        Ok(t) => ReportResult::Success(Report::Daily(DailyReport {
            date: t.date,
            records: t.count,
            deposit,
            verified: t.verified,
        })),
        Err(e) => ReportResult::failure(ReportKind::Daily, e),
    }
}

pub fn compose_period(totals: Result<PeriodTotals, ReportError>) -> ReportResult {
    match totals {
        Ok(t) => ReportResult::Success(Report::Period(PeriodReport {
            start_date: t.range.start(),
            end_date: t.range.end(),
            total_records: t.total,
            warning: t.warning,
        })),
        Err(e) => ReportResult::failure(ReportKind::Period, e),
    }
}

pub fn compose_project(totals: Result<ProjectTotals, ReportError>) -> ReportResult {
    match totals {
        Ok(t) => ReportResult::Success(Report::Project(ProjectReport {
            project: t.project_name,
            start_date: t.range.start(),
            end_date: t.range.end(),
            records: t.total,
            warning: t.warning,
        })),
        Err(e) => ReportResult::failure(ReportKind::Project, e),
    }
}

/// A sheet with no active rows is reported as a failure, not an empty listing.
pub fn compose_secondary(snapshot: Result<SecondarySnapshot, ReportError>) -> ReportResult {
    match snapshot {
        Ok(s) if s.projects.is_empty() => {
            ReportResult::failure(ReportKind::Secondary, ReportError::NoActiveProjects)
        }
        Ok(s) => ReportResult::Success(Report::Secondary(SecondaryReport {
            date: s.date,
            projects: s.projects,
        })),
        Err(e) => ReportResult::failure(ReportKind::Secondary, e),
    }
}

pub fn compose_catalog(entries: &[CatalogEntry]) -> ReportResult {
    ReportResult::Success(Report::Catalog(entries.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::DateRange;
    use crate::domain::{ProjectSnapshot, Warning};
    use pretty_assertions::assert_eq;
    use time::macros::date;

    #[test]
    fn daily_carries_deposit_through() {
        let totals = DailyTotals {
            date: date!(2024 - 11 - 01),
            column: 3,
            count: 5,
            verified: true,
        };
        assert_eq!(
            compose_daily(Ok(totals), 12345),
            ReportResult::Success(Report::Daily(DailyReport {
                date: date!(2024 - 11 - 01),
                records: 5,
                deposit: 12345,
                verified: true,
            }))
        );
    }

    #[test]
    fn failures_keep_their_kind() {
        let e = ReportError::NoDataForDate(date!(2024 - 11 - 01));
        let r = compose_daily(Err(e.clone()), 0);
        assert_eq!(r.kind(), ReportKind::Daily);
        assert_eq!(r.error(), Some(&e));

        let r = compose_project(Err(ReportError::UnknownProject("П9".into())));
        assert_eq!(r.kind(), ReportKind::Project);
        assert!(!r.is_success());
    }

    #[test]
    fn period_warning_survives_composition() {
        let range = DateRange::single(date!(2023 - 01 - 01));
        let r = compose_period(Ok(PeriodTotals {
            range,
            total: 0,
            per_day: vec![],
            warning: Some(Warning::NoDataInRange),
        }));
        let ReportResult::Success(Report::Period(p)) = r else {
            panic!("expected period report");
        };
        assert_eq!(p.warning, Some(Warning::NoDataInRange));
        assert_eq!(p.start_date, p.end_date);
    }

    #[test]
    fn empty_secondary_is_no_active_projects() {
        let snapshot = SecondarySnapshot {
            date: date!(2024 - 11 - 01),
            column: 6,
            projects: vec![],
            skipped_rows: 2,
        };
        assert_eq!(
            compose_secondary(Ok(snapshot.clone())),
            ReportResult::failure(ReportKind::Secondary, ReportError::NoActiveProjects)
        );

        let one = SecondarySnapshot {
            projects: vec![ProjectSnapshot {
                name: "Alpha".into(),
                total_volume: 1,
                tariff_remaining: 1,
                total_issued: 0,
                yesterday_issued: 0,
            }],
            ..snapshot
        };
        assert!(compose_secondary(Ok(one)).is_success());
    }
}
