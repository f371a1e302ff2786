use time::Date;
use tracing::{info, warn};

use crate::aggregate::{
    aggregate_daily, aggregate_period, aggregate_project, aggregate_secondary, extract_deposit,
};
use crate::compose::{
    compose_catalog, compose_daily, compose_period, compose_project, compose_secondary,
};
use crate::config::Config;
use crate::dates::DateRange;
use crate::domain::{ReportKind, ReportResult};
use crate::error::ReportError;
use crate::grid::Grid;
use crate::profile::SheetKind;
use crate::render::Renderer;
use crate::source::GridSource;

/// Report generation over one grid source. Every call fetches a fresh snapshot.
pub struct ReportEngine<S> {
    source: S,
    config: Config,
}

impl<S: GridSource> ReportEngine<S> {
    pub fn new(source: S, config: Config) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.config.templates, &self.config.messages)
    }

    pub async fn daily(&self, date: Date) -> ReportResult {
        let grid = match self.snapshot(SheetKind::Primary).await {
            Ok(g) => g,
            Err(e) => return ReportResult::failure(ReportKind::Daily, e),
        };
        let profile = &self.config.profiles.primary;
        let totals = aggregate_daily(&grid, profile, date);
        let deposit = extract_deposit(&grid, profile);
        compose_daily(totals, deposit)
    }

    pub async fn period(&self, range: DateRange) -> ReportResult {
        let grid = match self.snapshot(SheetKind::Primary).await {
            Ok(g) => g,
            Err(e) => return ReportResult::failure(ReportKind::Period, e),
        };
        let totals = aggregate_period(&grid, &self.config.profiles.primary, range);
        info!(
            start = %range.start(),
            end = %range.end(),
            days = totals.per_day.len(),
            total = totals.total,
            "period report"
        );
        compose_period(Ok(totals))
    }

    pub async fn project(&self, tag: &str, range: DateRange) -> ReportResult {
        let grid = match self.snapshot(SheetKind::Primary).await {
            Ok(g) => g,
            Err(e) => return ReportResult::failure(ReportKind::Project, e),
        };
        let totals = aggregate_project(&grid, &self.config.profiles.primary, tag, range);
        if let Ok(t) = &totals {
            info!(
                project = %t.project_name,
                days = t.per_day.len(),
                total = t.total,
                "project report"
            );
        }
        compose_project(totals)
    }

    pub async fn secondary(&self, date: Date) -> ReportResult {
        let grid = match self.snapshot(SheetKind::Secondary).await {
            Ok(g) => g,
            Err(e) => return ReportResult::failure(ReportKind::Secondary, e),
        };
        compose_secondary(aggregate_secondary(
            &grid,
            &self.config.profiles.secondary,
            date,
        ))
    }

    pub fn catalog(&self) -> ReportResult {
        compose_catalog(&self.config.catalog)
    }

    async fn snapshot(&self, kind: SheetKind) -> Result<Grid, ReportError> {
        let profile = self.config.profiles.get(kind);
        match self.source.fetch(kind, profile).await {
            Ok(grid) if grid.is_empty() => {
                warn!(sheet = %kind, "sheet returned no rows");
                Err(ReportError::SourceUnavailable(format!("{kind} sheet is empty")))
            }
            Ok(grid) => {
                info!(sheet = %kind, rows = grid.height(), "fetched sheet");
                Ok(grid)
            }
            Err(e) => {
                warn!(sheet = %kind, error = %e, "sheet fetch failed");
                Err(ReportError::SourceUnavailable(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DailyReport, Report, Warning};
    use crate::error::SourceError;
    use crate::profile::SheetProfile;
    use crate::source::StaticGridSource;
    use pretty_assertions::assert_eq;
    use time::macros::date;

    struct TimedOut;

    impl GridSource for TimedOut {
        async fn fetch(&self, _: SheetKind, _: &SheetProfile) -> Result<Grid, SourceError> {
            Err(SourceError::Timeout)
        }
    }

    fn primary() -> Grid {
        Grid::from_rows([
            vec!["", "", "", "01.11.24", "02.11.24"],
            vec!["", "", "", "TRUE"],
            vec!["П1: Marketing", "", "", "5", "x"],
            vec!["Остаток депозита", "", "12 345\u{a0}.67"],
        ])
    }

    fn engine(source: StaticGridSource) -> ReportEngine<StaticGridSource> {
        ReportEngine::new(source, Config::default())
    }

    #[tokio::test]
    async fn daily_combines_totals_and_deposit() {
        let e = engine(StaticGridSource::new().with(SheetKind::Primary, primary()));
        assert_eq!(
            e.daily(date!(2024 - 11 - 01)).await,
            ReportResult::Success(Report::Daily(DailyReport {
                date: date!(2024 - 11 - 01),
                records: 5,
                deposit: 12345,
                verified: true,
            }))
        );
    }

    #[tokio::test]
    async fn empty_grid_and_timeout_are_source_unavailable() {
        let e = engine(StaticGridSource::new().with(SheetKind::Primary, Grid::default()));
        let r = e.daily(date!(2024 - 11 - 01)).await;
        assert!(matches!(r.error(), Some(ReportError::SourceUnavailable(_))));

        let e = ReportEngine::new(TimedOut, Config::default());
        let r = e.period(DateRange::single(date!(2024 - 11 - 01))).await;
        assert!(matches!(r.error(), Some(ReportError::SourceUnavailable(_))));
        assert_eq!(r.kind(), ReportKind::Period);
    }

    #[tokio::test]
    async fn period_past_data_is_successful_with_warning() {
        let e = engine(StaticGridSource::new().with(SheetKind::Primary, primary()));
        let range = DateRange::new(date!(2025 - 01 - 01), date!(2025 - 01 - 31)).unwrap();
        let ReportResult::Success(Report::Period(p)) = e.period(range).await else {
            panic!("expected period report");
        };
        assert_eq!(p.total_records, 0);
        assert_eq!(p.warning, Some(Warning::NoDataInRange));
    }

    #[tokio::test]
    async fn secondary_reads_its_own_sheet() {
        let e = engine(StaticGridSource::new().with(SheetKind::Primary, primary()));
        let r = e.secondary(date!(2024 - 11 - 01)).await;
        assert!(matches!(r.error(), Some(ReportError::SourceUnavailable(_))));
        assert_eq!(r.kind(), ReportKind::Secondary);
    }
}
