use std::collections::HashMap;

use crate::error::SourceError;
use crate::grid::Grid;
use crate::profile::{SheetKind, SheetProfile};

/// Fetches the current snapshot of a sheet.
///
/// An empty grid is a valid answer; callers treat it exactly like a failed fetch.
pub trait GridSource {
    fn fetch(
        &self,
        kind: SheetKind,
        profile: &SheetProfile,
    ) -> impl Future<Output = Result<Grid, SourceError>>;
}

/// Grids held in memory, keyed by sheet.
#[derive(Clone, Debug, Default)]
pub struct StaticGridSource {
    grids: HashMap<SheetKind, Grid>,
}

impl StaticGridSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: SheetKind, grid: Grid) -> Self {
        self.grids.insert(kind, grid);
        self
    }
}

impl GridSource for StaticGridSource {
    async fn fetch(&self, kind: SheetKind, _profile: &SheetProfile) -> Result<Grid, SourceError> {
        self.grids
            .get(&kind)
            .cloned()
            .ok_or_else(|| SourceError::Unavailable(format!("no {kind} sheet loaded")))
    }
}
