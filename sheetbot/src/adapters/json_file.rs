use std::path::{Path, PathBuf};

use sheetbot_core::error::SourceError;
use sheetbot_core::grid::{Grid, ValueRange};
use sheetbot_core::{GridSource, SheetKind, SheetProfile};
use tracing::debug;

/// Offline source: `<dir>/primary.json` and `<dir>/secondary.json`, each a saved `values`
/// response.
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, kind: SheetKind) -> PathBuf {
        self.dir.join(format!("{kind}.json"))
    }
}

async fn read_values(path: &Path) -> Result<Grid, SourceError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SourceError::Unavailable(format!("{}: {e}", path.display())))?;
    let body: ValueRange = serde_json::from_str(&text)
        .map_err(|e| SourceError::Unavailable(format!("{}: {e}", path.display())))?;
    Ok(body.values)
}

impl GridSource for JsonFileSource {
    async fn fetch(&self, kind: SheetKind, _profile: &SheetProfile) -> Result<Grid, SourceError> {
        let path = self.path_for(kind);
        debug!(path = %path.display(), "reading saved sheet");
        read_values(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn reads_saved_values_response() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("secondary.json"),
            r#"{"range":"'s'!A1:G3","majorDimension":"ROWS","values":[["Проект","Статус"],["Alpha","TRUE"]]}"#,
        )
        .unwrap();

        let source = JsonFileSource::new(dir.path());
        let grid = source
            .fetch(SheetKind::Secondary, &SheetProfile::secondary())
            .await
            .unwrap();
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.cell(1, 0), "Alpha");
    }

    #[tokio::test]
    async fn missing_or_garbled_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path());
        let err = source
            .fetch(SheetKind::Primary, &SheetProfile::primary())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));

        std::fs::write(dir.path().join("primary.json"), "{not json").unwrap();
        let err = source
            .fetch(SheetKind::Primary, &SheetProfile::primary())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
    }
}
