use serde::Deserialize;

/// Row-major table of cell strings as returned by a sheet fetch. Rows may be ragged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

/// Wire shape of a values response (`{"range": ..., "values": [[...]]}`).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Grid,
}

impl Grid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, idx: usize) -> Option<&[String]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    /// Missing cells read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Rows in `[start, end)` with their indices; `end` is clamped to the grid height.
    pub fn rows_between(
        &self,
        start: usize,
        end: Option<usize>,
    ) -> impl Iterator<Item = (usize, &[String])> {
        let end = end.unwrap_or(self.rows.len()).min(self.rows.len());
        let start = start.min(end);
        self.rows[start..end]
            .iter()
            .enumerate()
            .map(move |(i, r)| (start + i, r.as_slice()))
    }
}
