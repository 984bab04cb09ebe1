use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Column-major view of rows selected from a recording.
///
/// Every column holds `len()` samples; column order follows the axis
/// selector the view was requested with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Series {
    columns: Vec<Vec<f64>>,
    len: usize,
}

impl Series {
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self> {
        let len = columns.first().map_or(0, Vec::len);
        if let Some(bad) = columns.iter().position(|c| c.len() != len) {
            anyhow::bail!(
                "Column {} has {} rows, expected {}",
                bad,
                columns[bad].len(),
                len
            );
        }
        Ok(Self { columns, len })
    }

    pub fn from_rows<const N: usize>(rows: &[[f64; N]]) -> Self {
        let columns = (0..N)
            .map(|c| rows.iter().map(|row| row[c]).collect())
            .collect();
        Self {
            columns,
            len: rows.len(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    pub fn row(&self, index: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[index]).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        (0..self.len).map(move |i| self.row(i))
    }

    /// The only column of a single-axis view
    pub fn single(&self) -> Result<&[f64]> {
        if self.width() != 1 {
            anyhow::bail!(
                "Expected a single-axis series, got {} columns",
                self.width()
            );
        }
        Ok(&self.columns[0])
    }
}
