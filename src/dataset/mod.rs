pub mod cell;
pub mod reshaper;

pub use cell::{format_number, CellValue, Numeric};
pub use reshaper::{
    reshape, reshape_with_report, size_token, MalformedCell, MalformedReason, ReshapeOutcome,
    SIZES_COLUMN,
};

use serde::{Deserialize, Serialize};

/// An in-memory table: named columns in order, and rows of cells aligned to them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Rows shorter than the header are padded with `Missing`.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, CellValue::Missing);
                }
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of the first column with this name.
    pub fn column(&self, name: &str) -> Option<Vec<&CellValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Values of the last column with this name.
    pub fn last_column(&self, name: &str) -> Option<Vec<&CellValue>> {
        let idx = self.columns.iter().rposition(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Append a column. `values` must hold one cell per row.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<CellValue>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.push(name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Header and first `n` rows, tab separated, for log output.
    pub fn preview(&self, n: usize) -> String {
        let mut out = self.columns.join("\t");
        for row in self.rows.iter().take(n) {
            out.push('\n');
            let cells: Vec<_> = row.iter().map(|c| c.render()).collect();
            out.push_str(&cells.join("\t"));
        }
        if self.rows.len() > n {
            out.push_str(&format!("\n... {} more rows", self.rows.len() - n));
        }
        out
    }
}
