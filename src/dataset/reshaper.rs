//! Collapses every value column of a row into a single `sizes` string.
//!
//! The first column is the key and is never read. Each following column, in
//! order, contributes `"<column>*<integer>,"` when its cell is strictly
//! positive; missing cells count as zero. Tokens are concatenated as-is, so a
//! non-empty result always ends with a comma.

use super::{CellValue, Dataset};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

pub const SIZES_COLUMN: &str = "sizes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedReason {
    NotNumeric,
    NotFinite,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::NotNumeric => write!(f, "not numeric"),
            MalformedReason::NotFinite => write!(f, "not finite"),
        }
    }
}

/// A value cell that could not be compared against zero and produced no token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedCell {
    pub row: usize,
    pub column: String,
    pub reason: MalformedReason,
}

#[derive(Debug, Clone)]
pub struct ReshapeOutcome {
    pub dataset: Dataset,
    pub malformed: Vec<MalformedCell>,
}

enum TokenResult {
    Token(String),
    Skip,
    Malformed(MalformedReason),
}

fn classify(column: &str, cell: &CellValue) -> TokenResult {
    let value = match cell {
        CellValue::Number(n) => n.value(),
        CellValue::Missing => 0.0,
        CellValue::Text(s) if s.trim().is_empty() => 0.0,
        CellValue::Text(_) => return TokenResult::Malformed(MalformedReason::NotNumeric),
    };
    if value.is_nan() || value <= 0.0 {
        return TokenResult::Skip;
    }
    if !value.is_finite() {
        return TokenResult::Malformed(MalformedReason::NotFinite);
    }
    TokenResult::Token(format!("{}*{:.0},", column, value.trunc()))
}

/// Token contributed by one value cell, if any.
pub fn size_token(column: &str, cell: &CellValue) -> Option<String> {
    match classify(column, cell) {
        TokenResult::Token(token) => Some(token),
        TokenResult::Skip | TokenResult::Malformed(_) => None,
    }
}

pub fn reshape(dataset: Dataset) -> Dataset {
    reshape_with_report(dataset).dataset
}

pub fn reshape_with_report(mut dataset: Dataset) -> ReshapeOutcome {
    let value_columns = dataset.columns().get(1..).unwrap_or_default();
    let mut malformed = Vec::new();

    let sizes: Vec<CellValue> = dataset
        .rows()
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let mut acc = String::new();
            for (column, cell) in value_columns.iter().zip(row.iter().skip(1)) {
                match classify(column, cell) {
                    TokenResult::Token(token) => acc.push_str(&token),
                    TokenResult::Skip => {}
                    TokenResult::Malformed(reason) => malformed.push(MalformedCell {
                        row: row_idx,
                        column: column.clone(),
                        reason,
                    }),
                }
            }
            CellValue::Text(acc)
        })
        .collect();

    log_malformed(&malformed);
    debug!(
        rows = dataset.row_count(),
        value_columns = value_columns.len(),
        "Computed sizes column"
    );

    dataset.push_column(SIZES_COLUMN, sizes);
    ReshapeOutcome { dataset, malformed }
}

fn log_malformed(malformed: &[MalformedCell]) {
    let mut per_column: BTreeMap<&str, usize> = BTreeMap::new();
    for cell in malformed {
        *per_column.entry(cell.column.as_str()).or_default() += 1;
    }
    for (column, count) in per_column {
        warn!(
            column,
            cells = count,
            "Value column has cells that cannot be compared to zero; no tokens emitted for them"
        );
    }
}
