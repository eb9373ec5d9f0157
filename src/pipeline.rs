use crate::dataset::{reshape_with_report, Dataset, MalformedCell};
use crate::tabular::{read_table, write_csv, TableFormat};
use crate::utils::Result;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct ReshapeSummary {
    pub rows: usize,
    pub columns: Vec<String>,
    pub malformed: Vec<MalformedCell>,
}

/// Parse an uploaded table from disk.
pub fn load_table(path: &Path, format: TableFormat) -> Result<Dataset> {
    let dataset = read_table(path, format)?;
    info!(
        ?format,
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "File read"
    );
    debug!("Data preview:\n{}", dataset.preview(PREVIEW_ROWS));
    Ok(dataset)
}

/// Append the `sizes` column and write the result as CSV to `output`.
/// A partially written output is removed on failure.
pub fn reshape_to_csv(dataset: Dataset, output: &Path) -> Result<ReshapeSummary> {
    let outcome = reshape_with_report(dataset);

    if let Err(e) = write_csv(&outcome.dataset, output) {
        if let Err(rm) = std::fs::remove_file(output) {
            if rm.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %output.display(), error = %rm, "Failed to remove partial output");
            }
        }
        return Err(e);
    }

    info!(
        path = %output.display(),
        rows = outcome.dataset.row_count(),
        malformed_cells = outcome.malformed.len(),
        "Wrote reshaped file"
    );

    Ok(ReshapeSummary {
        rows: outcome.dataset.row_count(),
        columns: outcome.dataset.columns().to_vec(),
        malformed: outcome.malformed,
    })
}

pub fn reshape_file(input: &Path, format: TableFormat, output: &Path) -> Result<ReshapeSummary> {
    let dataset = load_table(input, format)?;
    reshape_to_csv(dataset, output)
}
