use crate::dataset::{CellValue, Dataset};
use crate::tabular::TableFormat;
use crate::utils::{Result, SizesError};
use calamine::{open_workbook_auto, Data, Reader};
use std::io::Read;
use std::path::Path;

pub fn read_table(path: &Path, format: TableFormat) -> Result<Dataset> {
    match format {
        TableFormat::Csv => read_csv(path),
        TableFormat::Xlsx | TableFormat::Xls => read_workbook(path),
    }
}

pub fn read_csv(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)?;
    read_csv_from(file)
}

/// Parse CSV with a header row. The key column is kept as text, other
/// columns are interpreted per cell.
pub fn read_csv_from<R: Read>(source: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(SizesError::EmptyTable);
    }
    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| column_name(idx, name))
        .collect();
    let width = columns.len();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() > width {
            return Err(SizesError::MalformedRow {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                expected: width,
                found: record.len(),
            });
        }
        let row = record
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                if idx == 0 {
                    CellValue::verbatim(field)
                } else {
                    CellValue::from_field(field)
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(Dataset::new(columns, rows))
}

/// First worksheet, first row as header.
pub fn read_workbook(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SizesError::EmptyTable)??;

    let mut rows = range.rows();
    let header = rows.next().ok_or(SizesError::EmptyTable)?;
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let name = match cell {
                Data::String(s) => s.clone(),
                Data::Empty => String::new(),
                other => other.to_string(),
            };
            column_name(idx, &name)
        })
        .collect();

    let rows = rows
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(idx, cell)| workbook_cell(idx == 0, cell))
                .collect()
        })
        .collect();

    Ok(Dataset::new(columns, rows))
}

fn workbook_cell(is_key: bool, cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::number(*i as f64),
        Data::Float(f) => CellValue::number(*f),
        Data::String(s) if is_key => CellValue::verbatim(s),
        Data::String(s) => CellValue::from_field(s),
        Data::Empty | Data::Error(_) => CellValue::Missing,
        other => CellValue::Text(other.to_string()),
    }
}

fn column_name(idx: usize, raw: &str) -> String {
    let name = if idx == 0 {
        raw.trim_start_matches('\u{feff}')
    } else {
        raw
    };
    if name.trim().is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        name.to_string()
    }
}
