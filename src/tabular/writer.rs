use crate::dataset::{CellValue, Dataset};
use crate::utils::{Result, SizesError};
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub struct CsvTableWriter<W: Write> {
    writer: Writer<W>,
    rows_written: usize,
}

impl CsvTableWriter<File> {
    pub fn create(path: &Path, headers: &[String]) -> Result<Self> {
        let file = File::create(path)?;
        Self::from_writer(file, headers)
    }
}

impl<W: Write> CsvTableWriter<W> {
    pub fn from_writer(inner: W, headers: &[String]) -> Result<Self> {
        let mut writer = Writer::from_writer(inner);
        writer.write_record(headers)?;
        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    pub fn write_row(&mut self, row: &[CellValue]) -> Result<()> {
        self.writer
            .write_record(row.iter().map(|cell| cell.render().into_owned()))?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn write_rows(&mut self, rows: &[Vec<CellValue>]) -> Result<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| SizesError::IoError(e.into_error()))
    }

    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.rows_written)
    }
}

/// Header row plus every row, no index column.
pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<usize> {
    let mut writer = CsvTableWriter::create(path, dataset.columns())?;
    writer.write_rows(dataset.rows())?;
    writer.finish()
}

pub fn write_csv_bytes(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut writer = CsvTableWriter::from_writer(Vec::new(), dataset.columns())?;
    writer.write_rows(dataset.rows())?;
    writer.into_inner()
}
