pub mod format;
pub mod reader;
pub mod writer;

pub use format::TableFormat;
pub use reader::{read_csv, read_csv_from, read_table, read_workbook};
pub use writer::{write_csv, write_csv_bytes, CsvTableWriter};
