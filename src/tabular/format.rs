use crate::utils::{file_extension, Result, SizesError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Csv,
    Xlsx,
    Xls,
}

impl TableFormat {
    /// Pick the format from an uploaded file name's suffix.
    pub fn from_file_name(name: &str) -> Result<Self> {
        match file_extension(name).as_deref() {
            Some("csv") => Ok(TableFormat::Csv),
            Some("xlsx") => Ok(TableFormat::Xlsx),
            Some("xls") => Ok(TableFormat::Xls),
            _ => Err(SizesError::UnsupportedFormat(name.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Xlsx => "xlsx",
            TableFormat::Xls => "xls",
        }
    }
}
