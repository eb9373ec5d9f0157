use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Spellings read as a missing value in value columns.
const NA_SPELLINGS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A parsed number. Numbers read from text keep the field as written so
/// they are rendered back unchanged; equality looks at the value only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Numeric {
    value: f64,
    literal: Option<String>,
}

impl Numeric {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Number(Numeric),
    Text(String),
    Missing,
}

impl CellValue {
    /// A number with no source text; rendered with [`format_number`].
    pub fn number(value: f64) -> Self {
        CellValue::Number(Numeric {
            value,
            literal: None,
        })
    }

    /// Interpret a raw text field: NA spellings become `Missing`, numeric
    /// literals become `Number`, anything else stays `Text` untouched.
    pub fn from_field(field: &str) -> Self {
        let trimmed = field.trim();
        if NA_SPELLINGS.contains(&trimmed) {
            return CellValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) => CellValue::Number(Numeric {
                value,
                literal: Some(field.to_string()),
            }),
            Err(_) => CellValue::Text(field.to_string()),
        }
    }

    /// Keep a field as text; only the empty string is missing.
    pub fn verbatim(field: &str) -> Self {
        if field.is_empty() {
            CellValue::Missing
        } else {
            CellValue::Text(field.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn render(&self) -> Cow<'_, str> {
        match self {
            CellValue::Number(n) => match n.literal() {
                Some(text) => Cow::Borrowed(text),
                None => Cow::Owned(format_number(n.value)),
            },
            CellValue::Text(s) => Cow::Borrowed(s),
            CellValue::Missing => Cow::Borrowed(""),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// Shortest decimal that parses back to the same value; integral values
/// have no fraction and negative zero prints as `0`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}
