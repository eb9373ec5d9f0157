pub mod config;
pub mod errors;

pub use config::{AppConfig, ConfigSource};
pub use errors::{Result, SizesError};

/// Lowercased extension of a file name, without the dot.
pub fn file_extension(name: &str) -> Option<String> {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// File stem of an uploaded name, with any client-side directories removed.
pub fn file_stem(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    std::path::Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file_extension("Report.XLSX").as_deref(), Some("xlsx"));
        assert_eq!(file_extension("noext"), None);
    }

    #[test]
    fn stem_strips_client_paths() {
        assert_eq!(file_stem("C:\\Users\\me\\orders.csv"), "orders");
        assert_eq!(file_stem("../../etc/orders.xlsx"), "orders");
        assert_eq!(file_stem(".csv"), ".csv");
    }
}
