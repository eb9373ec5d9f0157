pub mod dataset;
pub mod pipeline;
pub mod server;
pub mod state;
pub mod tabular;
pub mod utils;

pub use dataset::{reshape, reshape_with_report, CellValue, Dataset, MalformedCell, SIZES_COLUMN};
pub use pipeline::{reshape_file, ReshapeSummary};
pub use server::build_router;
pub use state::{AppState, CleanupManager, OutputRegistry};
pub use tabular::TableFormat;
pub use utils::{AppConfig, ConfigSource, Result, SizesError};
