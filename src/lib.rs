pub mod adjust;
pub mod aggregate;
pub mod error;
pub mod ingest;
pub mod load;
pub mod model;
pub mod structs;

// Re-export public API
pub use adjust::apply_adjustments;
pub use aggregate::{
    SEASONS, Season, SeasonalAverageTable, SeasonalRow, ValueRange, seasonal_average,
};
pub use error::{CropcastError, Result};
pub use ingest::{load_csv, read_dataset};
pub use load::{write_csv, write_json, write_parquet};
pub use model::{ExogTable, FORECAST_STEPS, ModelLookup, SarimaxModel, lookup_model, model_path};
pub use structs::{AdjustConfig, Cell, ClimateRecord, Dataset, SimpleLogger};
