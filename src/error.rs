use arrow_schema::ArrowError;

#[derive(Debug, thiserror::Error)]
pub enum CropcastError {
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet Error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow Error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("No data found for district: {0}")]
    NoDistrictData(String),
    #[error("Exogenous variable mismatch! Model expects: {expected:?}, got: {provided:?}")]
    ExogMismatch {
        expected: Vec<String>,
        provided: Vec<String>,
    },
    #[error("Invalid model artifact: {0}")]
    InvalidModel(String),
    #[error("Data Error: {0}")]
    Data(String),
}

pub type Result<T> = std::result::Result<T, CropcastError>;
