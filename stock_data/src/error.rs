//! Error types for the stock_data crate

use thiserror::Error;

/// Custom error types for dataset ingestion and validation
#[derive(Debug, Error)]
pub enum DataError {
    /// Required logical columns could not be matched against the CSV header
    #[error("missing required columns: {missing:?}")]
    MissingColumns {
        missing: Vec<String>,
        required: Vec<String>,
        available: Vec<String>,
    },

    /// A date cell could not be parsed with any supported format
    #[error("could not parse date value '{value}'")]
    InvalidDate { value: String },

    /// Too few valid rows survived cleaning
    #[error("insufficient data: only {found} valid rows (minimum {required})")]
    InsufficientRows { found: usize, required: usize },

    /// The uploaded file contained no data rows
    #[error("uploaded file contains no data rows")]
    EmptyFile,

    /// Error from CSV decoding
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, DataError>;

impl DataError {
    /// Actionable hint surfaced alongside the error message in API responses.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            DataError::MissingColumns { required, .. } => Some(format!(
                "Ensure the CSV has columns: {}",
                required.join(", ")
            )),
            DataError::InvalidDate { .. } => Some(
                "Ensure the date column uses a supported format such as YYYY-MM-DD or MM/DD/YYYY"
                    .to_string(),
            ),
            DataError::InsufficientRows { required, .. } => Some(format!(
                "Upload a file with at least {} rows of valid data",
                required
            )),
            DataError::EmptyFile | DataError::Csv(_) => {
                Some("Ensure the file is a readable CSV with a header row".to_string())
            }
            DataError::Io(_) => None,
        }
    }
}
