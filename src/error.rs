//! Error types for the qpcr-abund library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum AbundError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid read count '{value}' at row {row}, column {col}")]
    InvalidCount {
        value: String,
        row: usize,
        col: usize,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Time point mismatch: {0}")]
    TimePointMismatch(String),

    #[error("Degenerate time point '{time}': zero total reads")]
    DegenerateTimePoint { time: String },

    #[error("Proportions at time point '{time}' sum to {sum}, expected 1")]
    ProportionSum { time: String, sum: f64 },

    #[error("Feature '{feature}' is constant across time, cannot standardize")]
    ConstantFeature { feature: String },

    #[error("No data for mouse '{0}'")]
    MissingMouse(String),

    #[error("mouse '{id}': {source}")]
    Mouse {
        id: String,
        #[source]
        source: Box<AbundError>,
    },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AbundError {
    /// Attach a mouse id to an error from that mouse's computation.
    pub fn for_mouse(self, id: &str) -> Self {
        AbundError::Mouse {
            id: id.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, AbundError>;
