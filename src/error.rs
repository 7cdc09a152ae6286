//! Error types for the placement predictor

use thiserror::Error;

/// Result type alias for placement operations
pub type Result<T> = std::result::Result<T, PlacementError>;

/// Main error type for training, persistence and inference
#[derive(Error, Debug)]
pub enum PlacementError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Insufficient label classes: {0}")]
    InsufficientClasses(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Corrupt model artifact: {0}")]
    CorruptArtifact(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
}

impl PlacementError {
    /// Whether the error was caused by the caller's input rather than the model or host
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PlacementError::SchemaMismatch(_)
                | PlacementError::MissingColumn(_)
                | PlacementError::InferenceError(_)
        )
    }
}

impl From<polars::error::PolarsError> for PlacementError {
    fn from(err: polars::error::PolarsError) -> Self {
        PlacementError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PlacementError {
    fn from(err: serde_json::Error) -> Self {
        PlacementError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for PlacementError {
    fn from(err: bincode::Error) -> Self {
        PlacementError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PlacementError {
    fn from(err: ndarray::ShapeError) -> Self {
        PlacementError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
