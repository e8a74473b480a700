//! Error types for the pickup_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the pickup_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// No snapshot, comparison or curve exists at the needed key
    #[error("Missing data: {0}")]
    MissingData(String),

    /// A curve had too few samples to be trusted
    #[error("Insufficient samples: {0}")]
    InsufficientSamples(String),

    /// Inputs disagree with each other (for example category totals vs the
    /// metric-level on-the-books value)
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error related to data shape or content
    #[error("Data error: {0}")]
    DataError(String),

    /// Error in engine configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV operations
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<otb_data::DataError> for ForecastError {
    fn from(err: otb_data::DataError) -> Self {
        ForecastError::DataError(err.to_string())
    }
}

impl From<pace_math::MathError> for ForecastError {
    fn from(err: pace_math::MathError) -> Self {
        ForecastError::ValidationError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}
