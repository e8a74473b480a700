//! # Pace Math
//!
//! Mathematical calculations for booking-pace analysis and forecast
//! evaluation. This crate provides the statistics behind pickup curves
//! (means, sample spreads, guarded ratios) and the accuracy metrics used
//! by the backtest harness.

use thiserror::Error;

// Calculation modules
pub mod accuracy;
pub mod stats;

/// Errors that can occur in pace-related calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for pace math operations
pub type Result<T> = std::result::Result<T, MathError>;
