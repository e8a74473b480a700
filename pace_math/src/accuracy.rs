//! Forecast accuracy metrics
//!
//! Error measures comparing projected values against realized actuals,
//! used by the backtest harness to score projection methods per lead-time
//! bucket.

use crate::{MathError, Result};

/// Calculate accuracy metrics for a forecast vs actual values
///
/// Errors are `forecast - actual`, so a positive bias means the method
/// over-forecasts. MAPE is averaged over the actuals that are non-zero;
/// if every actual is zero it is reported as 0.
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(MathError::InvalidInput(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;

    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| f - a)
        .collect();

    // Mean Absolute Error
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

    // Root Mean Squared Error
    let rmse = (errors.iter().map(|e| e.powi(2)).sum::<f64>() / n).sqrt();

    // Mean signed error
    let bias = errors.iter().sum::<f64>() / n;

    // Mean Absolute Percentage Error over non-zero actuals
    let nonzero = actual.iter().filter(|&&a| a != 0.0).count();
    let mape = if nonzero == 0 {
        0.0
    } else {
        actual
            .iter()
            .zip(errors.iter())
            .filter(|(&a, _)| a != 0.0)
            .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
            .sum::<f64>()
            / nonzero as f64
    };

    Ok(ForecastAccuracy {
        mae,
        rmse,
        mape,
        bias,
    })
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Mean signed error (positive = over-forecast)
    pub bias: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  Bias:  {:+.4}", self.bias)?;
        Ok(())
    }
}
