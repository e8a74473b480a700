//! Engine configuration
//!
//! All tunable thresholds live in one typed object passed to the engine at
//! construction, rather than a free-form key-value settings table. Values
//! can come from `Default`, from code, or from a TOML fragment:
//!
//! ```
//! use pickup_forecast::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(
//!     "min_curve_samples = 8\nconfidence_level = 0.95",
//! ).unwrap();
//! assert_eq!(config.min_curve_samples, 8);
//! assert_eq!(config.comparison_window_years, 2);
//! ```

use crate::error::Result;
use crate::ForecastError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable thresholds for the forecasting engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Minimum samples before a pickup curve is trusted; below this the
    /// lookup relaxes to a coarser key
    pub min_curve_samples: usize,
    /// How many years back the comparison fallback scan may search
    pub comparison_window_years: i32,
    /// Allowed divergence (percent) between category OTB totals and the
    /// metric-level OTB before a forecast is flagged low-confidence
    pub otb_sum_tolerance_pct: f64,
    /// Curves with `avg_pct_of_final` at or below this are unusable for
    /// curve-only projection (division guard)
    pub curve_floor_epsilon: f64,
    /// Confidence level for the indicative curve band on unsegmented
    /// forecasts
    pub confidence_level: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_curve_samples: 5,
            comparison_window_years: 2,
            otb_sum_tolerance_pct: 2.0,
            curve_floor_epsilon: 0.01,
            confidence_level: 0.90,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Check that every threshold is in its sensible range
    pub fn validate(&self) -> Result<()> {
        if self.min_curve_samples == 0 {
            return Err(ForecastError::ConfigError(
                "min_curve_samples must be at least 1".to_string(),
            ));
        }
        if !(1..=10).contains(&self.comparison_window_years) {
            return Err(ForecastError::ConfigError(
                "comparison_window_years must be between 1 and 10".to_string(),
            ));
        }
        if self.otb_sum_tolerance_pct < 0.0 {
            return Err(ForecastError::ConfigError(
                "otb_sum_tolerance_pct must not be negative".to_string(),
            ));
        }
        if self.curve_floor_epsilon <= 0.0 {
            return Err(ForecastError::ConfigError(
                "curve_floor_epsilon must be positive".to_string(),
            ));
        }
        if self.confidence_level <= 0.0 || self.confidence_level >= 1.0 {
            return Err(ForecastError::ConfigError(
                "confidence_level must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}
