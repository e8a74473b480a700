//! # InnPace
//!
//! `innpace_workspace` is the umbrella crate for the InnPace demand
//! forecasting project. It re-exports the member crates:
//!
//! - [`otb_data`] - booking snapshot data types, the lead-time bucket
//!   schedule, season/weekday calendar helpers, and CSV loading
//! - [`pace_math`] - statistics and forecast accuracy calculations
//! - [`pickup_forecast`] - the pickup forecasting engine: snapshot store,
//!   pickup curves, comparison selection, projection, confidence shading,
//!   and the backtest harness
//!
//! ## Example
//!
//! ```
//! use innpace_workspace::pickup_forecast::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.min_curve_samples, 5);
//! ```

pub use otb_data;
pub use pace_math;
pub use pickup_forecast;

#[cfg(test)]
mod tests {
    #[test]
    fn member_crates_are_reachable() {
        let config = pickup_forecast::EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(otb_data::schedule::snapshot_buckets().len(), 58);
    }
}
