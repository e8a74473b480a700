//! # Pickup Forecast
//!
//! A Rust library for hotel and restaurant demand forecasting from
//! on-the-books booking pace.
//!
//! ## Features
//!
//! - Snapshot store for OTB observations over a 58-bucket lead-time grid
//! - Pickup curves (fraction booked by day-of-week, season and lead time)
//!   with sparse-sample fallback and atomic rebuild
//! - Weekday-aligned prior-year comparison selection with bounded fallback
//! - Five projection methods with a deterministic tie-break chain, each
//!   forecast labelled with the method that produced it
//! - Category-level, inventory-bounded confidence shading for revenue
//! - A leak-free backtest harness scoring methods by lead-time bucket
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use otb_data::{utils::generate_booking_history, MetricType};
//! use pickup_forecast::{EngineConfig, ForecastEngine};
//!
//! fn main() -> Result<(), pickup_forecast::ForecastError> {
//!     // Ingest a year and a half of booking history
//!     let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//!     let history = generate_booking_history(MetricType::RoomNights, start, 500, 40.0, 7);
//!     let mut engine = ForecastEngine::new(EngineConfig::default())?;
//!     engine.store_mut().ingest_rows(history.rows);
//!     engine.store_mut().ingest_finals(history.finals);
//!
//!     // Rebuild curves, then forecast a date a month out
//!     let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
//!     engine.rebuild_curves(MetricType::RoomNights, today);
//!     let target = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
//!     let explanation = engine.generate_forecast(MetricType::RoomNights, target, today)?;
//!
//!     println!(
//!         "{} projected {} via {}",
//!         target, explanation.projected_value, explanation.projection_method
//!     );
//!     Ok(())
//! }
//! ```

pub mod backtest;
pub mod comparison;
pub mod config;
pub mod curves;
pub mod engine;
pub mod error;
pub mod explain;
pub mod projection;
pub mod shading;
pub mod store;

// Re-export commonly used types
pub use crate::backtest::{BacktestResult, LeadTimeSummary};
pub use crate::comparison::{ComparisonReference, ComparisonSelector};
pub use crate::config::EngineConfig;
pub use crate::curves::{CurveBuilder, CurveScope, CurveStore, CurveTable, PickupCurve};
pub use crate::engine::ForecastEngine;
pub use crate::error::{ForecastError, Result};
pub use crate::explain::{ConfidenceLevel, ExplanationLog, ForecastExplanation};
pub use crate::projection::{project, MethodSet, Projection, ProjectionMethod};
pub use crate::shading::{curve_band, shade, CategoryPosition, ConfidenceBounds};
pub use crate::store::{HistoryLoader, SnapshotStore, SnapshotView};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
