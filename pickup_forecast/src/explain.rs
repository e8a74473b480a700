//! Forecast explanations: the engine's auditable output records
//!
//! Every run produces a new explanation carrying the inputs, the chosen
//! method, and a confidence note, so a degraded forecast is always
//! distinguishable from a high-confidence one. The log is append-only;
//! records are never mutated after creation.

use crate::curves::CurveScope;
use crate::error::Result;
use crate::projection::ProjectionMethod;
use chrono::{DateTime, NaiveDate, Utc};
use otb_data::MetricType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Forecast confidence grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Comparison-anchored projection with consistent inputs
    High,
    /// Partially-anchored projection (implied pickup)
    Medium,
    /// Curve-only projection, or inconsistent shading inputs
    Low,
    /// Current OTB passthrough - no pacing information at all
    Lowest,
}

impl ConfidenceLevel {
    /// Grade a projection from its method, curve scope and input
    /// consistency
    pub fn grade(method: ProjectionMethod, scope: Option<CurveScope>, consistent: bool) -> Self {
        if !consistent {
            return ConfidenceLevel::Low;
        }
        match method {
            ProjectionMethod::Additive | ProjectionMethod::AdditiveFloor => ConfidenceLevel::High,
            ProjectionMethod::ImpliedAdditive => ConfidenceLevel::Medium,
            ProjectionMethod::CurveOnly => match scope {
                Some(CurveScope::DayAndSeason) => ConfidenceLevel::Medium,
                _ => ConfidenceLevel::Low,
            },
            ProjectionMethod::OtbPassthrough => ConfidenceLevel::Lowest,
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "high"),
            ConfidenceLevel::Medium => write!(f, "medium"),
            ConfidenceLevel::Low => write!(f, "low"),
            ConfidenceLevel::Lowest => write!(f, "lowest"),
        }
    }
}

/// One forecast output record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastExplanation {
    /// Sequence number of the run that produced this record
    pub run_id: u64,
    /// The date being forecast
    pub forecast_date: NaiveDate,
    /// Metric being forecast
    pub metric: MetricType,
    /// When the record was generated
    pub generated_at: DateTime<Utc>,
    /// OTB value the projection started from
    pub current_otb: f64,
    /// Lead time of the observation the projection used
    pub days_out: u16,
    /// Comparison analog date, when one was found
    pub comparison_date: Option<NaiveDate>,
    /// Comparison OTB at the aligned lead time
    pub comparison_otb: Option<f64>,
    /// Comparison realized final
    pub comparison_final: Option<f64>,
    /// Curve fraction booked at this lead time, when a curve was used
    pub pickup_curve_pct: Option<f64>,
    /// Spread of the curve fraction
    pub pickup_curve_std_dev: Option<f64>,
    /// Specificity of the resolved curve key
    pub curve_scope: Option<CurveScope>,
    /// Current OTB as a percentage of the comparison's
    pub pace_vs_prior_pct: Option<f64>,
    /// Method that produced the projection
    pub projection_method: ProjectionMethod,
    /// Projected final value, rounded to the metric's precision
    pub projected_value: f64,
    /// Shaded or indicative lower bound
    pub lower_bound: Option<f64>,
    /// Shaded or indicative upper bound
    pub upper_bound: Option<f64>,
    /// Confidence grade
    pub confidence: ConfidenceLevel,
    /// Human-readable summary of how the forecast was produced
    pub confidence_note: String,
}

impl ForecastExplanation {
    /// Serialize the explanation to JSON for the API layer
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            crate::ForecastError::DataError(format!("Failed to serialize explanation: {}", e))
        })
    }
}

/// Append-only audit trail of forecast explanations
#[derive(Debug, Clone, Default)]
pub struct ExplanationLog {
    entries: Vec<ForecastExplanation>,
}

impl ExplanationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record; existing records are never touched
    pub fn push(&mut self, explanation: ForecastExplanation) {
        self.entries.push(explanation);
    }

    /// Iterate the records in append order
    pub fn iter(&self) -> impl Iterator<Item = &ForecastExplanation> {
        self.entries.iter()
    }

    /// The most recent record
    pub fn latest(&self) -> Option<&ForecastExplanation> {
        self.entries.last()
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
