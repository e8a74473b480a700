//! Projection: turning current OTB plus a pacing anchor into a forecast
//!
//! Candidate methods are tried in a fixed priority order and the first one
//! whose precondition holds wins - a deterministic tie-break, never a
//! silent blend. The chosen method name is always recorded; it is the
//! primary explainability contract of the whole engine.

use crate::comparison::ComparisonReference;
use crate::curves::PickupCurve;
use crate::error::{ForecastError, Result};
use otb_data::MetricType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Projection method labels, in tie-break priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMethod {
    /// Comparison OTB and final both known: add the comparison's pickup
    Additive,
    /// Additive result would imply negative pickup: hold at current OTB
    AdditiveFloor,
    /// Comparison final known but its OTB missing: scale the final by the
    /// curve's unbooked share
    ImpliedAdditive,
    /// No usable comparison: divide current OTB by the curve fraction
    CurveOnly,
    /// Nothing else usable: current OTB as-is, lowest confidence
    OtbPassthrough,
}

impl ProjectionMethod {
    /// All methods, in tie-break priority order
    pub const ALL: [ProjectionMethod; 5] = [
        ProjectionMethod::Additive,
        ProjectionMethod::AdditiveFloor,
        ProjectionMethod::ImpliedAdditive,
        ProjectionMethod::CurveOnly,
        ProjectionMethod::OtbPassthrough,
    ];

    /// Stable identifier used in explanations and exports
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionMethod::Additive => "additive",
            ProjectionMethod::AdditiveFloor => "additive_floor",
            ProjectionMethod::ImpliedAdditive => "implied_additive",
            ProjectionMethod::CurveOnly => "curve_only",
            ProjectionMethod::OtbPassthrough => "otb_passthrough",
        }
    }

    fn index(&self) -> usize {
        match self {
            ProjectionMethod::Additive => 0,
            ProjectionMethod::AdditiveFloor => 1,
            ProjectionMethod::ImpliedAdditive => 2,
            ProjectionMethod::CurveOnly => 3,
            ProjectionMethod::OtbPassthrough => 4,
        }
    }
}

impl fmt::Display for ProjectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The set of projection methods a metric admits
///
/// Each metric declares its capability set instead of carrying a flat
/// boolean per model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSet {
    allowed: [bool; 5],
}

impl MethodSet {
    /// A set allowing every method
    pub fn all() -> Self {
        Self { allowed: [true; 5] }
    }

    /// A set allowing no method
    pub fn none() -> Self {
        Self {
            allowed: [false; 5],
        }
    }

    /// Add a method to the set
    pub fn with(mut self, method: ProjectionMethod) -> Self {
        self.allowed[method.index()] = true;
        self
    }

    /// Remove a method from the set
    pub fn without(mut self, method: ProjectionMethod) -> Self {
        self.allowed[method.index()] = false;
        self
    }

    /// Whether the set admits a method
    pub fn allows(&self, method: ProjectionMethod) -> bool {
        self.allowed[method.index()]
    }

    /// The capability set a metric declares
    ///
    /// Occupancy is already a ratio, so dividing it by a curve fraction
    /// compounds two ratios and is excluded; everything else admits the
    /// full chain.
    pub fn for_metric(metric: MetricType) -> Self {
        match metric {
            MetricType::Occupancy => Self::all().without(ProjectionMethod::CurveOnly),
            _ => Self::all(),
        }
    }
}

/// A projection: the point value, the method that produced it, and pace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    /// Projected final value, unrounded
    pub value: f64,
    /// Method that produced the value
    pub method: ProjectionMethod,
    /// Current OTB as a percentage of the comparison's OTB, when defined
    pub pace_vs_prior_pct: Option<f64>,
}

/// Project the final value from current OTB - a pure function
///
/// Identical inputs always select the same method and produce the same
/// value. Division guards route to the next method in the chain instead of
/// erroring: a comparison OTB of zero yields no pace figure, and a curve
/// fraction at or below `curve_floor_epsilon` makes curve-only unavailable.
pub fn project(
    current_otb: f64,
    comparison: &ComparisonReference,
    curve: Option<&PickupCurve>,
    methods: &MethodSet,
    curve_floor_epsilon: f64,
) -> Result<Projection> {
    let pace_vs_prior_pct = comparison.comparison_otb.and_then(|otb| {
        if otb > 0.0 {
            Some(current_otb / otb * 100.0)
        } else {
            None
        }
    });

    if methods.allows(ProjectionMethod::Additive) {
        if let (Some(comp_otb), Some(comp_final)) =
            (comparison.comparison_otb, comparison.comparison_final)
        {
            let additive = current_otb + (comp_final - comp_otb);
            if additive < current_otb && methods.allows(ProjectionMethod::AdditiveFloor) {
                // Never project below what is already on the books
                return Ok(Projection {
                    value: current_otb.max(additive),
                    method: ProjectionMethod::AdditiveFloor,
                    pace_vs_prior_pct,
                });
            }
            return Ok(Projection {
                value: additive,
                method: ProjectionMethod::Additive,
                pace_vs_prior_pct,
            });
        }
    }

    if methods.allows(ProjectionMethod::ImpliedAdditive) && comparison.comparison_otb.is_none() {
        if let (Some(comp_final), Some(curve)) = (comparison.comparison_final, curve) {
            let value = current_otb + comp_final * (1.0 - curve.avg_pct_of_final);
            return Ok(Projection {
                value,
                method: ProjectionMethod::ImpliedAdditive,
                pace_vs_prior_pct,
            });
        }
    }

    if methods.allows(ProjectionMethod::CurveOnly) {
        if let Some(curve) = curve {
            if curve.avg_pct_of_final > curve_floor_epsilon {
                return Ok(Projection {
                    value: current_otb / curve.avg_pct_of_final,
                    method: ProjectionMethod::CurveOnly,
                    pace_vs_prior_pct,
                });
            }
        }
    }

    if methods.allows(ProjectionMethod::OtbPassthrough) {
        return Ok(Projection {
            value: current_otb,
            method: ProjectionMethod::OtbPassthrough,
            pace_vs_prior_pct,
        });
    }

    Err(ForecastError::ValidationError(
        "No projection method available in the metric's capability set".to_string(),
    ))
}
