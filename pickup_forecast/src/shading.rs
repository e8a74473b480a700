//! Confidence shading for category-segmented revenue forecasts
//!
//! The lower bound is revenue already contracted (no further pickup); the
//! upper bound assumes every unsold unit in every category sells at its
//! rate ceiling. Inconsistencies between category totals and the
//! metric-level OTB are surfaced, never reconciled silently.

use crate::curves::PickupCurve;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::BTreeMap;

/// Per-category booking position feeding the shading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPosition {
    /// Revenue already on the books for the category
    pub otb_revenue: f64,
    /// Sellable units still unsold (available minus occupied minus
    /// maintenance)
    pub remaining_inventory: u32,
    /// Maximum sellable rate for the category on the date
    pub rate_ceiling: f64,
}

/// Shaded bounds around a point projection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceBounds {
    /// Hard floor: revenue already contracted
    pub lower: f64,
    /// Optimistic ceiling: contracted plus full-rate sellout of remaining
    /// inventory
    pub upper: f64,
    /// False when the inputs disagreed with each other
    pub consistent: bool,
}

/// Bound a revenue projection with per-category inventory and rate ceilings
///
/// `metric_otb` is the metric-level OTB the projection was computed from;
/// when the category totals diverge from it beyond `tolerance_pct` the
/// bounds are flagged inconsistent. An upper bound below the point
/// projection is a data inconsistency: it is logged, flagged, and widened
/// to the point - the point itself is never moved.
pub fn shade(
    point: f64,
    metric_otb: f64,
    positions: &BTreeMap<String, CategoryPosition>,
    tolerance_pct: f64,
) -> ConfidenceBounds {
    let contracted: f64 = positions.values().map(|p| p.otb_revenue).sum();
    let headroom: f64 = positions
        .values()
        .map(|p| p.remaining_inventory as f64 * p.rate_ceiling)
        .sum();

    let mut consistent = true;

    let divergence = (contracted - metric_otb).abs();
    let tolerated = metric_otb.abs() * tolerance_pct / 100.0;
    if divergence > tolerated {
        log::warn!(
            "category OTB total {:.2} diverges from metric-level OTB {:.2} beyond {}%",
            contracted,
            metric_otb,
            tolerance_pct
        );
        consistent = false;
    }

    let lower = contracted;
    let mut upper = contracted + headroom;
    if upper < point {
        log::warn!(
            "upper bound {:.2} fell below point projection {:.2}; widening",
            upper,
            point
        );
        upper = point;
        consistent = false;
    }

    ConfidenceBounds {
        lower,
        upper,
        consistent,
    }
}

/// Indicative interval from the curve spread, for unsegmented forecasts
///
/// Scales the point by the curve's relative spread at the z-score of the
/// requested confidence level. Returns `None` when the curve carries no
/// usable spread or the level is out of range.
pub fn curve_band(point: f64, curve: &PickupCurve, confidence_level: f64) -> Option<(f64, f64)> {
    if confidence_level <= 0.0 || confidence_level >= 1.0 {
        return None;
    }
    if curve.avg_pct_of_final <= 0.0 || curve.std_dev <= 0.0 {
        return None;
    }

    let normal = Normal::new(0.0, 1.0).ok()?;
    let z = normal.inverse_cdf(0.5 + confidence_level / 2.0);
    let relative_spread = curve.std_dev / curve.avg_pct_of_final;
    let margin = z * point.abs() * relative_spread;

    Some(((point - margin).max(0.0), point + margin))
}
