//! Comparison selection: finding the historical analog a forecast paces
//! against
//!
//! The primary analog is the weekday-aligned prior-year date (364 days
//! back), so seasonal and weekday effects both line up and the same
//! days-out snapshot describes the same moment in the booking window. When
//! that date is unusable the selector degrades to the most recent completed
//! date on the same weekday within a bounded window, and finally to an
//! empty reference that forces curve-only projection.

use crate::store::SnapshotView;
use chrono::{Duration, NaiveDate};
use otb_data::{calendar, MetricType};
use serde::{Deserialize, Serialize};

/// A pacing anchor: a historical date with its OTB/final pair
///
/// Transient - built per forecast run, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReference {
    /// The historical analog date, when one was found
    pub comparison_date: Option<NaiveDate>,
    /// OTB of the analog at the aligned lead time
    pub comparison_otb: Option<f64>,
    /// Realized final value of the analog
    pub comparison_final: Option<f64>,
}

impl ComparisonReference {
    /// A reference carrying no comparison data (curve-only mode)
    pub fn empty() -> Self {
        Self {
            comparison_date: None,
            comparison_otb: None,
            comparison_final: None,
        }
    }

    /// Whether the reference can anchor any comparison-based method
    pub fn is_usable(&self) -> bool {
        self.comparison_final.is_some()
    }
}

/// Selects comparison references from snapshot history
#[derive(Debug)]
pub struct ComparisonSelector;

impl ComparisonSelector {
    /// Select the best analog for a target date at a lead time
    ///
    /// Strategy, in order:
    /// 1. the 364-day prior-year date, when both its snapshot at `days_out`
    ///    and its final value are known;
    /// 2. the most recent completed same-weekday date with both available,
    ///    scanning back `window_years`;
    /// 3. the prior-year date with only its final known (comparison OTB
    ///    missing - the implied-additive case);
    /// 4. an empty reference.
    pub fn select(
        view: &SnapshotView<'_>,
        metric: MetricType,
        target_date: NaiveDate,
        days_out: u16,
        window_years: i32,
    ) -> ComparisonReference {
        let primary = calendar::prior_year_same_weekday(target_date);
        let primary_otb = view.otb_at(primary, metric, days_out);
        let primary_final = view.final_value(primary, metric);

        if let (Some(otb), Some(final_value)) = (primary_otb, primary_final) {
            return ComparisonReference {
                comparison_date: Some(primary),
                comparison_otb: Some(otb),
                comparison_final: Some(final_value),
            };
        }

        if let Some(reference) =
            Self::scan_same_weekday(view, metric, target_date, days_out, window_years)
        {
            return reference;
        }

        if let Some(final_value) = primary_final {
            return ComparisonReference {
                comparison_date: Some(primary),
                comparison_otb: None,
                comparison_final: Some(final_value),
            };
        }

        ComparisonReference::empty()
    }

    /// Most recent completed same-weekday date with both OTB and final
    fn scan_same_weekday(
        view: &SnapshotView<'_>,
        metric: MetricType,
        target_date: NaiveDate,
        days_out: u16,
        window_years: i32,
    ) -> Option<ComparisonReference> {
        // Latest same-weekday date that has already completed
        let mut candidate = view.today() - Duration::days(1);
        while !calendar::same_weekday(candidate, target_date) {
            candidate -= Duration::days(1);
        }

        let window_start = target_date - Duration::days(366 * window_years as i64);
        while candidate >= window_start {
            let otb = view.otb_at(candidate, metric, days_out);
            let final_value = view.final_value(candidate, metric);
            if let (Some(otb), Some(final_value)) = (otb, final_value) {
                return Some(ComparisonReference {
                    comparison_date: Some(candidate),
                    comparison_otb: Some(otb),
                    comparison_final: Some(final_value),
                });
            }
            candidate -= Duration::days(7);
        }
        None
    }
}
