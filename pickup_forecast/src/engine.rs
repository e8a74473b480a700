//! The forecasting engine facade
//!
//! [`ForecastEngine`] wires the snapshot store, the curve store, the
//! comparison selector and the projection engine together behind the three
//! operations the job layer calls: generate a forecast, rebuild curves,
//! run a backtest.

use crate::backtest::{self, BacktestResult};
use crate::comparison::{ComparisonReference, ComparisonSelector};
use crate::config::EngineConfig;
use crate::curves::{CurveBuilder, CurveScope, CurveStore, PickupCurve};
use crate::error::{ForecastError, Result};
use crate::explain::{ConfidenceLevel, ExplanationLog, ForecastExplanation};
use crate::projection::{project, MethodSet, Projection, ProjectionMethod};
use crate::shading::{curve_band, shade, CategoryPosition, ConfidenceBounds};
use crate::store::SnapshotStore;
use chrono::{NaiveDate, Utc};
use otb_data::{calendar, schedule, MetricType, Season};
use pace_math::stats::round_to_decimals;
use std::collections::BTreeMap;

/// Everything one projection run resolved along the way
struct ProjectionParts {
    days_out: u16,
    current_otb: f64,
    comparison: ComparisonReference,
    curve: Option<PickupCurve>,
    scope: Option<CurveScope>,
    projection: Projection,
}

/// The pickup forecasting engine
pub struct ForecastEngine {
    store: SnapshotStore,
    curves: CurveStore,
    config: EngineConfig,
    explanations: ExplanationLog,
    next_run_id: u64,
}

impl ForecastEngine {
    /// Create an engine with an empty snapshot store
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_store(SnapshotStore::new(), config)
    }

    /// Create an engine over an existing snapshot store
    pub fn with_store(store: SnapshotStore, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            curves: CurveStore::new(),
            config,
            explanations: ExplanationLog::new(),
            next_run_id: 0,
        })
    }

    /// The snapshot store
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Mutable access to the snapshot store, for ingestion
    pub fn store_mut(&mut self) -> &mut SnapshotStore {
        &mut self.store
    }

    /// The engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The append-only explanation log
    pub fn explanations(&self) -> &ExplanationLog {
        &self.explanations
    }

    /// Generation of the currently installed curve set
    pub fn curve_generation(&self) -> u64 {
        self.curves.generation()
    }

    /// Rebuild the pickup curves for a metric from completed history
    ///
    /// Builds a complete replacement table off to the side and installs it
    /// atomically; forecasts running concurrently keep the set they started
    /// with. Returns the new curve generation.
    pub fn rebuild_curves(&self, metric: MetricType, today: NaiveDate) -> u64 {
        let view = self.store.as_of(today);
        let rebuilt = CurveBuilder::rebuild(&view, metric);
        let curve_count = rebuilt.len();

        let mut next = (*self.curves.snapshot()).clone();
        next.replace_metric(metric, rebuilt);
        let generation = self.curves.install(next);

        log::info!(
            "Rebuilt {} pickup curves for {} (generation {})",
            curve_count,
            metric,
            generation
        );
        generation
    }

    /// Generate a forecast for a metric and target date
    ///
    /// Combines the visible OTB, the selected comparison and the resolved
    /// curve through the projection chain, and appends the explanation to
    /// the audit log.
    pub fn generate_forecast(
        &mut self,
        metric: MetricType,
        target_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<ForecastExplanation> {
        let parts = self.project_core(metric, target_date, today)?;

        let decimals = metric.decimals();
        let band = parts
            .curve
            .as_ref()
            .and_then(|c| curve_band(parts.projection.value, c, self.config.confidence_level));
        let confidence = ConfidenceLevel::grade(parts.projection.method, parts.scope, true);
        let confidence_note = Self::note_for(&parts, None);

        let explanation = self.finish(
            metric,
            target_date,
            parts,
            band.map(|(l, _)| round_to_decimals(l, decimals)),
            band.map(|(_, u)| round_to_decimals(u, decimals)),
            confidence,
            confidence_note,
        );
        Ok(explanation)
    }

    /// Generate a category-shaded forecast for a segmented revenue metric
    ///
    /// The projection itself is unchanged; the bounds come from per-category
    /// remaining inventory and rate ceilings, and inconsistent inputs
    /// downgrade the confidence grade instead of being reconciled.
    pub fn generate_segmented_forecast(
        &mut self,
        metric: MetricType,
        target_date: NaiveDate,
        today: NaiveDate,
        positions: &BTreeMap<String, CategoryPosition>,
    ) -> Result<ForecastExplanation> {
        if !metric.is_monetary() {
            return Err(ForecastError::ValidationError(format!(
                "Confidence shading applies to revenue metrics, not {}",
                metric
            )));
        }

        let parts = self.project_core(metric, target_date, today)?;

        let decimals = metric.decimals();
        let bounds = shade(
            parts.projection.value,
            parts.current_otb,
            positions,
            self.config.otb_sum_tolerance_pct,
        );
        let confidence =
            ConfidenceLevel::grade(parts.projection.method, parts.scope, bounds.consistent);
        let confidence_note = Self::note_for(&parts, Some(&bounds));

        let explanation = self.finish(
            metric,
            target_date,
            parts,
            Some(round_to_decimals(bounds.lower, decimals)),
            Some(round_to_decimals(bounds.upper, decimals)),
            confidence,
            confidence_note,
        );
        Ok(explanation)
    }

    /// Replay the projection engine over a historical date range
    ///
    /// Read-only: results go to the caller (and optionally a CSV result
    /// store via [`backtest::export_csv`]), never the explanation log.
    pub fn run_backtest(
        &self,
        metric: MetricType,
        start: NaiveDate,
        end: NaiveDate,
        lead_times: &[u16],
    ) -> Result<Vec<BacktestResult>> {
        backtest::backtest_range(&self.store, &self.config, metric, start, end, lead_times)
    }

    /// Resolve inputs and run the projection chain for one forecast
    fn project_core(
        &self,
        metric: MetricType,
        target_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<ProjectionParts> {
        if target_date < today {
            return Err(ForecastError::ValidationError(format!(
                "Target date {} has already passed",
                target_date
            )));
        }
        let lead = target_date.signed_duration_since(today).num_days();
        if lead > schedule::MAX_DAYS_OUT as i64 {
            return Err(ForecastError::MissingData(format!(
                "Target date {} is beyond the {}-day observation horizon",
                target_date,
                schedule::MAX_DAYS_OUT
            )));
        }

        let view = self.store.as_of(today);
        let (days_out, current_otb) = view
            .visible_otb(target_date, metric, lead as u16)
            .ok_or_else(|| {
                ForecastError::MissingData(format!(
                    "No snapshot observed for {} on {} as of {}",
                    metric, target_date, today
                ))
            })?;

        let comparison = ComparisonSelector::select(
            &view,
            metric,
            target_date,
            days_out,
            self.config.comparison_window_years,
        );

        let table = self.curves.snapshot();
        let resolved = table.resolve(
            metric,
            days_out,
            calendar::weekday_number(target_date),
            Season::of(target_date),
            self.config.min_curve_samples,
        );
        let (curve, scope) = match resolved {
            Some((curve, scope)) => (Some(curve.clone()), Some(scope)),
            None => (None, None),
        };

        let projection = project(
            current_otb,
            &comparison,
            curve.as_ref(),
            &MethodSet::for_metric(metric),
            self.config.curve_floor_epsilon,
        )?;

        Ok(ProjectionParts {
            days_out,
            current_otb,
            comparison,
            curve,
            scope,
            projection,
        })
    }

    /// Assemble the explanation, append it to the log and return it
    #[allow(clippy::too_many_arguments)]
    fn finish(
        &mut self,
        metric: MetricType,
        target_date: NaiveDate,
        parts: ProjectionParts,
        lower_bound: Option<f64>,
        upper_bound: Option<f64>,
        confidence: ConfidenceLevel,
        confidence_note: String,
    ) -> ForecastExplanation {
        self.next_run_id += 1;
        let projected_value = round_to_decimals(parts.projection.value, metric.decimals());

        log::info!(
            "run {}: {} {} -> {} via {} ({})",
            self.next_run_id,
            metric,
            target_date,
            projected_value,
            parts.projection.method,
            confidence
        );

        let explanation = ForecastExplanation {
            run_id: self.next_run_id,
            forecast_date: target_date,
            metric,
            generated_at: Utc::now(),
            current_otb: parts.current_otb,
            days_out: parts.days_out,
            comparison_date: parts.comparison.comparison_date,
            comparison_otb: parts.comparison.comparison_otb,
            comparison_final: parts.comparison.comparison_final,
            pickup_curve_pct: parts.curve.as_ref().map(|c| c.avg_pct_of_final),
            pickup_curve_std_dev: parts.curve.as_ref().map(|c| c.std_dev),
            curve_scope: parts.scope,
            pace_vs_prior_pct: parts.projection.pace_vs_prior_pct,
            projection_method: parts.projection.method,
            projected_value,
            lower_bound,
            upper_bound,
            confidence,
            confidence_note,
        };
        self.explanations.push(explanation.clone());
        explanation
    }

    /// Build the human-readable note for an explanation
    fn note_for(parts: &ProjectionParts, bounds: Option<&ConfidenceBounds>) -> String {
        let mut note = match parts.projection.method {
            ProjectionMethod::Additive => match parts.comparison.comparison_date {
                Some(date) => format!("Additive pickup from comparison {}", date),
                None => "Additive pickup from comparison".to_string(),
            },
            ProjectionMethod::AdditiveFloor => {
                "Comparison implied negative pickup; holding at current on-the-books".to_string()
            }
            ProjectionMethod::ImpliedAdditive => match parts.scope {
                Some(scope) => format!(
                    "Comparison final scaled by unbooked share of the {} curve",
                    scope
                ),
                None => "Comparison final scaled by unbooked curve share".to_string(),
            },
            ProjectionMethod::CurveOnly => match parts.scope {
                Some(scope) => format!(
                    "No usable comparison; current on-the-books divided by the {} curve fraction",
                    scope
                ),
                None => "No usable comparison; projected from curve only".to_string(),
            },
            ProjectionMethod::OtbPassthrough => {
                "No comparison or curve available; reporting current on-the-books only"
                    .to_string()
            }
        };

        if let Some(pace) = parts.projection.pace_vs_prior_pct {
            note.push_str(&format!("; pace {:.1}% of prior", pace));
        }
        if let Some(bounds) = bounds {
            if !bounds.consistent {
                note.push_str("; category totals disagree with metric-level on-the-books");
            }
        }
        note
    }
}
