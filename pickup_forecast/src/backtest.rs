//! Backtest harness: replaying the projection engine against history
//!
//! For a simulated "today" the harness reconstructs exactly the OTB that
//! was visible at that moment - never a booking recorded after it - runs
//! the same projection logic production uses, and scores the result against
//! the known actual. Curves and comparisons are resolved from the leak-free
//! view only, rebuilt per simulated today.

use crate::comparison::ComparisonSelector;
use crate::config::EngineConfig;
use crate::curves::CurveBuilder;
use crate::error::{ForecastError, Result};
use crate::projection::{project, MethodSet, ProjectionMethod};
use crate::store::SnapshotStore;
use chrono::{Duration, NaiveDate};
use otb_data::{calendar, MetricType, Season};
use pace_math::accuracy::{forecast_accuracy, ForecastAccuracy};
use pace_math::stats::round_to_decimals;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Outcome of one simulated forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub metric: MetricType,
    pub target_date: NaiveDate,
    pub lead_time: u16,
    pub simulated_today: NaiveDate,
    /// OTB visible at the simulated today
    pub simulated_otb: f64,
    pub projected_value: f64,
    pub actual_value: f64,
    pub method: ProjectionMethod,
    /// Signed error (projected minus actual)
    pub error: f64,
    /// Absolute percentage error, `None` when the actual was zero
    pub abs_pct_error: Option<f64>,
}

/// Accuracy aggregated over one lead-time bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadTimeSummary {
    pub lead_time: u16,
    pub sample_count: usize,
    pub accuracy: ForecastAccuracy,
}

impl fmt::Display for LeadTimeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>3} days out: MAE {:.2}, MAPE {:.1}%, bias {:+.2} (n={})",
            self.lead_time,
            self.accuracy.mae,
            self.accuracy.mape,
            self.accuracy.bias,
            self.sample_count
        )
    }
}

/// Replay one (target date, lead time) pair against history
///
/// Fails with `MissingData` when the target has no realized final or no
/// snapshot was visible at the simulated today.
pub fn backtest_one(
    store: &SnapshotStore,
    config: &EngineConfig,
    metric: MetricType,
    target_date: NaiveDate,
    lead_time: u16,
) -> Result<BacktestResult> {
    let actual_value = store.final_value(target_date, metric).ok_or_else(|| {
        ForecastError::MissingData(format!(
            "No realized final for {} on {}",
            metric, target_date
        ))
    })?;

    let simulated_today = target_date - Duration::days(lead_time as i64);
    let view = store.as_of(simulated_today);
    let (observed_bucket, simulated_otb) =
        view.visible_otb(target_date, metric, lead_time).ok_or_else(|| {
            ForecastError::MissingData(format!(
                "No snapshot visible for {} on {} as of {}",
                metric, target_date, simulated_today
            ))
        })?;

    // Everything downstream sees only the leak-free view
    let table = CurveBuilder::rebuild(&view, metric);
    let resolved = table.resolve(
        metric,
        observed_bucket,
        calendar::weekday_number(target_date),
        Season::of(target_date),
        config.min_curve_samples,
    );
    let comparison = ComparisonSelector::select(
        &view,
        metric,
        target_date,
        observed_bucket,
        config.comparison_window_years,
    );

    let projection = project(
        simulated_otb,
        &comparison,
        resolved.map(|(curve, _)| curve),
        &MethodSet::for_metric(metric),
        config.curve_floor_epsilon,
    )?;

    let projected_value = round_to_decimals(projection.value, metric.decimals());
    let error = projected_value - actual_value;
    let abs_pct_error = if actual_value != 0.0 {
        Some(error.abs() / actual_value.abs() * 100.0)
    } else {
        None
    };

    Ok(BacktestResult {
        metric,
        target_date,
        lead_time,
        simulated_today,
        simulated_otb,
        projected_value,
        actual_value,
        method: projection.method,
        error,
        abs_pct_error,
    })
}

/// Replay every date in a range at each requested lead time
///
/// Dates that lack a final or a visible snapshot are skipped (logged at
/// debug level); other errors abort the run.
pub fn backtest_range(
    store: &SnapshotStore,
    config: &EngineConfig,
    metric: MetricType,
    start: NaiveDate,
    end: NaiveDate,
    lead_times: &[u16],
) -> Result<Vec<BacktestResult>> {
    if end < start {
        return Err(ForecastError::ValidationError(format!(
            "Backtest range end {} precedes start {}",
            end, start
        )));
    }

    let mut results = Vec::new();
    let mut date = start;
    while date <= end {
        for &lead_time in lead_times {
            match backtest_one(store, config, metric, date, lead_time) {
                Ok(result) => results.push(result),
                Err(ForecastError::MissingData(reason)) => {
                    log::debug!("Skipping {} at {} days out: {}", date, lead_time, reason);
                }
                Err(e) => return Err(e),
            }
        }
        date += Duration::days(1);
    }
    Ok(results)
}

/// Aggregate results into per-lead-time accuracy summaries
pub fn summarize(results: &[BacktestResult]) -> Result<Vec<LeadTimeSummary>> {
    let mut grouped: BTreeMap<u16, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for result in results {
        let (forecasts, actuals) = grouped.entry(result.lead_time).or_default();
        forecasts.push(result.projected_value);
        actuals.push(result.actual_value);
    }

    grouped
        .into_iter()
        .map(|(lead_time, (forecasts, actuals))| {
            let accuracy = forecast_accuracy(&forecasts, &actuals)?;
            Ok(LeadTimeSummary {
                lead_time,
                sample_count: forecasts.len(),
                accuracy,
            })
        })
        .collect()
}

/// Write results to a CSV file - a result store separate from the
/// production explanation log
pub fn export_csv<P: AsRef<Path>>(results: &[BacktestResult], path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;
    Ok(())
}
