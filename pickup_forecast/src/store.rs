//! Snapshot store: observed on-the-books values by target date and lead time
//!
//! One logical row per (target date, metric), holding a `days_out -> value`
//! map over the snapshot schedule. Absent buckets mean "not yet observed"
//! and are distinct from a zero booking count. OTB values are allowed to
//! dip as lead time shrinks - cancellations are data, not errors.

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use otb_data::{FinalValue, MetricType, SnapshotRow};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

type RowKey = (NaiveDate, MetricType);

/// In-memory store of snapshots, category snapshots and realized finals
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    rows: BTreeMap<RowKey, BTreeMap<u16, f64>>,
    category_rows: BTreeMap<RowKey, BTreeMap<String, BTreeMap<u16, f64>>>,
    finals: BTreeMap<RowKey, f64>,
}

impl SnapshotStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observed OTB value - an idempotent upsert
    ///
    /// Replaying the same value is a no-op; a different value overwrites
    /// (corrected source data). Returns whether the stored state changed.
    pub fn record(
        &mut self,
        target_date: NaiveDate,
        metric: MetricType,
        days_out: u16,
        value: f64,
    ) -> bool {
        let row = self.rows.entry((target_date, metric)).or_default();
        match row.insert(days_out, value) {
            Some(previous) => previous != value,
            None => true,
        }
    }

    /// Record an observation, refusing buckets whose snapshot day has passed
    ///
    /// The snapshot for `(target_date, days_out)` is taken on
    /// `target_date - days_out`. Once `today` is later than that, the bucket
    /// is immutable and re-snapshotting it is a no-op.
    pub fn record_as_of(
        &mut self,
        today: NaiveDate,
        target_date: NaiveDate,
        metric: MetricType,
        days_out: u16,
        value: f64,
    ) -> bool {
        let snapshot_day = target_date - Duration::days(days_out as i64);
        if snapshot_day < today {
            return false;
        }
        self.record(target_date, metric, days_out, value)
    }

    /// Record one category-segmented OTB value (idempotent upsert)
    pub fn record_category(
        &mut self,
        target_date: NaiveDate,
        metric: MetricType,
        category: &str,
        days_out: u16,
        value: f64,
    ) -> bool {
        let row = self
            .category_rows
            .entry((target_date, metric))
            .or_default()
            .entry(category.to_string())
            .or_default();
        match row.insert(days_out, value) {
            Some(previous) => previous != value,
            None => true,
        }
    }

    /// Record the realized final value for a completed target date
    pub fn record_final(&mut self, target_date: NaiveDate, metric: MetricType, value: f64) {
        self.finals.insert((target_date, metric), value);
    }

    /// Ingest snapshot rows in bulk, routing segmented rows by category
    pub fn ingest_rows<I: IntoIterator<Item = SnapshotRow>>(&mut self, rows: I) {
        for row in rows {
            match row.category {
                Some(ref category) => {
                    self.record_category(
                        row.target_date,
                        row.metric,
                        category,
                        row.days_out,
                        row.value,
                    );
                }
                None => {
                    self.record(row.target_date, row.metric, row.days_out, row.value);
                }
            }
        }
    }

    /// Ingest realized finals in bulk
    pub fn ingest_finals<I: IntoIterator<Item = FinalValue>>(&mut self, finals: I) {
        for f in finals {
            self.record_final(f.target_date, f.metric, f.value);
        }
    }

    /// The full days-out map for a (target date, metric) pair
    pub fn read(&self, target_date: NaiveDate, metric: MetricType) -> Option<&BTreeMap<u16, f64>> {
        self.rows.get(&(target_date, metric))
    }

    /// The OTB value at an exact lead time, `None` when never observed
    pub fn otb_at(&self, target_date: NaiveDate, metric: MetricType, days_out: u16) -> Option<f64> {
        self.rows
            .get(&(target_date, metric))
            .and_then(|row| row.get(&days_out))
            .copied()
    }

    /// Category OTB values at an exact lead time
    pub fn category_otb_at(
        &self,
        target_date: NaiveDate,
        metric: MetricType,
        days_out: u16,
    ) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        if let Some(categories) = self.category_rows.get(&(target_date, metric)) {
            for (category, row) in categories {
                if let Some(&value) = row.get(&days_out) {
                    out.insert(category.clone(), value);
                }
            }
        }
        out
    }

    /// The realized final value, `None` until known
    pub fn final_value(&self, target_date: NaiveDate, metric: MetricType) -> Option<f64> {
        self.finals.get(&(target_date, metric)).copied()
    }

    /// A read-only view of the store as it looked on `today`
    ///
    /// The view hides snapshots taken after `today` and finals for dates
    /// that had not yet completed - the backtest harness depends on this to
    /// keep simulated history leak-free.
    pub fn as_of(&self, today: NaiveDate) -> SnapshotView<'_> {
        SnapshotView { store: self, today }
    }

    /// Number of (target date, metric) rows held
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read-only, time-bounded view over a [`SnapshotStore`]
#[derive(Debug, Clone, Copy)]
pub struct SnapshotView<'a> {
    store: &'a SnapshotStore,
    today: NaiveDate,
}

impl<'a> SnapshotView<'a> {
    /// The simulated (or actual) observation date of this view
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    fn is_visible(&self, target_date: NaiveDate, days_out: u16) -> bool {
        target_date - Duration::days(days_out as i64) <= self.today
    }

    /// OTB at an exact lead time, if the snapshot existed by `today`
    pub fn otb_at(&self, target_date: NaiveDate, metric: MetricType, days_out: u16) -> Option<f64> {
        if !self.is_visible(target_date, days_out) {
            return None;
        }
        self.store.otb_at(target_date, metric, days_out)
    }

    /// The most recent visible observation at or above a lead time
    ///
    /// Returns the `(days_out, value)` of the tightest snapshot with
    /// `days_out >= min_lead` that had been taken by `today`.
    pub fn visible_otb(
        &self,
        target_date: NaiveDate,
        metric: MetricType,
        min_lead: u16,
    ) -> Option<(u16, f64)> {
        let row = self.store.read(target_date, metric)?;
        row.range(min_lead..)
            .find(|(&d, _)| self.is_visible(target_date, d))
            .map(|(&d, &v)| (d, v))
    }

    /// The realized final, visible only once the target date has passed
    pub fn final_value(&self, target_date: NaiveDate, metric: MetricType) -> Option<f64> {
        if target_date >= self.today {
            return None;
        }
        self.store.final_value(target_date, metric)
    }

    /// Completed rows for a metric: target date, snapshots, and final
    ///
    /// Only dates whose final value is visible from this view are yielded;
    /// this is the sample set pickup curves are built from.
    pub fn completed_rows(
        &self,
        metric: MetricType,
    ) -> Vec<(NaiveDate, &'a BTreeMap<u16, f64>, f64)> {
        self.store
            .finals
            .iter()
            .filter(|((date, m), _)| *m == metric && *date < self.today)
            .filter_map(|(&(date, m), &final_value)| {
                self.store.read(date, m).map(|row| (date, row, final_value))
            })
            .collect()
    }
}

/// Loader for bulk snapshot history files
///
/// Reads a whole history export into a DataFrame and converts it to typed
/// rows. The expected columns are `target_date` (ISO date string),
/// `metric`, `days_out`, `value` and optionally `category`.
#[derive(Debug)]
pub struct HistoryLoader;

impl HistoryLoader {
    /// Load snapshot rows from a CSV history export
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<SnapshotRow>> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::rows_from_dataframe(&df)
    }

    /// Convert a history DataFrame into typed snapshot rows
    pub fn rows_from_dataframe(df: &DataFrame) -> Result<Vec<SnapshotRow>> {
        let dates = Self::column_as_dates(df, "target_date")?;
        let metrics = Self::column_as_metrics(df, "metric")?;
        let days = Self::column_as_days(df, "days_out")?;
        let values = Self::column_as_f64(df, "value")?;
        let categories = Self::optional_category_column(df);

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            rows.push(SnapshotRow {
                target_date: dates[i],
                metric: metrics[i],
                days_out: days[i],
                value: values[i],
                category: categories.get(i).cloned().flatten(),
            });
        }
        Ok(rows)
    }

    fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
        df.column(name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", name, e))
        })
    }

    fn column_as_dates(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
        let col = Self::column(df, name)?;
        match col.dtype() {
            DataType::Utf8 => col
                .utf8()
                .map_err(ForecastError::from)?
                .into_iter()
                .map(|opt| {
                    let s = opt.ok_or_else(|| {
                        ForecastError::DataError(format!("Null value in column '{}'", name))
                    })?;
                    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
                        ForecastError::DataError(format!("Invalid date '{}': {}", s, e))
                    })
                })
                .collect(),
            other => Err(ForecastError::DataError(format!(
                "Column '{}' has unsupported type {:?} for dates",
                name, other
            ))),
        }
    }

    fn column_as_metrics(df: &DataFrame, name: &str) -> Result<Vec<MetricType>> {
        let col = Self::column(df, name)?;
        match col.dtype() {
            DataType::Utf8 => col
                .utf8()
                .map_err(ForecastError::from)?
                .into_iter()
                .map(|opt| {
                    let s = opt.ok_or_else(|| {
                        ForecastError::DataError(format!("Null value in column '{}'", name))
                    })?;
                    s.parse::<MetricType>().map_err(ForecastError::from)
                })
                .collect(),
            other => Err(ForecastError::DataError(format!(
                "Column '{}' has unsupported type {:?} for metrics",
                name, other
            ))),
        }
    }

    fn column_as_days(df: &DataFrame, name: &str) -> Result<Vec<u16>> {
        let values = Self::column_as_f64(df, name)?;
        values
            .into_iter()
            .map(|v| {
                if v < 0.0 || v > u16::MAX as f64 || v.fract() != 0.0 {
                    Err(ForecastError::DataError(format!(
                        "Invalid days_out value {}",
                        v
                    )))
                } else {
                    Ok(v as u16)
                }
            })
            .collect()
    }

    fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let col = Self::column(df, name)?;
        let casted = col.cast(&DataType::Float64)?;
        let chunked = casted.f64()?;
        chunked
            .into_iter()
            .map(|opt| {
                opt.ok_or_else(|| {
                    ForecastError::DataError(format!("Null value in column '{}'", name))
                })
            })
            .collect()
    }

    fn optional_category_column(df: &DataFrame) -> Vec<Option<String>> {
        let col = match df.column("category") {
            Ok(col) => col,
            Err(_) => return vec![None; df.height()],
        };
        match col.utf8() {
            Ok(chunked) => chunked
                .into_iter()
                .map(|opt| opt.filter(|s| !s.is_empty()).map(|s| s.to_string()))
                .collect(),
            Err(_) => vec![None; df.height()],
        }
    }
}
