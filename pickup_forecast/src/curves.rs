//! Pickup curves: how much of the final value is booked at each lead time
//!
//! A curve is keyed by (day-of-week, season, metric, days-out) and holds the
//! average fraction of the eventual value already on the books at that lead
//! time, with its spread and sample count. Ratios above 1.0 are legitimate -
//! late cancellations can pull the final below an earlier OTB position - and
//! are never clamped.
//!
//! Rebuilds happen in batch: a complete new table is built off to the side
//! and installed with an atomic pointer swap, so concurrent readers never
//! observe a half-rebuilt curve set.

use crate::store::SnapshotView;
use otb_data::{calendar, MetricType, Season};
use pace_math::stats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Key of a pickup curve
///
/// `day_of_week` and `season` are optional so the same table can hold the
/// coarser curves the lookup relaxes to when samples are scarce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurveKey {
    pub metric: MetricType,
    pub days_out: u16,
    pub day_of_week: Option<u8>,
    pub season: Option<Season>,
}

/// Aggregated booking-pace statistics at one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupCurve {
    /// Mean fraction of the final value already booked at this lead time
    pub avg_pct_of_final: f64,
    /// Sample standard deviation of the fractions
    pub std_dev: f64,
    /// Number of historical dates behind the statistics
    pub sample_count: usize,
}

/// How specific the key of a resolved curve was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveScope {
    /// Full (day-of-week, season) key
    DayAndSeason,
    /// Season dropped - day-of-week only
    DayOfWeek,
    /// Both dropped - metric-wide
    MetricWide,
}

impl std::fmt::Display for CurveScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurveScope::DayAndSeason => write!(f, "day-and-season"),
            CurveScope::DayOfWeek => write!(f, "day-of-week"),
            CurveScope::MetricWide => write!(f, "metric-wide"),
        }
    }
}

/// An immutable set of curves produced by one rebuild
#[derive(Debug, Clone, Default)]
pub struct CurveTable {
    curves: HashMap<CurveKey, PickupCurve>,
}

impl CurveTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The curve at an exact key
    pub fn get(&self, key: &CurveKey) -> Option<&PickupCurve> {
        self.curves.get(key)
    }

    /// Number of curves held
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Whether the table holds no curves
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Resolve a usable curve, relaxing the key when samples are scarce
    ///
    /// Tries the full (day-of-week, season) key first, then drops the
    /// season, then the day-of-week. A curve below `min_samples` is never
    /// returned - an unreliable small-sample curve is worse than a coarser
    /// well-sampled one.
    pub fn resolve(
        &self,
        metric: MetricType,
        days_out: u16,
        day_of_week: u8,
        season: Season,
        min_samples: usize,
    ) -> Option<(&PickupCurve, CurveScope)> {
        let candidates = [
            (Some(day_of_week), Some(season), CurveScope::DayAndSeason),
            (Some(day_of_week), None, CurveScope::DayOfWeek),
            (None, None, CurveScope::MetricWide),
        ];
        for (dow, season, scope) in candidates {
            let key = CurveKey {
                metric,
                days_out,
                day_of_week: dow,
                season,
            };
            if let Some(curve) = self.curves.get(&key) {
                if curve.sample_count >= min_samples {
                    return Some((curve, scope));
                }
            }
        }
        None
    }

    /// Replace every curve of one metric with the curves of another table
    pub fn replace_metric(&mut self, metric: MetricType, rebuilt: CurveTable) {
        self.curves.retain(|key, _| key.metric != metric);
        self.curves.extend(rebuilt.curves);
    }

    fn insert(&mut self, key: CurveKey, curve: PickupCurve) {
        self.curves.insert(key, curve);
    }
}

/// Builds pickup curves from completed snapshot history
#[derive(Debug)]
pub struct CurveBuilder;

impl CurveBuilder {
    /// Build the curve for one explicit key
    ///
    /// Samples are the completed target dates matching the key whose final
    /// value is known; each contributes `otb_at(days_out) / final`. Dates
    /// with a zero final are excluded - the ratio is undefined, not zero.
    /// Returns `None` when no date contributes a sample.
    pub fn build(
        view: &SnapshotView<'_>,
        metric: MetricType,
        days_out: u16,
        day_of_week: Option<u8>,
        season: Option<Season>,
    ) -> Option<PickupCurve> {
        let mut ratios = Vec::new();
        for (date, row, final_value) in view.completed_rows(metric) {
            if final_value == 0.0 {
                continue;
            }
            if let Some(dow) = day_of_week {
                if calendar::weekday_number(date) != dow {
                    continue;
                }
            }
            if let Some(s) = season {
                if Season::of(date) != s {
                    continue;
                }
            }
            if let Some(&otb) = row.get(&days_out) {
                ratios.push(otb / final_value);
            }
        }
        Self::from_ratios(&ratios)
    }

    /// Rebuild the full curve set for a metric from a store view
    ///
    /// Produces curves at all three key levels (day-of-week + season,
    /// day-of-week only, metric-wide) for every scheduled bucket, in one
    /// pass over the completed history.
    pub fn rebuild(view: &SnapshotView<'_>, metric: MetricType) -> CurveTable {
        let mut by_full: HashMap<(u8, Season, u16), Vec<f64>> = HashMap::new();
        let mut by_dow: HashMap<(u8, u16), Vec<f64>> = HashMap::new();
        let mut by_metric: HashMap<u16, Vec<f64>> = HashMap::new();

        for (date, row, final_value) in view.completed_rows(metric) {
            if final_value == 0.0 {
                continue;
            }
            let dow = calendar::weekday_number(date);
            let season = Season::of(date);
            for (&days_out, &otb) in row {
                let ratio = otb / final_value;
                by_full.entry((dow, season, days_out)).or_default().push(ratio);
                by_dow.entry((dow, days_out)).or_default().push(ratio);
                by_metric.entry(days_out).or_default().push(ratio);
            }
        }

        let mut table = CurveTable::new();
        for ((dow, season, days_out), ratios) in &by_full {
            if let Some(curve) = Self::from_ratios(ratios) {
                table.insert(
                    CurveKey {
                        metric,
                        days_out: *days_out,
                        day_of_week: Some(*dow),
                        season: Some(*season),
                    },
                    curve,
                );
            }
        }
        for ((dow, days_out), ratios) in &by_dow {
            if let Some(curve) = Self::from_ratios(ratios) {
                table.insert(
                    CurveKey {
                        metric,
                        days_out: *days_out,
                        day_of_week: Some(*dow),
                        season: None,
                    },
                    curve,
                );
            }
        }
        for (days_out, ratios) in &by_metric {
            if let Some(curve) = Self::from_ratios(ratios) {
                table.insert(
                    CurveKey {
                        metric,
                        days_out: *days_out,
                        day_of_week: None,
                        season: None,
                    },
                    curve,
                );
            }
        }
        table
    }

    fn from_ratios(ratios: &[f64]) -> Option<PickupCurve> {
        let avg = stats::mean(ratios)?;
        Some(PickupCurve {
            avg_pct_of_final: avg,
            std_dev: stats::sample_std_dev(ratios).unwrap_or(0.0),
            sample_count: ratios.len(),
        })
    }
}

/// Shared curve set with atomic install
///
/// Readers take a cheap [`Arc`] snapshot of the current table; a rebuild
/// installs a complete replacement table and bumps the generation counter
/// in one swap. A reader that grabbed the old snapshot keeps a consistent
/// view until it drops it.
#[derive(Debug, Default)]
pub struct CurveStore {
    table: RwLock<Arc<CurveTable>>,
    generation: AtomicU64,
}

impl CurveStore {
    /// Create a store with an empty table at generation 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically install a new table, returning the new generation
    pub fn install(&self, table: CurveTable) -> u64 {
        let mut guard = self.table.write().expect("curve table lock poisoned");
        *guard = Arc::new(table);
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// A consistent snapshot of the current table
    pub fn snapshot(&self) -> Arc<CurveTable> {
        Arc::clone(&self.table.read().expect("curve table lock poisoned"))
    }

    /// The generation of the currently installed table
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
