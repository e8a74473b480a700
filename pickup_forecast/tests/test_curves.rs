use assert_approx_eq::assert_approx_eq;
use chrono::{Duration, NaiveDate};
use otb_data::{MetricType, Season};
use pickup_forecast::{CurveBuilder, CurveScope, CurveStore, SnapshotStore};

const FRIDAY: u8 = 4;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Five consecutive summer Fridays with otb/final pairs at 30 days out
fn summer_fridays(store: &mut SnapshotStore, pairs: &[(f64, f64)]) {
    let first = date(2024, 6, 7); // a Friday
    for (i, &(otb, final_value)) in pairs.iter().enumerate() {
        let target = first + Duration::days(7 * i as i64);
        store.record(target, MetricType::RoomNights, 30, otb);
        store.record_final(target, MetricType::RoomNights, final_value);
    }
}

#[test]
fn curve_averages_otb_over_final_ratios() {
    let mut store = SnapshotStore::new();
    summer_fridays(
        &mut store,
        &[(20.0, 40.0), (22.0, 44.0), (18.0, 36.0), (30.0, 60.0), (25.0, 50.0)],
    );

    let view = store.as_of(date(2025, 1, 1));
    let curve = CurveBuilder::build(
        &view,
        MetricType::RoomNights,
        30,
        Some(FRIDAY),
        Some(Season::Summer),
    )
    .unwrap();

    assert_eq!(curve.sample_count, 5);
    assert_approx_eq!(curve.avg_pct_of_final, 0.5);
    assert_approx_eq!(curve.std_dev, 0.0);
}

#[test]
fn zero_final_samples_are_excluded_not_counted_as_zero() {
    let mut store = SnapshotStore::new();
    summer_fridays(&mut store, &[(20.0, 40.0), (22.0, 44.0)]);
    // A cancelled-out date: bookings existed but the final was zero
    let dead = date(2024, 6, 21);
    store.record(dead, MetricType::RoomNights, 30, 15.0);
    store.record_final(dead, MetricType::RoomNights, 0.0);

    let view = store.as_of(date(2025, 1, 1));
    let curve = CurveBuilder::build(
        &view,
        MetricType::RoomNights,
        30,
        Some(FRIDAY),
        Some(Season::Summer),
    )
    .unwrap();

    assert_eq!(curve.sample_count, 2);
    assert_approx_eq!(curve.avg_pct_of_final, 0.5);
}

#[test]
fn ratios_above_one_are_not_clamped() {
    let mut store = SnapshotStore::new();
    // Heavy late cancellations: the final landed below the 30-day OTB
    summer_fridays(&mut store, &[(50.0, 40.0), (55.0, 44.0)]);

    let view = store.as_of(date(2025, 1, 1));
    let curve = CurveBuilder::build(
        &view,
        MetricType::RoomNights,
        30,
        Some(FRIDAY),
        Some(Season::Summer),
    )
    .unwrap();

    assert_approx_eq!(curve.avg_pct_of_final, 1.25);
}

#[test]
fn lookup_relaxes_below_the_sample_threshold() {
    let mut store = SnapshotStore::new();
    // Three summer Fridays - below the threshold of five
    summer_fridays(&mut store, &[(20.0, 40.0), (22.0, 44.0), (18.0, 36.0)]);
    // Four more winter Fridays bring the day-of-week total to seven
    let first_winter = date(2024, 12, 6); // a Friday
    for i in 0..4 {
        let target = first_winter + Duration::days(7 * i);
        store.record(target, MetricType::RoomNights, 30, 24.0);
        store.record_final(target, MetricType::RoomNights, 40.0);
    }

    let view = store.as_of(date(2025, 6, 1));
    let table = CurveBuilder::rebuild(&view, MetricType::RoomNights);

    let (curve, scope) = table
        .resolve(MetricType::RoomNights, 30, FRIDAY, Season::Summer, 5)
        .unwrap();
    assert_eq!(scope, CurveScope::DayOfWeek);
    assert_eq!(curve.sample_count, 7);

    // With a looser threshold the exact key is preferred
    let (exact, scope) = table
        .resolve(MetricType::RoomNights, 30, FRIDAY, Season::Summer, 3)
        .unwrap();
    assert_eq!(scope, CurveScope::DayAndSeason);
    assert_eq!(exact.sample_count, 3);
}

#[test]
fn lookup_returns_none_when_even_the_metric_curve_is_thin() {
    let mut store = SnapshotStore::new();
    summer_fridays(&mut store, &[(20.0, 40.0)]);

    let view = store.as_of(date(2025, 1, 1));
    let table = CurveBuilder::rebuild(&view, MetricType::RoomNights);
    assert!(table
        .resolve(MetricType::RoomNights, 30, FRIDAY, Season::Summer, 5)
        .is_none());
}

#[test]
fn installs_swap_atomically_and_bump_the_generation() {
    let mut store = SnapshotStore::new();
    summer_fridays(
        &mut store,
        &[(20.0, 40.0), (22.0, 44.0), (18.0, 36.0), (30.0, 60.0), (25.0, 50.0)],
    );
    let view = store.as_of(date(2025, 1, 1));

    let curves = CurveStore::new();
    assert_eq!(curves.generation(), 0);
    assert!(curves.snapshot().is_empty());

    // A reader holding the old snapshot keeps its consistent view
    let before = curves.snapshot();
    let generation = curves.install(CurveBuilder::rebuild(&view, MetricType::RoomNights));
    assert_eq!(generation, 1);
    assert_eq!(curves.generation(), 1);
    assert!(before.is_empty());
    assert!(!curves.snapshot().is_empty());
}
