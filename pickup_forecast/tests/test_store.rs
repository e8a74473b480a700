use chrono::NaiveDate;
use otb_data::MetricType;
use pickup_forecast::{HistoryLoader, SnapshotStore};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn recording_is_an_idempotent_upsert() {
    let mut store = SnapshotStore::new();
    let target = date(2025, 8, 16);

    // First write changes state, replaying the same value does not
    assert!(store.record(target, MetricType::RoomNights, 30, 41.0));
    assert!(!store.record(target, MetricType::RoomNights, 30, 41.0));
    assert_eq!(store.otb_at(target, MetricType::RoomNights, 30), Some(41.0));

    // A different value overwrites (corrected source data)
    assert!(store.record(target, MetricType::RoomNights, 30, 42.0));
    assert_eq!(store.otb_at(target, MetricType::RoomNights, 30), Some(42.0));
}

#[test]
fn absent_buckets_are_unknown_not_zero() {
    let mut store = SnapshotStore::new();
    let target = date(2025, 8, 16);
    store.record(target, MetricType::Covers, 30, 0.0);

    assert_eq!(store.otb_at(target, MetricType::Covers, 30), Some(0.0));
    assert_eq!(store.otb_at(target, MetricType::Covers, 37), None);
    assert_eq!(store.otb_at(date(2025, 8, 17), MetricType::Covers, 30), None);
}

#[test]
fn past_buckets_are_immutable() {
    let mut store = SnapshotStore::new();
    let target = date(2025, 8, 16);
    // The 30-days-out snapshot for this target is taken on 2025-07-17
    let snapshot_day = date(2025, 7, 17);

    assert!(store.record_as_of(snapshot_day, target, MetricType::RoomNights, 30, 41.0));

    // A day later the bucket's day has passed; re-snapshotting is a no-op
    assert!(!store.record_as_of(date(2025, 7, 18), target, MetricType::RoomNights, 30, 99.0));
    assert_eq!(store.otb_at(target, MetricType::RoomNights, 30), Some(41.0));
}

#[test]
fn views_hide_snapshots_taken_after_their_today() {
    let mut store = SnapshotStore::new();
    let target = date(2025, 8, 16);
    store.record(target, MetricType::RoomNights, 37, 38.0); // taken 2025-07-10
    store.record(target, MetricType::RoomNights, 30, 41.0); // taken 2025-07-17
    store.record(target, MetricType::RoomNights, 7, 52.0); // taken 2025-08-09

    let early = store.as_of(date(2025, 7, 10));
    assert_eq!(early.otb_at(target, MetricType::RoomNights, 37), Some(38.0));
    assert_eq!(early.otb_at(target, MetricType::RoomNights, 30), None);
    assert_eq!(
        early.visible_otb(target, MetricType::RoomNights, 30),
        Some((37, 38.0))
    );

    let later = store.as_of(date(2025, 7, 17));
    assert_eq!(
        later.visible_otb(target, MetricType::RoomNights, 30),
        Some((30, 41.0))
    );
}

#[test]
fn finals_become_visible_only_after_the_date_passes() {
    let mut store = SnapshotStore::new();
    let target = date(2025, 8, 16);
    store.record_final(target, MetricType::RoomNights, 72.0);

    assert_eq!(store.final_value(target, MetricType::RoomNights), Some(72.0));
    let same_day = store.as_of(target);
    assert_eq!(same_day.final_value(target, MetricType::RoomNights), None);
    let after = store.as_of(date(2025, 8, 17));
    assert_eq!(after.final_value(target, MetricType::RoomNights), Some(72.0));
}

#[test]
fn category_rows_are_kept_apart_from_metric_rows() {
    let mut store = SnapshotStore::new();
    let target = date(2025, 8, 16);
    store.record(target, MetricType::RoomsRevenue, 30, 3085.0);
    store.record_category(target, MetricType::RoomsRevenue, "standard", 30, 2325.0);
    store.record_category(target, MetricType::RoomsRevenue, "suite", 30, 760.0);

    let by_category = store.category_otb_at(target, MetricType::RoomsRevenue, 30);
    assert_eq!(by_category.len(), 2);
    assert_eq!(by_category["standard"], 2325.0);
    assert_eq!(by_category["suite"], 760.0);
    assert_eq!(
        store.otb_at(target, MetricType::RoomsRevenue, 30),
        Some(3085.0)
    );
}

#[test]
fn history_loader_reads_a_csv_export() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "target_date,metric,days_out,value,category").unwrap();
    writeln!(file, "2025-08-16,room_nights,30,41.0,").unwrap();
    writeln!(file, "2025-08-16,room_nights,37,38.0,").unwrap();
    writeln!(file, "2025-08-16,rooms_revenue,30,2325.0,standard").unwrap();
    file.flush().unwrap();

    let rows = HistoryLoader::from_csv(file.path()).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].target_date, date(2025, 8, 16));
    assert_eq!(rows[0].metric, MetricType::RoomNights);
    assert_eq!(rows[0].days_out, 30);
    assert_eq!(rows[0].value, 41.0);
    assert_eq!(rows[0].category, None);
    assert_eq!(rows[2].category.as_deref(), Some("standard"));

    let mut store = SnapshotStore::new();
    store.ingest_rows(rows);
    assert_eq!(
        store.otb_at(date(2025, 8, 16), MetricType::RoomNights, 37),
        Some(38.0)
    );
    assert_eq!(
        store.category_otb_at(date(2025, 8, 16), MetricType::RoomsRevenue, 30)["standard"],
        2325.0
    );
}

#[test]
fn history_loader_rejects_missing_columns() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "target_date,days_out,value").unwrap();
    writeln!(file, "2025-08-16,30,41.0").unwrap();
    file.flush().unwrap();

    assert!(HistoryLoader::from_csv(file.path()).is_err());
}
