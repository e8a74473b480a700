use chrono::NaiveDate;
use otb_data::utils::generate_booking_history;
use otb_data::MetricType;
use pickup_forecast::backtest::summarize;
use pickup_forecast::{
    CategoryPosition, ConfidenceLevel, EngineConfig, ForecastEngine, ForecastError,
    ProjectionMethod,
};
use std::collections::BTreeMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn engine_with_history() -> ForecastEngine {
    // A year and a half of synthetic room-nights history
    let history =
        generate_booking_history(MetricType::RoomNights, date(2024, 1, 1), 500, 40.0, 7);
    let mut engine = ForecastEngine::new(EngineConfig::default()).unwrap();
    engine.store_mut().ingest_rows(history.rows);
    engine.store_mut().ingest_finals(history.finals);
    engine
}

#[test]
fn test_full_forecast_workflow() {
    let mut engine = engine_with_history();
    let today = date(2025, 3, 1);
    let target = date(2025, 3, 31);

    // 1. Rebuild curves from completed history
    let generation = engine.rebuild_curves(MetricType::RoomNights, today);
    assert_eq!(generation, 1);
    assert_eq!(engine.curve_generation(), 1);

    // 2. Generate a forecast a month out
    let explanation = engine
        .generate_forecast(MetricType::RoomNights, target, today)
        .unwrap();
    assert_eq!(explanation.run_id, 1);
    assert_eq!(explanation.days_out, 30);
    // The prior-year Monday has a full history, so the additive family wins
    assert!(matches!(
        explanation.projection_method,
        ProjectionMethod::Additive | ProjectionMethod::AdditiveFloor
    ));
    assert_eq!(explanation.comparison_date, Some(date(2024, 4, 1)));
    assert!(explanation.projected_value > 0.0);
    assert!(explanation.pace_vs_prior_pct.is_some());
    assert_eq!(explanation.confidence, ConfidenceLevel::High);

    // 3. The method label travels through the JSON explanation
    let json = explanation.to_json().unwrap();
    assert!(json.contains("additive"));
    assert!(json.contains("projection_method"));

    // 4. Identical inputs reproduce the same value in a fresh run
    let again = engine
        .generate_forecast(MetricType::RoomNights, target, today)
        .unwrap();
    assert_eq!(again.run_id, 2);
    assert_eq!(again.projected_value, explanation.projected_value);
    assert_eq!(engine.explanations().len(), 2);

    // 5. A target with no observed snapshot is unknown, never zero
    let result = engine.generate_forecast(MetricType::RoomNights, date(2026, 1, 1), today);
    assert!(matches!(result, Err(ForecastError::MissingData(_))));

    // 6. Replay January at two lead times and aggregate
    let results = engine
        .run_backtest(
            MetricType::RoomNights,
            date(2025, 1, 1),
            date(2025, 1, 14),
            &[7, 30],
        )
        .unwrap();
    assert_eq!(results.len(), 28);
    assert!(results.iter().all(|r| matches!(
        r.method,
        ProjectionMethod::Additive | ProjectionMethod::AdditiveFloor
    )));

    let summaries = summarize(&results).unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].lead_time, 7);
    assert_eq!(summaries[0].sample_count, 14);
    assert_eq!(summaries[1].lead_time, 30);
    // The 7-day replay starts closer to the final, so it should not be
    // wildly worse than the 30-day one
    assert!(summaries[0].accuracy.mae.is_finite());
    assert!(summaries[1].accuracy.mape > 0.0);

    // 7. Backtesting never touched the production explanation log
    assert_eq!(engine.explanations().len(), 2);
}

#[test]
fn test_segmented_revenue_forecast() {
    let mut engine = ForecastEngine::new(EngineConfig::default()).unwrap();
    let today = date(2025, 7, 17);
    let target = date(2025, 8, 16);
    let prior = date(2024, 8, 17);

    let store = engine.store_mut();
    store.record(target, MetricType::RoomsRevenue, 30, 3085.0);
    store.record(prior, MetricType::RoomsRevenue, 30, 2800.0);
    store.record_final(prior, MetricType::RoomsRevenue, 3265.0);
    store.record_category(target, MetricType::RoomsRevenue, "standard", 30, 2325.0);
    store.record_category(target, MetricType::RoomsRevenue, "suite", 30, 760.0);

    let mut positions = BTreeMap::new();
    positions.insert(
        "standard".to_string(),
        CategoryPosition {
            otb_revenue: 2325.0,
            remaining_inventory: 5,
            rate_ceiling: 155.0,
        },
    );
    positions.insert(
        "suite".to_string(),
        CategoryPosition {
            otb_revenue: 760.0,
            remaining_inventory: 0,
            rate_ceiling: 380.0,
        },
    );

    let explanation = engine
        .generate_segmented_forecast(MetricType::RoomsRevenue, target, today, &positions)
        .unwrap();

    // Additive: 3085 + (3265 - 2800) = 3550, bounded by contracted revenue
    // below and a full-rate sellout above
    assert_eq!(explanation.projection_method, ProjectionMethod::Additive);
    assert_eq!(explanation.projected_value, 3550.0);
    assert_eq!(explanation.lower_bound, Some(3085.0));
    assert_eq!(explanation.upper_bound, Some(3860.0));
    assert_eq!(explanation.confidence, ConfidenceLevel::High);

    let lower = explanation.lower_bound.unwrap();
    let upper = explanation.upper_bound.unwrap();
    assert!(lower <= explanation.projected_value && explanation.projected_value <= upper);
}

#[test]
fn test_shading_rejects_count_metrics() {
    let mut engine = ForecastEngine::new(EngineConfig::default()).unwrap();
    let result = engine.generate_segmented_forecast(
        MetricType::RoomNights,
        date(2025, 8, 16),
        date(2025, 7, 17),
        &BTreeMap::new(),
    );
    assert!(matches!(result, Err(ForecastError::ValidationError(_))));
}

#[test]
fn test_curve_only_mode_without_history() {
    // Snapshots exist but no comparison and no curves: the engine degrades
    // to passthrough and says so
    let mut engine = ForecastEngine::new(EngineConfig::default()).unwrap();
    let today = date(2025, 7, 17);
    let target = date(2025, 8, 16);
    engine
        .store_mut()
        .record(target, MetricType::Covers, 30, 38.0);

    let explanation = engine
        .generate_forecast(MetricType::Covers, target, today)
        .unwrap();

    assert_eq!(
        explanation.projection_method,
        ProjectionMethod::OtbPassthrough
    );
    assert_eq!(explanation.projected_value, 38.0);
    assert_eq!(explanation.confidence, ConfidenceLevel::Lowest);
    assert!(!explanation.confidence_note.is_empty());
}
