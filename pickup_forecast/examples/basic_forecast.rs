use chrono::NaiveDate;
use otb_data::utils::generate_booking_history;
use otb_data::MetricType;
use pickup_forecast::{EngineConfig, ForecastEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build a year and a half of synthetic room-nights history
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let history = generate_booking_history(MetricType::RoomNights, start, 500, 42.0, 11);
    println!(
        "Generated {} snapshot rows over {} dates",
        history.rows.len(),
        history.finals.len()
    );

    let mut engine = ForecastEngine::new(EngineConfig::default())?;
    engine.store_mut().ingest_rows(history.rows);
    engine.store_mut().ingest_finals(history.finals);

    // Rebuild pickup curves from completed history
    let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let generation = engine.rebuild_curves(MetricType::RoomNights, today);
    println!("Installed curve generation {}", generation);

    // Forecast the next four Saturdays
    let mut target = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
    for _ in 0..4 {
        let explanation = engine.generate_forecast(MetricType::RoomNights, target, today)?;
        println!(
            "{} ({} days out): {} room-nights via {} [{}]",
            target,
            explanation.days_out,
            explanation.projected_value,
            explanation.projection_method,
            explanation.confidence
        );
        println!("  {}", explanation.confidence_note);
        target += chrono::Duration::days(7);
    }

    Ok(())
}
