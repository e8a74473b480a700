use chrono::NaiveDate;
use otb_data::utils::generate_booking_history;
use otb_data::MetricType;
use pickup_forecast::backtest::{export_csv, summarize};
use pickup_forecast::{EngineConfig, ForecastEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let history = generate_booking_history(MetricType::Covers, start, 500, 65.0, 23);

    let mut engine = ForecastEngine::new(EngineConfig::default())?;
    engine.store_mut().ingest_rows(history.rows);
    engine.store_mut().ingest_finals(history.finals);

    // Replay a month of covers forecasts at four lead times
    let results = engine.run_backtest(
        MetricType::Covers,
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
        &[3, 7, 14, 30],
    )?;
    println!("Replayed {} simulated forecasts", results.len());

    println!("Accuracy by lead time:");
    for summary in summarize(&results)? {
        println!("  {}", summary);
    }

    // Write the raw results to a separate result store
    let out = std::env::temp_dir().join("covers_backtest.csv");
    export_csv(&results, &out)?;
    println!("Raw results written to {}", out.display());

    Ok(())
}
