use pickup_forecast::ForecastError;

#[test]
fn errors_display_their_taxonomy() {
    let missing = ForecastError::MissingData("no snapshot at 30 days out".to_string());
    assert_eq!(
        missing.to_string(),
        "Missing data: no snapshot at 30 days out"
    );

    let inconsistent = ForecastError::Inconsistency("category totals diverge".to_string());
    assert_eq!(
        inconsistent.to_string(),
        "Inconsistent data: category totals diverge"
    );

    let config = ForecastError::ConfigError("min_curve_samples must be at least 1".to_string());
    assert!(config.to_string().starts_with("Configuration error:"));
}

#[test]
fn io_errors_convert_into_forecast_errors() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: ForecastError = io.into();
    assert!(matches!(err, ForecastError::IoError(_)));
    assert!(err.to_string().contains("gone"));
}

#[test]
fn member_crate_errors_convert_into_forecast_errors() {
    let data_err = otb_data::DataError::UnknownMetric("room_rates".to_string());
    let err: ForecastError = data_err.into();
    assert!(matches!(err, ForecastError::DataError(_)));
    assert!(err.to_string().contains("room_rates"));

    let math_err = pace_math::MathError::InvalidInput("empty series".to_string());
    let err: ForecastError = math_err.into();
    assert!(matches!(err, ForecastError::ValidationError(_)));
}
