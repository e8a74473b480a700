//! Basic statistics over booking-pace samples

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator)
///
/// Returns `None` for fewer than two samples - the spread of a single
/// observation is undefined, and callers decide how to treat that.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        / (values.len() as f64 - 1.0);
    Some(variance.sqrt())
}

/// Division guarded against a zero denominator
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Round a value to a fixed number of decimal places
///
/// Used once, at the final output step of a forecast.
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn std_dev_needs_two_samples() {
        assert_eq!(sample_std_dev(&[]), None);
        assert_eq!(sample_std_dev(&[1.0]), None);
        // Known value: sample std-dev of 2, 4, 4, 4, 5, 5, 7, 9 is ~2.138
        let s = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((s - 2.138).abs() < 0.001);
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(ratio(10.0, 0.0), None);
        assert_eq!(ratio(10.0, 4.0), Some(2.5));
    }

    #[test]
    fn rounding_respects_precision() {
        assert_eq!(round_to_decimals(76.994, 0), 77.0);
        assert_eq!(round_to_decimals(76.994, 2), 76.99);
        assert_eq!(round_to_decimals(81.25, 1), 81.3);
    }
}
