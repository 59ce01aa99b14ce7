use approx::assert_abs_diff_eq;
use chrono::{Days, NaiveDate};
use sales_forecast::data::{DailySeries, HistoricalPoint};
use sales_forecast::evaluation::{forecast_accuracy, train_test_split};
use sales_forecast::{ForecastError, ModelFitFailure};

#[test]
fn test_accuracy_metrics() {
    let forecast = [10.0, 12.0, 8.0, 5.0];
    let actual = [12.0, 12.0, 4.0, 5.0];

    let accuracy = forecast_accuracy(&forecast, &actual).unwrap();

    assert_abs_diff_eq!(accuracy.mae, 1.5, epsilon = 1e-12);
    assert_abs_diff_eq!(accuracy.mse, 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(accuracy.rmse, 5.0_f64.sqrt(), epsilon = 1e-12);
    // (2/12 + 0 + 4/4 + 0) / 4
    assert_abs_diff_eq!(accuracy.mape.unwrap(), 29.166_666_666_666_668, epsilon = 1e-9);
    assert!(accuracy.smape > 0.0);
}

#[test]
fn test_mape_skips_days_without_sales() {
    let accuracy = forecast_accuracy(&[1.0, 3.0], &[0.0, 2.0]).unwrap();
    assert_abs_diff_eq!(accuracy.mape.unwrap(), 50.0, epsilon = 1e-12);

    let accuracy = forecast_accuracy(&[1.0, 0.0], &[0.0, 0.0]).unwrap();
    assert!(accuracy.mape.is_none());
    // 200 for the miss, 0 where both are zero
    assert_abs_diff_eq!(accuracy.smape, 100.0, epsilon = 1e-12);
    assert!(accuracy.to_string().contains("n/a"));
}

#[test]
fn test_accuracy_rejects_mismatched_lengths() {
    assert!(matches!(
        forecast_accuracy(&[1.0], &[1.0, 2.0]),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(forecast_accuracy(&[], &[]).is_err());
}

#[test]
fn test_train_test_split_keeps_dates() {
    let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    let points = (0..10)
        .map(|i| HistoricalPoint::new(start + Days::new(i), i as f64))
        .collect();
    let series = DailySeries::from_points(points).unwrap();

    let (train, test) = train_test_split(&series, 3).unwrap();

    assert_eq!(train.len(), 7);
    assert_eq!(test.points()[0].date, start + Days::new(7));
    assert_eq!(test.values(), vec![7.0, 8.0, 9.0]);
}

#[test]
fn test_error_messages() {
    let err = ForecastError::InsufficientData { required: 3, found: 2 };
    assert_eq!(
        err.to_string(),
        "Insufficient data: need at least 3 daily points, found 2"
    );

    let err: ForecastError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
    assert!(matches!(err, ForecastError::Config(_)));

    let err: ForecastError = sales_math::MathError::InvalidInput("bad window".to_string()).into();
    assert!(matches!(err, ForecastError::InvalidParameter(ref msg) if msg == "bad window"));

    let failure = ModelFitFailure::NonConvergence { iterations: 200 };
    assert!(failure.to_string().contains("200"));
}
