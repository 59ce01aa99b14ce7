use approx::assert_abs_diff_eq;
use chrono::{Days, NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use sales_forecast::forecast::assemble_forecast;
use sales_forecast::intervals::StepEstimate;
use sales_forecast::{
    generate_forecast, ForecastConfig, ForecastError, ForecastRequest, ForecastResult,
    HistoricalPoint, ModelMetrics, ModelParameters, ModelType, SalesEvent, SalesForecaster,
    SalesMetric, SalesRecord,
};

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(offset)
}

fn daily_events(values: &[f64]) -> Vec<SalesEvent> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Days::new(i as u64);
            SalesEvent::new(ts, v)
        })
        .collect()
}

fn assert_forecast_invariants(result: &ForecastResult, horizon: usize) {
    assert_eq!(result.forecast_data.len(), horizon);

    let last = result.historical_data.last().unwrap().date;
    for (i, point) in result.forecast_data.iter().enumerate() {
        assert_eq!(point.date, last + Days::new(i as u64 + 1));
        assert!(point.predicted_value >= 0.0);
        assert!(point.lower_bound >= 0.0);
        assert!(point.lower_bound <= point.predicted_value);
        assert!(point.predicted_value <= point.upper_bound);
    }
}

#[test]
fn test_three_days_forecast_two() {
    let events = daily_events(&[10.0, 20.0, 15.0]);

    let result = generate_forecast(&events, 2, 0.95).unwrap();

    assert_forecast_invariants(&result, 2);
    assert_eq!(result.forecast_data[0].date, day(3));
    assert_eq!(result.forecast_data[1].date, day(4));
    assert_eq!(result.model_metrics.model_type, ModelType::Fallback);
    assert_eq!(result.model_metrics.parameters, ModelParameters::Window { window: 3 });
    assert_eq!(result.model_metrics.sample_size, 3);

    // Base is the 3-day average, std dev is 5
    let first = &result.forecast_data[0];
    assert_abs_diff_eq!(first.predicted_value, 15.0, epsilon = 1e-9);
    assert_abs_diff_eq!(first.lower_bound, 5.2, epsilon = 1e-9);
    assert_abs_diff_eq!(first.upper_bound, 24.8, epsilon = 1e-9);

    let second = &result.forecast_data[1];
    assert_abs_diff_eq!(second.lower_bound, 4.22, epsilon = 1e-9);
    assert_abs_diff_eq!(second.upper_bound, 25.78, epsilon = 1e-9);
}

#[test]
fn test_no_history_is_insufficient() {
    let result = generate_forecast(&[], 7, 0.95);
    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData { required: 3, found: 0 })
    ));
}

#[test]
fn test_two_days_is_insufficient() {
    let result = generate_forecast(&daily_events(&[4.0, 5.0]), 7, 0.95);
    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData { required: 3, found: 2 })
    ));
}

#[test]
fn test_all_zero_history_falls_back() {
    let events = daily_events(&[0.0; 20]);

    let result = generate_forecast(&events, 5, 0.95).unwrap();

    assert_forecast_invariants(&result, 5);
    assert_eq!(result.model_metrics.model_type, ModelType::Fallback);
    assert!(result.model_metrics.note.is_some());
    for point in &result.forecast_data {
        assert_eq!(point.predicted_value, 0.0);
        assert_eq!(point.lower_bound, 0.0);
        assert_eq!(point.upper_bound, 0.0);
    }
}

#[test]
fn test_single_step_uses_unit_growth() {
    let events = daily_events(&[10.0, 20.0, 15.0]);

    let result = generate_forecast(&events, 1, 0.99).unwrap();

    // margin = 2.576 * 5 * 1.0
    let point = &result.forecast_data[0];
    assert_abs_diff_eq!(point.upper_bound - point.predicted_value, 12.88, epsilon = 1e-9);
    assert_abs_diff_eq!(point.predicted_value - point.lower_bound, 12.88, epsilon = 1e-9);
}

#[test]
fn test_identical_values_give_zero_width() {
    let events = daily_events(&[8.0, 8.0, 8.0]);

    let result = generate_forecast(&events, 4, 0.9).unwrap();

    assert_forecast_invariants(&result, 4);
    for point in &result.forecast_data {
        assert_abs_diff_eq!(point.predicted_value, 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(point.upper_bound - point.lower_bound, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_long_history_uses_primary_model() {
    let values: Vec<f64> = (0..45)
        .map(|t| {
            let t = t as f64;
            120.0 + 0.8 * t + 6.0 * (t * 0.9).sin() + 3.0 * (t * 2.3).cos()
        })
        .collect();

    let result = generate_forecast(&daily_events(&values), 14, 0.95).unwrap();

    assert_forecast_invariants(&result, 14);
    assert_eq!(result.model_metrics.model_type, ModelType::Primary);
    assert_eq!(
        result.model_metrics.parameters,
        ModelParameters::Order { order: (1, 1, 1) }
    );
    assert!(result.model_metrics.fit_quality.is_some());
    assert_eq!(result.historical_data.len(), 45);
}

#[rstest]
#[case(0, 0.95)]
#[case(366, 0.95)]
#[case(7, 0.49)]
#[case(7, 0.995)]
#[case(7, f64::NAN)]
fn test_invalid_parameters_rejected(#[case] horizon: usize, #[case] confidence: f64) {
    let events = daily_events(&[1.0, 2.0, 3.0, 4.0]);
    let result = generate_forecast(&events, horizon, confidence);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[rstest]
#[case(1, 0.5)]
#[case(365, 0.99)]
fn test_boundary_parameters_accepted(#[case] horizon: usize, #[case] confidence: f64) {
    let events = daily_events(&[1.0, 2.0, 3.0, 4.0]);
    let result = generate_forecast(&events, horizon, confidence).unwrap();
    assert_forecast_invariants(&result, horizon);
}

#[test]
fn test_invalid_parameters_checked_before_history() {
    let result = generate_forecast(&[], 0, 0.95);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_invariants_hold_for_random_histories() {
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..40 {
        let days = rng.gen_range(3..60);
        let values: Vec<f64> = (0..days)
            .map(|_| {
                if rng.gen_bool(0.2) {
                    0.0
                } else {
                    rng.gen_range(0.0..80.0)
                }
            })
            .collect();
        let horizon = rng.gen_range(1..40);
        let confidence = rng.gen_range(0.5..=0.99);

        let result = generate_forecast(&daily_events(&values), horizon, confidence).unwrap();

        assert_forecast_invariants(&result, horizon);
        assert_eq!(result.model_metrics.sample_size, days);
    }
}

#[test]
fn test_forecast_is_deterministic() {
    let values: Vec<f64> = (0..30).map(|t| 50.0 + ((t * 37) % 11) as f64).collect();
    let events = daily_events(&values);

    let first = generate_forecast(&events, 10, 0.9).unwrap();
    let second = generate_forecast(&events, 10, 0.9).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_forecast_history_accepts_sparse_points() {
    let history = vec![
        HistoricalPoint::new(day(0), 4.0),
        HistoricalPoint::new(day(2), 6.0),
        HistoricalPoint::new(day(5), 5.0),
    ];

    let result = SalesForecaster::default()
        .forecast_history(history, 3, 0.95)
        .unwrap();

    assert_eq!(result.historical_data.len(), 6);
    assert_eq!(result.forecast_data[0].date, day(6));
    assert_forecast_invariants(&result, 3);
}

#[test]
fn test_forecast_records_scoped_to_product() {
    let record = |d: u64, product: i64, quantity: f64| SalesRecord {
        timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap() + Days::new(d),
        product_id: Some(product),
        quantity,
        unit_price: 2.5,
    };
    let records = vec![
        record(0, 1, 4.0),
        record(0, 2, 100.0),
        record(1, 1, 6.0),
        record(2, 1, 5.0),
        record(3, 2, 100.0),
    ];
    let request = ForecastRequest::new(2, 0.95).for_target(1);

    let result = SalesForecaster::default()
        .forecast_records(&records, &request, SalesMetric::Revenue)
        .unwrap();

    let history: Vec<f64> = result.historical_data.iter().map(|p| p.value).collect();
    assert_eq!(history, vec![10.0, 15.0, 12.5]);
    assert_forecast_invariants(&result, 2);
}

#[test]
fn test_custom_config_changes_fallback_window() {
    let mut config = ForecastConfig::default();
    config.fallback.window_cap = 2;
    let forecaster = SalesForecaster::new(config).unwrap();

    let result = forecaster
        .generate_forecast(&daily_events(&[10.0, 20.0, 15.0]), 1, 0.95)
        .unwrap();

    assert_eq!(result.model_metrics.parameters, ModelParameters::Window { window: 2 });
    assert_abs_diff_eq!(result.forecast_data[0].predicted_value, 17.5, epsilon = 1e-9);
}

#[test]
fn test_assemble_rejects_empty_steps() {
    let metrics = ModelMetrics {
        model_type: ModelType::Fallback,
        parameters: ModelParameters::Window { window: 3 },
        fit_quality: None,
        sample_size: 3,
        note: None,
    };
    let history = vec![HistoricalPoint::new(day(0), 1.0)];

    let result = assemble_forecast(history.clone(), &[], metrics.clone());
    assert!(matches!(result, Err(ForecastError::EmptyForecast)));

    let step = StepEstimate::clamped(1.0, 0.5, 1.5);
    let result = assemble_forecast(history, &[step], metrics).unwrap();
    assert_eq!(result.forecast_data[0].date, day(1));
}

#[test]
fn test_result_serializes_for_reporting() {
    let result = generate_forecast(&daily_events(&[10.0, 20.0, 15.0]), 2, 0.95).unwrap();

    let json = result.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["model_metrics"]["model_type"], "fallback");
    assert_eq!(value["model_metrics"]["parameters"]["window"], 3);
    assert_eq!(value["forecast_data"][0]["date"], "2024-01-04");
    assert_eq!(value["historical_data"].as_array().unwrap().len(), 3);
}

#[test]
fn test_backtest_scores_holdout() {
    let values: Vec<f64> = (0..40).map(|t| 30.0 + ((t * 13) % 7) as f64).collect();

    let report = SalesForecaster::default()
        .backtest(&daily_events(&values), 7, 0.95)
        .unwrap();

    assert_eq!(report.holdout_days, 7);
    assert_eq!(report.predicted.len(), 7);
    assert_eq!(report.actual, values[33..].to_vec());
    assert!(report.accuracy.mae >= 0.0);
    assert!(report.accuracy.rmse >= report.accuracy.mae - 1e-12);
}

#[test]
fn test_forecaster_is_shareable_across_threads() {
    let forecaster = std::sync::Arc::new(SalesForecaster::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let forecaster = forecaster.clone();
            std::thread::spawn(move || {
                let values: Vec<f64> = (0..12).map(|t| (t + i) as f64).collect();
                forecaster.generate_forecast(&daily_events(&values), 3, 0.95)
            })
        })
        .collect();

    for handle in handles {
        let result = handle.join().unwrap().unwrap();
        assert_eq!(result.forecast_data.len(), 3);
    }
}
