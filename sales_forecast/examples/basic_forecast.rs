use chrono::{Days, TimeZone, Utc};
use sales_forecast::{ForecastConfig, SalesEvent, SalesForecaster};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sales Forecast: Basic Example");
    println!("=============================\n");

    let config = ForecastConfig::load()?;
    let forecaster = SalesForecaster::new(config)?;

    // A short history is forecast with the moving-average fallback
    let short = create_sales_events(&[10.0, 20.0, 15.0]);
    let result = forecaster.generate_forecast(&short, 2, 0.95)?;
    println!("Three days of history, 2-day horizon:");
    print_forecast(&result);

    // Two months of history use the ARIMA model
    let long = create_sales_events(&create_daily_sales(60));
    let result = forecaster.generate_forecast(&long, 7, 0.9)?;
    println!("\nSixty days of history, 7-day horizon:");
    print_forecast(&result);

    let report = forecaster.backtest(&long, 14, 0.9)?;
    println!("\nBacktest over the last {} days ({} model):", report.holdout_days, report.model_type);
    print!("{}", report.accuracy);

    println!("\nJSON output:\n{}", result.to_json()?);

    Ok(())
}

fn print_forecast(result: &sales_forecast::ForecastResult) {
    let metrics = &result.model_metrics;
    println!("  model: {} {:?}", metrics.model_type, metrics.parameters);
    if let Some(note) = &metrics.note {
        println!("  note: {}", note);
    }
    for point in &result.forecast_data {
        println!(
            "  {}: {:.2} ({:.2}, {:.2})",
            point.date, point.predicted_value, point.lower_bound, point.upper_bound
        );
    }
}

/// Daily sales with a weekly cycle and a slow upward trend
fn create_daily_sales(days: usize) -> Vec<f64> {
    (0..days)
        .map(|t| {
            let t = t as f64;
            let weekly = 12.0 * (2.0 * std::f64::consts::PI * t / 7.0).sin();
            let noise = 4.0 * (t * 1.7).sin() * (t * 0.3).cos();
            (80.0 + 0.5 * t + weekly + noise).max(0.0)
        })
        .collect()
}

/// Spread each day's total over two transactions
fn create_sales_events(daily: &[f64]) -> Vec<SalesEvent> {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    daily
        .iter()
        .enumerate()
        .flat_map(|(i, &total)| {
            let day = start + Days::new(i as u64);
            [
                SalesEvent::new(day + chrono::Duration::hours(10), total * 0.4),
                SalesEvent::new(day + chrono::Duration::hours(16), total * 0.6),
            ]
        })
        .collect()
}
