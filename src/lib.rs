//! # POS Forecast
//!
//! Umbrella crate for the point-of-sale forecasting workspace.
//!
//! - [`sales_math`]: moving averages, dispersion and differencing on `f64` slices
//! - [`sales_forecast`]: daily aggregation, ARIMA with moving-average fallback,
//!   confidence bounds and forecast assembly
//!
//! ## Example
//!
//! ```
//! use pos_forecast_workspace::sales_forecast::{HistoricalPoint, SalesForecaster};
//! use chrono::NaiveDate;
//!
//! let history: Vec<HistoricalPoint> = [12.0, 9.0, 14.0, 11.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &v)| {
//!         HistoricalPoint::new(NaiveDate::from_ymd_opt(2024, 5, 1 + i as u32).unwrap(), v)
//!     })
//!     .collect();
//!
//! let result = SalesForecaster::default().forecast_history(history, 3, 0.9)?;
//! assert_eq!(result.forecast_data.len(), 3);
//! # Ok::<(), pos_forecast_workspace::sales_forecast::ForecastError>(())
//! ```

pub use sales_forecast;
pub use sales_math;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crates_are_linked() {
        assert_eq!(sales_forecast::NAME, "sales_forecast");
        assert_eq!(sales_math::mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0);
    }
}
