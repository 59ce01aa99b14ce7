//! # Sales Forecast
//!
//! Daily sales forecasting for the point-of-sale backend.
//!
//! ## Features
//!
//! - Aggregation of raw sales events into a gap-free daily series (UTC days)
//! - ARIMA forecasting with model-native confidence intervals
//! - Automatic fallback to a trailing moving average when the ARIMA model
//!   cannot be fitted, with bounds that widen further into the future
//! - Hold-out backtesting with MAE, RMSE, MAPE and SMAPE
//! - CSV ingest of transaction line items, JSON configuration
//!
//! ## Order Heuristic
//!
//! Series with at least 10 days use ARIMA(1,1,1); shorter series use
//! ARIMA(1,0,1). Fewer than 3 days is an error.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use sales_forecast::{generate_forecast, ModelType, SalesEvent};
//!
//! let events: Vec<SalesEvent> = [10.0, 20.0, 15.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(day, &amount)| {
//!         let ts = Utc.with_ymd_and_hms(2024, 3, 1 + day as u32, 12, 0, 0).unwrap();
//!         SalesEvent::new(ts, amount)
//!     })
//!     .collect();
//!
//! let result = generate_forecast(&events, 2, 0.95)?;
//! assert_eq!(result.forecast_data.len(), 2);
//! assert_eq!(result.model_metrics.model_type, ModelType::Fallback);
//! # Ok::<(), sales_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod forecast;
pub mod intervals;
pub mod metrics;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{
    aggregate_daily, DailySeries, HistoricalPoint, SalesEvent, SalesLoader, SalesMetric,
    SalesRecord,
};
pub use crate::error::{ForecastError, Result};
pub use crate::forecast::{
    generate_forecast, ForecastPoint, ForecastRequest, ForecastResult, SalesForecaster,
};
pub use crate::metrics::{FitQuality, ModelMetrics, ModelParameters, ModelType};
pub use crate::models::{ForecastStrategy, ModelFitFailure};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
