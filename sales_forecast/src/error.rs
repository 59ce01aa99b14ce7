//! Error types for the sales_forecast crate

use thiserror::Error;

/// Errors surfaced to callers of the forecasting engine
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Not enough aggregated history to forecast
    #[error("Insufficient data: need at least {required} daily points, found {found}")]
    InsufficientData {
        /// Minimum number of daily points
        required: usize,
        /// Number of daily points available
        found: usize,
    },

    /// Horizon, confidence level, history or configuration value out of bounds
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No forecast points could be produced
    #[error("Forecast produced no points")]
    EmptyForecast,

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from CSV ingest
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Config(err.to_string())
    }
}

impl From<sales_math::MathError> for ForecastError {
    fn from(err: sales_math::MathError) -> Self {
        match err {
            sales_math::MathError::InsufficientData(msg)
            | sales_math::MathError::InvalidInput(msg) => ForecastError::InvalidParameter(msg),
        }
    }
}
