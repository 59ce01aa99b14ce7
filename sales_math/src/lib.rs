//! # Sales Math
//!
//! Numeric building blocks for daily sales series.
//! This crate knows nothing about dates or forecasts; it works on plain
//! `f64` slices and is shared by the forecasting engine.

use thiserror::Error;

pub mod moving_averages;
pub mod statistics;

pub use moving_averages::{trailing_means, SimpleMovingAverage};
pub use statistics::{difference, integrate, mean, sample_std_dev, sample_variance};

/// Errors that can occur in series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;
