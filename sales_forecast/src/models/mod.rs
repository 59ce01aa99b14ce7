//! Forecasting models for daily sales series

use crate::config::ForecastConfig;
use crate::data::DailySeries;
use crate::error::{ForecastError, Result};
use crate::metrics::{FitQuality, ModelMetrics, ModelParameters, ModelType};
use log::{debug, warn};
use std::fmt::Debug;
use thiserror::Error;

pub mod arima;
pub mod moving_average;

use arima::{ArimaModel, TrainedArima};
use moving_average::{MovingAverageModel, TrainedMovingAverage};

/// Reasons a model could not be fitted or could not forecast.
///
/// These never reach callers of the engine; they select the fallback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelFitFailure {
    /// Series too short for the requested order
    #[error("series too short: need {required} usable points, have {found}")]
    TooShort {
        /// Points required
        required: usize,
        /// Points available
        found: usize,
    },

    /// No variation left to model
    #[error("degenerate series: {0}")]
    Degenerate(String),

    /// Estimation did not settle within the iteration budget
    #[error("no convergence after {iterations} iterations")]
    NonConvergence {
        /// Sweeps performed
        iterations: usize,
    },

    /// NaN or infinity appeared during estimation or forecasting
    #[error("non-finite value encountered: {0}")]
    NonFinite(String),

    /// Normal quantile for the interval could not be computed
    #[error("normal quantile unavailable: {0}")]
    Quantile(String),

    /// Model output does not match the requested horizon
    #[error("malformed model output: {0}")]
    Malformed(String),
}

/// Result type for model internals
pub type FitResult<T> = std::result::Result<T, ModelFitFailure>;

/// Raw model output before clamping
#[derive(Debug, Clone, PartialEq)]
pub struct ModelForecast {
    /// Forecasted values
    values: Vec<f64>,
    /// Model-native (lower, upper) intervals, if the model provides them
    intervals: Option<Vec<(f64, f64)>>,
}

impl ModelForecast {
    /// Create a forecast without native intervals
    pub fn new(values: Vec<f64>, horizon: usize) -> FitResult<Self> {
        if values.len() != horizon {
            return Err(ModelFitFailure::Malformed(format!(
                "Values length ({}) doesn't match horizon ({})",
                values.len(),
                horizon
            )));
        }

        Ok(Self {
            values,
            intervals: None,
        })
    }

    /// Create a forecast with native confidence intervals
    pub fn new_with_intervals(
        values: Vec<f64>,
        horizon: usize,
        intervals: Vec<(f64, f64)>,
    ) -> FitResult<Self> {
        let mut forecast = Self::new(values, horizon)?;

        if intervals.len() != horizon {
            return Err(ModelFitFailure::Malformed(format!(
                "Intervals length ({}) doesn't match horizon ({})",
                intervals.len(),
                horizon
            )));
        }

        forecast.intervals = Some(intervals);
        Ok(forecast)
    }

    /// Forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Native intervals, if available
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    /// Number of steps
    pub fn horizon(&self) -> usize {
        self.values.len()
    }
}

/// Trained model ready to forecast
pub trait TrainedForecastModel: Debug {
    /// Forecast `horizon` future days
    fn forecast(&self, horizon: usize, confidence_level: f64) -> FitResult<ModelForecast>;

    /// Parameters reported in the model metrics
    fn parameters(&self) -> ModelParameters;

    /// Goodness of fit, when the model computes one
    fn fit_quality(&self) -> Option<FitQuality> {
        None
    }

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a daily series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a daily series
    fn train(&self, series: &DailySeries) -> FitResult<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// The estimator chosen for a request
#[derive(Debug, Clone)]
pub enum ForecastStrategy {
    /// Fitted ARIMA model
    PrimaryArima(TrainedArima),
    /// Moving-average estimator used after the primary model failed
    MovingAverageFallback {
        /// Trained fallback
        model: TrainedMovingAverage,
        /// Why the primary model was abandoned
        reason: ModelFitFailure,
    },
}

impl ForecastStrategy {
    /// Fit the primary model, switching to the fallback if fitting fails
    pub fn fit(series: &DailySeries, config: &ForecastConfig) -> Result<Self> {
        let order = config.arima.order_for(series.len());
        let model = ArimaModel::from_settings(order, &config.arima);

        match model.train(series) {
            Ok(trained) => {
                debug!("fitted {} on {} days", trained.name(), series.len());
                Ok(ForecastStrategy::PrimaryArima(trained))
            }
            Err(failure) => Self::fallback(series, config, failure),
        }
    }

    /// Build the moving-average fallback
    pub fn fallback(
        series: &DailySeries,
        config: &ForecastConfig,
        reason: ModelFitFailure,
    ) -> Result<Self> {
        warn!("primary model unavailable ({}), using moving average", reason);

        let window = config.fallback.window_for(series.len());
        let model = MovingAverageModel::new(window)?
            .train(series)
            .map_err(|_| ForecastError::EmptyForecast)?;

        Ok(ForecastStrategy::MovingAverageFallback { model, reason })
    }

    /// Forecast with whichever model was chosen
    pub fn forecast(&self, horizon: usize, confidence_level: f64) -> FitResult<ModelForecast> {
        match self {
            ForecastStrategy::PrimaryArima(model) => model.forecast(horizon, confidence_level),
            ForecastStrategy::MovingAverageFallback { model, .. } => {
                model.forecast(horizon, confidence_level)
            }
        }
    }

    /// Model type tag
    pub fn model_type(&self) -> ModelType {
        match self {
            ForecastStrategy::PrimaryArima(_) => ModelType::Primary,
            ForecastStrategy::MovingAverageFallback { .. } => ModelType::Fallback,
        }
    }

    /// Metrics describing this strategy
    pub fn metrics(&self, sample_size: usize) -> ModelMetrics {
        match self {
            ForecastStrategy::PrimaryArima(model) => ModelMetrics {
                model_type: ModelType::Primary,
                parameters: model.parameters(),
                fit_quality: model.fit_quality(),
                sample_size,
                note: None,
            },
            ForecastStrategy::MovingAverageFallback { model, reason } => ModelMetrics {
                model_type: ModelType::Fallback,
                parameters: model.parameters(),
                fit_quality: None,
                sample_size,
                note: Some(format!(
                    "ARIMA model unavailable ({}); forecast uses a {}-day moving average",
                    reason,
                    model.window()
                )),
            },
        }
    }
}
