//! Moving-average fallback estimator

use crate::data::DailySeries;
use crate::error::{ForecastError, Result};
use crate::metrics::ModelParameters;
use crate::models::{FitResult, ForecastModel, ModelFitFailure, ModelForecast, TrainedForecastModel};
use sales_math::{mean, trailing_means};

/// Trailing simple moving average
#[derive(Debug, Clone)]
pub struct MovingAverageModel {
    /// Name of the model
    name: String,
    /// Window size
    window: usize,
}

/// Trained moving average
#[derive(Debug, Clone)]
pub struct TrainedMovingAverage {
    /// Name of the model
    name: String,
    /// Window size
    window: usize,
    /// Value repeated for every future day
    base: f64,
}

impl MovingAverageModel {
    /// Create a new moving average with the given window
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window size must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Moving Average (window={})", window),
            window,
        })
    }
}

impl ForecastModel for MovingAverageModel {
    type Trained = TrainedMovingAverage;

    fn train(&self, series: &DailySeries) -> FitResult<TrainedMovingAverage> {
        let values = series.values();
        let too_short = || ModelFitFailure::TooShort {
            required: 1,
            found: values.len(),
        };

        // Last full-window average, or the plain mean when no window fits
        let means = trailing_means(&values, self.window).map_err(|_| too_short())?;
        let base = match means.last() {
            Some(&last) => last,
            None => mean(&values).map_err(|_| too_short())?,
        };

        Ok(TrainedMovingAverage {
            name: self.name.clone(),
            window: self.window,
            base,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedMovingAverage {
    /// Window size
    pub fn window(&self) -> usize {
        self.window
    }

    /// Base value of the forecast
    pub fn base(&self) -> f64 {
        self.base
    }
}

impl TrainedForecastModel for TrainedMovingAverage {
    fn forecast(&self, horizon: usize, _confidence_level: f64) -> FitResult<ModelForecast> {
        ModelForecast::new(vec![self.base; horizon], horizon)
    }

    fn parameters(&self) -> ModelParameters {
        ModelParameters::Window {
            window: self.window,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
