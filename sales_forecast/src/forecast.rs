//! Forecast engine: request validation, model selection and assembly

use crate::config::ForecastConfig;
use crate::data::{
    aggregate_daily, records_to_events, DailySeries, HistoricalPoint, SalesEvent, SalesMetric,
    SalesRecord,
};
use crate::error::{ForecastError, Result};
use crate::evaluation::{forecast_accuracy, train_test_split, BacktestReport};
use crate::intervals::{IntervalEstimator, StepEstimate};
use crate::metrics::ModelMetrics;
use crate::models::{ForecastStrategy, ModelForecast};
use crate::utils::future_dates;
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// What the caller wants forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Product the series is scoped to; `None` forecasts all sales
    pub target_id: Option<i64>,
    /// Number of future days
    pub horizon: usize,
    /// Probability mass inside the reported bounds
    pub confidence_level: f64,
}

impl ForecastRequest {
    /// Create an unscoped request
    pub fn new(horizon: usize, confidence_level: f64) -> Self {
        Self {
            target_id: None,
            horizon,
            confidence_level,
        }
    }

    /// Scope the request to one product
    pub fn for_target(mut self, target_id: i64) -> Self {
        self.target_id = Some(target_id);
        self
    }
}

/// One forecast day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Forecast day
    pub date: NaiveDate,
    /// Predicted value, never negative
    pub predicted_value: f64,
    /// Lower bound, never negative
    pub lower_bound: f64,
    /// Upper bound
    pub upper_bound: f64,
}

/// Complete forecast handed back to the API layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Daily history the forecast was fitted on
    pub historical_data: Vec<HistoricalPoint>,
    /// One point per forecast day
    pub forecast_data: Vec<ForecastPoint>,
    /// How the forecast was produced
    pub model_metrics: ModelMetrics,
}

impl ForecastResult {
    /// Serialize to JSON for the reporting layer
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// States of a forecast run, used in log output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastStage {
    Requested,
    Aggregated,
    PrimaryFit,
    Fallback,
    IntervalsComputed,
    Assembled,
}

impl std::fmt::Display for ForecastStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ForecastStage::Requested => "requested",
            ForecastStage::Aggregated => "aggregated",
            ForecastStage::PrimaryFit => "primary-fit",
            ForecastStage::Fallback => "fallback",
            ForecastStage::IntervalsComputed => "intervals-computed",
            ForecastStage::Assembled => "assembled",
        };
        write!(f, "{}", name)
    }
}

/// Stateless forecasting engine.
///
/// Each call works only on the data it is given, so one forecaster can be
/// shared across threads.
#[derive(Debug, Clone, Default)]
pub struct SalesForecaster {
    config: ForecastConfig,
}

impl SalesForecaster {
    /// Create a forecaster with a validated configuration
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast from raw (timestamp, amount) events
    pub fn generate_forecast(
        &self,
        events: &[SalesEvent],
        horizon: usize,
        confidence_level: f64,
    ) -> Result<ForecastResult> {
        self.validate_request(horizon, confidence_level)?;
        debug!("{}: {} events, horizon {}", ForecastStage::Requested, events.len(), horizon);

        if events.is_empty() {
            return Err(self.insufficient(0));
        }

        let series = aggregate_daily(events)?;
        self.forecast_series(series, horizon, confidence_level)
    }

    /// Forecast from an already aggregated daily history
    pub fn forecast_history(
        &self,
        history: Vec<HistoricalPoint>,
        horizon: usize,
        confidence_level: f64,
    ) -> Result<ForecastResult> {
        self.validate_request(horizon, confidence_level)?;
        debug!("{}: {} daily points, horizon {}", ForecastStage::Requested, history.len(), horizon);

        if history.is_empty() {
            return Err(self.insufficient(0));
        }

        let series = DailySeries::from_points(history)?;
        self.forecast_series(series, horizon, confidence_level)
    }

    /// Forecast from point-of-sale records, scoped and measured per the request
    pub fn forecast_records(
        &self,
        records: &[SalesRecord],
        request: &ForecastRequest,
        metric: SalesMetric,
    ) -> Result<ForecastResult> {
        let events = records_to_events(records, request.target_id, metric);
        self.generate_forecast(&events, request.horizon, request.confidence_level)
    }

    /// Forecast the last `holdout_days` days from the days before them and score the result
    pub fn backtest(
        &self,
        events: &[SalesEvent],
        holdout_days: usize,
        confidence_level: f64,
    ) -> Result<BacktestReport> {
        self.validate_request(holdout_days, confidence_level)?;
        if events.is_empty() {
            return Err(self.insufficient(0));
        }

        let series = aggregate_daily(events)?;
        let (train, test) = train_test_split(&series, holdout_days)?;
        let result = self.forecast_series(train, holdout_days, confidence_level)?;

        let predicted: Vec<f64> = result.forecast_data.iter().map(|p| p.predicted_value).collect();
        let actual = test.values();
        let accuracy = forecast_accuracy(&predicted, &actual)?;
        info!(
            "backtest over {} days with {} model: MAE {:.4}",
            holdout_days, result.model_metrics.model_type, accuracy.mae
        );

        Ok(BacktestReport {
            holdout_days,
            model_type: result.model_metrics.model_type,
            predicted,
            actual,
            accuracy,
        })
    }

    fn validate_request(&self, horizon: usize, confidence_level: f64) -> Result<()> {
        let limits = &self.config.limits;
        if horizon == 0 || horizon > limits.max_horizon {
            return Err(ForecastError::InvalidParameter(format!(
                "Horizon must be between 1 and {}, got {}",
                limits.max_horizon, horizon
            )));
        }
        if !(confidence_level >= limits.min_confidence && confidence_level <= limits.max_confidence) {
            return Err(ForecastError::InvalidParameter(format!(
                "Confidence level must be between {} and {}, got {}",
                limits.min_confidence, limits.max_confidence, confidence_level
            )));
        }
        Ok(())
    }

    fn insufficient(&self, found: usize) -> ForecastError {
        ForecastError::InsufficientData {
            required: self.config.limits.min_history,
            found,
        }
    }

    fn forecast_series(
        &self,
        series: DailySeries,
        horizon: usize,
        confidence_level: f64,
    ) -> Result<ForecastResult> {
        debug!("{}: {} daily points", ForecastStage::Aggregated, series.len());
        if series.len() < self.config.limits.min_history {
            return Err(self.insufficient(series.len()));
        }

        let (strategy, model_forecast) = self.fit_and_forecast(&series, horizon, confidence_level)?;

        let history = series.values();
        let steps = IntervalEstimator::new(&self.config.intervals).estimate(
            &model_forecast,
            &history,
            confidence_level,
        )?;
        debug!("{}: {} steps", ForecastStage::IntervalsComputed, steps.len());

        let metrics = strategy.metrics(series.len());
        let result = assemble_forecast(series.into_points(), &steps, metrics)?;
        debug!("{}: {} model", ForecastStage::Assembled, result.model_metrics.model_type);

        Ok(result)
    }

    /// Single decision point between the primary model and the fallback
    fn fit_and_forecast(
        &self,
        series: &DailySeries,
        horizon: usize,
        confidence_level: f64,
    ) -> Result<(ForecastStrategy, ModelForecast)> {
        let strategy = ForecastStrategy::fit(series, &self.config)?;
        let stage = match &strategy {
            ForecastStrategy::PrimaryArima(_) => ForecastStage::PrimaryFit,
            ForecastStrategy::MovingAverageFallback { .. } => ForecastStage::Fallback,
        };
        debug!("{}: {} days", stage, series.len());

        match strategy.forecast(horizon, confidence_level) {
            Ok(forecast) => Ok((strategy, forecast)),
            Err(failure) => {
                if matches!(strategy, ForecastStrategy::MovingAverageFallback { .. }) {
                    warn!("fallback forecast failed: {}", failure);
                    return Err(ForecastError::EmptyForecast);
                }

                let fallback = ForecastStrategy::fallback(series, &self.config, failure)?;
                debug!("{}: {} days", ForecastStage::Fallback, series.len());
                let forecast = fallback
                    .forecast(horizon, confidence_level)
                    .map_err(|_| ForecastError::EmptyForecast)?;
                Ok((fallback, forecast))
            }
        }
    }
}

/// Attach consecutive dates after the history to the step estimates
pub fn assemble_forecast(
    historical_data: Vec<HistoricalPoint>,
    steps: &[StepEstimate],
    model_metrics: ModelMetrics,
) -> Result<ForecastResult> {
    if steps.is_empty() {
        return Err(ForecastError::EmptyForecast);
    }
    let last_date = historical_data
        .last()
        .map(|p| p.date)
        .ok_or(ForecastError::InsufficientData {
            required: 1,
            found: 0,
        })?;

    let forecast_data = future_dates(last_date, steps.len())?
        .into_iter()
        .zip(steps)
        .map(|(date, step)| ForecastPoint {
            date,
            predicted_value: step.predicted,
            lower_bound: step.lower,
            upper_bound: step.upper,
        })
        .collect();

    Ok(ForecastResult {
        historical_data,
        forecast_data,
        model_metrics,
    })
}

/// Forecast from raw events with the default configuration
pub fn generate_forecast(
    events: &[SalesEvent],
    horizon: usize,
    confidence_level: f64,
) -> Result<ForecastResult> {
    SalesForecaster::default().generate_forecast(events, horizon, confidence_level)
}
