//! Engine configuration
//!
//! Every constant the engine relies on (history and horizon limits, the ARIMA
//! order heuristic, the fallback window cap, the z-score table and the
//! uncertainty growth rate) lives here as plain data. Configurations are
//! usually left at their defaults; a JSON document may override any subset.

use crate::error::{ForecastError, Result};
use crate::intervals::ZScoreTable;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a JSON configuration file
pub const CONFIG_ENV_VAR: &str = "SALES_FORECAST_CONFIG";

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Request bounds
    pub limits: ForecastLimits,
    /// Primary model settings
    pub arima: ArimaSettings,
    /// Fallback estimator settings
    pub fallback: FallbackSettings,
    /// Interval estimation settings
    pub intervals: IntervalSettings,
}

/// Bounds applied to every forecast request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastLimits {
    /// Minimum number of aggregated daily points
    pub min_history: usize,
    /// Largest accepted horizon in days
    pub max_horizon: usize,
    /// Lowest accepted confidence level (inclusive)
    pub min_confidence: f64,
    /// Highest accepted confidence level (inclusive)
    pub max_confidence: f64,
}

impl Default for ForecastLimits {
    fn default() -> Self {
        Self {
            min_history: 3,
            max_horizon: 365,
            min_confidence: 0.5,
            max_confidence: 0.99,
        }
    }
}

/// ARIMA order heuristic and estimator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaSettings {
    /// AR order (p)
    pub ar_order: usize,
    /// MA order (q)
    pub ma_order: usize,
    /// Sample size from which one order of differencing is applied
    pub differencing_min_samples: usize,
    /// Maximum coordinate-descent sweeps
    pub max_iterations: usize,
    /// Relative improvement in the sum of squares below which the fit has converged
    pub tolerance: f64,
    /// Coefficients are searched in (-bound, bound)
    pub coefficient_bound: f64,
}

impl Default for ArimaSettings {
    fn default() -> Self {
        Self {
            ar_order: 1,
            ma_order: 1,
            differencing_min_samples: 10,
            max_iterations: 200,
            tolerance: 1e-8,
            coefficient_bound: 0.99,
        }
    }
}

impl ArimaSettings {
    /// Order triple used for a series of `sample_size` points
    pub fn order_for(&self, sample_size: usize) -> (usize, usize, usize) {
        let d = if sample_size >= self.differencing_min_samples {
            1
        } else {
            0
        };
        (self.ar_order, d, self.ma_order)
    }
}

/// Moving-average fallback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSettings {
    /// Largest trailing window
    pub window_cap: usize,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self { window_cap: 7 }
    }
}

impl FallbackSettings {
    /// Window used for a series of `sample_size` points
    pub fn window_for(&self, sample_size: usize) -> usize {
        self.window_cap.min(sample_size).max(1)
    }
}

/// Heuristic interval settings used by the fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalSettings {
    /// Confidence level to z-score breakpoints
    pub z_scores: ZScoreTable,
    /// Per-step widening of the margin
    pub growth_rate: f64,
}

impl Default for IntervalSettings {
    fn default() -> Self {
        Self {
            z_scores: ZScoreTable::default(),
            growth_rate: 0.1,
        }
    }
}

impl ForecastConfig {
    /// Parse a configuration from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ForecastConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        debug!("loading forecast configuration from {}", path.as_ref().display());
        Self::from_json_str(&contents)
    }

    /// Configuration from the file named by `SALES_FORECAST_CONFIG`, or the defaults
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<()> {
        let limits = &self.limits;
        if limits.min_history == 0 {
            return Err(invalid("limits.min_history must be at least 1"));
        }
        if limits.max_horizon == 0 {
            return Err(invalid("limits.max_horizon must be at least 1"));
        }
        if !(limits.min_confidence > 0.0
            && limits.min_confidence <= limits.max_confidence
            && limits.max_confidence < 1.0)
        {
            return Err(invalid(
                "confidence limits must satisfy 0 < min_confidence <= max_confidence < 1",
            ));
        }

        let arima = &self.arima;
        if arima.ar_order > 3 || arima.ma_order > 3 {
            return Err(invalid("arima orders above 3 are not supported"));
        }
        if arima.max_iterations == 0 {
            return Err(invalid("arima.max_iterations must be at least 1"));
        }
        if !(arima.tolerance > 0.0 && arima.tolerance.is_finite()) {
            return Err(invalid("arima.tolerance must be a positive number"));
        }
        if !(arima.coefficient_bound > 0.0 && arima.coefficient_bound < 1.0) {
            return Err(invalid("arima.coefficient_bound must lie in (0, 1)"));
        }

        if self.fallback.window_cap == 0 {
            return Err(invalid("fallback.window_cap must be at least 1"));
        }

        if !(self.intervals.growth_rate >= 0.0 && self.intervals.growth_rate.is_finite()) {
            return Err(invalid("intervals.growth_rate must be a non-negative number"));
        }
        self.intervals.z_scores.validate()?;

        Ok(())
    }
}

fn invalid(msg: &str) -> ForecastError {
    ForecastError::InvalidParameter(msg.to_string())
}
