//! Per-step confidence bounds
//!
//! Model-native intervals are used as they are. Otherwise the bounds come
//! from the fixed z-score table and a margin that widens linearly with the
//! step index. Predicted values and lower bounds never go below zero.

use crate::config::IntervalSettings;
use crate::error::{ForecastError, Result};
use crate::models::ModelForecast;
use sales_math::sample_std_dev;
use serde::{Deserialize, Serialize};

/// A confidence level and the z-score used from that level upwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZBreakpoint {
    /// Smallest confidence level the z-score applies to
    pub level: f64,
    /// Two-sided z-score
    pub z: f64,
}

/// Step function from confidence level to z-score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZScoreTable {
    /// Breakpoints, in any order
    pub breakpoints: Vec<ZBreakpoint>,
    /// z-score below the lowest breakpoint
    pub floor: f64,
}

impl Default for ZScoreTable {
    fn default() -> Self {
        Self {
            breakpoints: vec![
                ZBreakpoint { level: 0.99, z: 2.576 },
                ZBreakpoint { level: 0.95, z: 1.96 },
                ZBreakpoint { level: 0.90, z: 1.645 },
            ],
            floor: 1.28,
        }
    }
}

impl ZScoreTable {
    /// z-score of the highest breakpoint not above `confidence_level`
    pub fn z_for(&self, confidence_level: f64) -> f64 {
        self.breakpoints
            .iter()
            .filter(|b| confidence_level >= b.level)
            .max_by(|a, b| a.level.total_cmp(&b.level))
            .map_or(self.floor, |b| b.z)
    }

    /// Check that all z-scores are positive and levels lie in (0, 1)
    pub fn validate(&self) -> Result<()> {
        if !(self.floor > 0.0 && self.floor.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "z-score floor must be a positive number".to_string(),
            ));
        }
        for b in &self.breakpoints {
            if !(b.level > 0.0 && b.level < 1.0) || !(b.z > 0.0 && b.z.is_finite()) {
                return Err(ForecastError::InvalidParameter(format!(
                    "Invalid z-score breakpoint (level={}, z={})",
                    b.level, b.z
                )));
            }
        }
        Ok(())
    }
}

/// Point prediction and bounds for one forecast step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEstimate {
    /// Predicted value, at least zero
    pub predicted: f64,
    /// Lower bound, at least zero
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
}

impl StepEstimate {
    /// Clamp a raw estimate so that `0 <= lower <= predicted <= upper`.
    ///
    /// The upper bound is never lowered; it is only raised to the clamped
    /// prediction when the whole raw interval sits below zero.
    pub fn clamped(predicted: f64, lower: f64, upper: f64) -> Self {
        let predicted = predicted.max(0.0);
        let lower = lower.max(0.0).min(predicted);
        let upper = upper.max(predicted);
        Self {
            predicted,
            lower,
            upper,
        }
    }
}

/// Turns model output into clamped per-step bounds
#[derive(Debug, Clone)]
pub struct IntervalEstimator<'a> {
    settings: &'a IntervalSettings,
}

impl<'a> IntervalEstimator<'a> {
    /// Create an estimator over the given settings
    pub fn new(settings: &'a IntervalSettings) -> Self {
        Self { settings }
    }

    /// Fallback margins `z * std_dev * (1 + growth_rate * i)` for `horizon` steps
    pub fn fallback_margins(&self, std_dev: f64, confidence_level: f64, horizon: usize) -> Vec<f64> {
        let z = self.settings.z_scores.z_for(confidence_level);
        (0..horizon)
            .map(|i| {
                let growth = 1.0 + self.settings.growth_rate * i as f64;
                z * std_dev * growth
            })
            .collect()
    }

    /// Bounds for every step of `forecast`.
    ///
    /// `history` is the daily series the model was fitted on; its sample
    /// standard deviation drives the heuristic bounds when the forecast
    /// carries no native intervals.
    pub fn estimate(
        &self,
        forecast: &ModelForecast,
        history: &[f64],
        confidence_level: f64,
    ) -> Result<Vec<StepEstimate>> {
        let values = forecast.values();

        let steps = match forecast.intervals() {
            Some(intervals) => values
                .iter()
                .zip(intervals)
                .map(|(&v, &(lo, hi))| StepEstimate::clamped(v, lo, hi))
                .collect(),
            None => {
                let std_dev = sample_std_dev(history)?;
                let margins = self.fallback_margins(std_dev, confidence_level, values.len());
                values
                    .iter()
                    .zip(margins)
                    .map(|(&base, margin)| StepEstimate::clamped(base, base - margin, base + margin))
                    .collect()
            }
        };

        Ok(steps)
    }
}
