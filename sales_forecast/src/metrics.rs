//! Model metadata attached to every forecast

use serde::{Deserialize, Serialize};

/// Which estimator produced the forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// ARIMA model
    Primary,
    /// Moving-average fallback
    Fallback,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelType::Primary => write!(f, "primary"),
            ModelType::Fallback => write!(f, "fallback"),
        }
    }
}

/// Model-specific parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelParameters {
    /// ARIMA (p, d, q) order
    Order {
        /// Order triple
        order: (usize, usize, usize),
    },
    /// Moving-average window
    Window {
        /// Window size in days
        window: usize,
    },
}

/// Goodness-of-fit statistics of the primary model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    /// Conditional Gaussian log-likelihood
    pub log_likelihood: f64,
    /// Akaike information criterion
    pub aic: f64,
    /// Bayesian information criterion
    pub bic: f64,
    /// Residual variance
    pub sigma2: f64,
}

/// Metadata describing how a forecast was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Primary or fallback
    pub model_type: ModelType,
    /// Order triple or window size
    pub parameters: ModelParameters,
    /// Fit statistics, primary model only
    pub fit_quality: Option<FitQuality>,
    /// Number of daily points used
    pub sample_size: usize,
    /// Why the fallback was used, if it was
    pub note: Option<String>,
}
