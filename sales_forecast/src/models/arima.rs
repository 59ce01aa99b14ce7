//! ARIMA models for daily sales forecasting
//!
//! Coefficients are estimated by conditional sum of squares (CSS): the
//! series is differenced `d` times, centred on its mean when `d == 0`, and the
//! AR and MA coefficients are searched one at a time with golden-section line
//! searches until the sum of squared residuals stops improving. Forecast
//! variances come from the psi-weights of the integrated model.

use crate::config::ArimaSettings;
use crate::data::DailySeries;
use crate::metrics::{FitQuality, ModelParameters};
use crate::models::{FitResult, ForecastModel, ModelFitFailure, ModelForecast, TrainedForecastModel};
use sales_math::{difference, integrate, mean};
use statrs::distribution::{ContinuousCDF, Normal};

/// Golden-section steps per line search
const LINE_SEARCH_STEPS: usize = 60;

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
    /// Maximum coordinate-descent sweeps
    max_iterations: usize,
    /// Relative improvement that counts as converged
    tolerance: f64,
    /// Coefficients stay inside (-bound, bound)
    bound: f64,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArima {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
    /// Fitted AR coefficients
    ar_coefficients: Vec<f64>,
    /// Fitted MA coefficients
    ma_coefficients: Vec<f64>,
    /// Mean of the differenced series (zero when d > 0)
    constant: f64,
    /// Original series
    history: Vec<f64>,
    /// Differenced series minus the constant
    centred: Vec<f64>,
    /// In-sample residuals, zero for the first p points
    residuals: Vec<f64>,
    /// Fit statistics
    quality: FitQuality,
}

impl ArimaModel {
    /// Create a new ARIMA model with default estimator settings
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::from_settings((p, d, q), &ArimaSettings::default())
    }

    /// Create a model of the given order using the configured estimator settings
    pub fn from_settings(order: (usize, usize, usize), settings: &ArimaSettings) -> Self {
        let (p, d, q) = order;
        Self {
            name: format!("ARIMA({},{},{})", p, d, q),
            p,
            d,
            q,
            max_iterations: settings.max_iterations,
            tolerance: settings.tolerance,
            bound: settings.coefficient_bound,
        }
    }

    /// Order triple
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Minimise the CSS objective over the AR and MA coefficients
    fn estimate(&self, centred: &[f64]) -> FitResult<(Vec<f64>, f64)> {
        let mut coeffs = vec![0.0; self.p + self.q];

        // Start the first AR term at the lag-1 autocorrelation
        if self.p > 0 {
            coeffs[0] = lag1_autocorrelation(centred).clamp(-0.5 * self.bound, 0.5 * self.bound);
        }

        let mut sse = sum_of_squares(centred, &coeffs, self.p);
        if !sse.is_finite() {
            return Err(ModelFitFailure::NonFinite(
                "initial sum of squares".to_string(),
            ));
        }
        if coeffs.is_empty() {
            return Ok((coeffs, sse));
        }

        for _ in 0..self.max_iterations {
            let before = sse;
            let start = coeffs.clone();

            for k in 0..coeffs.len() {
                let mut trial = coeffs.clone();
                let (candidate, candidate_sse) = golden_section(
                    |c| {
                        trial[k] = c;
                        sum_of_squares(centred, &trial, self.p)
                    },
                    -self.bound,
                    self.bound,
                );
                if candidate_sse < sse {
                    coeffs[k] = candidate;
                    sse = candidate_sse;
                }
            }

            // Extrapolate along the sweep's net move; AR and MA terms trade off along ridges
            let direction: Vec<f64> = coeffs.iter().zip(&start).map(|(c, s)| c - s).collect();
            let reach = max_step(&coeffs, &direction, self.bound);
            if reach > 0.0 {
                let (step, step_sse) = golden_section(
                    |s| {
                        let moved: Vec<f64> =
                            coeffs.iter().zip(&direction).map(|(c, d)| c + s * d).collect();
                        sum_of_squares(centred, &moved, self.p)
                    },
                    0.0,
                    reach,
                );
                if step_sse < sse {
                    for (c, d) in coeffs.iter_mut().zip(&direction) {
                        *c += step * d;
                    }
                    sse = step_sse;
                }
            }

            if !sse.is_finite() {
                return Err(ModelFitFailure::NonFinite("sum of squares".to_string()));
            }
            if before - sse <= self.tolerance * before.max(f64::MIN_POSITIVE) {
                return Ok((coeffs, sse));
            }
        }

        Err(ModelFitFailure::NonConvergence {
            iterations: self.max_iterations,
        })
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArima;

    fn train(&self, series: &DailySeries) -> FitResult<TrainedArima> {
        let history = series.values();
        if history.iter().any(|v| !v.is_finite()) {
            return Err(ModelFitFailure::NonFinite("history".to_string()));
        }

        let with_constant = self.d == 0;
        let n_coeffs = self.p + self.q + usize::from(with_constant);
        let required = self.d + self.p + n_coeffs + 1;
        if history.len() < required {
            return Err(ModelFitFailure::TooShort {
                required,
                found: history.len(),
            });
        }

        let differenced = difference(&history, self.d).map_err(|_| ModelFitFailure::TooShort {
            required,
            found: history.len(),
        })?;

        let (min, max) = differenced
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let scale = min.abs().max(max.abs()).max(1.0);
        if max - min <= 1e-9 * scale {
            return Err(ModelFitFailure::Degenerate(
                "differenced series is constant".to_string(),
            ));
        }

        let constant = if with_constant {
            mean(&differenced).map_err(|e| ModelFitFailure::Degenerate(e.to_string()))?
        } else {
            0.0
        };
        let centred: Vec<f64> = differenced.iter().map(|v| v - constant).collect();

        let (coeffs, sse) = self.estimate(&centred)?;
        let residuals = css_residuals(&centred, &coeffs, self.p);

        let n_eff = (centred.len() - self.p) as f64;
        let sigma2 = sse / n_eff;
        let spread = centred.iter().map(|v| v * v).sum::<f64>() / centred.len() as f64;
        if !(sigma2 > 1e-12 * spread.max(1.0)) {
            return Err(ModelFitFailure::Degenerate(
                "residual variance is zero".to_string(),
            ));
        }

        // Coefficients plus the residual variance
        let k = (n_coeffs + 1) as f64;
        let log_likelihood =
            -0.5 * n_eff * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);
        let quality = FitQuality {
            log_likelihood,
            aic: -2.0 * log_likelihood + 2.0 * k,
            bic: -2.0 * log_likelihood + k * n_eff.ln(),
            sigma2,
        };

        let (ar, ma) = coeffs.split_at(self.p);

        Ok(TrainedArima {
            name: self.name.clone(),
            p: self.p,
            d: self.d,
            q: self.q,
            ar_coefficients: ar.to_vec(),
            ma_coefficients: ma.to_vec(),
            constant,
            history,
            centred,
            residuals,
            quality,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArima {
    /// Order triple
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Fitted AR coefficients
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    /// Fitted MA coefficients
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// Residual variance
    pub fn sigma2(&self) -> f64 {
        self.quality.sigma2
    }

    /// Point forecasts of the differenced series, constant added back
    fn forecast_differenced(&self, horizon: usize) -> Vec<f64> {
        let mut x = self.centred.clone();
        let mut e = self.residuals.clone();
        let mut out = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let t = x.len();
            let mut next = 0.0;
            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                if let Some(idx) = t.checked_sub(i + 1) {
                    next += phi * x[idx];
                }
            }
            for (j, theta) in self.ma_coefficients.iter().enumerate() {
                if let Some(idx) = t.checked_sub(j + 1) {
                    next += theta * e[idx];
                }
            }

            x.push(next);
            // Future shocks have zero expectation
            e.push(0.0);
            out.push(next + self.constant);
        }

        out
    }

    /// Psi-weights of the integrated model for the first `horizon` steps
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let mut psi = vec![0.0; horizon];
        if horizon == 0 {
            return psi;
        }

        psi[0] = 1.0;
        for j in 1..horizon {
            let mut w = self.ma_coefficients.get(j - 1).copied().unwrap_or(0.0);
            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                if i + 1 <= j {
                    w += phi * psi[j - i - 1];
                }
            }
            psi[j] = w;
        }

        // Each order of integration accumulates the weights
        for _ in 0..self.d {
            let mut running = 0.0;
            for w in psi.iter_mut() {
                running += *w;
                *w = running;
            }
        }

        psi
    }
}

impl TrainedForecastModel for TrainedArima {
    fn forecast(&self, horizon: usize, confidence_level: f64) -> FitResult<ModelForecast> {
        let differenced = self.forecast_differenced(horizon);
        let values = integrate(&differenced, &self.history, self.d).map_err(|_| {
            ModelFitFailure::TooShort {
                required: self.d,
                found: self.history.len(),
            }
        })?;

        let normal =
            Normal::new(0.0, 1.0).map_err(|e| ModelFitFailure::Quantile(e.to_string()))?;
        let alpha = 1.0 - confidence_level;
        let z = normal.inverse_cdf(1.0 - alpha / 2.0);
        if !z.is_finite() {
            return Err(ModelFitFailure::Quantile(format!(
                "confidence level {}",
                confidence_level
            )));
        }

        let mut variance = 0.0;
        let intervals: Vec<(f64, f64)> = self
            .psi_weights(horizon)
            .iter()
            .zip(&values)
            .map(|(psi, &value)| {
                variance += self.quality.sigma2 * psi * psi;
                let margin = z * variance.sqrt();
                (value - margin, value + margin)
            })
            .collect();

        let finite = values.iter().all(|v| v.is_finite())
            && intervals.iter().all(|(lo, hi)| lo.is_finite() && hi.is_finite());
        if !finite {
            return Err(ModelFitFailure::NonFinite("forecast".to_string()));
        }

        ModelForecast::new_with_intervals(values, horizon, intervals)
    }

    fn parameters(&self) -> ModelParameters {
        ModelParameters::Order {
            order: self.order(),
        }
    }

    fn fit_quality(&self) -> Option<FitQuality> {
        Some(self.quality)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// CSS residuals; the first `p` entries are zero
fn css_residuals(x: &[f64], coeffs: &[f64], p: usize) -> Vec<f64> {
    let (ar, ma) = coeffs.split_at(p);
    let mut e = vec![0.0; x.len()];

    for t in p..x.len() {
        let mut predicted = 0.0;
        for (i, phi) in ar.iter().enumerate() {
            predicted += phi * x[t - i - 1];
        }
        for (j, theta) in ma.iter().enumerate() {
            if let Some(idx) = t.checked_sub(j + 1) {
                predicted += theta * e[idx];
            }
        }
        e[t] = x[t] - predicted;
    }

    e
}

fn sum_of_squares(x: &[f64], coeffs: &[f64], p: usize) -> f64 {
    css_residuals(x, coeffs, p).iter().map(|r| r * r).sum()
}

/// Largest step along `direction` keeping every coefficient inside the bound
fn max_step(coeffs: &[f64], direction: &[f64], bound: f64) -> f64 {
    let mut reach = f64::INFINITY;
    for (c, d) in coeffs.iter().zip(direction) {
        if *d > 0.0 {
            reach = reach.min((bound - c) / d);
        } else if *d < 0.0 {
            reach = reach.min((-bound - c) / d);
        }
    }

    if reach.is_finite() {
        reach.max(0.0)
    } else {
        0.0
    }
}

fn lag1_autocorrelation(x: &[f64]) -> f64 {
    let denom: f64 = x.iter().map(|v| v * v).sum();
    if denom <= 0.0 {
        return 0.0;
    }
    let num: f64 = x.windows(2).map(|w| w[0] * w[1]).sum();
    num / denom
}

/// Minimise `f` on `[lo, hi]`, returning the argument and value found
fn golden_section<F: FnMut(f64) -> f64>(mut f: F, lo: f64, hi: f64) -> (f64, f64) {
    let ratio = (5f64.sqrt() - 1.0) / 2.0;
    let (mut a, mut b) = (lo, hi);
    let mut c = b - ratio * (b - a);
    let mut d = a + ratio * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);

    for _ in 0..LINE_SEARCH_STEPS {
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - ratio * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + ratio * (b - a);
            fd = f(d);
        }
    }

    if fc < fd {
        (c, fc)
    } else {
        (d, fd)
    }
}
