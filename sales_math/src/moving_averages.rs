//! Trailing moving averages over daily values

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average over a fixed trailing window
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    window: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new moving average with the given window
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(MathError::InvalidInput(
                "Window must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            window,
            values: VecDeque::with_capacity(window),
            sum: 0.0,
        })
    }

    /// Push the next observation, dropping the oldest once the window is full
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.window {
            if let Some(oldest) = self.values.pop_front() {
                self.sum -= oldest;
            }
        }
    }

    /// Current average, or `None` until the window has filled
    pub fn current(&self) -> Option<f64> {
        if self.values.len() < self.window {
            return None;
        }

        Some(self.sum / self.window as f64)
    }

    /// Window size
    pub fn window(&self) -> usize {
        self.window
    }

    /// Clear all observations
    pub fn reset(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}

/// Rolling means of `values`, one per position where a full window is available.
///
/// The result has `values.len() - window + 1` entries, or none when the
/// series is shorter than the window.
pub fn trailing_means(values: &[f64], window: usize) -> Result<Vec<f64>> {
    let mut sma = SimpleMovingAverage::new(window)?;
    let mut means = Vec::with_capacity(values.len().saturating_sub(window) + 1);

    for &value in values {
        sma.push(value);
        if let Some(avg) = sma.current() {
            means.push(avg);
        }
    }

    Ok(means)
}
