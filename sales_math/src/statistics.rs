//! Descriptive statistics and differencing for value series

use crate::{MathError, Result};

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty series".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance with Bessel's correction; zero for a single observation
pub fn sample_variance(values: &[f64]) -> Result<f64> {
    let avg = mean(values)?;
    if values.len() == 1 {
        return Ok(0.0);
    }

    let sum_sq = values.iter().map(|&v| (v - avg).powi(2)).sum::<f64>();
    Ok(sum_sq / (values.len() - 1) as f64)
}

/// Sample standard deviation; zero for a single observation
pub fn sample_std_dev(values: &[f64]) -> Result<f64> {
    Ok(sample_variance(values)?.sqrt())
}

/// Difference a series `order` times.
///
/// Each pass shortens the series by one.
pub fn difference(values: &[f64], order: usize) -> Result<Vec<f64>> {
    if values.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "Need more than {} values to difference {} times, have {}",
            order,
            order,
            values.len()
        )));
    }

    let mut out = values.to_vec();
    for _ in 0..order {
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }

    Ok(out)
}

/// Undo `order` passes of differencing for values that continue `history`.
///
/// `diffs` are future values of the `order`-times differenced series;
/// the result continues `history` on the original scale.
pub fn integrate(diffs: &[f64], history: &[f64], order: usize) -> Result<Vec<f64>> {
    if order == 0 {
        return Ok(diffs.to_vec());
    }
    if history.len() < order {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} historical values to integrate {} times",
            order, order
        )));
    }

    // Last value at each differencing level, level 0 being the original series
    let mut anchors = Vec::with_capacity(order);
    for level in 0..order {
        let series = difference(history, level)?;
        if let Some(&last) = series.last() {
            anchors.push(last);
        }
    }

    let mut out = diffs.to_vec();
    for level in (0..order).rev() {
        let mut running = anchors[level];
        for value in out.iter_mut() {
            running += *value;
            *value = running;
        }
    }

    Ok(out)
}
