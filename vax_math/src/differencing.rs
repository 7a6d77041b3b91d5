//! Differencing and integration of equally spaced series
//!
//! An ARIMA model with differencing order `d` is fitted on the `d`-th
//! difference of the observations. Forecasts made on the differenced
//! scale are turned back into levels by integrating once per order,
//! seeded with the last value of each intermediate differencing level.

use crate::{MathError, Result};

/// Apply `order` rounds of first differencing
///
/// Each round shortens the series by one observation. Differencing a
/// series that is not longer than `order` yields an empty vector.
pub fn difference(data: &[f64], order: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..order {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Last value of every differencing level `0..order`
///
/// Entry `k` is the final observation of the `k`-th difference, which is
/// exactly what [`integrate`] needs to undo differencing.
pub fn level_tails(data: &[f64], order: usize) -> Result<Vec<f64>> {
    if data.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "Need more than {} observations to difference {} times, got {}",
            order,
            order,
            data.len()
        )));
    }

    let mut tails = Vec::with_capacity(order);
    let mut level = data.to_vec();
    for _ in 0..order {
        // Non-empty: checked above
        tails.push(level[level.len() - 1]);
        level = difference(&level, 1);
    }

    Ok(tails)
}

/// Undo differencing for values that continue a differenced series
///
/// `tails` must come from [`level_tails`] on the original observations.
pub fn integrate(values: &[f64], tails: &[f64]) -> Vec<f64> {
    let mut result = values.to_vec();

    // Innermost level first
    for &tail in tails.iter().rev() {
        let mut running = tail;
        for value in result.iter_mut() {
            running += *value;
            *value = running;
        }
    }

    result
}
