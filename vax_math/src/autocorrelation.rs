//! Autocovariance estimation and the Levinson-Durbin recursion

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Solution of the Yule-Walker equations for a given AR order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevinsonDurbin {
    /// AR coefficients, `coefficients[i]` multiplies lag `i + 1`
    pub coefficients: Vec<f64>,
    /// Partial autocorrelations for lags `1..=order`
    pub pacf: Vec<f64>,
    /// One-step prediction error variance of the final model
    pub innovation_variance: f64,
}

/// Biased sample autocovariances for lags `0..=max_lag`
///
/// The series is centered on its sample mean and every lag is divided by
/// `n`, which keeps the autocovariance matrix positive semi-definite.
pub fn autocovariance(data: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    if data.len() <= max_lag {
        return Err(MathError::InsufficientData(format!(
            "Need more than {} observations for lag {}, got {}",
            max_lag,
            max_lag,
            data.len()
        )));
    }

    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let centered: Vec<f64> = data.iter().map(|x| x - mean).collect();

    let acov = (0..=max_lag)
        .map(|k| {
            centered[k..]
                .iter()
                .zip(centered.iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n
        })
        .collect();

    Ok(acov)
}

/// Solve the Yule-Walker equations for an AR(`order`) model
///
/// `acov` holds autocovariances for lags `0..=order`.
pub fn levinson_durbin(acov: &[f64], order: usize) -> Result<LevinsonDurbin> {
    if acov.len() <= order {
        return Err(MathError::InvalidInput(format!(
            "Need {} autocovariances for order {}, got {}",
            order + 1,
            order,
            acov.len()
        )));
    }
    if acov[0] <= 0.0 || !acov[0].is_finite() {
        return Err(MathError::CalculationError(
            "Lag-zero autocovariance must be positive".to_string(),
        ));
    }

    let mut coefficients: Vec<f64> = Vec::with_capacity(order);
    let mut pacf = Vec::with_capacity(order);
    let mut variance = acov[0];

    for k in 1..=order {
        let mut numerator = acov[k];
        for (j, coeff) in coefficients.iter().enumerate() {
            numerator -= coeff * acov[k - j - 1];
        }

        if variance <= f64::EPSILON * acov[0] {
            // Perfectly predictable; higher lags add nothing
            pacf.push(0.0);
            coefficients.push(0.0);
            continue;
        }

        let reflection = numerator / variance;
        let previous = coefficients.clone();
        for j in 0..previous.len() {
            coefficients[j] = previous[j] - reflection * previous[previous.len() - 1 - j];
        }
        coefficients.push(reflection);
        pacf.push(reflection);

        variance *= 1.0 - reflection * reflection;
    }

    Ok(LevinsonDurbin {
        coefficients,
        pacf,
        innovation_variance: variance.max(0.0),
    })
}
