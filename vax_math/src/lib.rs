//! # Vax Math
//!
//! Numerical building blocks for fitting ARIMA models to short yearly
//! count series. This crate provides differencing and integration,
//! autocovariance estimation, the Levinson-Durbin recursion, the
//! partial-autocorrelation parameter transforms, small dense linear
//! solves and a deterministic Nelder-Mead minimizer.

use thiserror::Error;

pub mod autocorrelation;
pub mod differencing;
pub mod linalg;
pub mod optimize;
pub mod transform;

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Singular matrix: {0}")]
    Singular(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Arithmetic mean of a slice, `None` when empty
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population variance of a slice, `None` when empty
pub fn variance(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    Some(data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / data.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_variance() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data).unwrap(), 5.0);
        assert_relative_eq!(variance(&data).unwrap(), 4.0);
    }

    #[test]
    fn test_empty_slice_has_no_moments() {
        assert!(mean(&[]).is_none());
        assert!(variance(&[]).is_none());
    }
}
