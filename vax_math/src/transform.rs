//! Parameter transforms between unconstrained space and stationary models
//!
//! Every real vector maps to a vector of partial autocorrelations in
//! `(-1, 1)`, and every such vector maps to the coefficients of a
//! stationary autoregressive polynomial via the Durbin-Levinson
//! recursion. Optimizers can therefore search all of `R^n` while the
//! model they evaluate stays stationary.
//!
//! Coefficients follow the `x_t = phi_1 x_{t-1} + ... + phi_p x_{t-p}`
//! convention. An MA polynomial `1 + theta_1 B + ... + theta_q B^q` is
//! invertible exactly when `-theta` is a stationary AR coefficient vector.

use crate::{MathError, Result};

/// Largest magnitude accepted for an unconstrained parameter
///
/// Beyond this the partial autocorrelation is within 0.00125 of the unit
/// circle and the objective is treated as flat.
pub const UNCONSTRAINED_LIMIT: f64 = 20.0;

/// Partial autocorrelations used when a coefficient vector sits on or
/// outside the stationary boundary
const PACF_CLAMP: f64 = 0.99;

/// Map partial autocorrelations to AR coefficients
pub fn pacf_to_ar(pacf: &[f64]) -> Vec<f64> {
    let mut coefficients: Vec<f64> = Vec::with_capacity(pacf.len());
    for &r in pacf {
        let previous = coefficients.clone();
        let k = previous.len();
        for j in 0..k {
            coefficients[j] = previous[j] - r * previous[k - 1 - j];
        }
        coefficients.push(r);
    }
    coefficients
}

/// Map AR coefficients back to partial autocorrelations
///
/// Fails when the coefficients are not stationary.
pub fn ar_to_pacf(coefficients: &[f64]) -> Result<Vec<f64>> {
    let mut current = coefficients.to_vec();
    let mut pacf = vec![0.0; coefficients.len()];

    for k in (0..coefficients.len()).rev() {
        let r = current[k];
        if r.abs() >= 1.0 || !r.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "Coefficients are not stationary (partial autocorrelation {} at lag {})",
                r,
                k + 1
            )));
        }
        pacf[k] = r;

        let denominator = 1.0 - r * r;
        let previous: Vec<f64> = (0..k)
            .map(|j| (current[j] + r * current[k - 1 - j]) / denominator)
            .collect();
        current = previous;
    }

    Ok(pacf)
}

/// Map unconstrained reals to stationary AR coefficients
pub fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let pacf: Vec<f64> = unconstrained
        .iter()
        .map(|&x| {
            let x = x.clamp(-UNCONSTRAINED_LIMIT, UNCONSTRAINED_LIMIT);
            x / (1.0 + x * x).sqrt()
        })
        .collect();
    pacf_to_ar(&pacf)
}

/// Inverse of [`constrain_stationary`]
///
/// Coefficients outside the stationary region are pulled back inside by
/// clamping their partial autocorrelations, so this never fails for
/// finite input. Non-finite input is rejected.
pub fn unconstrain_stationary(coefficients: &[f64]) -> Result<Vec<f64>> {
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(MathError::InvalidInput(
            "Coefficients must be finite".to_string(),
        ));
    }

    let pacf = match ar_to_pacf(coefficients) {
        Ok(pacf) => pacf,
        Err(_) => {
            // Shrink towards zero until stationary
            let mut shrunk = coefficients.to_vec();
            loop {
                shrunk.iter_mut().for_each(|c| *c *= 0.5);
                if let Ok(pacf) = ar_to_pacf(&shrunk) {
                    break pacf;
                }
            }
        }
    };

    Ok(pacf
        .into_iter()
        .map(|r| {
            let r = r.clamp(-PACF_CLAMP, PACF_CLAMP);
            r / (1.0 - r * r).sqrt()
        })
        .collect())
}

/// Multiply two polynomials given as coefficient vectors, lowest power first
pub fn polynomial_multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }

    let mut product = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            product[i + j] += x * y;
        }
    }
    product
}
