//! State-space form of a zero-mean ARMA(p, q) process and its Kalman filter
//!
//! Harvey's representation with `r = max(p, q + 1)` states:
//!
//! ```text
//! y_t         = Z a_t,            Z = [1, 0, ..., 0]
//! a_{t+1}     = T a_t + R e_t,    T[i][0] = phi_{i+1}, T[i][i+1] = 1
//!                                 R = [1, theta_1, ..., theta_{r-1}]'
//! ```
//!
//! The innovation variance is fixed at one so that the scale can be
//! concentrated out of the likelihood.

use crate::error::{ForecastError, Result};
use vax_math::linalg::{self, Matrix};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StateSpace {
    transition: Matrix,
    selection: Vec<f64>,
}

/// Output of one filtering pass
#[derive(Debug, Clone)]
pub(crate) struct FilterOutput {
    /// One-step prediction errors
    pub innovations: Vec<f64>,
    /// Their variances, in units of the innovation variance
    pub variances: Vec<f64>,
    /// State prediction for the period after the last observation
    pub next_state: Vec<f64>,
}

impl FilterOutput {
    /// Sum of squared standardized innovations
    pub fn sum_squares(&self) -> f64 {
        self.innovations
            .iter()
            .zip(self.variances.iter())
            .map(|(v, f)| v * v / f)
            .sum()
    }

    /// Sum of log innovation variances
    pub fn log_determinant(&self) -> f64 {
        self.variances.iter().map(|f| f.ln()).sum()
    }

    /// Concentrated Gaussian log-likelihood and the implied innovation
    /// variance estimate
    pub fn concentrated_log_likelihood(&self) -> Result<(f64, f64)> {
        let n = self.innovations.len() as f64;
        let sigma2 = self.sum_squares() / n;
        if !(sigma2 > 0.0 && sigma2.is_finite()) {
            return Err(ForecastError::ModelFit(
                "Innovation variance estimate is zero or not finite".to_string(),
            ));
        }

        let log_likelihood = -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + sigma2.ln() + 1.0)
            - 0.5 * self.log_determinant();

        Ok((log_likelihood, sigma2))
    }
}

impl StateSpace {
    /// Build the system matrices for AR coefficients `ar` and MA
    /// coefficients `ma`
    pub fn arma(ar: &[f64], ma: &[f64]) -> Self {
        let r = ar.len().max(ma.len() + 1);

        let mut transition = linalg::zeros(r);
        for (i, phi) in ar.iter().enumerate() {
            transition[i][0] = *phi;
        }
        for i in 0..r - 1 {
            transition[i][i + 1] = 1.0;
        }

        let mut selection = vec![0.0; r];
        selection[0] = 1.0;
        for (i, theta) in ma.iter().enumerate() {
            selection[i + 1] = *theta;
        }

        Self {
            transition,
            selection,
        }
    }

    pub fn dimension(&self) -> usize {
        self.selection.len()
    }

    /// Advance a state one period with no new shock
    pub fn propagate(&self, state: &[f64]) -> Vec<f64> {
        linalg::multiply_vector(&self.transition, state)
    }

    fn shock_covariance(&self) -> Matrix {
        self.selection
            .iter()
            .map(|a| self.selection.iter().map(|b| a * b).collect())
            .collect()
    }

    /// Unconditional state covariance of the stationary process
    pub fn stationary_covariance(&self) -> Result<Matrix> {
        linalg::solve_discrete_lyapunov(&self.transition, &self.shock_covariance()).map_err(|e| {
            ForecastError::ModelFit(format!("Cannot initialize state covariance: {}", e))
        })
    }

    /// Run the Kalman filter over zero-mean observations
    pub fn filter(&self, observations: &[f64]) -> Result<FilterOutput> {
        let r = self.dimension();
        let shock = self.shock_covariance();
        let transition_t = linalg::transpose(&self.transition);

        let mut state = vec![0.0; r];
        let mut cov = self.stationary_covariance()?;

        let mut innovations = Vec::with_capacity(observations.len());
        let mut variances = Vec::with_capacity(observations.len());

        for &y in observations {
            let f = cov[0][0];
            if !(f > 0.0 && f.is_finite()) {
                return Err(ForecastError::ModelFit(format!(
                    "Non-positive prediction variance {} in Kalman filter",
                    f
                )));
            }

            let v = y - state[0];
            innovations.push(v);
            variances.push(f);

            // Measurement update
            let gain: Vec<f64> = (0..r).map(|i| cov[i][0] / f).collect();
            let updated_state: Vec<f64> = (0..r).map(|i| state[i] + gain[i] * v).collect();
            let first_row = cov[0].clone();
            let updated_cov: Matrix = (0..r)
                .map(|i| (0..r).map(|j| cov[i][j] - gain[i] * first_row[j]).collect())
                .collect();

            // Time update
            state = self.propagate(&updated_state);
            let mut predicted =
                linalg::multiply(&linalg::multiply(&self.transition, &updated_cov), &transition_t);
            for i in 0..r {
                for j in 0..r {
                    predicted[i][j] += shock[i][j];
                }
            }
            cov = predicted;
        }

        Ok(FilterOutput {
            innovations,
            variances,
            next_state: state,
        })
    }
}
