//! ARIMA models for yearly count forecasting
//!
//! The series is differenced `d` times and an ARMA(p, q) model (with a
//! mean when `d == 0`) is fitted to the result by exact Gaussian maximum
//! likelihood. The likelihood comes from a Kalman filter with the
//! innovation variance concentrated out, and is maximized by Nelder-Mead
//! over unconstrained parameters that map onto stationary AR and
//! invertible MA polynomials. Start values are Yule-Walker estimates, so
//! fitting the same observations twice gives identical results.

use crate::config::{ArimaOrder, ForecastConfig};
use crate::error::{ForecastError, Result};
use crate::models::state_space::{FilterOutput, StateSpace};
use crate::models::{FittedForecastModel, ForecastModel};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use vax_math::autocorrelation::{autocovariance, levinson_durbin};
use vax_math::differencing::{difference, integrate, level_tails};
use vax_math::optimize::NelderMead;
use vax_math::transform::{constrain_stationary, polynomial_multiply, unconstrain_stationary};

/// Initial simplex edge for AR and MA parameters in unconstrained space
const COEFFICIENT_STEP: f64 = 0.25;

/// Relative spread below which a differenced series counts as constant
const DEGENERATE_TOLERANCE: f64 = 1e-10;

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct Arima {
    /// Name of the model
    name: String,
    /// Model order
    order: ArimaOrder,
    /// Optimizer iteration cap
    max_iterations: usize,
    /// Optimizer convergence tolerance
    tolerance: f64,
}

/// Estimated parameters and fit statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    /// Model name, e.g. `ARIMA(1,1,1)`
    pub model: String,
    pub order: ArimaOrder,
    /// AR coefficients, lag 1 first
    pub ar: Vec<f64>,
    /// MA coefficients, lag 1 first
    pub ma: Vec<f64>,
    /// Mean of the series, estimated only without differencing
    pub mean: Option<f64>,
    /// Innovation variance
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// Observations the likelihood was computed on, after differencing
    pub observations: usize,
    /// Optimizer iterations used
    pub iterations: usize,
    pub converged: bool,
}

/// Fitted ARIMA model
#[derive(Debug, Clone)]
pub struct FittedArima {
    name: String,
    order: ArimaOrder,
    ar: Vec<f64>,
    ma: Vec<f64>,
    mean: f64,
    sigma2: f64,
    log_likelihood: f64,
    iterations: usize,
    converged: bool,
    /// Observations on the original scale
    observations: Vec<f64>,
    /// Last value of every differencing level, for integration
    tails: Vec<f64>,
    /// One-step prediction errors on the differenced scale
    innovations: Vec<f64>,
    /// Predicted state for the first forecast period
    next_state: Vec<f64>,
    system: StateSpace,
}

impl Arima {
    /// Create a new ARIMA model with default optimizer settings
    pub fn new(order: ArimaOrder) -> Self {
        Self {
            name: order.to_string(),
            order,
            max_iterations: ForecastConfig::DEFAULT_MAX_ITERATIONS,
            tolerance: ForecastConfig::DEFAULT_TOLERANCE,
        }
    }

    /// Create the model described by a forecast configuration
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self {
            name: config.order().to_string(),
            order: config.order(),
            max_iterations: config.max_iterations(),
            tolerance: config.tolerance(),
        }
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Split an unconstrained parameter vector into AR, MA and mean
    fn unpack(&self, params: &[f64]) -> (Vec<f64>, Vec<f64>, f64) {
        let p = self.order.p();
        let q = self.order.q();

        let ar = constrain_stationary(&params[..p]);
        let ma = constrain_stationary(&params[p..p + q])
            .into_iter()
            .map(|c| -c)
            .collect();
        let mean = if self.order.includes_constant() {
            params[p + q]
        } else {
            0.0
        };

        (ar, ma, mean)
    }

    /// Filter the differenced series under a parameter vector
    fn evaluate(&self, diffed: &[f64], params: &[f64]) -> Result<(FilterOutput, f64, f64)> {
        let (ar, ma, mean) = self.unpack(params);
        let centered: Vec<f64> = diffed.iter().map(|w| w - mean).collect();
        let output = StateSpace::arma(&ar, &ma).filter(&centered)?;
        let (log_likelihood, sigma2) = output.concentrated_log_likelihood()?;
        Ok((output, log_likelihood, sigma2))
    }

    /// Yule-Walker AR start, zero MA, sample mean
    fn start_values(&self, diffed: &[f64]) -> Vec<f64> {
        let p = self.order.p();
        let mut start = Vec::with_capacity(self.order.parameter_count());

        if p > 0 {
            let ar_start = autocovariance(diffed, p)
                .and_then(|acov| levinson_durbin(&acov, p))
                .and_then(|yw| unconstrain_stationary(&yw.coefficients))
                .unwrap_or_else(|e| {
                    log::debug!("Yule-Walker start failed ({}), starting AR at zero", e);
                    vec![0.0; p]
                });
            start.extend(ar_start);
        }

        start.extend(std::iter::repeat(0.0).take(self.order.q()));

        if self.order.includes_constant() {
            start.push(vax_math::mean(diffed).unwrap_or(0.0));
        }

        start
    }

    fn simplex_steps(&self, diffed: &[f64]) -> Vec<f64> {
        let mut steps = vec![COEFFICIENT_STEP; self.order.p() + self.order.q()];
        if self.order.includes_constant() {
            let sd = vax_math::variance(diffed).unwrap_or(0.0).sqrt();
            steps.push(if sd > 0.0 { 0.1 * sd } else { 1.0 });
        }
        steps
    }

    fn check_not_degenerate(&self, diffed: &[f64]) -> Result<()> {
        let center = if self.order.includes_constant() {
            vax_math::mean(diffed).unwrap_or(0.0)
        } else {
            0.0
        };
        let scale = diffed.iter().fold(1.0_f64, |acc, w| acc.max(w.abs()));

        if diffed
            .iter()
            .all(|w| (w - center).abs() <= DEGENERATE_TOLERANCE * scale)
        {
            return Err(ForecastError::ModelFit(format!(
                "Series has zero variance after differencing; {} cannot be estimated",
                self.name
            )));
        }

        Ok(())
    }
}

impl ForecastModel for Arima {
    type Fitted = FittedArima;

    fn fit(&self, observations: &[f64]) -> Result<FittedArima> {
        let required = self.order.min_observations();
        if observations.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                actual: observations.len(),
            });
        }

        if observations.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Data(
                "Observations contain NaN or infinite values".to_string(),
            ));
        }

        let d = self.order.d();
        let diffed = difference(observations, d);
        let tails = level_tails(observations, d)?;
        self.check_not_degenerate(&diffed)?;

        let start = self.start_values(&diffed);
        let (params, iterations, converged) = if start.is_empty() {
            (start, 0, true)
        } else {
            let optimizer = NelderMead::new(self.max_iterations, self.tolerance)?
                .with_steps(self.simplex_steps(&diffed));
            let minimum = optimizer.minimize(
                |x| match self.evaluate(&diffed, x) {
                    Ok((_, log_likelihood, _)) => -log_likelihood,
                    Err(_) => f64::INFINITY,
                },
                &start,
            )?;

            if !minimum.converged {
                return Err(ForecastError::ModelFit(format!(
                    "{} did not converge within {} iterations",
                    self.name, minimum.iterations
                )));
            }

            (minimum.point, minimum.iterations, minimum.converged)
        };

        let (output, log_likelihood, sigma2) = self.evaluate(&diffed, &params)?;
        let (ar, ma, mean) = self.unpack(&params);

        log::debug!(
            "Fitted {} on {} observations in {} iterations: ar={:?} ma={:?} sigma2={:.4} loglik={:.4}",
            self.name,
            observations.len(),
            iterations,
            ar,
            ma,
            sigma2,
            log_likelihood
        );

        Ok(FittedArima {
            name: self.name.clone(),
            order: self.order,
            system: StateSpace::arma(&ar, &ma),
            ar,
            ma,
            mean,
            sigma2,
            log_likelihood,
            iterations,
            converged,
            observations: observations.to_vec(),
            tails,
            innovations: output.innovations,
            next_state: output.next_state,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedArima {
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// One-step prediction errors on the differenced scale
    pub fn residuals(&self) -> &[f64] {
        &self.innovations
    }

    /// Moving-average weights of the integrated model, `psi_0 = 1`
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let mut ar_polynomial = vec![1.0];
        ar_polynomial.extend(self.ar.iter().map(|c| -c));
        for _ in 0..self.order.d() {
            ar_polynomial = polynomial_multiply(&ar_polynomial, &[1.0, -1.0]);
        }
        let phi: Vec<f64> = ar_polynomial[1..].iter().map(|c| -c).collect();

        let mut psi = Vec::with_capacity(horizon);
        psi.push(1.0);
        for j in 1..horizon {
            let mut weight = self.ma.get(j - 1).copied().unwrap_or(0.0);
            for i in 1..=j.min(phi.len()) {
                weight += phi[i - 1] * psi[j - i];
            }
            psi.push(weight);
        }
        psi
    }
}

impl FittedForecastModel for FittedArima {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        if horizon == 0 {
            return Err(ForecastError::Configuration(
                "Forecast horizon must be positive".to_string(),
            ));
        }

        let mut state = self.next_state.clone();
        let mut diffed = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            diffed.push(self.mean + state[0]);
            state = self.system.propagate(&state);
        }

        Ok(integrate(&diffed, &self.tails))
    }

    fn forecast_intervals(
        &self,
        horizon: usize,
        confidence_level: f64,
    ) -> Result<Vec<(f64, f64)>> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(ForecastError::Configuration(format!(
                "Confidence level must be between 0 and 1, got {}",
                confidence_level
            )));
        }

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::ModelFit(format!("Normal distribution: {}", e)))?;
        let z = normal.inverse_cdf(0.5 + confidence_level / 2.0);

        let values = self.forecast(horizon)?;
        let psi = self.psi_weights(horizon);

        let mut cumulative = 0.0;
        Ok(values
            .iter()
            .zip(psi.iter())
            .map(|(value, weight)| {
                cumulative += weight * weight;
                let margin = z * (self.sigma2 * cumulative).sqrt();
                (value - margin, value + margin)
            })
            .collect())
    }

    fn fitted_values(&self) -> Vec<f64> {
        let d = self.order.d();
        self.innovations
            .iter()
            .enumerate()
            .map(|(t, v)| self.observations[t + d] - v)
            .collect()
    }

    fn summary(&self) -> FitSummary {
        let n = self.innovations.len() as f64;
        // Mean-equation parameters plus the innovation variance
        let k = (self.order.parameter_count() + 1) as f64;

        FitSummary {
            model: self.name.clone(),
            order: self.order,
            ar: self.ar.clone(),
            ma: self.ma.clone(),
            mean: self.order.includes_constant().then_some(self.mean),
            sigma2: self.sigma2,
            log_likelihood: self.log_likelihood,
            aic: 2.0 * k - 2.0 * self.log_likelihood,
            bic: k * n.ln() - 2.0 * self.log_likelihood,
            observations: self.innovations.len(),
            iterations: self.iterations,
            converged: self.converged,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
