//! Derivative-free minimization
//!
//! Likelihood surfaces of small ARIMA models are cheap to evaluate but
//! awkward to differentiate, so the fit uses the Nelder-Mead simplex
//! method. Given the same objective and starting point the search is
//! fully deterministic.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Outcome of a minimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Minimum {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the simplex collapsed below the tolerance
    pub converged: bool,
}

/// Nelder-Mead simplex minimizer
#[derive(Debug, Clone)]
pub struct NelderMead {
    max_iterations: usize,
    tolerance: f64,
    steps: Option<Vec<f64>>,
}

impl NelderMead {
    /// Create a minimizer with an iteration cap and convergence tolerance
    pub fn new(max_iterations: usize, tolerance: f64) -> Result<Self> {
        if max_iterations == 0 {
            return Err(MathError::InvalidInput(
                "Iteration limit must be positive".to_string(),
            ));
        }
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(MathError::InvalidInput(
                "Tolerance must be a positive finite number".to_string(),
            ));
        }

        Ok(Self {
            max_iterations,
            tolerance,
            steps: None,
        })
    }

    /// Use explicit initial simplex edge lengths, one per coordinate
    pub fn with_steps(mut self, steps: Vec<f64>) -> Self {
        self.steps = Some(steps);
        self
    }

    fn initial_step(&self, index: usize, start: f64) -> f64 {
        match self.steps.as_ref().and_then(|s| s.get(index)) {
            Some(&step) if step != 0.0 => step,
            _ if start != 0.0 => 0.05 * start,
            _ => 0.00025,
        }
    }

    /// Minimize `objective` starting from `start`
    ///
    /// Non-finite objective values are treated as `+inf`, so the search
    /// backs away from regions where the objective cannot be evaluated.
    /// Running out of iterations is not an error; check
    /// [`Minimum::converged`].
    pub fn minimize<F>(&self, mut objective: F, start: &[f64]) -> Result<Minimum>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let mut eval = |x: &[f64]| {
            let value = objective(x);
            if value.is_finite() {
                value
            } else {
                f64::INFINITY
            }
        };

        let n = start.len();
        if n == 0 {
            return Ok(Minimum {
                point: Vec::new(),
                value: eval(start),
                iterations: 0,
                converged: true,
            });
        }

        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        simplex.push(start.to_vec());
        for i in 0..n {
            let mut vertex = start.to_vec();
            vertex[i] += self.initial_step(i, start[i]);
            simplex.push(vertex);
        }
        let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

        if values.iter().all(|v| v.is_infinite()) {
            return Err(MathError::CalculationError(
                "Objective is not finite anywhere on the initial simplex".to_string(),
            ));
        }

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            // Order vertices best to worst; ties keep insertion order
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            simplex = order.iter().map(|&i| simplex[i].clone()).collect();
            values = order.iter().map(|&i| values[i]).collect();

            if self.has_converged(&simplex, &values) {
                converged = true;
                break;
            }
            iterations += 1;

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|v| v[j]).sum::<f64>() / n as f64)
                .collect();
            let worst = simplex[n].clone();
            let towards = |coeff: f64| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(worst.iter())
                    .map(|(c, w)| c + coeff * (c - w))
                    .collect()
            };

            let reflected = towards(REFLECTION);
            let f_reflected = eval(&reflected);

            if f_reflected < values[0] {
                let expanded = towards(REFLECTION * EXPANSION);
                let f_expanded = eval(&expanded);
                if f_expanded < f_reflected {
                    simplex[n] = expanded;
                    values[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    values[n] = f_reflected;
                }
                continue;
            }

            if f_reflected < values[n - 1] {
                simplex[n] = reflected;
                values[n] = f_reflected;
                continue;
            }

            let (contracted, f_contracted) = if f_reflected < values[n] {
                let outside = towards(REFLECTION * CONTRACTION);
                let f_outside = eval(&outside);
                (outside, f_outside)
            } else {
                let inside = towards(-CONTRACTION);
                let f_inside = eval(&inside);
                (inside, f_inside)
            };

            if f_contracted < values[n].min(f_reflected) {
                simplex[n] = contracted;
                values[n] = f_contracted;
                continue;
            }

            // Shrink towards the best vertex
            let best = simplex[0].clone();
            for i in 1..=n {
                for j in 0..n {
                    simplex[i][j] = best[j] + SHRINK * (simplex[i][j] - best[j]);
                }
                values[i] = eval(&simplex[i]);
            }
        }

        let best = (0..=n)
            .min_by(|&a, &b| values[a].total_cmp(&values[b]))
            .unwrap_or(0);

        log::debug!(
            "Nelder-Mead finished after {} iterations (converged: {}, value: {})",
            iterations,
            converged,
            values[best]
        );

        Ok(Minimum {
            point: simplex[best].clone(),
            value: values[best],
            iterations,
            converged,
        })
    }

    fn has_converged(&self, simplex: &[Vec<f64>], values: &[f64]) -> bool {
        let best = &simplex[0];
        if !values[0].is_finite() {
            return false;
        }

        let f_spread = values[1..]
            .iter()
            .map(|v| (v - values[0]).abs())
            .fold(0.0_f64, f64::max);
        let x_spread = simplex[1..]
            .iter()
            .flat_map(|v| v.iter().zip(best.iter()).map(|(a, b)| (a - b).abs()))
            .fold(0.0_f64, f64::max);
        let x_scale = 1.0 + best.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

        f_spread <= self.tolerance * (1.0 + values[0].abs())
            && x_spread <= self.tolerance.sqrt() * x_scale
    }
}
