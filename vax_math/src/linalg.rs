//! Small dense linear algebra
//!
//! State-space ARIMA models never exceed a handful of states, so plain
//! row-major `Vec<Vec<f64>>` matrices and Gaussian elimination are enough.

use crate::{MathError, Result};

/// Row-major dense matrix
pub type Matrix = Vec<Vec<f64>>;

/// Pivots smaller than this (relative to the largest entry) are singular
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Square zero matrix
pub fn zeros(n: usize) -> Matrix {
    vec![vec![0.0; n]; n]
}

/// Square identity matrix
pub fn identity(n: usize) -> Matrix {
    let mut m = zeros(n);
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    m
}

/// Matrix product `a * b`
pub fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
    let cols = b.first().map_or(0, Vec::len);
    a.iter()
        .map(|row| {
            (0..cols)
                .map(|j| row.iter().zip(b.iter()).map(|(x, b_row)| x * b_row[j]).sum())
                .collect()
        })
        .collect()
}

/// Transpose of a matrix
pub fn transpose(a: &Matrix) -> Matrix {
    let cols = a.first().map_or(0, Vec::len);
    (0..cols)
        .map(|j| a.iter().map(|row| row[j]).collect())
        .collect()
}

/// Matrix-vector product `a * x`
pub fn multiply_vector(a: &Matrix, x: &[f64]) -> Vec<f64> {
    a.iter()
        .map(|row| row.iter().zip(x.iter()).map(|(a, b)| a * b).sum())
        .collect()
}

/// Solve `a * x = b` by Gaussian elimination with partial pivoting
pub fn solve(a: &Matrix, b: &[f64]) -> Result<Vec<f64>> {
    let n = a.len();
    if b.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(format!(
            "Expected a {}x{} system with a right-hand side of length {}",
            n,
            n,
            n
        )));
    }

    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return Err(MathError::Singular(
            "Coefficient matrix is zero or not finite".to_string(),
        ));
    }

    let mut m: Matrix = a.clone();
    let mut rhs = b.to_vec();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))
            .unwrap_or(col);

        if m[pivot_row][col].abs() <= PIVOT_TOLERANCE * scale {
            return Err(MathError::Singular(format!(
                "Pivot {} vanished during elimination",
                col
            )));
        }

        m.swap(col, pivot_row);
        rhs.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = m[row][col] / m[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                m[row][k] -= factor * m[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| m[row][k] * x[k]).sum();
        x[row] = (rhs[row] - tail) / m[row][row];
    }

    Ok(x)
}

/// Solve the discrete Lyapunov equation `P = T P T' + Q`
///
/// The equation is vectorized as `(I - T ⊗ T) vec(P) = vec(Q)`. A unit
/// root in `T` makes the system singular.
pub fn solve_discrete_lyapunov(t: &Matrix, q: &Matrix) -> Result<Matrix> {
    let r = t.len();
    if q.len() != r {
        return Err(MathError::InvalidInput(
            "Transition and covariance matrices must have the same size".to_string(),
        ));
    }

    let size = r * r;
    let mut system = identity(size);
    for i in 0..r {
        for j in 0..r {
            for k in 0..r {
                for l in 0..r {
                    system[i * r + j][k * r + l] -= t[i][k] * t[j][l];
                }
            }
        }
    }

    let rhs: Vec<f64> = q.iter().flat_map(|row| row.iter().copied()).collect();
    let solution = solve(&system, &rhs)?;

    let mut p = zeros(r);
    for i in 0..r {
        for j in 0..r {
            // Symmetrize away rounding noise
            p[i][j] = 0.5 * (solution[i * r + j] + solution[j * r + i]);
        }
    }

    Ok(p)
}
