//! Weighted least squares solver.
//!
//! Each IRLS iteration solves a problem of the form:
//!
//! ```text
//! minimize Σ w_i (z_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - We scale rows by `sqrt(w_i)` and solve an ordinary least squares problem.
//! - SVD handles tall design matrices directly and hands us `(X'WX)^-1` for
//!   free as `V diag(1/s^2) V'`, which is what the standard errors need.
//! - Rank is judged once per design (`numerical_rank`) before iterating; a
//!   rank-deficient design is rejected rather than solved with a pseudo-inverse.

use nalgebra::{DMatrix, DVector};

/// Solution of one weighted least squares problem.
#[derive(Debug, Clone)]
pub struct WlsSolution {
    pub beta: DVector<f64>,
    /// `(X'WX)^-1`, the unscaled coefficient covariance.
    pub xtwx_inv: DMatrix<f64>,
}

/// Numerical rank of `x` from its singular values.
///
/// Uses the usual `max(n, p) * eps * s_max` cutoff.
pub fn numerical_rank(x: &DMatrix<f64>) -> usize {
    if x.nrows() == 0 || x.ncols() == 0 {
        return 0;
    }
    let singular = x.clone().svd(false, false).singular_values;
    let s_max = singular.iter().copied().fold(0.0_f64, f64::max);
    if !(s_max.is_finite() && s_max > 0.0) {
        return 0;
    }
    let tol = (x.nrows().max(x.ncols()) as f64) * f64::EPSILON * s_max;
    singular.iter().filter(|&&s| s > tol).count()
}

/// Solve a weighted least squares problem using SVD.
///
/// Returns `None` if the weighted system is singular or produces non-finite
/// coefficients.
pub fn solve_weighted_least_squares(
    x: &DMatrix<f64>,
    z: &DVector<f64>,
    w: &DVector<f64>,
) -> Option<WlsSolution> {
    let n = x.nrows();
    let p = x.ncols();
    if z.len() != n || w.len() != n || n < p {
        return None;
    }

    let mut xw = x.clone();
    let mut zw = z.clone();
    for i in 0..n {
        let sw = w[i].max(0.0).sqrt();
        for j in 0..p {
            xw[(i, j)] *= sw;
        }
        zw[i] *= sw;
    }

    let svd = xw.svd(true, true);
    let s_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let tol = (n.max(p) as f64) * f64::EPSILON * s_max;
    if svd.singular_values.iter().any(|&s| !(s > tol)) {
        return None;
    }

    let beta = svd.solve(&zw, tol).ok()?;
    if !beta.iter().all(|v| v.is_finite()) {
        return None;
    }

    let v_t = svd.v_t.as_ref()?;
    let mut xtwx_inv = DMatrix::<f64>::zeros(p, p);
    for k in 0..p {
        let inv_s2 = 1.0 / (svd.singular_values[k] * svd.singular_values[k]);
        for i in 0..p {
            let vik = v_t[(k, i)] * inv_s2;
            for j in 0..p {
                xtwx_inv[(i, j)] += vik * v_t[(k, j)];
            }
        }
    }

    Some(WlsSolution { beta, xtwx_inv })
}
