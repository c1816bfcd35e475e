//! GLM fitting behind the `ModelFitter` seam.
//!
//! The stepwise search only needs "fit this design with this family and give
//! me a scored model". `IrlsFitter` is the default implementation:
//!
//! - start from `mu0` (family starting values, moved inside the link's domain)
//! - iterate weighted least squares on the working response
//!   `z = eta + (y - mu) g'(mu)` with weights `w = 1 / (V(mu) g'(mu)^2)`
//! - stop when the relative deviance change drops below `tol`
//!
//! Numerical events (non-convergence, clamped means, overflowing `eta`) are
//! attached to the result as `FitDiagnostic`s rather than printed.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::DesignMatrix;
use crate::domain::{FamilySpec, FitDiagnostic};
use crate::error::FitError;
use crate::math::{numerical_rank, solve_weighted_least_squares};
use crate::models::{
    clamp_eta, clamp_mu, clamp_to_domain, deviance, inv_link, link, link_deriv, log_likelihood,
    pearson_chi2, starting_mu, validate_response, variance,
};

/// Bounds applied to IRLS working weights.
const MIN_WEIGHT: f64 = 1e-10;
const MAX_WEIGHT: f64 = 1e10;

/// Fits one GLM for a given design matrix and family.
///
/// Implementations must be safe to call from several threads at once: the
/// selector evaluates the candidates of one step in parallel.
pub trait ModelFitter: Sync {
    fn fit(
        &self,
        response: &[f64],
        design: &DesignMatrix,
        family: FamilySpec,
    ) -> Result<FittedModel, FitError>;
}

impl<F: ModelFitter + ?Sized> ModelFitter for &F {
    fn fit(
        &self,
        response: &[f64],
        design: &DesignMatrix,
        family: FamilySpec,
    ) -> Result<FittedModel, FitError> {
        (**self).fit(response, design, family)
    }
}

/// IRLS settings.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Maximum number of IRLS iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the relative deviance change.
    pub tol: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iter: 100,
            tol: 1e-8,
        }
    }
}

/// A fitted GLM with its information criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub family: FamilySpec,
    /// Column names, intercept first.
    pub names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub n_obs: usize,
    pub df_model: usize,
    pub df_resid: usize,
    /// Dispersion used for the standard errors.
    pub scale: f64,
    pub log_likelihood: f64,
    pub deviance: f64,
    pub pearson_chi2: f64,
    pub aic: f64,
    pub bic: f64,
    pub iterations: usize,
    pub converged: bool,
    pub diagnostics: Vec<FitDiagnostic>,
}

impl FittedModel {
    /// Human-readable summary table.
    pub fn summary_text(&self) -> String {
        crate::report::format_model_summary(self)
    }
}

/// Default GLM fitter (iteratively reweighted least squares).
#[derive(Debug, Clone, Default)]
pub struct IrlsFitter {
    pub options: FitOptions,
}

impl IrlsFitter {
    pub fn new(options: FitOptions) -> Self {
        Self { options }
    }
}

impl ModelFitter for IrlsFitter {
    fn fit(
        &self,
        response: &[f64],
        design: &DesignMatrix,
        family: FamilySpec,
    ) -> Result<FittedModel, FitError> {
        fit_irls(response, design, family, &self.options)
    }
}

/// Fit a GLM by IRLS.
pub fn fit_irls(
    y: &[f64],
    design: &DesignMatrix,
    family: FamilySpec,
    opts: &FitOptions,
) -> Result<FittedModel, FitError> {
    let n = y.len();
    let p = design.ncols();

    if n == 0 {
        return Err(FitError::EmptyInput("response is empty".to_string()));
    }
    if p == 0 {
        return Err(FitError::EmptyInput("design matrix has no columns".to_string()));
    }
    if design.nrows() != n {
        return Err(FitError::DimensionMismatch(format!(
            "design matrix has {} rows but the response has {n}",
            design.nrows()
        )));
    }
    if !family.is_supported() {
        return Err(FitError::UnsupportedLink {
            family: family.family.display_name().to_string(),
            link: family.link.display_name().to_string(),
        });
    }
    validate_response(family.family, y)?;
    if design.matrix.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite("design matrix contains NaN or infinity".to_string()));
    }

    let x = &design.matrix;
    let rank = numerical_rank(x);
    if rank < p {
        return Err(FitError::RankDeficient {
            rank,
            cols: p,
            columns: design.names.join(", "),
        });
    }

    let mut mu: Vec<f64> = starting_mu(family.family, y)
        .into_iter()
        .map(|m| clamp_to_domain(family.link, m))
        .collect();
    let mut eta: Vec<f64> = mu.iter().map(|&m| link(family.link, m)).collect();
    let mut dev = deviance(family.family, y, &mu);

    let mut beta = DVector::<f64>::zeros(p);
    let mut xtwx_inv = nalgebra::DMatrix::<f64>::zeros(p, p);
    let mut converged = false;
    let mut iterations = 0;
    let mut rel_change = f64::INFINITY;
    let mut eta_overflow = 0usize;
    let mut mean_clamped = 0usize;

    while iterations < opts.max_iter {
        iterations += 1;

        let mut w = DVector::<f64>::zeros(n);
        let mut z = DVector::<f64>::zeros(n);
        for i in 0..n {
            let d = link_deriv(family.link, mu[i]);
            let wi = 1.0 / (variance(family.family, mu[i]) * d * d);
            w[i] = if wi.is_finite() { wi.clamp(MIN_WEIGHT, MAX_WEIGHT) } else { MAX_WEIGHT };
            z[i] = eta[i] + (y[i] - mu[i]) * d;
        }

        let sol = solve_weighted_least_squares(x, &z, &w)
            .ok_or(FitError::SingularSystem { iteration: iterations })?;
        beta = sol.beta;
        xtwx_inv = sol.xtwx_inv;

        let eta_new = x * &beta;
        eta_overflow = 0;
        mean_clamped = 0;
        for i in 0..n {
            let (e, overflowed) = clamp_eta(family.link, eta_new[i]);
            let (m, clamped) = clamp_mu(family.family, inv_link(family.link, e));
            eta_overflow += usize::from(overflowed);
            mean_clamped += usize::from(clamped);
            eta[i] = e;
            mu[i] = m;
        }

        let dev_old = dev;
        dev = deviance(family.family, y, &mu);
        if !dev.is_finite() {
            return Err(FitError::NonFinite(format!(
                "deviance became non-finite at IRLS iteration {iterations}"
            )));
        }

        rel_change = if dev_old.abs() > 1e-10 {
            (dev_old - dev).abs() / dev_old.abs()
        } else {
            (dev_old - dev).abs()
        };
        if rel_change < opts.tol {
            converged = true;
            break;
        }
    }

    let mut diagnostics = Vec::new();
    if !converged {
        debug!(iterations, rel_change, columns = %design.names.join(","), "IRLS did not converge");
        diagnostics.push(FitDiagnostic::NotConverged { iterations, rel_change });
    }
    if mean_clamped > 0 {
        debug!(count = mean_clamped, "fitted means clamped into the family range");
        diagnostics.push(FitDiagnostic::MeanClamped { count: mean_clamped });
    }
    if eta_overflow > 0 {
        debug!(count = eta_overflow, "linear predictor clamped before the inverse link");
        diagnostics.push(FitDiagnostic::EtaOverflow { count: eta_overflow });
    }

    let df_resid = n.saturating_sub(p);
    let pearson = pearson_chi2(family.family, y, &mu);
    let scale = if family.family.fixed_scale() {
        1.0
    } else {
        pearson / df_resid.max(1) as f64
    };
    let llf = log_likelihood(family.family, y, &mu, scale);
    let std_errors = (0..p).map(|j| (scale * xtwx_inv[(j, j)]).sqrt()).collect();

    Ok(FittedModel {
        family,
        names: design.names.clone(),
        coefficients: beta.iter().copied().collect(),
        std_errors,
        n_obs: n,
        df_model: p - 1,
        df_resid,
        scale,
        log_likelihood: llf,
        deviance: dev,
        pearson_chi2: pearson,
        aic: aic(llf, p),
        bic: bic(llf, p, n),
        iterations,
        converged,
        diagnostics,
    })
}

/// Akaike information criterion: `-2 llf + 2k`.
pub fn aic(llf: f64, k: usize) -> f64 {
    -2.0 * llf + 2.0 * k as f64
}

/// Bayesian information criterion: `-2 llf + k ln(n)`.
pub fn bic(llf: f64, k: usize, n: usize) -> f64 {
    -2.0 * llf + k as f64 * (n as f64).ln()
}
