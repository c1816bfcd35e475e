//! Exponential-family distributions.
//!
//! Everything IRLS and the information criteria need from a family:
//! variance function, valid mean range, starting values, deviance,
//! Pearson chi² and log-likelihood. Implemented as small pure functions over
//! `FamilyKind` so the fitter stays generic.

use statrs::function::gamma::ln_gamma;

use crate::domain::FamilyKind;
use crate::error::FitError;

/// Smallest admissible mean for bounded families.
const MU_EPS: f64 = 1e-10;

/// Variance function `V(mu)`.
pub fn variance(kind: FamilyKind, mu: f64) -> f64 {
    match kind {
        FamilyKind::Gaussian => 1.0,
        FamilyKind::Binomial => mu * (1.0 - mu),
        FamilyKind::Poisson => mu,
        FamilyKind::Gamma => mu * mu,
    }
}

/// Clamp `mu` into the family's valid range.
///
/// Returns the clamped value and whether it changed.
pub fn clamp_mu(kind: FamilyKind, mu: f64) -> (f64, bool) {
    let clamped = match kind {
        FamilyKind::Gaussian => mu,
        FamilyKind::Binomial => mu.clamp(MU_EPS, 1.0 - MU_EPS),
        FamilyKind::Poisson | FamilyKind::Gamma => mu.max(MU_EPS),
    };
    (clamped, clamped != mu)
}

/// Check the response against the family's support.
pub fn validate_response(kind: FamilyKind, y: &[f64]) -> Result<(), FitError> {
    let invalid = |reason: &str| FitError::InvalidResponse {
        family: kind.display_name().to_string(),
        reason: reason.to_string(),
    };

    if y.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite("response contains NaN or infinity".to_string()));
    }
    match kind {
        FamilyKind::Gaussian => Ok(()),
        FamilyKind::Binomial => {
            if y.iter().any(|&v| !(0.0..=1.0).contains(&v)) {
                Err(invalid("values must lie in [0, 1]"))
            } else {
                Ok(())
            }
        }
        FamilyKind::Poisson => {
            if y.iter().any(|&v| v < 0.0) {
                Err(invalid("values must be non-negative"))
            } else {
                Ok(())
            }
        }
        FamilyKind::Gamma => {
            if y.iter().any(|&v| v <= 0.0) {
                Err(invalid("values must be strictly positive"))
            } else {
                Ok(())
            }
        }
    }
}

/// Starting means for IRLS.
pub fn starting_mu(kind: FamilyKind, y: &[f64]) -> Vec<f64> {
    match kind {
        FamilyKind::Binomial => y.iter().map(|&v| (v + 0.5) / 2.0).collect(),
        _ => {
            let mean = y.iter().sum::<f64>() / y.len().max(1) as f64;
            y.iter()
                .map(|&v| clamp_mu(kind, (v + mean) / 2.0).0)
                .collect()
        }
    }
}

/// Total deviance `Σ d(y_i, mu_i)`.
pub fn deviance(kind: FamilyKind, y: &[f64], mu: &[f64]) -> f64 {
    y.iter()
        .zip(mu.iter())
        .map(|(&yi, &mi)| unit_deviance(kind, yi, mi))
        .sum()
}

fn unit_deviance(kind: FamilyKind, y: f64, mu: f64) -> f64 {
    match kind {
        FamilyKind::Gaussian => (y - mu) * (y - mu),
        FamilyKind::Binomial => 2.0 * (xlogy(y, y / mu) + xlogy(1.0 - y, (1.0 - y) / (1.0 - mu))),
        FamilyKind::Poisson => 2.0 * (xlogy(y, y / mu) - (y - mu)),
        FamilyKind::Gamma => 2.0 * (-(y / mu).ln() + (y - mu) / mu),
    }
}

/// Pearson chi² `Σ (y - mu)^2 / V(mu)`.
pub fn pearson_chi2(kind: FamilyKind, y: &[f64], mu: &[f64]) -> f64 {
    y.iter()
        .zip(mu.iter())
        .map(|(&yi, &mi)| {
            let r = yi - mi;
            r * r / variance(kind, mi)
        })
        .sum()
}

/// Log-likelihood of the fitted means.
///
/// `scale` is only used by the Gamma family; Gaussian uses the ML scale
/// `SSE / n`, Binomial and Poisson have unit dispersion.
pub fn log_likelihood(kind: FamilyKind, y: &[f64], mu: &[f64], scale: f64) -> f64 {
    let n = y.len() as f64;
    match kind {
        FamilyKind::Gaussian => {
            let sse = deviance(kind, y, mu);
            let ml_scale = sse / n;
            -0.5 * n * ((2.0 * std::f64::consts::PI * ml_scale).ln() + 1.0)
        }
        FamilyKind::Binomial => y
            .iter()
            .zip(mu.iter())
            .map(|(&yi, &mi)| {
                -ln_gamma(yi + 1.0) - ln_gamma(2.0 - yi) + xlogy(yi, mi) + xlogy(1.0 - yi, 1.0 - mi)
            })
            .sum(),
        FamilyKind::Poisson => y
            .iter()
            .zip(mu.iter())
            .map(|(&yi, &mi)| xlogy(yi, mi) - mi - ln_gamma(yi + 1.0))
            .sum(),
        FamilyKind::Gamma => {
            let nu = 1.0 / scale;
            y.iter()
                .zip(mu.iter())
                .map(|(&yi, &mi)| {
                    let r = yi / mi;
                    nu * (nu * r).ln() - nu * r - ln_gamma(nu) - yi.ln()
                })
                .sum()
        }
    }
}

/// `x * ln(y)` with the convention `0 * ln(0) = 0`.
fn xlogy(x: f64, y: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x * y.ln() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binomial_rejects_out_of_range_response() {
        assert!(validate_response(FamilyKind::Binomial, &[0.0, 1.0, 0.5]).is_ok());
        let err = validate_response(FamilyKind::Binomial, &[0.0, 2.0]).unwrap_err();
        assert!(matches!(err, FitError::InvalidResponse { .. }));
        assert!(validate_response(FamilyKind::Gamma, &[1.0, 0.0]).is_err());
        assert!(validate_response(FamilyKind::Poisson, &[f64::NAN]).is_err());
    }

    #[test]
    fn deviance_is_zero_at_saturation() {
        let y = [1.0, 2.0, 5.0];
        for kind in [FamilyKind::Gaussian, FamilyKind::Poisson, FamilyKind::Gamma] {
            assert!(deviance(kind, &y, &y).abs() < 1e-12);
        }
    }

    #[test]
    fn gaussian_loglik_uses_ml_scale() {
        let y = [1.0, 2.0, 3.0, 4.0];
        let mu = [1.5, 1.5, 3.5, 3.5];
        // SSE = 1, n = 4, scale = 0.25
        let expected = -0.5 * 4.0 * ((2.0 * std::f64::consts::PI * 0.25).ln() + 1.0);
        let got = log_likelihood(FamilyKind::Gaussian, &y, &mu, 1.0);
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn poisson_loglik_matches_density() {
        // ln P(Y=2 | mu=3) = 2 ln 3 - 3 - ln 2
        let got = log_likelihood(FamilyKind::Poisson, &[2.0], &[3.0], 1.0);
        let expected = 2.0 * 3.0_f64.ln() - 3.0 - 2.0_f64.ln();
        assert!((got - expected).abs() < 1e-10);
    }

    #[test]
    fn binomial_loglik_matches_bernoulli() {
        let got = log_likelihood(FamilyKind::Binomial, &[1.0, 0.0], &[0.8, 0.3], 1.0);
        let expected = 0.8_f64.ln() + 0.7_f64.ln();
        assert!((got - expected).abs() < 1e-10);
    }

    #[test]
    fn starting_mu_is_valid() {
        let mu = starting_mu(FamilyKind::Binomial, &[0.0, 1.0, 1.0, 0.0]);
        assert!(mu.iter().all(|&m| m > 0.0 && m < 1.0));

        let mu = starting_mu(FamilyKind::Poisson, &[0.0, 0.0, 3.0]);
        assert!(mu.iter().all(|&m| m > 0.0));
    }
}
