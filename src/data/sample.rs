//! Synthetic datasets with a known ground truth.
//!
//! Signal predictors `X1..Xk` enter the linear predictor with the configured
//! coefficients; decoy predictors `X{k+1}..` are drawn the same way but never
//! enter the response. The response is drawn from the requested family through
//! the requested link, so the selector can be checked against the truth.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Bernoulli, Gamma, Normal, Poisson};

use crate::data::table::PredictorTable;
use crate::domain::{FamilyKind, FamilySpec, SampleConfig};
use crate::error::{AppError, EXIT_INVALID_INPUT};
use crate::models::{clamp_eta, clamp_mu, inv_link};

/// Generated dataset plus the names of the predictors that carry signal.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub response: Vec<f64>,
    pub predictors: PredictorTable,
    pub signal: Vec<String>,
    pub decoys: Vec<String>,
}

pub fn generate_sample(config: &SampleConfig, family: FamilySpec) -> Result<SampleData, AppError> {
    if config.n == 0 {
        return Err(AppError::new(EXIT_INVALID_INPUT, "Sample size must be > 0."));
    }
    if !family.is_supported() {
        return Err(AppError::new(
            EXIT_INVALID_INPUT,
            format!("Unsupported family/link combination: {family}."),
        ));
    }
    if config.signal.iter().any(|b| !b.is_finite()) || !config.intercept.is_finite() {
        return Err(AppError::new(EXIT_INVALID_INPUT, "Coefficients must be finite."));
    }
    if !(config.noise.is_finite() && config.noise > 0.0) {
        return Err(AppError::new(EXIT_INVALID_INPUT, "Noise level must be finite and > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let std_normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(EXIT_INVALID_INPUT, format!("Predictor distribution error: {e}")))?;

    let k = config.signal.len();
    let total = k + config.decoys;
    let names: Vec<String> = (1..=total).map(|i| format!("X{i}")).collect();

    let columns: Vec<Vec<f64>> = (0..total)
        .map(|_| (0..config.n).map(|_| std_normal.sample(&mut rng)).collect())
        .collect();

    let mut response = Vec::with_capacity(config.n);
    for i in 0..config.n {
        let mut eta = config.intercept;
        for (j, beta) in config.signal.iter().enumerate() {
            eta += beta * columns[j][i];
        }
        let (eta, _) = clamp_eta(family.link, eta);
        let (mu, _) = clamp_mu(family.family, inv_link(family.link, eta));
        response.push(draw_response(&mut rng, family.family, mu, config.noise)?);
    }

    let predictors = PredictorTable::from_columns(names.iter().cloned().zip(columns))?;

    Ok(SampleData {
        response,
        predictors,
        signal: names[..k].to_vec(),
        decoys: names[k..].to_vec(),
    })
}

fn draw_response(rng: &mut StdRng, family: FamilyKind, mu: f64, noise: f64) -> Result<f64, AppError> {
    let dist_err = |e: String| AppError::new(EXIT_INVALID_INPUT, format!("Response distribution error: {e}"));
    match family {
        FamilyKind::Gaussian => {
            let normal = Normal::new(mu, noise).map_err(|e| dist_err(e.to_string()))?;
            Ok(normal.sample(rng))
        }
        FamilyKind::Binomial => {
            let bernoulli = Bernoulli::new(mu).map_err(|e| dist_err(e.to_string()))?;
            Ok(if bernoulli.sample(rng) { 1.0 } else { 0.0 })
        }
        FamilyKind::Poisson => {
            let poisson = Poisson::new(mu).map_err(|e| dist_err(e.to_string()))?;
            Ok(poisson.sample(rng))
        }
        FamilyKind::Gamma => {
            // Shape 1/noise^2 gives a coefficient of variation equal to `noise`.
            let shape = 1.0 / (noise * noise);
            let gamma = Gamma::new(shape, mu / shape).map_err(|e| dist_err(e.to_string()))?;
            Ok(gamma.sample(rng).max(f64::MIN_POSITIVE))
        }
    }
}
