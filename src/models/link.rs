//! Link functions.
//!
//! Maps between the mean `mu` and the linear predictor `eta = g(mu)`.

use crate::domain::LinkKind;

/// Largest `|eta|` passed to an exponential inverse link before clamping.
pub const ETA_EXP_MAX: f64 = 700.0;

/// Apply the link function: `eta = g(mu)`.
pub fn link(kind: LinkKind, mu: f64) -> f64 {
    match kind {
        LinkKind::Identity => mu,
        LinkKind::Log => mu.ln(),
        LinkKind::Logit => (mu / (1.0 - mu)).ln(),
        LinkKind::Inverse => 1.0 / mu,
        LinkKind::Cloglog => (-(-mu).ln_1p()).ln(),
    }
}

/// Apply the inverse link: `mu = g^{-1}(eta)`.
pub fn inv_link(kind: LinkKind, eta: f64) -> f64 {
    match kind {
        LinkKind::Identity => eta,
        LinkKind::Log => eta.exp(),
        LinkKind::Logit => 1.0 / (1.0 + (-eta).exp()),
        LinkKind::Inverse => 1.0 / eta,
        LinkKind::Cloglog => -(-eta.exp()).exp_m1(),
    }
}

/// Derivative of the link with respect to the mean: `g'(mu)`.
pub fn link_deriv(kind: LinkKind, mu: f64) -> f64 {
    match kind {
        LinkKind::Identity => 1.0,
        LinkKind::Log => 1.0 / mu,
        LinkKind::Logit => 1.0 / (mu * (1.0 - mu)),
        LinkKind::Inverse => -1.0 / (mu * mu),
        LinkKind::Cloglog => -1.0 / ((1.0 - mu) * (-mu).ln_1p()),
    }
}

/// Move a starting mean inside the link's domain.
pub fn clamp_to_domain(kind: LinkKind, mu: f64) -> f64 {
    const EPS: f64 = 1e-10;
    match kind {
        LinkKind::Identity => mu,
        LinkKind::Log | LinkKind::Inverse => mu.max(EPS),
        LinkKind::Logit | LinkKind::Cloglog => mu.clamp(EPS, 1.0 - EPS),
    }
}

/// Clamp `eta` into the range where the inverse link stays finite.
///
/// Returns the (possibly clamped) value and whether clamping happened.
pub fn clamp_eta(kind: LinkKind, eta: f64) -> (f64, bool) {
    match kind {
        LinkKind::Log | LinkKind::Logit | LinkKind::Cloglog => {
            if eta.abs() > ETA_EXP_MAX {
                (eta.clamp(-ETA_EXP_MAX, ETA_EXP_MAX), true)
            } else {
                (eta, false)
            }
        }
        LinkKind::Identity | LinkKind::Inverse => (eta, false),
    }
}
