//! Shared domain types.
//!
//! These types are kept small and serializable so they can be used in-memory
//! during the search, exported to JSON/CSV, and parsed straight from CLI flags.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::fit::FittedModel;

/// Information criterion that drives every comparison in a selector.
///
/// Lower is better for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    Aic,
    Bic,
}

impl Comparator {
    pub fn display_name(self) -> &'static str {
        match self {
            Comparator::Aic => "AIC",
            Comparator::Bic => "BIC",
        }
    }

    /// Resolve the comparator into the scoring function used by the search loops.
    pub fn scorer(self) -> fn(&FittedModel) -> f64 {
        match self {
            Comparator::Aic => aic_score,
            Comparator::Bic => bic_score,
        }
    }

    /// Read the comparator's score from a fitted model.
    pub fn score(self, model: &FittedModel) -> f64 {
        (self.scorer())(model)
    }
}

fn aic_score(model: &FittedModel) -> f64 {
    model.aic
}

fn bic_score(model: &FittedModel) -> f64 {
    model.bic
}

/// Exponential-family distribution of the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FamilyKind {
    Gaussian,
    Binomial,
    Poisson,
    Gamma,
}

impl FamilyKind {
    pub fn display_name(self) -> &'static str {
        match self {
            FamilyKind::Gaussian => "Gaussian",
            FamilyKind::Binomial => "Binomial",
            FamilyKind::Poisson => "Poisson",
            FamilyKind::Gamma => "Gamma",
        }
    }

    /// Canonical (default) link for the family.
    pub fn default_link(self) -> LinkKind {
        match self {
            FamilyKind::Gaussian => LinkKind::Identity,
            FamilyKind::Binomial => LinkKind::Logit,
            FamilyKind::Poisson => LinkKind::Log,
            FamilyKind::Gamma => LinkKind::Inverse,
        }
    }

    /// Links the fitter accepts for this family.
    pub fn supported_links(self) -> &'static [LinkKind] {
        match self {
            FamilyKind::Gaussian => &[LinkKind::Identity, LinkKind::Log, LinkKind::Inverse],
            FamilyKind::Binomial => &[LinkKind::Logit, LinkKind::Cloglog, LinkKind::Log],
            FamilyKind::Poisson => &[LinkKind::Log, LinkKind::Identity],
            FamilyKind::Gamma => &[LinkKind::Inverse, LinkKind::Log, LinkKind::Identity],
        }
    }

    /// Whether the dispersion is fixed at 1 (no scale estimate).
    pub fn fixed_scale(self) -> bool {
        matches!(self, FamilyKind::Binomial | FamilyKind::Poisson)
    }
}

/// Link function mapping the mean to the linear predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Identity,
    Log,
    Logit,
    Inverse,
    Cloglog,
}

impl LinkKind {
    pub fn display_name(self) -> &'static str {
        match self {
            LinkKind::Identity => "identity",
            LinkKind::Log => "log",
            LinkKind::Logit => "logit",
            LinkKind::Inverse => "inverse",
            LinkKind::Cloglog => "cloglog",
        }
    }
}

/// Family + link handed to the fitter.
///
/// The selector never looks inside; it only forwards the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySpec {
    pub family: FamilyKind,
    pub link: LinkKind,
}

impl FamilySpec {
    pub fn new(family: FamilyKind, link: LinkKind) -> Self {
        Self { family, link }
    }

    /// The family with its canonical link.
    pub fn canonical(family: FamilyKind) -> Self {
        Self::new(family, family.default_link())
    }

    pub fn gaussian() -> Self {
        Self::canonical(FamilyKind::Gaussian)
    }

    pub fn binomial() -> Self {
        Self::canonical(FamilyKind::Binomial)
    }

    pub fn poisson() -> Self {
        Self::canonical(FamilyKind::Poisson)
    }

    pub fn is_supported(&self) -> bool {
        self.family.supported_links().contains(&self.link)
    }
}

impl Default for FamilySpec {
    fn default() -> Self {
        Self::gaussian()
    }
}

impl std::fmt::Display for FamilySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.family.display_name(), self.link.display_name())
    }
}

/// Policy deciding when a phase stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StopRule {
    /// Commit a step only when it strictly beats the currently selected model.
    ///
    /// Backward removes the predictor whose removal gives the lowest score.
    #[default]
    Incumbent,
    /// Compare the best candidate against its own score.
    ///
    /// Forward commits one predictor and stops; backward never removes.
    Legacy,
}

/// Search phase that produced a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Forward,
    Backward,
}

impl Phase {
    pub fn display_name(self) -> &'static str {
        match self {
            Phase::Forward => "forward",
            Phase::Backward => "backward",
        }
    }
}

/// One committed step of the search (a predictor added or removed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionStep {
    pub phase: Phase,
    pub predictor: String,
    /// Comparator score of the model selected by this step.
    pub score: f64,
    /// Number of predictors selected after the step.
    pub n_predictors: usize,
}

/// Numerical events recorded on a fitted model instead of being printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitDiagnostic {
    /// IRLS hit its iteration cap before the deviance settled.
    NotConverged { iterations: usize, rel_change: f64 },
    /// Fitted means left the family's valid range and were clamped.
    MeanClamped { count: usize },
    /// The linear predictor overflowed the inverse link and was clamped.
    EtaOverflow { count: usize },
}

/// Portable record of a finished selection, written by `--export`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub comparator: Comparator,
    pub family: FamilySpec,
    pub stop_rule: StopRule,
    pub n_obs: usize,
    pub selected_predictors: Vec<String>,
    pub steps: Vec<SelectionStep>,
    pub model: Option<FittedModel>,
}

/// A full run's configuration as understood by the pipeline.
///
/// Derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub family: FamilySpec,
    pub comparator: Comparator,
    pub stop_rule: StopRule,
    pub backward: bool,
    pub trace: bool,

    pub sample: SampleConfig,

    pub max_iter: usize,
    pub tol: f64,

    pub export_json: Option<PathBuf>,
    pub export_steps: Option<PathBuf>,
}

/// Synthetic dataset parameters.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub n: usize,
    /// Coefficients of the signal predictors `X1..Xk` on the linear-predictor scale.
    pub signal: Vec<f64>,
    pub intercept: f64,
    /// Number of pure-noise predictors appended after the signal ones.
    pub decoys: usize,
    /// Gaussian standard deviation, or the Gamma coefficient of variation.
    pub noise: f64,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            n: 200,
            signal: vec![2.0, 3.0],
            intercept: 1.0,
            decoys: 2,
            noise: 1.0,
            seed: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_links_are_supported() {
        for family in [
            FamilyKind::Gaussian,
            FamilyKind::Binomial,
            FamilyKind::Poisson,
            FamilyKind::Gamma,
        ] {
            assert!(FamilySpec::canonical(family).is_supported());
        }
        assert!(!FamilySpec::new(FamilyKind::Poisson, LinkKind::Logit).is_supported());
    }

    #[test]
    fn default_family_is_gaussian_identity() {
        let spec = FamilySpec::default();
        assert_eq!(spec.family, FamilyKind::Gaussian);
        assert_eq!(spec.link, LinkKind::Identity);
        assert_eq!(spec.to_string(), "Gaussian-identity");
    }

    #[test]
    fn stop_rule_defaults_to_incumbent() {
        assert_eq!(StopRule::default(), StopRule::Incumbent);
    }
}
