//! Shared "selection pipeline" logic.
//!
//! sample generation -> forward selection -> backward elimination
//!
//! The CLI only handles presentation (printing and exports).

use tracing::info;

use crate::data::{SampleData, generate_sample};
use crate::domain::{RunConfig, SelectionStep};
use crate::error::AppError;
use crate::fit::{FitOptions, FittedModel, IrlsFitter, StepwiseSelector};

/// All computed outputs of a single `stepwise demo` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub sample: SampleData,
    /// Selection right after the forward phase.
    pub forward_predictors: Vec<String>,
    /// Final selection (after backward, when enabled).
    pub selected_predictors: Vec<String>,
    pub steps: Vec<SelectionStep>,
    pub model: Option<FittedModel>,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_selection(config: &RunConfig) -> Result<RunOutput, AppError> {
    // 1) Synthetic sample with known signal/decoy predictors.
    let sample = generate_sample(&config.sample, config.family)?;
    info!(
        n = sample.response.len(),
        predictors = sample.predictors.len(),
        family = %config.family,
        "generated sample"
    );

    // 2) Forward, then optionally backward.
    let fitter = IrlsFitter::new(FitOptions {
        max_iter: config.max_iter,
        tol: config.tol,
    });
    let mut selector = StepwiseSelector::new(
        sample.response.clone(),
        sample.predictors.clone(),
        config.comparator,
    )
    .with_family(config.family)
    .with_trace(config.trace)
    .with_stop_rule(config.stop_rule)
    .with_fitter(fitter);

    selector.forward()?;
    let forward_predictors = selector.selected_predictors().to_vec();

    if config.backward {
        selector.backward()?;
    }

    Ok(RunOutput {
        forward_predictors,
        selected_predictors: selector.selected_predictors().to_vec(),
        steps: selector.steps().to_vec(),
        model: selector.selected_model().cloned(),
        sample,
    })
}
