//! Greedy stepwise predictor selection.
//!
//! `forward()` grows the selected set one predictor at a time, always taking
//! the candidate with the lowest comparator score. `backward()` then prunes the
//! selected set one predictor at a time. Which candidate a phase commits and
//! when it stops is governed by the selector's `StopRule`.
//!
//! Candidate fits within one step are independent, so they run in parallel.
//! Results are gathered in pool order and scanned sequentially, which keeps
//! tie-breaking, trace output and error precedence identical to a sequential
//! evaluation.

use std::io::Write;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::data::PredictorTable;
use crate::domain::{Comparator, FamilySpec, Phase, SelectionStep, StopRule};
use crate::error::SelectionError;
use crate::fit::fitter::{FittedModel, IrlsFitter, ModelFitter};

/// One evaluated trial model.
#[derive(Debug, Clone)]
struct Candidate {
    /// Predictor added (forward) or removed (backward).
    predictor: String,
    model: FittedModel,
    score: f64,
}

/// Stepwise selector over a fixed response and predictor table.
pub struct StepwiseSelector<F: ModelFitter = IrlsFitter> {
    response: Vec<f64>,
    predictors: PredictorTable,
    comparator: Comparator,
    scorer: fn(&FittedModel) -> f64,
    family: FamilySpec,
    trace: bool,
    out: Box<dyn Write + Send>,
    stop_rule: StopRule,
    fitter: F,
    n: usize,

    selected_predictors: Vec<String>,
    selected_model: Option<FittedModel>,
    steps: Vec<SelectionStep>,
}

impl StepwiseSelector<IrlsFitter> {
    /// Create a selector with the Gaussian-identity family, trace enabled and
    /// the default IRLS fitter. Nothing is fitted here.
    pub fn new(response: Vec<f64>, predictors: PredictorTable, comparator: Comparator) -> Self {
        let n = response.len();
        Self {
            response,
            predictors,
            comparator,
            scorer: comparator.scorer(),
            family: FamilySpec::default(),
            trace: true,
            out: Box::new(std::io::stdout()),
            stop_rule: StopRule::default(),
            fitter: IrlsFitter::default(),
            n,
            selected_predictors: Vec::new(),
            selected_model: None,
            steps: Vec::new(),
        }
    }
}

impl<F: ModelFitter> StepwiseSelector<F> {
    pub fn with_family(mut self, family: FamilySpec) -> Self {
        self.family = family;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Send trace and `summary()` output somewhere other than stdout.
    pub fn with_trace_writer(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    pub fn with_stop_rule(mut self, stop_rule: StopRule) -> Self {
        self.stop_rule = stop_rule;
        self
    }

    /// Replace the fitting collaborator.
    pub fn with_fitter<G: ModelFitter>(self, fitter: G) -> StepwiseSelector<G> {
        StepwiseSelector {
            response: self.response,
            predictors: self.predictors,
            comparator: self.comparator,
            scorer: self.scorer,
            family: self.family,
            trace: self.trace,
            out: self.out,
            stop_rule: self.stop_rule,
            fitter,
            n: self.n,
            selected_predictors: self.selected_predictors,
            selected_model: self.selected_model,
            steps: self.steps,
        }
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn family(&self) -> FamilySpec {
        self.family
    }

    pub fn stop_rule(&self) -> StopRule {
        self.stop_rule
    }

    /// Number of observations.
    pub fn n_obs(&self) -> usize {
        self.n
    }

    pub fn predictors(&self) -> &PredictorTable {
        &self.predictors
    }

    /// Selected predictors in the order they were added.
    pub fn selected_predictors(&self) -> &[String] {
        &self.selected_predictors
    }

    pub fn selected_model(&self) -> Option<&FittedModel> {
        self.selected_model.as_ref()
    }

    /// The selected model, or `NoModelSelected`.
    pub fn require_model(&self) -> Result<&FittedModel, SelectionError> {
        self.selected_model.as_ref().ok_or(SelectionError::NoModelSelected)
    }

    /// Committed steps, oldest first.
    pub fn steps(&self) -> &[SelectionStep] {
        &self.steps
    }

    /// Greedy forward addition.
    ///
    /// Each step fits `const + selected + candidate` for every predictor not yet
    /// selected and keeps the lowest score (first in table order on ties). The
    /// first addition is always committed; later ones only when the stop rule
    /// allows. A fit failure aborts the phase; earlier commits are kept.
    pub fn forward(&mut self) -> Result<(), SelectionError> {
        if self.predictors.is_empty() {
            warn!("predictor pool is empty; forward selection has nothing to add");
            return Ok(());
        }

        loop {
            let pool: Vec<String> = self
                .predictors
                .names()
                .iter()
                .filter(|name| !self.selected_predictors.contains(*name))
                .cloned()
                .collect();
            if pool.is_empty() {
                break;
            }

            let trials = pool
                .into_iter()
                .map(|candidate| {
                    let mut columns = self.selected_predictors.clone();
                    columns.push(candidate.clone());
                    (candidate, columns)
                })
                .collect();

            let mut best: Option<Candidate> = None;
            for result in self.evaluate(trials) {
                let candidate = result?;
                debug!(
                    phase = "forward",
                    predictor = %candidate.predictor,
                    score = candidate.score,
                    "candidate evaluated"
                );
                if best.as_ref().is_none_or(|b| candidate.score < b.score) {
                    best = Some(candidate);
                }
                if self.trace {
                    if let Some(b) = &best {
                        let text = b.model.summary_text();
                        writeln!(self.out, "{text}")?;
                    }
                }
            }

            let Some(best) = best else { break };
            if !self.selected_predictors.is_empty() && !self.commits(&best) {
                info!(
                    phase = "forward",
                    predictor = %best.predictor,
                    score = best.score,
                    "no candidate improves the selected model; stopping"
                );
                break;
            }

            self.selected_predictors.push(best.predictor.clone());
            self.record(Phase::Forward, best);
        }

        Ok(())
    }

    /// Greedy backward elimination over the selected predictors.
    ///
    /// Runs while more than one predictor remains, so a selection of size one
    /// (or none) is left untouched without fitting anything.
    pub fn backward(&mut self) -> Result<(), SelectionError> {
        let mut working = self.selected_predictors.clone();

        while working.len() > 1 {
            let trials = working
                .iter()
                .map(|removed| {
                    let columns: Vec<String> =
                        working.iter().filter(|p| *p != removed).cloned().collect();
                    (removed.clone(), columns)
                })
                .collect();

            let mut pick: Option<Candidate> = None;
            for result in self.evaluate(trials) {
                let candidate = result?;
                debug!(
                    phase = "backward",
                    predictor = %candidate.predictor,
                    score = candidate.score,
                    "removal evaluated"
                );
                let better = match (&pick, self.stop_rule) {
                    (None, _) => true,
                    (Some(p), StopRule::Incumbent) => candidate.score < p.score,
                    (Some(p), StopRule::Legacy) => candidate.score > p.score,
                };
                if better {
                    pick = Some(candidate);
                }
            }

            let Some(pick) = pick else { break };
            if !self.commits(&pick) {
                info!(
                    phase = "backward",
                    predictor = %pick.predictor,
                    score = pick.score,
                    "no removal improves the selected model; stopping"
                );
                break;
            }

            working.retain(|p| *p != pick.predictor);
            self.selected_predictors = working.clone();
            self.record(Phase::Backward, pick);
        }

        Ok(())
    }

    /// Write the selected model's summary to the output writer.
    pub fn summary(&mut self) -> Result<(), SelectionError> {
        let text = self.summary_text()?;
        writeln!(self.out, "{text}")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn summary_text(&self) -> Result<String, SelectionError> {
        Ok(self.require_model()?.summary_text())
    }

    /// Whether `candidate` should be committed under the stop rule.
    fn commits(&self, candidate: &Candidate) -> bool {
        match self.stop_rule {
            StopRule::Incumbent => self
                .selected_model
                .as_ref()
                .is_none_or(|incumbent| candidate.score < (self.scorer)(incumbent)),
            // Compared against the candidate's own model, so never true.
            StopRule::Legacy => candidate.score < (self.scorer)(&candidate.model),
        }
    }

    fn record(&mut self, phase: Phase, candidate: Candidate) {
        let step = SelectionStep {
            phase,
            predictor: candidate.predictor,
            score: candidate.score,
            n_predictors: self.selected_predictors.len(),
        };
        info!(
            phase = phase.display_name(),
            predictor = %step.predictor,
            score = step.score,
            comparator = self.comparator.display_name(),
            selected = step.n_predictors,
            "step committed"
        );
        self.steps.push(step);
        self.selected_model = Some(candidate.model);
    }

    /// Fit every `(predictor, columns)` trial in parallel, results in input order.
    fn evaluate(&self, trials: Vec<(String, Vec<String>)>) -> Vec<Result<Candidate, SelectionError>> {
        let response = self.response.as_slice();
        let predictors = &self.predictors;
        let fitter = &self.fitter;
        let family = self.family;
        let scorer = self.scorer;
        let n = self.n;

        trials
            .into_par_iter()
            .map(|(predictor, columns)| -> Result<Candidate, SelectionError> {
                let design = predictors.design_matrix(&columns, n)?;
                let model = fitter.fit(response, &design, family)?;
                let score = scorer(&model);
                Ok(Candidate {
                    predictor,
                    model,
                    score,
                })
            })
            .collect()
    }
}
