//! End-to-end selection scenarios with the IRLS fitter.
//!
//! The Gaussian fixtures make decoy predictors exactly orthogonal to the
//! intercept, the signal predictors and the response. Adding a decoy then
//! leaves the residual sum of squares unchanged, so it only costs its AIC/BIC
//! penalty and the expected selection is deterministic.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal, Poisson};

use stepwise_glm::data::{DesignMatrix, PredictorTable};
use stepwise_glm::domain::{Comparator, FamilySpec, Phase};
use stepwise_glm::error::{FitError, SelectionError};
use stepwise_glm::fit::{FittedModel, IrlsFitter, ModelFitter, StepwiseSelector};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn normal_column(rng: &mut StdRng, n: usize) -> Vec<f64> {
    let dist = Normal::new(0.0, 1.0).unwrap();
    (0..n).map(|_| dist.sample(rng)).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Remove from `v` its projection on span(`basis`).
fn orthogonalize(v: &mut [f64], basis: &[Vec<f64>]) {
    let mut q: Vec<Vec<f64>> = Vec::new();
    for b in basis {
        let mut u = b.clone();
        for qi in &q {
            let c = dot(&u, qi);
            u.iter_mut().zip(qi).for_each(|(x, y)| *x -= c * y);
        }
        let norm = dot(&u, &u).sqrt();
        if norm > 1e-12 {
            q.push(u.iter().map(|x| x / norm).collect());
        }
    }
    for qi in &q {
        let c = dot(v, qi);
        v.iter_mut().zip(qi).for_each(|(x, y)| *x -= c * y);
    }
}

/// y = 1 + 2 X1 + 3 X2 + N(0, 0.5²) with `decoys` orthogonalized noise columns.
fn gaussian_fixture(n: usize, decoys: usize, seed: u64) -> (Vec<f64>, PredictorTable) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x1 = normal_column(&mut rng, n);
    let x2 = normal_column(&mut rng, n);
    let noise = Normal::new(0.0, 0.5).unwrap();
    let y: Vec<f64> = (0..n)
        .map(|i| 1.0 + 2.0 * x1[i] + 3.0 * x2[i] + noise.sample(&mut rng))
        .collect();

    let basis = vec![vec![1.0; n], x1.clone(), x2.clone(), y.clone()];
    let mut columns = vec![("X1".to_string(), x1), ("X2".to_string(), x2)];
    for d in 0..decoys {
        let mut col = normal_column(&mut rng, n);
        orthogonalize(&mut col, &basis);
        columns.push((format!("X{}", d + 3), col));
    }

    (y, PredictorTable::from_columns(columns).unwrap())
}

fn sorted(names: &[String]) -> Vec<&str> {
    let mut v: Vec<&str> = names.iter().map(String::as_str).collect();
    v.sort_unstable();
    v
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// IRLS fitter that counts its calls.
#[derive(Default)]
struct CountingFitter {
    inner: IrlsFitter,
    fits: AtomicUsize,
}

impl ModelFitter for CountingFitter {
    fn fit(
        &self,
        response: &[f64],
        design: &DesignMatrix,
        family: FamilySpec,
    ) -> Result<FittedModel, FitError> {
        self.fits.fetch_add(1, Ordering::SeqCst);
        self.inner.fit(response, design, family)
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn forward_selects_signal_and_backward_keeps_it() {
    let (y, table) = gaussian_fixture(200, 1, 7);
    let mut sel = StepwiseSelector::new(y, table, Comparator::Aic).with_trace(false);

    sel.forward().unwrap();
    assert_eq!(sorted(sel.selected_predictors()), vec!["X1", "X2"]);
    let after_forward = sel.selected_model().unwrap().clone();

    sel.backward().unwrap();
    assert_eq!(sorted(sel.selected_predictors()), vec!["X1", "X2"]);
    assert_eq!(sel.selected_model().unwrap(), &after_forward);
    assert!(sel.steps().iter().all(|s| s.phase == Phase::Forward));
}

#[test]
fn aic_and_bic_agree_on_ground_truth() {
    for comparator in [Comparator::Aic, Comparator::Bic] {
        let (y, table) = gaussian_fixture(300, 2, 11);
        let mut sel = StepwiseSelector::new(y, table, comparator).with_trace(false);
        sel.forward().unwrap();
        sel.backward().unwrap();
        assert_eq!(
            sorted(sel.selected_predictors()),
            vec!["X1", "X2"],
            "{comparator:?} picked {:?}",
            sel.selected_predictors()
        );
    }
}

#[test]
fn empty_pool_leaves_nothing_selected() {
    let mut sel =
        StepwiseSelector::new(vec![1.0, 2.0, 3.0], PredictorTable::new(), Comparator::Aic).with_trace(false);
    sel.forward().unwrap();

    assert!(sel.selected_predictors().is_empty());
    assert!(sel.selected_model().is_none());
    assert_eq!(sel.summary().unwrap_err(), SelectionError::NoModelSelected);
    assert_eq!(sel.require_model().unwrap_err(), SelectionError::NoModelSelected);
}

#[test]
fn single_predictor_backward_is_a_no_op() {
    let (y, table) = gaussian_fixture(100, 0, 3);
    let x1 = table.column("X1").unwrap().to_vec();
    let single = PredictorTable::from_columns([("X1", x1)]).unwrap();

    let fitter = CountingFitter::default();
    let mut sel = StepwiseSelector::new(y, single, Comparator::Aic)
        .with_trace(false)
        .with_fitter(&fitter);
    sel.forward().unwrap();
    assert_eq!(sel.selected_predictors(), &["X1"]);

    let before = fitter.fits.load(Ordering::SeqCst);
    let model = sel.selected_model().cloned();
    sel.backward().unwrap();
    assert_eq!(fitter.fits.load(Ordering::SeqCst), before);
    assert_eq!(sel.selected_predictors(), &["X1"]);
    assert_eq!(sel.selected_model().cloned(), model);
}

#[test]
fn refit_of_selection_reproduces_scores() {
    let (y, table) = gaussian_fixture(200, 2, 5);
    let mut sel = StepwiseSelector::new(y.clone(), table.clone(), Comparator::Bic).with_trace(false);
    sel.forward().unwrap();
    sel.backward().unwrap();

    let stored = sel.selected_model().unwrap();
    let design = table.design_matrix(sel.selected_predictors(), y.len()).unwrap();
    let refit = IrlsFitter::default().fit(&y, &design, FamilySpec::gaussian()).unwrap();

    assert_eq!(refit.names, stored.names);
    assert!((refit.aic - stored.aic).abs() < 1e-9);
    assert!((refit.bic - stored.bic).abs() < 1e-9);
}

#[test]
fn second_forward_does_not_change_selection() {
    let (y, table) = gaussian_fixture(200, 2, 9);
    let mut sel = StepwiseSelector::new(y, table, Comparator::Aic).with_trace(false);
    sel.forward().unwrap();
    let first = sel.selected_predictors().to_vec();
    let steps = sel.steps().len();

    sel.forward().unwrap();
    assert_eq!(sel.selected_predictors(), first.as_slice());
    assert_eq!(sel.steps().len(), steps);
}

#[test]
fn collinear_candidate_fails_and_keeps_prior_commits() {
    let (y, table) = gaussian_fixture(150, 0, 13);
    let x1 = table.column("X1").unwrap().to_vec();
    let x2 = table.column("X2").unwrap().to_vec();
    let pool = PredictorTable::from_columns([("X2", x2), ("X1", x1.clone()), ("X1copy", x1)]).unwrap();

    let mut sel = StepwiseSelector::new(y, pool, Comparator::Aic).with_trace(false);
    let err = sel.forward().unwrap_err();

    assert!(matches!(err, SelectionError::Fit(FitError::RankDeficient { .. })), "{err:?}");
    assert_eq!(sorted(sel.selected_predictors()), vec!["X1", "X2"]);
    assert_eq!(sel.selected_model().unwrap().names.len(), 3);
}

#[test]
fn trace_prints_after_every_candidate() {
    let (y, table) = gaussian_fixture(120, 1, 21);
    let buf = SharedBuf::default();
    let mut sel = StepwiseSelector::new(y, table, Comparator::Aic).with_trace_writer(buf.clone());
    sel.forward().unwrap();

    let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    // Pool of 3: three candidates, then two, then the last one that is rejected.
    assert_eq!(text.matches("Dep. Variable").count(), 3 + 2 + 1);
}

#[test]
fn poisson_selection_includes_signal() {
    let n = 500;
    let mut rng = StdRng::seed_from_u64(17);
    let x1 = normal_column(&mut rng, n);
    let x2 = normal_column(&mut rng, n);
    let x3 = normal_column(&mut rng, n);
    let y: Vec<f64> = (0..n)
        .map(|i| {
            let mu = (0.5 + 0.6 * x1[i] - 0.8 * x2[i]).exp();
            Poisson::new(mu).unwrap().sample(&mut rng)
        })
        .collect();
    let table = PredictorTable::from_columns([("X1", x1), ("X2", x2), ("X3", x3)]).unwrap();

    let mut sel = StepwiseSelector::new(y, table, Comparator::Bic)
        .with_family(FamilySpec::poisson())
        .with_trace(false);
    sel.forward().unwrap();
    sel.backward().unwrap();

    let selected = sorted(sel.selected_predictors());
    assert!(selected.contains(&"X1") && selected.contains(&"X2"), "{selected:?}");
    let model = sel.selected_model().unwrap();
    assert!(model.converged);
    assert_eq!(model.scale, 1.0);
}
