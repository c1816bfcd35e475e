//! Formatted terminal output: model summaries, step tables and the run report.
//!
//! Formatting lives here so the fitting and selection code never prints
//! anything itself.

use statrs::function::erf::erfc;

use crate::app::pipeline::RunOutput;
use crate::domain::{RunConfig, SelectionStep};
use crate::fit::FittedModel;

const RULE_WIDTH: usize = 78;
/// Two-sided 95% normal quantile.
const Z_975: f64 = 1.959_963_984_540_054;

/// Summary table of one fitted GLM.
pub fn format_model_summary(model: &FittedModel) -> String {
    let mut out = String::new();
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    out.push_str(&format!("{:^RULE_WIDTH$}\n", "Generalized Linear Model Regression Results"));
    out.push_str(&heavy);
    out.push('\n');

    let converged = if model.converged { "yes" } else { "no" };
    let rows = [
        ("Dep. Variable:", "y".to_string(), "No. Observations:", model.n_obs.to_string()),
        ("Model:", "GLM".to_string(), "Df Residuals:", model.df_resid.to_string()),
        (
            "Model Family:",
            model.family.family.display_name().to_string(),
            "Df Model:",
            model.df_model.to_string(),
        ),
        (
            "Link Function:",
            model.family.link.display_name().to_string(),
            "Scale:",
            format!("{:.4}", model.scale),
        ),
        ("Method:", "IRLS".to_string(), "Log-Likelihood:", format!("{:.3}", model.log_likelihood)),
        (
            "Deviance:",
            format!("{:.4}", model.deviance),
            "Pearson chi2:",
            format!("{:.4}", model.pearson_chi2),
        ),
        ("No. Iterations:", model.iterations.to_string(), "Converged:", converged.to_string()),
        ("AIC:", format!("{:.4}", model.aic), "BIC:", format!("{:.4}", model.bic)),
    ];
    for (l_label, l_value, r_label, r_value) in rows {
        out.push_str(&format!("{l_label:<18}{l_value:>20}   {r_label:<20}{r_value:>17}\n"));
    }
    out.push_str(&heavy);
    out.push('\n');

    out.push_str(&format!(
        "{:<14}{:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
        "", "coef", "std err", "z", "P>|z|", "[0.025", "0.975]"
    ));
    out.push_str(&light);
    out.push('\n');
    for (i, name) in model.names.iter().enumerate() {
        let coef = model.coefficients.get(i).copied().unwrap_or(f64::NAN);
        let se = model.std_errors.get(i).copied().unwrap_or(f64::NAN);
        let z = coef / se;
        out.push_str(&format!(
            "{:<14}{:>10.4} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}\n",
            truncate(name, 14),
            coef,
            se,
            z,
            p_value(z),
            coef - Z_975 * se,
            coef + Z_975 * se,
        ));
    }
    out.push_str(&heavy);

    if !model.diagnostics.is_empty() {
        out.push_str("\nDiagnostics:");
        for d in &model.diagnostics {
            out.push_str(&format!("\n- {d:?}"));
        }
    }

    out
}

/// Table of committed selection steps.
pub fn format_steps_table(steps: &[SelectionStep], score_label: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>4} {:<9} {:<16} {:>14} {:>6}\n",
        "#", "phase", "predictor", score_label, "size"
    ));
    out.push_str(&format!("{:->4} {:-<9} {:-<16} {:->14} {:->6}\n", "", "", "", "", ""));
    for (i, s) in steps.iter().enumerate() {
        let sign = match s.phase {
            crate::domain::Phase::Forward => '+',
            crate::domain::Phase::Backward => '-',
        };
        out.push_str(&format!(
            "{:>4} {:<9} {:<16} {:>14.4} {:>6}\n",
            i + 1,
            s.phase.display_name(),
            format!("{sign}{}", truncate(&s.predictor, 15)),
            s.score,
            s.n_predictors,
        ));
    }
    out
}

/// Full run report: configuration, dataset, steps and final model.
pub fn format_run_report(config: &RunConfig, run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== stepwise - GLM predictor selection ===\n");
    out.push_str(&format!(
        "Family: {} | Comparator: {} | Stop rule: {:?} | Backward: {}\n",
        config.family,
        config.comparator.display_name(),
        config.stop_rule,
        if config.backward { "on" } else { "off" },
    ));
    out.push_str(&format!(
        "Sample: n={} | seed={} | signal=[{}] ({}) | decoys=[{}]\n",
        config.sample.n,
        config.sample.seed,
        fmt_vec(&config.sample.signal),
        run.sample.signal.join(", "),
        run.sample.decoys.join(", "),
    ));

    out.push_str("\nSteps:\n");
    if run.steps.is_empty() {
        out.push_str("  (no steps committed)\n");
    } else {
        out.push_str(&format_steps_table(&run.steps, config.comparator.display_name()));
    }

    out.push_str(&format!(
        "\nAfter forward : [{}]\n",
        run.forward_predictors.join(", ")
    ));
    out.push_str(&format!(
        "Selected      : [{}]\n",
        run.selected_predictors.join(", ")
    ));

    let mut missed: Vec<&str> = run
        .sample
        .signal
        .iter()
        .filter(|s| !run.selected_predictors.contains(*s))
        .map(String::as_str)
        .collect();
    missed.sort_unstable();
    let spurious: Vec<&str> = run
        .selected_predictors
        .iter()
        .filter(|s| run.sample.decoys.contains(*s))
        .map(String::as_str)
        .collect();
    out.push_str(&format!(
        "Missed signal : [{}] | Spurious: [{}]\n",
        missed.join(", "),
        spurious.join(", ")
    ));

    if let Some(model) = &run.model {
        out.push('\n');
        out.push_str(&format_model_summary(model));
        out.push('\n');
    }

    out
}

/// Two-sided normal p-value for a z statistic.
fn p_value(z: f64) -> f64 {
    erfc(z.abs() / std::f64::consts::SQRT_2)
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x}")).collect();
    parts.join(", ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FamilySpec, FitDiagnostic, Phase};

    fn model() -> FittedModel {
        FittedModel {
            family: FamilySpec::gaussian(),
            names: vec!["const".to_string(), "X1".to_string()],
            coefficients: vec![1.0, 2.0],
            std_errors: vec![0.5, 0.1],
            n_obs: 50,
            df_model: 1,
            df_resid: 48,
            scale: 0.25,
            log_likelihood: -35.0,
            deviance: 12.0,
            pearson_chi2: 12.0,
            aic: 74.0,
            bic: 77.8,
            iterations: 2,
            converged: true,
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn p_value_matches_known_quantiles() {
        assert!((p_value(0.0) - 1.0).abs() < 1e-12);
        assert!((p_value(Z_975) - 0.05).abs() < 1e-9);
        assert!((p_value(-Z_975) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn summary_lists_every_coefficient() {
        let text = format_model_summary(&model());
        assert_eq!(text.matches("Dep. Variable").count(), 1);
        assert!(text.contains("Gaussian"));
        assert!(text.contains("identity"));
        assert!(text.lines().any(|l| l.starts_with("const")));
        assert!(text.lines().any(|l| l.starts_with("X1")));
        assert!(text.contains("74.0000"));
        assert!(!text.contains("Diagnostics"));
    }

    #[test]
    fn summary_reports_diagnostics() {
        let mut m = model();
        m.converged = false;
        m.diagnostics.push(FitDiagnostic::NotConverged { iterations: 100, rel_change: 1e-3 });
        let text = format_model_summary(&m);
        assert!(text.contains("Diagnostics"));
        assert!(text.contains("NotConverged"));
    }

    #[test]
    fn steps_table_marks_phase() {
        let steps = vec![
            SelectionStep {
                phase: Phase::Forward,
                predictor: "X1".to_string(),
                score: 10.0,
                n_predictors: 1,
            },
            SelectionStep {
                phase: Phase::Backward,
                predictor: "X1".to_string(),
                score: 9.0,
                n_predictors: 0,
            },
        ];
        let table = format_steps_table(&steps, "AIC");
        assert!(table.contains("+X1"));
        assert!(table.contains("-X1"));
        assert_eq!(table.lines().count(), 4);
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdefgh", 5), "abcd.");
    }
}
