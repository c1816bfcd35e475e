//! Command-line parsing for the stepwise GLM selector.
//!
//! Argument parsing and command dispatch are kept apart from the selection and
//! fitting code; `app` turns parsed arguments into a `RunConfig`.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::{Comparator, FamilyKind, LinkKind, StopRule};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "stepwise", version, about = "Greedy stepwise predictor selection for GLMs (AIC/BIC)")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a synthetic dataset with known signal and decoy predictors,
    /// run stepwise selection on it and print the report.
    Demo(DemoArgs),
}

/// Options for the demo run.
#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Response distribution.
    #[arg(long, value_enum, default_value_t = FamilyKind::Gaussian)]
    pub family: FamilyKind,

    /// Link function (defaults to the family's canonical link).
    #[arg(long, value_enum)]
    pub link: Option<LinkKind>,

    /// Information criterion driving the search.
    #[arg(short = 'c', long, value_enum, default_value_t = Comparator::Aic)]
    pub comparator: Comparator,

    /// When a step is committed (`incumbent` compares with the selected model).
    #[arg(long, value_enum, default_value_t = StopRule::Incumbent)]
    pub stop_rule: StopRule,

    /// Skip backward elimination.
    #[arg(long)]
    pub no_backward: bool,

    /// Number of observations.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub n: usize,

    /// Signal coefficients on the linear-predictor scale, one per predictor X1..Xk.
    #[arg(long, value_delimiter = ',', default_values_t = vec![2.0, 3.0])]
    pub signal: Vec<f64>,

    /// Intercept on the linear-predictor scale.
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    pub intercept: f64,

    /// Number of pure-noise predictors.
    #[arg(long, default_value_t = 2)]
    pub decoys: usize,

    /// Noise level (Gaussian sd, Gamma coefficient of variation).
    #[arg(long, default_value_t = 1.0)]
    pub noise: f64,

    /// Random seed for sample generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Print the best model summary after every candidate evaluation.
    #[arg(long)]
    pub trace: bool,

    /// Maximum IRLS iterations per fit.
    #[arg(long, default_value_t = 100)]
    pub max_iter: usize,

    /// IRLS convergence tolerance (relative deviance change).
    #[arg(long, default_value_t = 1e-8)]
    pub tol: f64,

    /// Export the selection (steps + final model) to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the committed steps to CSV.
    #[arg(long = "export-steps")]
    pub export_steps: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_defaults() {
        let cli = Cli::try_parse_from(["stepwise", "demo"]).unwrap();
        let Command::Demo(args) = cli.command;
        assert_eq!(args.family, FamilyKind::Gaussian);
        assert_eq!(args.link, None);
        assert_eq!(args.comparator, Comparator::Aic);
        assert_eq!(args.signal, vec![2.0, 3.0]);
        assert!(!args.no_backward);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn demo_flags() {
        let cli = Cli::try_parse_from([
            "stepwise", "-vv", "demo", "--family", "poisson", "--comparator", "bic", "--signal",
            "0.5,-0.25,1", "--stop-rule", "legacy", "--no-backward", "--export", "out.json",
        ])
        .unwrap();
        let Command::Demo(args) = cli.command;
        assert_eq!(cli.verbose, 2);
        assert_eq!(args.family, FamilyKind::Poisson);
        assert_eq!(args.comparator, Comparator::Bic);
        assert_eq!(args.stop_rule, StopRule::Legacy);
        assert_eq!(args.signal, vec![0.5, -0.25, 1.0]);
        assert!(args.no_backward);
        assert_eq!(args.export, Some(PathBuf::from("out.json")));
    }
}
