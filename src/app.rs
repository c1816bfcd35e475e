//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - builds the run configuration
//! - runs the selection pipeline
//! - prints the report and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, DemoArgs};
use crate::domain::{FamilySpec, RunConfig, SampleConfig};
use crate::error::{AppError, EXIT_INVALID_INPUT};

pub mod pipeline;

/// Entry point for the `stepwise` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Demo(args) => handle_demo(args),
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Ignore a second initialization (tests, embedding).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let run = pipeline::run_selection(&config)?;

    println!("{}", crate::report::format_run_report(&config, &run));

    if let Some(path) = &config.export_steps {
        crate::io::write_steps_csv(path, &run.steps, config.comparator)?;
    }
    if let Some(path) = &config.export_json {
        let selection = crate::io::selection_file(&config, &run);
        crate::io::write_selection_json(path, &selection)?;
    }

    Ok(())
}

pub fn run_config_from_args(args: &DemoArgs) -> Result<RunConfig, AppError> {
    let family = FamilySpec::new(args.family, args.link.unwrap_or(args.family.default_link()));
    if !family.is_supported() {
        return Err(AppError::new(
            EXIT_INVALID_INPUT,
            format!(
                "Link '{}' is not supported for the {} family (supported: {}).",
                family.link.display_name(),
                family.family.display_name(),
                family
                    .family
                    .supported_links()
                    .iter()
                    .map(|l| l.display_name())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        ));
    }
    if args.max_iter == 0 {
        return Err(AppError::new(EXIT_INVALID_INPUT, "--max-iter must be > 0."));
    }
    if !(args.tol.is_finite() && args.tol > 0.0) {
        return Err(AppError::new(EXIT_INVALID_INPUT, "--tol must be finite and > 0."));
    }

    Ok(RunConfig {
        family,
        comparator: args.comparator,
        stop_rule: args.stop_rule,
        backward: !args.no_backward,
        trace: args.trace,
        sample: SampleConfig {
            n: args.n,
            signal: args.signal.clone(),
            intercept: args.intercept,
            decoys: args.decoys,
            noise: args.noise,
            seed: args.seed,
        },
        max_iter: args.max_iter,
        tol: args.tol,
        export_json: args.export.clone(),
        export_steps: args.export_steps.clone(),
    })
}
