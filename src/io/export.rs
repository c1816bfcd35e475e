//! Export committed selection steps to CSV.
//!
//! One row per committed step, in the order the steps were taken.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Comparator, SelectionStep};
use crate::error::{AppError, EXIT_IO};

/// Write the step ledger to a CSV file.
pub fn write_steps_csv(path: &Path, steps: &[SelectionStep], comparator: Comparator) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to create steps CSV '{}': {e}", path.display())))?;
    write_steps(&mut file, steps, comparator)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to write steps CSV: {e}")))
}

fn write_steps(out: &mut impl Write, steps: &[SelectionStep], comparator: Comparator) -> std::io::Result<()> {
    writeln!(out, "step,phase,predictor,comparator,score,n_predictors")?;
    let criterion = comparator.display_name().to_lowercase();
    for (i, s) in steps.iter().enumerate() {
        writeln!(
            out,
            "{},{},{},{},{:.10},{}",
            i + 1,
            s.phase.display_name(),
            s.predictor,
            criterion,
            s.score,
            s.n_predictors,
        )?;
    }
    Ok(())
}
