//! Read/write selection JSON files.
//!
//! A selection file is the portable result of a run: the comparator, family
//! and stop rule used, the committed steps, the selected predictors and the
//! final model with its statistics. The schema is `domain::SelectionFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{RunConfig, SelectionFile};
use crate::error::{AppError, EXIT_INVALID_INPUT, EXIT_IO};
use crate::app::pipeline::RunOutput;

/// Build the portable record of a run.
pub fn selection_file(config: &RunConfig, run: &RunOutput) -> SelectionFile {
    SelectionFile {
        tool: "stepwise".to_string(),
        generated_at: Utc::now(),
        comparator: config.comparator,
        family: config.family,
        stop_rule: config.stop_rule,
        n_obs: run.sample.response.len(),
        selected_predictors: run.selected_predictors.clone(),
        steps: run.steps.clone(),
        model: run.model.clone(),
    }
}

/// Write a selection JSON file.
pub fn write_selection_json(path: &Path, selection: &SelectionFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to create selection JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, selection)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to write selection JSON: {e}")))?;

    Ok(())
}

/// Read a selection JSON file.
pub fn read_selection_json(path: &Path) -> Result<SelectionFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to open selection JSON '{}': {e}", path.display())))?;
    let selection: SelectionFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(EXIT_INVALID_INPUT, format!("Invalid selection JSON: {e}")))?;
    Ok(selection)
}
