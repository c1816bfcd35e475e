//! Error types.
//!
//! The library reports typed errors (`FitError`, `SelectionError`, `TableError`)
//! so callers can match on the failure. The `stepwise` binary folds them into
//! `AppError`, which carries the process exit code.

use thiserror::Error;

/// Exit code for invalid input or configuration.
pub const EXIT_INVALID_INPUT: u8 = 2;
/// Exit code when a summary was requested but nothing was selected.
pub const EXIT_NO_MODEL: u8 = 3;
/// Exit code for a failed GLM fit.
pub const EXIT_FIT_FAILURE: u8 = 4;
/// Exit code for filesystem / serialization failures.
pub const EXIT_IO: u8 = 5;

/// A single GLM fit could not be produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("design matrix is rank deficient (rank {rank} < {cols} columns: {columns})")]
    RankDeficient {
        rank: usize,
        cols: usize,
        columns: String,
    },

    #[error("response is invalid for the {family} family: {reason}")]
    InvalidResponse { family: String, reason: String },

    #[error("link {link} is not supported for the {family} family")]
    UnsupportedLink { family: String, link: String },

    #[error("non-finite value encountered: {0}")]
    NonFinite(String),

    #[error("weighted least squares system became singular at IRLS iteration {iteration}")]
    SingularSystem { iteration: usize },
}

/// Failures surfaced by the stepwise selector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    /// The fitting collaborator failed; propagated unmodified.
    #[error("fit failed: {0}")]
    Fit(#[from] FitError),

    /// A model accessor was used before any model was selected.
    #[error("no model selected; run forward() on a non-empty predictor pool first")]
    NoModelSelected,

    #[error("unknown predictor '{0}'")]
    UnknownPredictor(String),

    /// Writing trace or summary output failed.
    #[error("failed to write output: {0}")]
    Output(String),
}

impl From<std::io::Error> for SelectionError {
    fn from(err: std::io::Error) -> Self {
        SelectionError::Output(err.to_string())
    }
}

/// Predictor table construction errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("duplicate predictor '{0}'")]
    DuplicateName(String),

    #[error("predictor '{name}' has {got} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(EXIT_FIT_FAILURE, err.to_string())
    }
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        let code = match &err {
            SelectionError::Fit(_) => EXIT_FIT_FAILURE,
            SelectionError::NoModelSelected => EXIT_NO_MODEL,
            SelectionError::UnknownPredictor(_) => EXIT_INVALID_INPUT,
            SelectionError::Output(_) => EXIT_IO,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<TableError> for AppError {
    fn from(err: TableError) -> Self {
        AppError::new(EXIT_INVALID_INPUT, err.to_string())
    }
}
