//! `stepwise-glm` library crate.
//!
//! Greedy forward/backward selection of GLM predictors by AIC or BIC.
//!
//! The binary (`stepwise`) is a thin wrapper around this library so that:
//!
//! - the search is testable without spawning processes
//! - the selector and fitter can be embedded elsewhere
//!
//! ```no_run
//! use stepwise_glm::data::PredictorTable;
//! use stepwise_glm::domain::Comparator;
//! use stepwise_glm::fit::StepwiseSelector;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let predictors = PredictorTable::from_columns([
//!     ("x1", vec![0.1, 0.4, 0.9, 1.3, 2.0, 2.2]),
//!     ("x2", vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0]),
//! ])?;
//! let y = vec![0.3, 0.7, 2.1, 2.4, 4.2, 4.3];
//!
//! let mut selector = StepwiseSelector::new(y, predictors, Comparator::Aic).with_trace(false);
//! selector.forward()?;
//! selector.backward()?;
//! selector.summary()?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
