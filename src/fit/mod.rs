//! Model fitting and stepwise selection.
//!
//! - `fitter`: the `ModelFitter` seam and the default IRLS GLM fitter
//! - `selection`: greedy forward/backward search driven by AIC or BIC

pub mod fitter;
pub mod selection;

pub use fitter::*;
pub use selection::*;
