//! Data containers and synthetic data.
//!
//! - `table`: the predictor table and design matrices handed to the fitter
//! - `sample`: seeded synthetic datasets with a known ground truth

pub mod sample;
pub mod table;

pub use sample::*;
pub use table::*;
