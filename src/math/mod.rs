//! Numerical utilities: weighted least squares and rank checks.

pub mod ols;

pub use ols::*;
