//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - configuration enums (`Comparator`, `FamilyKind`, `LinkKind`, `StopRule`)
//! - the family token passed to the fitter (`FamilySpec`)
//! - search records (`SelectionStep`, `FitDiagnostic`) and the run configuration

pub mod types;

pub use types::*;
