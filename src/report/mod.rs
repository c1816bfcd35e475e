//! Reporting: model summaries, step tables and the run report.

pub mod format;

pub use format::*;
