//! Input/output helpers.
//!
//! - committed-step CSV export (`export`)
//! - selection JSON read/write (`selection_file`)

pub mod export;
pub mod selection_file;

pub use export::*;
pub use selection_file::*;
