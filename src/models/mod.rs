//! GLM building blocks: families and link functions.
//!
//! Implemented as small, pure functions so the fitter can stay generic over
//! `FamilySpec`.

pub mod family;
pub mod link;

pub use family::*;
pub use link::*;
