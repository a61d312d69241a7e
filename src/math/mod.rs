//! Numerical utilities: finite differences and Newton minimization.

pub mod diff;
pub mod newton;

pub use diff::*;
pub use newton::*;
