//! Data sources that do not come from a trajectory.

pub mod synthetic;

pub use synthetic::*;
