//! Bonded potential forms and their initial-guess heuristics.
//!
//! Models are small, pure functions of `(form, x, params)` so fitting, reporting
//! and plotting share one evaluation path.

pub mod guess;
pub mod model;

pub use guess::*;
pub use model::*;
