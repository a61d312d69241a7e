//! Boltzmann inversion of sampled coordinates into free-energy profiles.

pub mod histogram;
pub mod joint;

pub use histogram::invert;
pub use joint::{JointIncrements, invert_joint};
