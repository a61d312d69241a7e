//! Terminal plots of free-energy profiles and fitted potentials.

pub mod ascii;

pub use ascii::*;
