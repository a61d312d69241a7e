//! Fitting of potential forms to free-energy profiles.
//!
//! Responsibilities:
//!
//! - run the Newton minimizer with its retry policy (`driver`)
//! - fit one functional form to one profile (`fitter`)
//! - find the angles coupled to a dihedral (`coupled`)
//! - parameterize a whole sample set (`engine`)

pub mod coupled;
pub mod driver;
pub mod engine;
pub mod fitter;

pub use coupled::*;
pub use driver::*;
pub use engine::*;
pub use fitter::*;
