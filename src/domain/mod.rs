//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - interaction categories and potential forms (`Category`, `FunctionalForm`)
//! - sampled input (`SampleSet`, `Interaction`)
//! - inversion and fit outputs (`FreeEnergyProfile`, `FitResult`, `BondedRecord`)
//! - run settings (`EngineOptions`, `FitConfig`)

pub mod types;

pub use types::*;
