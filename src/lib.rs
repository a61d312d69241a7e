//! `bonded-fit` library crate.
//!
//! Boltzmann inversion of coarse-grained bonded distributions and nonlinear
//! fitting of bonded potential forms. The binary (`bfit`) is a thin wrapper
//! around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the engine can be driven from other tools with in-memory samples

pub mod app;
pub mod boltzmann;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
