//! Reporting: formatted terminal summaries of a parameterization run.

pub mod format;

pub use format::*;
