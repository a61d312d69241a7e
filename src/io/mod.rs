//! Input/output helpers.
//!
//! - sample-set JSON read/write (`samples`)
//! - records JSON export (`records`)
//! - GROMACS topology fragment (`itp`)

pub mod itp;
pub mod records;
pub mod samples;

pub use itp::*;
pub use records::*;
pub use samples::*;
