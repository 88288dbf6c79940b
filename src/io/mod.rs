//! Input/output helpers.
//!
//! - trial table CSV read/write (`table`)
//! - fit JSON and residual CSV exports (`export`)

pub mod export;
pub mod table;

pub use export::*;
pub use table::*;
