//! Domain types used throughout the tool.
//!
//! This module defines:
//!
//! - measured launch trials (`Observation`) and the CSV column names
//! - fit outputs (`Coefficients`, `Fit`, `SolveMethod`)
//! - predictions and dataset summaries

pub mod types;

pub use types::*;
