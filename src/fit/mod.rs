//! Model fitting.
//!
//! A single closed-form fit over the whole observation table.

pub mod fitter;

pub use fitter::*;
