//! The linear launch model.
//!
//! Kept as small, pure functions so the fitter, predictor, plots and reports
//! all evaluate the model the same way.

pub mod model;

pub use model::*;
