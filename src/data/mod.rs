//! Data sources other than the CSV table.

pub mod sample;

pub use sample::*;
