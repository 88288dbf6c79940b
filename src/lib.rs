//! `launch-fit` library crate.
//!
//! The binary (`launch`) is a thin wrapper around this library so that:
//!
//! - core logic (fit, predict, table edits) is testable without spawning processes
//! - the CLI and the TUI drive exactly the same session code
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod input;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;

#[cfg(test)]
mod test_support;
