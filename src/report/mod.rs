//! Reporting utilities: per-trial residuals and formatted terminal output.
//!
//! Residuals are expressed in the predictor's terms: for each measured trial we
//! ask the model which pull force would reach the measured distance with the
//! measured mass, and compare that to the force actually used.

use crate::domain::{Fit, Observation};
use crate::error::AppError;
use crate::models::solve_force;

pub mod format;

pub use format::*;

/// Fitted value and error for a single trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialResidual {
    /// 0-based row index in the table.
    pub row: usize,
    pub observation: Observation,
    /// Force the model says was needed for this trial's distance.
    pub predicted_force: f64,
    /// `observed - predicted` (lbs).
    pub error: f64,
    /// `100 · error / observed`; `None` when the observed force is zero.
    pub percent_error: Option<f64>,
}

/// Residuals for the whole table plus an aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualReport {
    pub rows: Vec<TrialResidual>,
    /// Mean of `|percent_error|` over rows where it is defined.
    pub mean_abs_percent_error: Option<f64>,
}

/// Compute force residuals for every trial under `fit`.
pub fn compute_residuals(observations: &[Observation], fit: &Fit) -> Result<ResidualReport, AppError> {
    let mut rows = Vec::with_capacity(observations.len());
    for (row, obs) in observations.iter().enumerate() {
        let predicted_force = solve_force(&fit.coefficients, obs.mass, obs.distance)?;
        let error = obs.force - predicted_force;
        let percent_error = if obs.force == 0.0 {
            None
        } else {
            Some(100.0 * error / obs.force)
        };
        rows.push(TrialResidual {
            row,
            observation: *obs,
            predicted_force,
            error,
            percent_error,
        });
    }

    let defined: Vec<f64> = rows.iter().filter_map(|r| r.percent_error).map(f64::abs).collect();
    let mean_abs_percent_error = if defined.is_empty() {
        None
    } else {
        Some(defined.iter().sum::<f64>() / defined.len() as f64)
    };

    Ok(ResidualReport {
        rows,
        mean_abs_percent_error,
    })
}
