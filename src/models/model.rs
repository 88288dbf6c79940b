//! Forward and inverse evaluation of the launch model.
//!
//! The fitter and predictor rely on three primitive operations:
//! - build a design row for a trial (for OLS)
//! - predict distance given mass and force (for plots/reports)
//! - solve for the force that reaches a target distance (the prediction)

use crate::domain::Coefficients;
use crate::error::AppError;

/// Force weights smaller than this (in absolute value) cannot be inverted.
pub const MIN_FORCE_WEIGHT: f64 = 1e-12;

/// Number of columns in the design matrix (constant, mass, force).
pub const DESIGN_LEN: usize = 3;

/// Design row for a trial. The constant term comes first (intercept).
pub fn design_row(mass: f64, force: f64) -> [f64; DESIGN_LEN] {
    [1.0, mass, force]
}

/// `distance = b0 + b1·mass + b2·force`
pub fn predict_distance(coefficients: &Coefficients, mass: f64, force: f64) -> f64 {
    coefficients.intercept + coefficients.mass * mass + coefficients.force * force
}

/// Invert the fitted plane for the pull force: `(distance - b0 - b1·mass) / b2`.
///
/// Fails when the force weight is zero, negligible or non-finite: distance does
/// not depend on force in that model, so no force reaches the target.
pub fn solve_force(coefficients: &Coefficients, mass: f64, distance: f64) -> Result<f64, AppError> {
    let b2 = coefficients.force;
    if !b2.is_finite() || b2.abs() < MIN_FORCE_WEIGHT {
        return Err(AppError::numeric(format!(
            "Cannot solve for pull strength: the fitted force weight is {b2:e}, so distance does not depend on force."
        )));
    }

    let force = (distance - coefficients.intercept - coefficients.mass * mass) / b2;
    if !force.is_finite() {
        return Err(AppError::numeric("Non-finite pull strength prediction."));
    }
    Ok(force)
}
