//! Validation of user-typed numbers.
//!
//! Both front-ends funnel free-form text through here: the CLI via clap value
//! parsers, the TUI via its form fields. Nothing touches the table or the fit
//! until every field of a form has parsed.

use crate::domain::Observation;
use crate::error::AppError;

/// Parse a finite `f64` from `text`, naming `label` in the error.
pub fn parse_number(label: &str, text: &str) -> Result<f64, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::input(format!("{label}: a numeric value is required.")));
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(AppError::input(format!("{label}: '{trimmed}' is not a valid number."))),
    }
}

/// Parse a full trial from the three form fields.
pub fn parse_observation(mass: &str, force: &str, distance: &str) -> Result<Observation, AppError> {
    Ok(Observation::new(
        parse_number("Mass (g)", mass)?,
        parse_number("Pull Strength (lbs)", force)?,
        parse_number("Distance (feet)", distance)?,
    ))
}

/// clap `value_parser` adapter.
pub fn parse_cli_number(text: &str) -> Result<f64, String> {
    parse_number("value", text).map_err(|e| e.to_string())
}
