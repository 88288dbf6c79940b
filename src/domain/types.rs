//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and prediction
//! - exported to JSON
//! - rendered by both the CLI and the TUI

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// CSV header for the mass column (grams).
pub const MASS_COLUMN: &str = "mass(g)";
/// CSV header for the pull-force column (pounds).
pub const FORCE_COLUMN: &str = "pull strength(lbs)";
/// CSV header for the distance column (feet).
pub const DISTANCE_COLUMN: &str = "distance feet";

/// Column order used when writing the table back to disk.
pub const COLUMNS: [&str; 3] = [MASS_COLUMN, FORCE_COLUMN, DISTANCE_COLUMN];

/// A single measured launch trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Projectile mass in grams.
    pub mass: f64,
    /// Pull strength in pounds.
    pub force: f64,
    /// Travel distance in feet.
    pub distance: f64,
}

impl Observation {
    pub fn new(mass: f64, force: f64, distance: f64) -> Self {
        Self { mass, force, distance }
    }

    pub fn is_finite(&self) -> bool {
        self.mass.is_finite() && self.force.is_finite() && self.distance.is_finite()
    }
}

/// Linear model `distance = intercept + mass * m + force * f`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub intercept: f64,
    pub mass: f64,
    pub force: f64,
}

impl Coefficients {
    pub fn new(intercept: f64, mass: f64, force: f64) -> Self {
        Self { intercept, mass, force }
    }

    /// Coefficients in design-column order: `[b0, b_mass, b_force]`.
    pub fn as_array(&self) -> [f64; 3] {
        [self.intercept, self.mass, self.force]
    }

    pub fn is_finite(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite())
    }
}

/// How the least-squares system was solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolveMethod {
    /// `(XᵗX)⁻¹Xᵗy`
    NormalEquation,
    /// Minimum-norm `pinv(X)·y`, used when `XᵗX` is singular.
    PseudoInverse,
}

impl SolveMethod {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            SolveMethod::NormalEquation => "normal equation",
            SolveMethod::PseudoInverse => "pseudo-inverse",
        }
    }
}

/// Fit output for the current table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fit {
    pub coefficients: Coefficients,
    pub method: SolveMethod,
    /// Number of observations the fit was computed from.
    pub n: usize,
}

/// Answer to "what force reaches `distance` with `mass`".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub mass: f64,
    pub distance: f64,
    pub force: f64,
}

/// Summary stats about the current table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub mass_min: f64,
    pub mass_max: f64,
    pub force_min: f64,
    pub force_max: f64,
    pub distance_min: f64,
    pub distance_max: f64,
}

impl DatasetStats {
    /// Compute column ranges. Returns `None` for an empty table.
    pub fn from_observations(rows: &[Observation]) -> Option<Self> {
        let first = rows.first()?;
        let mut stats = DatasetStats {
            n_rows: rows.len(),
            mass_min: first.mass,
            mass_max: first.mass,
            force_min: first.force,
            force_max: first.force,
            distance_min: first.distance,
            distance_max: first.distance,
        };
        for r in &rows[1..] {
            stats.mass_min = stats.mass_min.min(r.mass);
            stats.mass_max = stats.mass_max.max(r.mass);
            stats.force_min = stats.force_min.min(r.force);
            stats.force_max = stats.force_max.max(r.force);
            stats.distance_min = stats.distance_min.min(r.distance);
            stats.distance_max = stats.distance_max.max(r.distance);
        }
        Some(stats)
    }
}

/// Parameters for synthetic trial generation.
///
/// Trials are drawn uniformly over the mass and force ranges; distance follows
/// `truth` plus Gaussian noise with standard deviation `noise_sd`.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    pub truth: Coefficients,
    pub mass_range: (f64, f64),
    pub force_range: (f64, f64),
    pub noise_sd: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            count: 20,
            seed: 42,
            truth: Coefficients::new(-12.0, -0.05, 4.5),
            mass_range: (150.0, 450.0),
            force_range: (10.0, 40.0),
            noise_sd: 2.0,
        }
    }
}

/// A saved fit (JSON export).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    /// Serialized as RFC 3339.
    pub generated: DateTime<Local>,
    pub data_path: PathBuf,
    pub fit: Fit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_cover_all_columns() {
        let rows = [
            Observation::new(200.0, 20.0, 60.0),
            Observation::new(300.0, 15.0, 80.0),
            Observation::new(250.0, 30.0, 40.0),
        ];
        let s = DatasetStats::from_observations(&rows).unwrap();
        assert_eq!(s.n_rows, 3);
        assert_eq!((s.mass_min, s.mass_max), (200.0, 300.0));
        assert_eq!((s.force_min, s.force_max), (15.0, 30.0));
        assert_eq!((s.distance_min, s.distance_max), (40.0, 80.0));
    }

    #[test]
    fn stats_empty_is_none() {
        assert!(DatasetStats::from_observations(&[]).is_none());
    }

    #[test]
    fn solve_method_serializes_kebab_case() {
        let s = serde_json::to_string(&SolveMethod::PseudoInverse).unwrap();
        assert_eq!(s, "\"pseudo-inverse\"");
    }
}
