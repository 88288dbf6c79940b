//! Terminal formatting.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (and covered by snapshot-style tests)

use std::path::Path;

use crate::domain::{DatasetStats, Fit, Observation, Prediction};
use crate::report::ResidualReport;

/// Dataset stats + coefficients + solve method.
pub fn format_fit_summary(data_path: &Path, stats: Option<&DatasetStats>, fit: Option<&Fit>) -> String {
    let mut out = String::new();

    out.push_str("=== launch - distance ~ mass + pull strength ===\n");
    out.push_str(&format!("Data: {}\n", data_path.display()));

    match stats {
        Some(s) => {
            out.push_str(&format!("Trials: n={}\n", s.n_rows));
            out.push_str(&format!("  mass      [{:.2}, {:.2}] g\n", s.mass_min, s.mass_max));
            out.push_str(&format!("  pull      [{:.2}, {:.2}] lbs\n", s.force_min, s.force_max));
            out.push_str(&format!("  distance  [{:.2}, {:.2}] ft\n", s.distance_min, s.distance_max));
        }
        None => out.push_str("Trials: n=0\n"),
    }

    out.push_str("\nModel:\n");
    match fit {
        Some(fit) => {
            let c = &fit.coefficients;
            out.push_str(&format!(
                "- distance = {:.6} + {:.6}·mass + {:.6}·pull\n",
                c.intercept, c.mass, c.force
            ));
            out.push_str(&format!("- solved by: {} (n={})\n", fit.method.display_name(), fit.n));
        }
        None => out.push_str("- (no fit: add trials first)\n"),
    }

    out
}

/// The three-line prediction table shown after a query.
pub fn format_prediction(prediction: &Prediction) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<18}{:.1}\n", "Force (lbs):", prediction.force));
    out.push_str(&format!("{:<18}{}\n", "Mass (g):", prediction.mass));
    out.push_str(&format!("{:<18}{}\n", "Distance (feet):", prediction.distance));
    out
}

/// Trial table with 0-based row indices (the ids used by `data update/delete`).
pub fn format_observations(rows: &[Observation]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>5} {:>12} {:>12} {:>12}", "row", "mass(g)", "pull(lbs)", "dist(ft)").trim_end());
    out.push('\n');
    out.push_str(format!("{:->5} {:->12} {:->12} {:->12}", "", "", "", "").trim_end());
    out.push('\n');
    for (i, r) in rows.iter().enumerate() {
        out.push_str(&format!("{i:>5} {:>12} {:>12} {:>12}\n", r.mass, r.force, r.distance));
    }
    if rows.is_empty() {
        out.push_str("(no trials)\n");
    }
    out
}

/// Per-trial force residuals and percent errors.
pub fn format_residuals(report: &ResidualReport) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>5} {:>10} {:>10} {:>10} {:>10} {:>10} {:>9}",
            "row", "mass", "dist", "pull", "pull_fit", "error", "error%"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:->5} {:->10} {:->10} {:->10} {:->10} {:->10} {:->9}",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in &report.rows {
        let o = &r.observation;
        let pct = r.percent_error.map(|p| format!("{p:.2}")).unwrap_or_default();
        out.push_str(
            format!(
                "{:>5} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>9}",
                r.row, o.mass, o.distance, o.force, r.predicted_force, r.error, pct
            )
            .trim_end(),
        );
        out.push('\n');
    }

    match report.mean_abs_percent_error {
        Some(mape) => out.push_str(&format!("\nMean |error%|: {mape:.2}\n")),
        None => out.push_str("\nMean |error%|: -\n"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coefficients, SolveMethod};
    use crate::report::TrialResidual;

    #[test]
    fn prediction_table_rounds_force_only() {
        let txt = format_prediction(&Prediction {
            mass: 250.0,
            distance: 80.5,
            force: 21.349,
        });
        assert_eq!(
            txt,
            "Force (lbs):      21.3\nMass (g):         250\nDistance (feet):  80.5\n"
        );
    }

    #[test]
    fn summary_mentions_method_and_coefficients() {
        let fit = Fit {
            coefficients: Coefficients::new(1.0, 0.5, 2.0),
            method: SolveMethod::PseudoInverse,
            n: 1,
        };
        let stats = DatasetStats::from_observations(&[Observation::new(1.0, 2.0, 3.0)]);
        let txt = format_fit_summary(Path::new("trials.csv"), stats.as_ref(), Some(&fit));
        assert!(txt.contains("Trials: n=1"));
        assert!(txt.contains("distance = 1.000000 + 0.500000·mass + 2.000000·pull"));
        assert!(txt.contains("solved by: pseudo-inverse (n=1)"));
    }

    #[test]
    fn summary_without_fit() {
        let txt = format_fit_summary(Path::new("trials.csv"), None, None);
        assert!(txt.contains("Trials: n=0"));
        assert!(txt.contains("no fit"));
    }

    #[test]
    fn observations_table_lists_rows() {
        let txt = format_observations(&[Observation::new(200.0, 20.5, 61.0)]);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "    0          200         20.5           61");
    }

    #[test]
    fn residual_table_blank_percent_for_zero_force() {
        let report = ResidualReport {
            rows: vec![TrialResidual {
                row: 0,
                observation: Observation::new(1.0, 0.0, 2.0),
                predicted_force: 0.5,
                error: -0.5,
                percent_error: None,
            }],
            mean_abs_percent_error: None,
        };
        let txt = format_residuals(&report);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[2], "    0       1.00       2.00       0.00       0.50      -0.50");
        assert!(txt.ends_with("Mean |error%|: -\n"));
    }
}
