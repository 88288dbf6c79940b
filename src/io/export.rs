//! Exports: fit JSON and per-trial residual CSV.
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Local;

use crate::domain::{Fit, FitFile};
use crate::error::AppError;
use crate::report::ResidualReport;

/// Build the JSON document for a fit.
pub fn fit_file(fit: &Fit, data_path: &Path) -> FitFile {
    FitFile {
        tool: "launch".to_string(),
        generated: Local::now(),
        data_path: data_path.to_path_buf(),
        fit: *fit,
    }
}

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, fit: &Fit, data_path: &Path) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create fit JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &fit_file(fit, data_path))
        .map_err(|e| AppError::input(format!("Failed to write fit JSON: {e}")))?;

    log::info!("exported fit to {}", path.display());
    Ok(())
}

/// Write per-trial residuals to a CSV file.
pub fn write_residuals_csv(path: &Path, report: &ResidualReport) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_residuals_to(&mut file, report)?;
    log::info!("exported {} residual row(s) to {}", report.rows.len(), path.display());
    Ok(())
}

fn write_residuals_to<W: Write>(sink: &mut W, report: &ResidualReport) -> Result<(), AppError> {
    writeln!(sink, "row,mass_g,distance_ft,pull_lbs,pull_fit_lbs,error_lbs,error_pct")
        .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for r in &report.rows {
        let o = &r.observation;
        writeln!(
            sink,
            "{},{},{},{},{:.6},{:.6},{}",
            r.row,
            o.mass,
            o.distance,
            o.force,
            r.predicted_force,
            r.error,
            r.percent_error.map(|p| format!("{p:.4}")).unwrap_or_default(),
        )
        .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}
