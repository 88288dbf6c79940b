//! CSV read/write for the trial table.
//!
//! The backing file has exactly three named columns:
//!
//! ```text
//! mass(g),pull strength(lbs),distance feet
//! ```
//!
//! Design goals:
//! - **Strict schema**: exactly the three columns, no extras (clear errors + exit
//!   code 2); a column we could not write back would be lost on the next edit
//! - **No silent truncation**: any unparsable row fails the whole read, with
//!   line numbers, so a later rewrite never drops data
//! - **Full rewrite**: the table is always written back whole, row order preserved
//! - **Atomic replace**: writes go to a sibling temp file that is renamed over the
//!   target, so an interrupted write leaves the previous file intact

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::domain::{Observation, COLUMNS, DISTANCE_COLUMN, FORCE_COLUMN, MASS_COLUMN};
use crate::error::AppError;

/// How many row errors are spelled out before summarizing the rest.
const MAX_REPORTED_ROW_ERRORS: usize = 5;

/// A row-level error encountered while reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Read the trial table from a CSV file.
pub fn read_table(path: &Path) -> Result<Vec<Observation>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!(
            "Failed to open data file '{}': {e}. Create one with `launch data init` or `launch data generate`.",
            path.display()
        ))
    })?;
    let rows = read_table_from(file)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;
    log::info!("read {} trial(s) from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read the trial table from any CSV source.
pub fn read_table_from<R: Read>(source: R) -> Result<Vec<Observation>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    reject_unknown_columns(&headers)?;
    let columns = resolve_columns(&header_map)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        match result {
            Ok(record) => match parse_row(&record, columns) {
                Ok(obs) => rows.push(obs),
                Err(message) => row_errors.push(RowError { line, message }),
            },
            Err(e) => row_errors.push(RowError {
                line,
                message: format!("CSV parse error: {e}"),
            }),
        }
    }

    if !row_errors.is_empty() {
        return Err(AppError::input(format_row_errors(&row_errors)));
    }
    Ok(rows)
}

/// Rewrite the whole table at `path`.
pub fn write_table(path: &Path, rows: &[Observation]) -> Result<(), AppError> {
    let tmp = temp_path(path);
    {
        let file = File::create(&tmp)
            .map_err(|e| AppError::input(format!("Failed to create '{}': {e}", tmp.display())))?;
        if let Err(e) = write_table_to(file, rows) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        AppError::input(format!("Failed to replace '{}': {e}", path.display()))
    })?;

    log::info!("wrote {} trial(s) to {}", rows.len(), path.display());
    Ok(())
}

/// Write the table as CSV to any sink.
pub fn write_table_to<W: Write>(sink: W, rows: &[Observation]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);
    writer
        .write_record(COLUMNS)
        .map_err(|e| AppError::input(format!("Failed to write CSV header: {e}")))?;

    for r in rows {
        writer
            .write_record([r.mass.to_string(), r.force.to_string(), r.distance.to_string()])
            .map_err(|e| AppError::input(format!("Failed to write CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    mass: usize,
    force: usize,
    distance: usize,
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn reject_unknown_columns(headers: &StringRecord) -> Result<(), AppError> {
    let mut seen = Vec::with_capacity(COLUMNS.len());
    for raw in headers.iter() {
        let name = normalize_header_name(raw);
        if !COLUMNS.contains(&name.as_str()) {
            return Err(AppError::input(format!(
                "Unexpected column `{}`; the table must have exactly: {}",
                raw.trim(),
                COLUMNS.join(", ")
            )));
        }
        if seen.contains(&name) {
            return Err(AppError::input(format!("Duplicate column: `{name}`")));
        }
        seen.push(name);
    }
    Ok(())
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<ColumnIndex, AppError> {
    let find = |name: &str| {
        header_map
            .get(name)
            .copied()
            .ok_or_else(|| AppError::input(format!("Missing required column: `{name}`")))
    };
    Ok(ColumnIndex {
        mass: find(MASS_COLUMN)?,
        force: find(FORCE_COLUMN)?,
        distance: find(DISTANCE_COLUMN)?,
    })
}

fn parse_row(record: &StringRecord, columns: ColumnIndex) -> Result<Observation, String> {
    if record.len() != COLUMNS.len() {
        return Err(format!("Expected {} fields, found {}", COLUMNS.len(), record.len()));
    }
    Ok(Observation {
        mass: parse_field(record, columns.mass, MASS_COLUMN)?,
        force: parse_field(record, columns.force, FORCE_COLUMN)?,
        distance: parse_field(record, columns.distance, DISTANCE_COLUMN)?,
    })
}

fn parse_field(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing value for `{name}`"))?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid number '{raw}' for `{name}`")),
    }
}

fn format_row_errors(errors: &[RowError]) -> String {
    let mut out = format!("{} invalid row(s):", errors.len());
    for e in errors.iter().take(MAX_REPORTED_ROW_ERRORS) {
        out.push_str(&format!("\n  line {}: {}", e.line, e.message));
    }
    if errors.len() > MAX_REPORTED_ROW_ERRORS {
        out.push_str(&format!("\n  ... and {} more", errors.len() - MAX_REPORTED_ROW_ERRORS));
    }
    out
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "table.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_in_order_with_duplicates() {
        let csv = "mass(g),pull strength(lbs),distance feet\n200,20,60.5\n250,22.5,70\n200,20,60.5\n";
        let rows = read_table_from(csv.as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![
                Observation::new(200.0, 20.0, 60.5),
                Observation::new(250.0, 22.5, 70.0),
                Observation::new(200.0, 20.0, 60.5),
            ]
        );
    }

    #[test]
    fn headers_are_normalized_and_reordered() {
        let csv = "\u{feff}Distance Feet , MASS(G),Pull Strength(lbs)\n60,200,20\n";
        let rows = read_table_from(csv.as_bytes()).unwrap();
        assert_eq!(rows, vec![Observation::new(200.0, 20.0, 60.0)]);
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "mass(g),distance feet\n200,60\n";
        let err = read_table_from(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("pull strength(lbs)"), "{err}");
    }

    #[test]
    fn extra_column_is_rejected() {
        let csv = "mass(g),pull strength(lbs),distance feet,notes\n200,20,60,windy\n";
        let err = read_table_from(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("Unexpected column `notes`"), "{err}");

        let csv = ",mass(g),pull strength(lbs),distance feet\n0,200,20,60\n";
        assert!(read_table_from(csv.as_bytes()).is_err());

        let csv = "mass(g),mass(g),pull strength(lbs),distance feet\n1,2,3,4\n";
        assert!(read_table_from(csv.as_bytes()).unwrap_err().message().contains("Duplicate"));
    }

    #[test]
    fn rows_with_wrong_field_count_are_rejected() {
        let csv = "mass(g),pull strength(lbs),distance feet\n200,20,60,extra\n250,22\n";
        let err = read_table_from(csv.as_bytes()).unwrap_err();
        assert!(err.message().starts_with("2 invalid row(s)"), "{err}");
        assert!(err.message().contains("line 2: Expected 3 fields, found 4"), "{err}");
        assert!(err.message().contains("line 3: Expected 3 fields, found 2"), "{err}");
    }

    #[test]
    fn bad_rows_fail_the_read_with_line_numbers() {
        let csv = "mass(g),pull strength(lbs),distance feet\n200,20,60\nabc,20,60\n200,,60\n";
        let err = read_table_from(csv.as_bytes()).unwrap_err();
        assert!(err.message().starts_with("2 invalid row(s)"), "{err}");
        assert!(err.message().contains("line 3: Invalid number 'abc'"), "{err}");
        assert!(err.message().contains("line 4: Missing value for `pull strength(lbs)`"), "{err}");
    }

    #[test]
    fn header_only_file_is_an_empty_table() {
        let rows = read_table_from("mass(g),pull strength(lbs),distance feet\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn written_table_reads_back() {
        let rows = vec![
            Observation::new(200.0, 20.0, 60.25),
            Observation::new(0.1, 1e-3, 12345.678),
            Observation::new(200.0, 20.0, 60.25),
        ];
        let mut buf = Vec::new();
        write_table_to(&mut buf, &rows).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("mass(g),pull strength(lbs),distance feet\n"));
        assert_eq!(read_table_from(buf.as_slice()).unwrap(), rows);
    }

    #[test]
    fn write_table_replaces_file_and_leaves_no_temp() {
        let dir = crate::test_support::TempDir::new("table");
        let path = dir.join("trials.csv");

        write_table(&path, &[Observation::new(1.0, 2.0, 3.0)]).unwrap();
        write_table(&path, &[Observation::new(4.0, 5.0, 6.0)]).unwrap();

        assert_eq!(read_table(&path).unwrap(), vec![Observation::new(4.0, 5.0, 6.0)]);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn missing_file_mentions_init() {
        let err = read_table(Path::new("/nonexistent/launch-fit/trials.csv")).unwrap_err();
        assert!(err.message().contains("launch data init"));
    }
}
