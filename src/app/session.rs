//! The editable trial table and its fit.
//!
//! Both the CLI and the TUI drive a `Session`. It owns the backing file path, the
//! in-memory rows and the fit computed from them, and keeps the three in step:
//!
//! - every edit validates first, then rewrites the file, then swaps the new rows
//!   in and refits from scratch
//! - if the write fails, neither the rows nor the fit change
//! - the fit is never updated incrementally; it is always a function of `rows`

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::domain::{DatasetStats, Fit, Observation, Prediction};
use crate::error::AppError;
use crate::fit::fit_observations;
use crate::input::parse_number;
use crate::io::{read_table, write_table};
use crate::models::solve_force;

#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    rows: Vec<Observation>,
    fit: Option<Fit>,
    /// Why `fit` is `None`, when it is.
    fit_error: Option<AppError>,
}

impl Session {
    /// Load the table at `path` and fit it.
    ///
    /// An empty (header-only) table opens fine; it simply has no fit yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let rows = read_table(&path)?;
        Ok(Self::with_rows(path, rows))
    }

    /// Create a new table file at `path` holding `rows`.
    ///
    /// Refuses to overwrite an existing file unless `overwrite` is set.
    pub fn create(path: impl Into<PathBuf>, rows: Vec<Observation>, overwrite: bool) -> Result<Self, AppError> {
        let path = path.into();
        if path.exists() && !overwrite {
            return Err(AppError::input(format!(
                "'{}' already exists (use --force to overwrite).",
                path.display()
            )));
        }
        write_table(&path, &rows)?;
        Ok(Self::with_rows(path, rows))
    }

    fn with_rows(path: PathBuf, rows: Vec<Observation>) -> Self {
        let mut session = Self {
            path,
            rows,
            fit: None,
            fit_error: None,
        };
        session.refit();
        session
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn observations(&self) -> &[Observation] {
        &self.rows
    }

    pub fn fit(&self) -> Option<&Fit> {
        self.fit.as_ref()
    }

    pub fn fit_error(&self) -> Option<&AppError> {
        self.fit_error.as_ref()
    }

    pub fn stats(&self) -> Option<DatasetStats> {
        DatasetStats::from_observations(&self.rows)
    }

    /// The current fit, or the reason there is none.
    pub fn require_fit(&self) -> Result<&Fit, AppError> {
        match (&self.fit, &self.fit_error) {
            (Some(fit), _) => Ok(fit),
            (None, Some(err)) => Err(err.clone()),
            (None, None) => Err(AppError::no_data("No fitted model.")),
        }
    }

    /// Pull force needed to reach `distance` with `mass`.
    pub fn predict(&self, mass: f64, distance: f64) -> Result<Prediction, AppError> {
        if !(mass.is_finite() && distance.is_finite()) {
            return Err(AppError::input("Mass and target distance must be finite numbers."));
        }
        let fit = self.require_fit()?;
        let force = solve_force(&fit.coefficients, mass, distance)?;
        Ok(Prediction { mass, distance, force })
    }

    /// [`Session::predict`] from raw form text.
    pub fn predict_text(&self, mass: &str, distance: &str) -> Result<Prediction, AppError> {
        let mass = parse_number("Mass (g)", mass)?;
        let distance = parse_number("Target Distance (ft)", distance)?;
        self.predict(mass, distance)
    }

    /// Append a trial. Returns its row index.
    pub fn add(&mut self, obs: Observation) -> Result<usize, AppError> {
        ensure_finite(&obs)?;
        let mut rows = self.rows.clone();
        rows.push(obs);
        self.commit(rows)?;
        log::info!("added row {}", self.rows.len() - 1);
        Ok(self.rows.len() - 1)
    }

    /// Replace the trial at `row`.
    pub fn update(&mut self, row: usize, obs: Observation) -> Result<(), AppError> {
        ensure_finite(&obs)?;
        self.check_row(row)?;
        let mut rows = self.rows.clone();
        rows[row] = obs;
        self.commit(rows)?;
        log::info!("updated row {row}");
        Ok(())
    }

    /// Delete the trials at `indices` (duplicates ignored). Returns how many were removed.
    ///
    /// Any out-of-range index rejects the whole delete. Remaining rows keep their
    /// relative order and are re-indexed from 0.
    pub fn delete(&mut self, indices: &[usize]) -> Result<usize, AppError> {
        let targets: BTreeSet<usize> = indices.iter().copied().collect();
        if targets.is_empty() {
            return Err(AppError::input("Select at least one row to delete."));
        }
        for &row in &targets {
            self.check_row(row)?;
        }

        let rows: Vec<Observation> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| !targets.contains(i))
            .map(|(_, o)| *o)
            .collect();
        self.commit(rows)?;
        log::info!("deleted {} row(s)", targets.len());
        Ok(targets.len())
    }

    /// Re-read the backing file, discarding in-memory state.
    pub fn reload(&mut self) -> Result<(), AppError> {
        let rows = read_table(&self.path)?;
        self.rows = rows;
        self.refit();
        Ok(())
    }

    fn check_row(&self, row: usize) -> Result<(), AppError> {
        if row < self.rows.len() {
            Ok(())
        } else {
            Err(AppError::input(format!(
                "Row {row} does not exist (table has {} row(s)).",
                self.rows.len()
            )))
        }
    }

    fn commit(&mut self, rows: Vec<Observation>) -> Result<(), AppError> {
        write_table(&self.path, &rows)?;
        self.rows = rows;
        self.refit();
        Ok(())
    }

    fn refit(&mut self) {
        match fit_observations(&self.rows) {
            Ok(fit) => {
                self.fit = Some(fit);
                self.fit_error = None;
            }
            Err(err) => {
                log::warn!("refit failed: {err}");
                self.fit = None;
                self.fit_error = Some(err);
            }
        }
    }
}

fn ensure_finite(obs: &Observation) -> Result<(), AppError> {
    if obs.is_finite() {
        Ok(())
    } else {
        Err(AppError::input("Mass, pull strength and distance must be finite numbers."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::plane_trials;
    use crate::domain::Coefficients;
    use crate::io::read_table;
    use crate::test_support::TempDir;

    fn trials_path(dir: &TempDir) -> PathBuf {
        dir.join("trials.csv")
    }

    fn seeded(dir: &TempDir) -> Session {
        let truth = Coefficients::new(-12.0, -0.05, 4.5);
        let mut rows = plane_trials(&truth, &[(150.0, 20.0), (300.0, 25.0), (220.0, 32.0), (400.0, 18.0)]);
        // A little off-plane noise so edits actually move the fit.
        rows[1].distance += 3.0;
        rows[3].distance -= 1.5;
        Session::create(trials_path(dir), rows, false).unwrap()
    }

    fn assert_coefficients_close(a: &Coefficients, b: &Coefficients) {
        for (x, y) in a.as_array().iter().zip(b.as_array().iter()) {
            assert!((x - y).abs() < 1e-8, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn add_then_delete_restores_coefficients() {
        let dir = TempDir::new("session");
        let mut session = seeded(&dir);
        let before = session.fit().unwrap().coefficients;

        let row = session.add(Observation::new(275.0, 30.0, 140.0)).unwrap();
        let during = session.fit().unwrap().coefficients;
        assert!((during.force - before.force).abs() > 1e-6, "edit should move the fit");

        session.delete(&[row]).unwrap();
        assert_coefficients_close(&session.fit().unwrap().coefficients, &before);
        assert_eq!(read_table(&trials_path(&dir)).unwrap(), session.observations());
    }

    #[test]
    fn non_numeric_prediction_leaves_state_untouched() {
        let dir = TempDir::new("session");
        let session = seeded(&dir);
        let rows_before = session.observations().to_vec();
        let fit_before = *session.fit().unwrap();

        let err = session.predict_text("heavy", "80").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().starts_with("Mass (g)"));
        assert!(session.predict_text("200", "").is_err());

        assert_eq!(session.observations(), rows_before.as_slice());
        assert_eq!(session.fit(), Some(&fit_before));
        assert_eq!(read_table(&trials_path(&dir)).unwrap(), rows_before);
    }

    #[test]
    fn prediction_round_trips_exact_training_point() {
        let dir = TempDir::new("session");
        let truth = Coefficients::new(5.0, 0.01, 3.0);
        let rows = plane_trials(&truth, &[(100.0, 10.0), (220.0, 14.0), (180.0, 31.0)]);
        let session = Session::create(trials_path(&dir), rows.clone(), false).unwrap();

        let p = session.predict(rows[1].mass, rows[1].distance).unwrap();
        assert!((p.force - rows[1].force).abs() < 1e-6, "{p:?}");
    }

    #[test]
    fn update_replaces_row_and_persists() {
        let dir = TempDir::new("session");
        let mut session = seeded(&dir);
        let new = Observation::new(210.0, 21.0, 70.0);

        session.update(2, new).unwrap();
        assert_eq!(session.observations()[2], new);
        assert_eq!(Session::open(trials_path(&dir)).unwrap().observations()[2], new);
    }

    #[test]
    fn out_of_range_edits_are_rejected() {
        let dir = TempDir::new("session");
        let mut session = seeded(&dir);
        let before = session.observations().to_vec();

        assert!(session.update(99, Observation::new(1.0, 1.0, 1.0)).is_err());
        assert!(session.delete(&[0, 99]).is_err());
        assert!(session.delete(&[]).is_err());
        assert!(session.add(Observation::new(f64::NAN, 1.0, 1.0)).is_err());
        assert_eq!(session.observations(), before.as_slice());
    }

    #[test]
    fn delete_collapses_duplicates_and_reindexes() {
        let dir = TempDir::new("session");
        let mut session = seeded(&dir);
        let keep = [session.observations()[1], session.observations()[3]];

        assert_eq!(session.delete(&[2, 0, 2]).unwrap(), 2);
        assert_eq!(session.observations(), keep.as_slice());
    }

    #[test]
    fn emptying_the_table_drops_the_fit() {
        let dir = TempDir::new("session");
        let mut session = seeded(&dir);
        session.delete(&[0, 1, 2, 3]).unwrap();

        assert!(session.fit().is_none());
        assert_eq!(session.predict(200.0, 50.0).unwrap_err().exit_code(), 3);

        session.add(Observation::new(200.0, 20.0, 60.0)).unwrap();
        assert!(session.fit().is_some());
    }

    #[test]
    fn create_refuses_to_clobber() {
        let dir = TempDir::new("session");
        let _ = seeded(&dir);
        assert!(Session::create(trials_path(&dir), Vec::new(), false).is_err());
        let empty = Session::create(trials_path(&dir), Vec::new(), true).unwrap();
        assert!(empty.observations().is_empty());
    }

    #[test]
    fn reload_picks_up_external_changes() {
        let dir = TempDir::new("session");
        let mut session = seeded(&dir);
        crate::io::write_table(&trials_path(&dir), &[Observation::new(1.0, 2.0, 3.0)]).unwrap();

        session.reload().unwrap();
        assert_eq!(session.observations(), &[Observation::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn unfittable_row_is_saved_and_table_still_opens() {
        let dir = TempDir::new("session");
        let mut session = seeded(&dir);

        session.add(Observation::new(1e200, 1.0, 1.0)).unwrap();
        assert!(session.fit().is_none());
        assert_eq!(session.fit_error().unwrap().exit_code(), 4);

        let mut reopened = Session::open(trials_path(&dir)).unwrap();
        assert!(reopened.fit().is_none());
        reopened.delete(&[4]).unwrap();
        assert!(reopened.fit().is_some());
    }

    #[test]
    fn table_with_extra_column_is_not_opened_or_rewritten() {
        let dir = TempDir::new("session");
        let path = trials_path(&dir);
        let text = "mass(g),pull strength(lbs),distance feet,notes\n200,20,60,windy\n";
        std::fs::write(&path, text).unwrap();

        assert_eq!(Session::open(&path).unwrap_err().exit_code(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    }
}
