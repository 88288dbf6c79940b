//! Terminal-independent TUI state and key handling.
//!
//! Everything the screens show lives here, so key flows can be tested without a
//! terminal. Rendering only reads this state.

use std::collections::BTreeSet;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::session::Session;
use crate::domain::Prediction;
use crate::error::AppError;
use crate::input::parse_observation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Predict,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFocus {
    Form,
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Dismissed by any key.
    Error { title: String, message: String },
    /// Waits for y/n.
    ConfirmDelete(Vec<usize>),
}

#[derive(Debug, Clone)]
pub struct TextField {
    pub label: &'static str,
    pub value: String,
}

impl TextField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
        }
    }
}

pub struct TuiState {
    pub(super) session: Session,
    pub(super) screen: Screen,
    /// Mass and target distance.
    pub(super) predict_fields: [TextField; 2],
    pub(super) predict_focus: usize,
    pub(super) prediction: Option<Prediction>,
    /// Mass, pull strength and distance of a trial.
    pub(super) data_fields: [TextField; 3],
    pub(super) data_field_focus: usize,
    pub(super) data_focus: DataFocus,
    pub(super) cursor: usize,
    pub(super) marked: BTreeSet<usize>,
    pub(super) modal: Option<Modal>,
    pub(super) status: String,
}

impl TuiState {
    pub fn new(session: Session) -> Self {
        let status = match session.fit_error() {
            Some(err) => format!("No model: {err}"),
            None => format!("Loaded {} trial(s) from {}", session.observations().len(), session.path().display()),
        };
        Self {
            session,
            screen: Screen::Predict,
            predict_fields: [TextField::new("Mass (g)"), TextField::new("Target Distance (ft)")],
            predict_focus: 0,
            prediction: None,
            data_fields: [
                TextField::new("Mass (g)"),
                TextField::new("Pull Strength (lbs)"),
                TextField::new("Distance (feet)"),
            ],
            data_field_focus: 0,
            data_focus: DataFocus::Form,
            cursor: 0,
            marked: BTreeSet::new(),
            modal: None,
            status,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Rows an update/delete would act on: the marked set, or the cursor row.
    pub fn selection(&self) -> Vec<usize> {
        if !self.marked.is_empty() {
            return self.marked.iter().copied().collect();
        }
        if self.cursor < self.session.observations().len() {
            vec![self.cursor]
        } else {
            Vec::new()
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        if let Some(modal) = self.modal.take() {
            self.handle_modal_key(modal, key.code);
            return Flow::Continue;
        }

        if ctrl && key.code == KeyCode::Char('r') {
            self.reload();
            return Flow::Continue;
        }

        match self.screen {
            Screen::Predict => self.handle_predict_key(key.code, ctrl),
            Screen::Data => {
                self.handle_data_key(key.code, ctrl);
                Flow::Continue
            }
        }
    }

    fn handle_modal_key(&mut self, modal: Modal, code: KeyCode) {
        match modal {
            Modal::Error { .. } => {}
            Modal::ConfirmDelete(rows) => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.delete_rows(&rows),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.status = "Delete canceled.".to_string();
                }
                _ => self.modal = Some(Modal::ConfirmDelete(rows)),
            },
        }
    }

    fn handle_predict_key(&mut self, code: KeyCode, ctrl: bool) -> Flow {
        match code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('d') if ctrl => {
                self.screen = Screen::Data;
                self.status = "Data collection: Enter add, Ctrl-u update, Del delete, Esc back.".to_string();
            }
            KeyCode::Char('l') if ctrl => {
                for f in &mut self.predict_fields {
                    f.value.clear();
                }
                self.prediction = None;
            }
            KeyCode::Tab | KeyCode::Down => self.predict_focus = (self.predict_focus + 1) % 2,
            KeyCode::BackTab | KeyCode::Up => self.predict_focus = (self.predict_focus + 1) % 2,
            KeyCode::Enter => self.run_prediction(),
            KeyCode::Backspace => {
                self.predict_fields[self.predict_focus].value.pop();
            }
            KeyCode::Char(c) if !ctrl => self.predict_fields[self.predict_focus].value.push(c),
            _ => {}
        }
        Flow::Continue
    }

    fn handle_data_key(&mut self, code: KeyCode, ctrl: bool) {
        match code {
            KeyCode::Esc => {
                self.screen = Screen::Predict;
                self.status = "Back to prediction.".to_string();
            }
            KeyCode::Char('u') if ctrl => self.update_selected(),
            KeyCode::Char('x') if ctrl => self.request_delete(),
            KeyCode::Delete => self.request_delete(),
            KeyCode::Char('l') if ctrl => self.clear_data_fields(),
            KeyCode::Tab => self.focus_next(),
            KeyCode::BackTab => self.focus_prev(),
            _ => match self.data_focus {
                DataFocus::Form => self.handle_form_key(code, ctrl),
                DataFocus::Table => self.handle_table_key(code),
            },
        }
    }

    fn handle_form_key(&mut self, code: KeyCode, ctrl: bool) {
        let n = self.data_fields.len();
        match code {
            KeyCode::Down => self.data_field_focus = (self.data_field_focus + 1) % n,
            KeyCode::Up => self.data_field_focus = (self.data_field_focus + n - 1) % n,
            KeyCode::Enter => self.add_row(),
            KeyCode::Backspace => {
                self.data_fields[self.data_field_focus].value.pop();
            }
            KeyCode::Char(c) if !ctrl => self.data_fields[self.data_field_focus].value.push(c),
            _ => {}
        }
    }

    fn handle_table_key(&mut self, code: KeyCode) {
        let len = self.session.observations().len();
        if len == 0 {
            return;
        }
        match code {
            KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                self.fill_form_from_cursor();
            }
            KeyCode::Down => {
                self.cursor = (self.cursor + 1).min(len - 1);
                self.fill_form_from_cursor();
            }
            KeyCode::Char(' ') => {
                if !self.marked.remove(&self.cursor) {
                    self.marked.insert(self.cursor);
                }
            }
            KeyCode::Enter => self.fill_form_from_cursor(),
            _ => {}
        }
    }

    /// Tab walks the form fields, then the table, then wraps.
    fn focus_next(&mut self) {
        match self.data_focus {
            DataFocus::Form if self.data_field_focus + 1 < self.data_fields.len() => self.data_field_focus += 1,
            DataFocus::Form => self.data_focus = DataFocus::Table,
            DataFocus::Table => {
                self.data_focus = DataFocus::Form;
                self.data_field_focus = 0;
            }
        }
    }

    fn focus_prev(&mut self) {
        match self.data_focus {
            DataFocus::Form if self.data_field_focus > 0 => self.data_field_focus -= 1,
            DataFocus::Form => self.data_focus = DataFocus::Table,
            DataFocus::Table => {
                self.data_focus = DataFocus::Form;
                self.data_field_focus = self.data_fields.len() - 1;
            }
        }
    }

    fn fill_form_from_cursor(&mut self) {
        if let Some(obs) = self.session.observations().get(self.cursor) {
            self.data_fields[0].value = obs.mass.to_string();
            self.data_fields[1].value = obs.force.to_string();
            self.data_fields[2].value = obs.distance.to_string();
        }
    }

    fn clear_data_fields(&mut self) {
        for f in &mut self.data_fields {
            f.value.clear();
        }
        self.data_field_focus = 0;
    }

    fn run_prediction(&mut self) {
        let [mass, distance] = &self.predict_fields;
        match self.session.predict_text(&mass.value, &distance.value) {
            Ok(p) => {
                self.status = format!("Required pull strength: {:.1} lbs", p.force);
                self.prediction = Some(p);
            }
            Err(err) if err.exit_code() == 2 => self.show_error("Input Error", &err),
            Err(err) => self.show_error("Prediction Error", &err),
        }
    }

    /// Keep the predict screen in step with the refitted model.
    fn refresh_prediction(&mut self) {
        let Some(p) = self.prediction else {
            return;
        };
        match self.session.predict(p.mass, p.distance) {
            Ok(next) => self.prediction = Some(next),
            Err(err) => {
                self.prediction = None;
                self.status = format!("{} Prediction cleared: {err}", self.status);
            }
        }
    }

    fn form_observation(&self) -> Result<crate::domain::Observation, AppError> {
        let [mass, force, distance] = &self.data_fields;
        parse_observation(&mass.value, &force.value, &distance.value)
    }

    fn add_row(&mut self) {
        let obs = match self.form_observation() {
            Ok(obs) => obs,
            Err(err) => return self.show_error("Input Error", &err),
        };
        match self.session.add(obs) {
            Ok(row) => {
                self.cursor = row;
                self.status = "Row added, model updated.".to_string();
                self.clear_data_fields();
                self.refresh_prediction();
            }
            Err(err) => self.show_error("Save Error", &err),
        }
    }

    fn update_selected(&mut self) {
        let rows = self.selection();
        let row = match rows.as_slice() {
            [] => return self.show_message("No Selection", "Select a single row to update."),
            [row] => *row,
            _ => return self.show_message("Multiple Selected", "Please select only one row to update."),
        };
        let obs = match self.form_observation() {
            Ok(obs) => obs,
            Err(err) => return self.show_error("Input Error", &err),
        };
        match self.session.update(row, obs) {
            Ok(()) => {
                self.marked.clear();
                self.cursor = row;
                self.status = "Row updated and model refreshed.".to_string();
                self.refresh_prediction();
            }
            Err(err) => self.show_error("Update Error", &err),
        }
    }

    fn request_delete(&mut self) {
        let rows = self.selection();
        if rows.is_empty() {
            return self.show_message("No Selection", "Select at least one row to delete.");
        }
        self.modal = Some(Modal::ConfirmDelete(rows));
    }

    fn delete_rows(&mut self, rows: &[usize]) {
        match self.session.delete(rows) {
            Ok(_) => {
                self.marked.clear();
                let len = self.session.observations().len();
                self.cursor = self.cursor.min(len.saturating_sub(1));
                self.status = "Selected row(s) deleted and model refreshed.".to_string();
                self.clear_data_fields();
                self.refresh_prediction();
            }
            Err(err) => self.show_error("Delete Error", &err),
        }
    }

    /// Re-read the table from disk, e.g. after editing it with `launch data`.
    fn reload(&mut self) {
        match self.session.reload() {
            Ok(()) => {
                self.marked.clear();
                let len = self.session.observations().len();
                self.cursor = self.cursor.min(len.saturating_sub(1));
                self.status = format!("Reloaded {} trial(s).", len);
                self.refresh_prediction();
            }
            Err(err) => self.show_error("Reload Error", &err),
        }
    }

    fn show_error(&mut self, title: &str, err: &AppError) {
        self.show_message(title, err.message());
    }

    fn show_message(&mut self, title: &str, message: &str) {
        log::debug!("{title}: {message}");
        self.status = message.to_string();
        self.modal = Some(Modal::Error {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}
