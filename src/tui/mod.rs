//! Ratatui-based terminal UI.
//!
//! Two screens share one [`Session`]:
//!
//! - **Predict**: mass + target distance form, the result table and a 3D chart of
//!   the trials with the fitted plane
//! - **Data**: trial form and the live table, for adding, updating and deleting rows
//!
//! Key handling lives in [`state`]; this module owns the terminal and drawing.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Terminal,
};

use crate::app::session::Session;
use crate::domain::{Fit, Prediction};
use crate::error::AppError;
use crate::models::solve_force;

mod plotters_chart;
pub mod state;

use plotters_chart::{LaunchChart3d, Point3};
use state::{DataFocus, Flow, Modal, Screen, TextField, TuiState};

/// Wireframe resolution along each axis.
const GRID_LINES: usize = 5;

/// Start the TUI on an opened session.
pub fn run(session: Session) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::numeric(format!("Failed to initialize terminal: {e}")))?;

    let mut state = TuiState::new(session);
    event_loop(&mut state, &mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::numeric(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::numeric(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

fn event_loop<B: ratatui::backend::Backend>(state: &mut TuiState, terminal: &mut Terminal<B>) -> Result<(), AppError> {
    let mut needs_redraw = true;
    loop {
        if needs_redraw {
            terminal
                .draw(|f| draw(state, f))
                .map_err(|e| AppError::numeric(format!("Terminal draw error: {e}")))?;
            needs_redraw = false;
        }

        if !event::poll(Duration::from_millis(100))
            .map_err(|e| AppError::numeric(format!("Event poll error: {e}")))?
        {
            continue;
        }

        match event::read().map_err(|e| AppError::numeric(format!("Event read error: {e}")))? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if state.handle_key(key) == Flow::Quit {
                    break;
                }
                needs_redraw = true;
            }
            Event::Resize(_, _) => {
                needs_redraw = true;
            }
            _ => {}
        }
    }
    Ok(())
}

fn draw(state: &TuiState, frame: &mut ratatui::Frame<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
        .split(frame.area());

    draw_header(state, frame, chunks[0]);
    match state.screen() {
        Screen::Predict => draw_predict(state, frame, chunks[1]),
        Screen::Data => draw_data(state, frame, chunks[1]),
    }
    draw_footer(state, frame, chunks[2]);

    if let Some(modal) = state.modal() {
        draw_modal(modal, frame);
    }
}

fn draw_header(state: &TuiState, frame: &mut ratatui::Frame<'_>, area: Rect) {
    let session = state.session();
    let title = match state.screen() {
        Screen::Predict => " - force prediction",
        Screen::Data => " - data collection",
    };
    let mut lines = vec![Line::from(vec![
        Span::styled("launch", Style::default().fg(Color::Cyan)),
        Span::raw(title),
        Span::styled(
            format!("  ({}, {} trial(s))", session.path().display(), session.observations().len()),
            Style::default().fg(Color::Gray),
        ),
    ])];

    let model_line = match session.fit() {
        Some(fit) => fit_line(fit),
        None => format!(
            "no model: {}",
            session.fit_error().map(|e| e.message().to_string()).unwrap_or_default()
        ),
    };
    lines.push(Line::from(Span::styled(model_line, Style::default().fg(Color::Gray))));

    let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::LEFT | Borders::RIGHT | Borders::TOP));
    frame.render_widget(p, area);
}

fn fit_line(fit: &Fit) -> String {
    let c = &fit.coefficients;
    format!(
        "distance = {:.4} + {:.6}·mass + {:.4}·pull  [{}, n={}]",
        c.intercept,
        c.mass,
        c.force,
        fit.method.display_name(),
        fit.n
    )
}

fn draw_predict(state: &TuiState, frame: &mut ratatui::Frame<'_>, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(0)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(5), Constraint::Min(0)])
        .split(cols[0]);

    draw_form(frame, left[0], "Inputs", &state.predict_fields, Some(state.predict_focus));
    draw_result(state.prediction(), frame, left[1]);
    draw_chart(state, frame, cols[1]);
}

fn draw_form(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, fields: &[TextField], focus: Option<usize>) {
    let label_width = fields.iter().map(|f| f.label.len()).max().unwrap_or(0) + 2;
    let lines: Vec<Line> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let active = focus == Some(i);
            let style = if active {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default()
            };
            let cursor = if active { "_" } else { "" };
            Line::from(vec![
                Span::raw(format!("{:>width$} ", format!("{}:", f.label), width = label_width)),
                Span::styled(format!("{}{cursor}", f.value), style),
            ])
        })
        .collect();
    let p = Paragraph::new(lines).block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn draw_result(prediction: Option<&Prediction>, frame: &mut ratatui::Frame<'_>, area: Rect) {
    let rows: Vec<Row> = match prediction {
        Some(p) => vec![
            Row::new(vec![Cell::from("Force (lbs):"), Cell::from(format!("{:.1}", p.force))]),
            Row::new(vec![Cell::from("Mass (g):"), Cell::from(p.mass.to_string())]),
            Row::new(vec![Cell::from("Distance (feet):"), Cell::from(p.distance.to_string())]),
        ],
        None => vec![Row::new(vec![Cell::from("Enter to predict")]).style(Style::default().fg(Color::Gray))],
    };
    let table = Table::new(rows, [Constraint::Length(17), Constraint::Min(0)])
        .block(Block::default().title("Result").borders(Borders::ALL));
    frame.render_widget(table, area);
}

/// Chart series and bounds, or `None` when there is nothing to plot.
struct ChartSeries {
    trials: Vec<Point3>,
    wireframe: Vec<Vec<Point3>>,
    prediction: Option<Point3>,
    mass_bounds: [f64; 2],
    distance_bounds: [f64; 2],
    force_bounds: [f64; 2],
}

fn chart_series(session: &Session, prediction: Option<&Prediction>) -> Option<ChartSeries> {
    let stats = session.stats()?;
    let trials: Vec<Point3> = session
        .observations()
        .iter()
        .map(|o| (o.mass, o.distance, o.force))
        .collect();
    let prediction = prediction.map(|p| (p.mass, p.distance, p.force));

    let mut mass = [stats.mass_min, stats.mass_max];
    let mut distance = [stats.distance_min, stats.distance_max];
    if let Some((m, d, _)) = prediction {
        mass = [mass[0].min(m), mass[1].max(m)];
        distance = [distance[0].min(d), distance[1].max(d)];
    }
    let mass = widen(mass);
    let distance = widen(distance);

    let wireframe = session
        .fit()
        .map(|fit| plane_wireframe(fit, mass, distance))
        .unwrap_or_default();

    let mut force = [f64::INFINITY, f64::NEG_INFINITY];
    let points = trials.iter().chain(wireframe.iter().flatten()).chain(prediction.iter());
    for &(_, _, f) in points {
        if f.is_finite() {
            force = [force[0].min(f), force[1].max(f)];
        }
    }
    let force = pad(widen(force), 0.05);

    Some(ChartSeries {
        trials,
        wireframe,
        prediction,
        mass_bounds: pad(mass, 0.05),
        distance_bounds: pad(distance, 0.05),
        force_bounds: force,
    })
}

/// Constant-mass and constant-distance cuts through the fitted plane.
fn plane_wireframe(fit: &Fit, mass: [f64; 2], distance: [f64; 2]) -> Vec<Vec<Point3>> {
    let grid = |b: [f64; 2]| -> Vec<f64> {
        (0..GRID_LINES)
            .map(|i| b[0] + (b[1] - b[0]) * i as f64 / (GRID_LINES as f64 - 1.0))
            .collect()
    };
    let masses = grid(mass);
    let distances = grid(distance);
    let point = |m: f64, d: f64| solve_force(&fit.coefficients, m, d).ok().map(|f| (m, d, f));

    let mut lines = Vec::with_capacity(2 * GRID_LINES);
    for &m in &masses {
        let line: Option<Vec<Point3>> = distances.iter().map(|&d| point(m, d)).collect();
        lines.extend(line);
    }
    for &d in &distances {
        let line: Option<Vec<Point3>> = masses.iter().map(|&m| point(m, d)).collect();
        lines.extend(line);
    }
    lines
}

fn widen(b: [f64; 2]) -> [f64; 2] {
    if !(b[0].is_finite() && b[1].is_finite()) {
        [0.0, 1.0]
    } else if b[1] > b[0] {
        b
    } else {
        [b[0] - 1.0, b[1] + 1.0]
    }
}

fn pad(b: [f64; 2], frac: f64) -> [f64; 2] {
    let p = ((b[1] - b[0]).abs() * frac).max(1e-12);
    [b[0] - p, b[1] + p]
}

fn draw_chart(state: &TuiState, frame: &mut ratatui::Frame<'_>, area: Rect) {
    let block = Block::default()
        .title("3D: mass (g) → x, distance (ft) ↑ y, pull (lbs) → z")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let Some(series) = chart_series(state.session(), state.prediction()) else {
        let msg = Paragraph::new("No trials yet. Ctrl-d opens data collection.")
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, inner);
        return;
    };

    let widget = LaunchChart3d {
        trials: &series.trials,
        wireframe: &series.wireframe,
        prediction: series.prediction,
        mass_bounds: series.mass_bounds,
        distance_bounds: series.distance_bounds,
        force_bounds: series.force_bounds,
    };
    frame.render_widget(widget, inner);
}

fn draw_data(state: &TuiState, frame: &mut ratatui::Frame<'_>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let form_focus = (state.data_focus == DataFocus::Form).then_some(state.data_field_focus);
    draw_form(frame, chunks[0], "Trial", &state.data_fields, form_focus);

    let help = "Tab focus  Enter add  Ctrl-u update  Del/Ctrl-x delete  Space mark  Ctrl-l clear  Esc back";
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::Gray)),
        chunks[1],
    );

    draw_table(state, frame, chunks[2]);
}

fn draw_table(state: &TuiState, frame: &mut ratatui::Frame<'_>, area: Rect) {
    let header = Row::new(vec!["", "#", "mass(g)", "pull strength(lbs)", "distance feet"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = state
        .session()
        .observations()
        .iter()
        .enumerate()
        .map(|(i, o)| {
            let mark = if state.marked.contains(&i) { "*" } else { "" };
            Row::new(vec![
                mark.to_string(),
                i.to_string(),
                o.mass.to_string(),
                o.force.to_string(),
                o.distance.to_string(),
            ])
        })
        .collect();

    let border_style = if state.data_focus == DataFocus::Table {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(20),
            Constraint::Min(0),
        ],
    )
    .header(header)
    .block(Block::default().title("Trials").borders(Borders::ALL).border_style(border_style))
    .row_highlight_style(Style::default().fg(Color::Black).bg(Color::White))
    .highlight_symbol("» ");

    let mut table_state = TableState::default();
    if !state.session().observations().is_empty() {
        table_state.select(Some(state.cursor));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn draw_footer(state: &TuiState, frame: &mut ratatui::Frame<'_>, area: Rect) {
    let help = match state.screen() {
        Screen::Predict => "Tab field  Enter predict  Ctrl-l clear  Ctrl-d data  Ctrl-r reload  Esc quit",
        Screen::Data => "Ctrl-r reload  Esc back  Ctrl-c quit",
    };
    let line = Line::from(vec![
        Span::styled(help, Style::default().fg(Color::Gray)),
        Span::raw(" | "),
        Span::styled(state.status(), Style::default().fg(Color::Yellow)),
    ]);
    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn draw_modal(modal: &Modal, frame: &mut ratatui::Frame<'_>) {
    let (title, body, color) = match modal {
        Modal::Error { title, message } => (title.clone(), format!("{message}\n\n(any key)"), Color::Red),
        Modal::ConfirmDelete(rows) => (
            "Confirm Delete".to_string(),
            format!("Delete {} selected row(s)?\n\n[y]es / [n]o", rows.len()),
            Color::Yellow,
        ),
    };
    let area = centered(frame.area(), 50, 7);
    frame.render_widget(Clear, area);
    let p = Paragraph::new(body)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(p, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
