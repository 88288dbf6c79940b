//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - opens the trial table as a [`session::Session`]
//! - prints reports/plots or runs the TUI
//! - writes optional exports

use std::path::Path;

use clap::Parser;

use crate::cli::{Cli, Command, DataCommand, PlotArgs, ReportArgs, TargetArgs, TrialArgs};
use crate::domain::SampleConfig;
use crate::error::AppError;
use crate::input::parse_observation;

pub mod session;

use session::Session;

/// Entry point for the `launch` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; LAUNCH_DATA and RUST_LOG may come from the shell.
    dotenvy::dotenv().ok();

    // We want `launch` and `launch --data x.csv` to behave like `launch tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    init_logging(matches!(cli.command, Command::Tui));
    log::debug!("data file: {}", cli.data.display());

    match cli.command {
        Command::Tui => crate::tui::run(Session::open(&cli.data)?),
        Command::Fit => handle_fit(&cli.data),
        Command::Predict(args) => handle_predict(&cli.data, &args),
        Command::Report(args) => handle_report(&cli.data, &args),
        Command::Plot(args) => handle_plot(&cli.data, &args),
        Command::Export(args) => handle_export(&cli.data, &args.out),
        Command::Data(cmd) => handle_data(&cli.data, cmd),
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or errors only under the TUI so
/// log lines don't scribble over the alternate screen.
fn init_logging(tui: bool) {
    let default = if tui { "error" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).try_init();
}

fn handle_fit(data: &Path) -> Result<(), AppError> {
    let session = Session::open(data)?;
    let stats = session.stats();
    println!(
        "{}",
        crate::report::format_fit_summary(session.path(), stats.as_ref(), session.fit())
    );
    session.require_fit()?;
    Ok(())
}

fn handle_predict(data: &Path, args: &TargetArgs) -> Result<(), AppError> {
    let session = Session::open(data)?;
    let prediction = session.predict_text(&args.mass, &args.distance)?;
    println!("{}", crate::report::format_prediction(&prediction));
    Ok(())
}

fn handle_report(data: &Path, args: &ReportArgs) -> Result<(), AppError> {
    let session = Session::open(data)?;
    let fit = session.require_fit()?;
    let report = crate::report::compute_residuals(session.observations(), fit)?;
    println!(
        "{}",
        crate::report::format_fit_summary(session.path(), session.stats().as_ref(), Some(fit))
    );
    println!("{}", crate::report::format_residuals(&report));

    if let Some(path) = &args.export {
        crate::io::write_residuals_csv(path, &report)?;
    }
    Ok(())
}

fn handle_plot(data: &Path, args: &PlotArgs) -> Result<(), AppError> {
    let session = Session::open(data)?;
    let prediction = session.predict_text(&args.target.mass, &args.target.distance)?;
    let fit = session.require_fit()?;
    let plot = crate::plot::render_force_slice(
        session.observations(),
        &fit.coefficients,
        prediction.mass,
        Some(&prediction),
        args.width,
        args.height,
    );
    println!("{}", crate::report::format_prediction(&prediction));
    println!("{plot}");
    Ok(())
}

fn handle_export(data: &Path, out: &Path) -> Result<(), AppError> {
    let session = Session::open(data)?;
    let fit = session.require_fit()?;
    crate::io::write_fit_json(out, fit, session.path())?;
    println!("Wrote {}", out.display());
    Ok(())
}

fn handle_data(data: &Path, cmd: DataCommand) -> Result<(), AppError> {
    match cmd {
        DataCommand::List => {
            let session = Session::open(data)?;
            println!("{}", crate::report::format_observations(session.observations()));
        }
        DataCommand::Add(trial) => {
            let obs = trial_observation(&trial)?;
            let mut session = Session::open(data)?;
            let row = session.add(obs)?;
            println!("Row {row} added, model updated.");
            print_refit(&session);
        }
        DataCommand::Update { row, trial } => {
            let obs = trial_observation(&trial)?;
            let mut session = Session::open(data)?;
            session.update(row, obs)?;
            println!("Row {row} updated and model refreshed.");
            print_refit(&session);
        }
        DataCommand::Delete { rows } => {
            let mut session = Session::open(data)?;
            let removed = session.delete(&rows)?;
            println!("{removed} row(s) deleted and model refreshed.");
            print_refit(&session);
        }
        DataCommand::Init { force } => {
            let session = Session::create(data, Vec::new(), force)?;
            println!("Created empty table {}", session.path().display());
        }
        DataCommand::Generate {
            count,
            seed,
            noise,
            force,
        } => {
            let config = SampleConfig {
                count,
                seed,
                noise_sd: noise,
                ..SampleConfig::default()
            };
            let rows = crate::data::generate_trials(&config)?;
            let session = Session::create(data, rows, force)?;
            println!(
                "Wrote {} synthetic trial(s) to {}",
                session.observations().len(),
                session.path().display()
            );
            print_refit(&session);
        }
    }
    Ok(())
}

fn trial_observation(trial: &TrialArgs) -> Result<crate::domain::Observation, AppError> {
    parse_observation(&trial.mass, &trial.force, &trial.distance)
}

fn print_refit(session: &Session) {
    match (session.fit(), session.fit_error()) {
        (Some(fit), _) => {
            let c = &fit.coefficients;
            println!(
                "distance = {:.4} + {:.6}*mass + {:.4}*pull ({}, n={})",
                c.intercept,
                c.mass,
                c.force,
                fit.method.display_name(),
                fit.n
            );
        }
        (None, Some(err)) => println!("No fitted model: {err}"),
        (None, None) => {}
    }
}

/// Rewrite argv so `launch` defaults to `launch tui`.
///
/// Rules:
/// - `launch`                        -> `launch tui`
/// - `launch --data x.csv ...`       -> `launch tui --data x.csv ...`
/// - `launch --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "tui" | "fit" | "predict" | "report" | "plot" | "export" | "data"
    );
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_tui() {
        assert_eq!(rewrite_args(args(&["launch"])), args(&["launch", "tui"]));
        assert_eq!(
            rewrite_args(args(&["launch", "--data", "x.csv"])),
            args(&["launch", "tui", "--data", "x.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for argv in [&["launch", "fit"][..], &["launch", "--help"], &["launch", "data", "list"]] {
            assert_eq!(rewrite_args(args(argv)), args(argv));
        }
    }
}
