//! Synthetic launch trials.
//!
//! Used to bootstrap a dataset file before any real trials have been measured,
//! and by tests that need data with a known generating plane.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Coefficients, Observation, SampleConfig};
use crate::error::AppError;
use crate::models::predict_distance;

/// Draw `config.count` trials from `config.truth` plus Gaussian distance noise.
///
/// Deterministic for a given seed.
pub fn generate_trials(config: &SampleConfig) -> Result<Vec<Observation>, AppError> {
    if config.count == 0 {
        return Err(AppError::input("Sample count must be > 0."));
    }
    validate_range("mass", config.mass_range)?;
    validate_range("force", config.force_range)?;
    if !(config.noise_sd.is_finite() && config.noise_sd >= 0.0) {
        return Err(AppError::input("Noise standard deviation must be finite and >= 0."));
    }
    if !config.truth.is_finite() {
        return Err(AppError::input("Generating coefficients must be finite."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise_sd)
        .map_err(|e| AppError::numeric(format!("Noise distribution error: {e}")))?;

    let (m0, m1) = config.mass_range;
    let (f0, f1) = config.force_range;

    let mut out = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let mass = round_to(rng.gen_range(m0..=m1), 1);
        let force = round_to(rng.gen_range(f0..=f1), 1);
        let distance = predict_distance(&config.truth, mass, force) + normal.sample(&mut rng);
        out.push(Observation::new(mass, force, round_to(distance, 2)));
    }

    log::info!("generated {} synthetic trials (seed={})", out.len(), config.seed);
    Ok(out)
}

/// Noise-free trials lying exactly on `truth` at the given `(mass, force)` pairs.
pub fn plane_trials(truth: &Coefficients, inputs: &[(f64, f64)]) -> Vec<Observation> {
    inputs
        .iter()
        .map(|&(mass, force)| Observation::new(mass, force, predict_distance(truth, mass, force)))
        .collect()
}

fn validate_range(name: &str, (lo, hi): (f64, f64)) -> Result<(), AppError> {
    if lo.is_finite() && hi.is_finite() && hi > lo {
        Ok(())
    } else {
        Err(AppError::input(format!("Invalid {name} range: [{lo}, {hi}].")))
    }
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}
