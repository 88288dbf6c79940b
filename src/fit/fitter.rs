//! Least-squares fit of distance on mass and pull force.
//!
//! Given observations `(m_i, f_i, d_i)` we build the design matrix
//!
//! ```text
//! X = [1  m_i  f_i]      y = [d_i]
//! ```
//!
//! and solve for `[b0, b_mass, b_force]` with the normal equation (pseudo-inverse
//! fallback when `XᵗX` is singular). The fit is always recomputed from the whole
//! table; there is no incremental update.

use nalgebra::{DMatrix, DVector};

use crate::domain::{Coefficients, Fit, Observation};
use crate::error::AppError;
use crate::math::solve_normal_equation;
use crate::models::{design_row, DESIGN_LEN};

/// Fit the launch model to the full observation table.
pub fn fit_observations(observations: &[Observation]) -> Result<Fit, AppError> {
    if observations.is_empty() {
        return Err(AppError::no_data("No observations to fit. Add at least one trial."));
    }
    if let Some(idx) = observations.iter().position(|o| !o.is_finite()) {
        return Err(AppError::input(format!("Row {idx} contains a non-finite value.")));
    }

    let n = observations.len();
    let mut x = DMatrix::<f64>::zeros(n, DESIGN_LEN);
    let mut y = DVector::<f64>::zeros(n);

    for (i, obs) in observations.iter().enumerate() {
        let row = design_row(obs.mass, obs.force);
        for (j, v) in row.iter().enumerate() {
            x[(i, j)] = *v;
        }
        y[i] = obs.distance;
    }

    let (beta, method) = solve_normal_equation(&x, &y)
        .ok_or_else(|| AppError::numeric("Least-squares solve produced non-finite coefficients."))?;

    let coefficients = Coefficients::new(beta[0], beta[1], beta[2]);
    log::debug!(
        "fit n={n} method={} b0={:.6} b_mass={:.6} b_force={:.6}",
        method.display_name(),
        coefficients.intercept,
        coefficients.mass,
        coefficients.force
    );

    Ok(Fit { coefficients, method, n })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_trials, plane_trials};
    use crate::domain::{SampleConfig, SolveMethod};
    use crate::models::{predict_distance, solve_force};

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "expected {b}, got {a}");
    }

    #[test]
    fn recovers_exact_linear_relationship() {
        let truth = Coefficients::new(-12.0, -0.05, 4.5);
        let rows = plane_trials(&truth, &[(150.0, 20.0), (300.0, 25.0), (220.0, 32.0), (400.0, 18.0), (180.0, 38.0)]);

        let fit = fit_observations(&rows).unwrap();
        assert_eq!(fit.method, SolveMethod::NormalEquation);
        assert_eq!(fit.n, 5);
        assert_close(fit.coefficients.intercept, truth.intercept, 1e-6);
        assert_close(fit.coefficients.mass, truth.mass, 1e-8);
        assert_close(fit.coefficients.force, truth.force, 1e-7);
    }

    #[test]
    fn training_point_round_trips_through_predictor() {
        let truth = Coefficients::new(3.0, 0.02, 2.5);
        let rows = plane_trials(&truth, &[(100.0, 10.0), (200.0, 12.0), (150.0, 30.0), (320.0, 22.0)]);
        let fit = fit_observations(&rows).unwrap();

        for obs in &rows {
            let force = solve_force(&fit.coefficients, obs.mass, obs.distance).unwrap();
            assert_close(force, obs.force, 1e-6);
        }
    }

    #[test]
    fn noisy_sample_is_close_to_truth() {
        let config = SampleConfig {
            count: 400,
            noise_sd: 0.5,
            ..SampleConfig::default()
        };
        let rows = generate_trials(&config).unwrap();
        let fit = fit_observations(&rows).unwrap();

        assert_close(fit.coefficients.force, config.truth.force, 0.05);
        assert_close(fit.coefficients.mass, config.truth.mass, 0.005);
    }

    #[test]
    fn single_row_falls_back_to_pseudo_inverse() {
        let rows = [Observation::new(200.0, 20.0, 80.0)];
        let fit = fit_observations(&rows).unwrap();
        assert_eq!(fit.method, SolveMethod::PseudoInverse);
        assert!(fit.coefficients.is_finite());
        // The minimum-norm solution still reproduces the single trial.
        assert_close(predict_distance(&fit.coefficients, 200.0, 20.0), 80.0, 1e-8);
    }

    #[test]
    fn collinear_columns_fall_back_to_pseudo_inverse() {
        // Force is always mass / 10.
        let rows = [
            Observation::new(100.0, 10.0, 40.0),
            Observation::new(200.0, 20.0, 70.0),
            Observation::new(300.0, 30.0, 100.0),
        ];
        let fit = fit_observations(&rows).unwrap();
        assert_eq!(fit.method, SolveMethod::PseudoInverse);
        for r in &rows {
            assert_close(predict_distance(&fit.coefficients, r.mass, r.force), r.distance, 1e-6);
        }
    }

    #[test]
    fn empty_table_is_an_error() {
        let err = fit_observations(&[]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn non_finite_row_is_rejected() {
        let rows = [Observation::new(1.0, f64::NAN, 2.0)];
        assert_eq!(fit_observations(&rows).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn huge_finite_mass_is_a_numeric_error() {
        let rows = [
            Observation::new(1e200, 20.0, 60.0),
            Observation::new(250.0, 22.0, 70.0),
            Observation::new(300.0, 30.0, 95.0),
        ];
        assert_eq!(fit_observations(&rows).unwrap_err().exit_code(), 4);
    }
}
