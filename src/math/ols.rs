//! Ordinary least squares via the normal equation.
//!
//! We solve small regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! with the closed form `β = (XᵗX)⁻¹Xᵗy`.
//!
//! Implementation choices:
//! - `XᵗX` is only 3×3 here, so forming and inverting it is cheap.
//! - Before inverting we check the reciprocal condition number of `XᵗX`. LU with
//!   partial pivoting happily "inverts" a matrix that is singular up to rounding,
//!   which would produce huge, meaningless coefficients for collinear inputs.
//! - When `XᵗX` is singular (too few rows, duplicated or collinear columns) we
//!   fall back to the minimum-norm solution `pinv(X)·y` computed from the SVD of
//!   `X` itself.
//! - Inputs whose squares overflow `f64` are rejected up front: nalgebra's SVD
//!   panics on the NaNs an overflowing `XᵗX` produces.

use nalgebra::{DMatrix, DVector};

use crate::domain::SolveMethod;

/// `XᵗX` is treated as singular below this reciprocal condition number.
const RCOND_MIN: f64 = 1e-12;

/// Solve a least squares problem, preferring the normal equation.
///
/// Returns `None` if neither path produces finite coefficients.
pub fn solve_normal_equation(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<(DVector<f64>, SolveMethod)> {
    if x.nrows() == 0 || x.nrows() != y.len() {
        return None;
    }

    if !squares_are_finite(x) || !y.iter().all(|v| v.is_finite()) {
        log::warn!("design matrix magnitude overflows f64; cannot solve");
        return None;
    }

    let xt = x.transpose();
    let xtx = &xt * x;

    if xtx.iter().all(|v| v.is_finite()) && reciprocal_condition(&xtx) > RCOND_MIN {
        if let Some(inv) = xtx.try_inverse() {
            let beta = inv * (&xt * y);
            if beta.iter().all(|v| v.is_finite()) {
                return Some((beta, SolveMethod::NormalEquation));
            }
        }
    }

    log::warn!("XᵗX is singular; falling back to pseudo-inverse");
    solve_pseudo_inverse(x, y).map(|beta| (beta, SolveMethod::PseudoInverse))
}

/// Minimum-norm least-squares solution `pinv(X)·y`.
pub fn solve_pseudo_inverse(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || !squares_are_finite(x) {
        return None;
    }
    let svd = x.clone().svd(true, true);
    let sv_max = svd.singular_values.max();
    if !sv_max.is_finite() {
        return None;
    }

    // Same cutoff LAPACK-style solvers use: σ_max · max(m, n) · ε.
    let eps = (sv_max * x.nrows().max(x.ncols()) as f64 * f64::EPSILON).max(f64::MIN_POSITIVE);
    let pinv = svd.pseudo_inverse(eps).ok()?;
    let beta = pinv * y;

    if beta.iter().all(|v| v.is_finite()) {
        Some(beta)
    } else {
        None
    }
}

/// Every entry and the sum of squares are finite.
fn squares_are_finite(x: &DMatrix<f64>) -> bool {
    x.iter().all(|v| v.is_finite()) && x.iter().map(|v| v * v).sum::<f64>().is_finite()
}

/// `σ_min / σ_max` of a square matrix (0 for a zero matrix).
fn reciprocal_condition(m: &DMatrix<f64>) -> f64 {
    let sv = m.singular_values();
    let max = sv.max();
    let min = sv.min();
    if !(max.is_finite() && min.is_finite()) || max <= 0.0 {
        return 0.0;
    }
    min / max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_equation_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let (beta, method) = solve_normal_equation(&x, &y).unwrap();
        assert_eq!(method, SolveMethod::NormalEquation);
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn singular_system_uses_pseudo_inverse() {
        // Second column duplicates the first: XᵗX has rank 1.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let y = DVector::from_row_slice(&[2.0, 4.0, 6.0]);

        let (beta, method) = solve_normal_equation(&x, &y).unwrap();
        assert_eq!(method, SolveMethod::PseudoInverse);
        // Minimum-norm split of y = 2·x across the two identical columns.
        assert!((beta[0] - 1.0).abs() < 1e-9, "got {beta}");
        assert!((beta[1] - 1.0).abs() < 1e-9, "got {beta}");
    }

    #[test]
    fn underdetermined_system_uses_pseudo_inverse() {
        // One row, three unknowns.
        let x = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 2.0]);
        let y = DVector::from_row_slice(&[9.0]);

        let (beta, method) = solve_normal_equation(&x, &y).unwrap();
        assert_eq!(method, SolveMethod::PseudoInverse);
        let fitted = beta[0] + 2.0 * beta[1] + 2.0 * beta[2];
        assert!((fitted - 9.0).abs() < 1e-9);
        // Minimum norm solution is parallel to the row: [1, 2, 2].
        assert!((beta[0] - 1.0).abs() < 1e-9);
        assert!((beta[1] - 2.0).abs() < 1e-9);
        assert!((beta[2] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn overflowing_magnitudes_return_none() {
        let x = DMatrix::from_row_slice(3, 3, &[1.0, 1e200, 20.0, 1.0, 250.0, 22.0, 1.0, 300.0, 30.0]);
        let y = DVector::from_row_slice(&[60.0, 70.0, 95.0]);
        assert!(solve_normal_equation(&x, &y).is_none());
        assert!(solve_pseudo_inverse(&x, &y).is_none());
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let y = DVector::from_row_slice(&[1.0]);
        assert!(solve_normal_equation(&x, &y).is_none());
    }
}
