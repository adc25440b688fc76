//! Input and output checks shared by the optimizer.
//!
//! Configuration checks ([`verify_tol_grad`], [`verify_tol_cost`],
//! [`verify_fd_step`]) run when options are built; state checks
//! ([`validate_grad`], [`validate_theta_hat`], [`validate_value`],
//! [`validate_hessian`]) run on whatever the solver or the finite-difference
//! routines hand back. Each reports the first offending entry as an
//! [`OptError`].
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta, types::Hessian},
};

/// Accept `None`, or a finite, strictly positive gradient-norm tolerance.
///
/// Errors
/// ------
/// - `OptError::InvalidTolGrad` for NaN, ±∞ or values ≤ 0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(tol) if !tol.is_finite() => {
            Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." })
        }
        Some(tol) if tol <= 0.0 => {
            Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." })
        }
        _ => Ok(()),
    }
}

/// Accept `None`, or a finite, strictly positive cost-change tolerance.
///
/// Errors
/// ------
/// - `OptError::InvalidTolCost` for NaN, ±∞ or values ≤ 0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(tol) if !tol.is_finite() => {
            Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." })
        }
        Some(tol) if tol <= 0.0 => {
            Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." })
        }
        _ => Ok(()),
    }
}

/// Accept `None` (adaptive steps) or a finite, strictly positive fixed step.
pub fn verify_fd_step(step: Option<f64>) -> OptResult<()> {
    match step {
        Some(step) if !step.is_finite() => {
            Err(OptError::InvalidFdStep { step, reason: "Step must be finite." })
        }
        Some(step) if step <= 0.0 => {
            Err(OptError::InvalidFdStep { step, reason: "Step must be positive." })
        }
        _ => Ok(()),
    }
}

/// Check a gradient's length against `dim` and that every entry is finite.
///
/// Errors
/// ------
/// - `OptError::GradientDimMismatch` on a length mismatch.
/// - `OptError::InvalidGradient` naming the first non-finite entry.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match grad.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidGradient {
            index,
            value: grad[index],
            reason: "Gradient elements must be finite.",
        }),
        None => Ok(()),
    }
}

/// Unwrap the solver's best parameter vector, rejecting non-finite entries.
///
/// Errors
/// ------
/// - `OptError::MissingThetaHat` when the solver kept no best parameter.
/// - `OptError::InvalidThetaHat` naming the first non-finite entry.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta_hat = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some(index) = theta_hat.iter().position(|v| !v.is_finite()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value: theta_hat[index],
            reason: "Parameter estimates must be finite.",
        });
    }
    Ok(theta_hat)
}

/// Reject NaN or infinite objective values.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

/// Check a Hessian is `dim × dim` with finite entries.
///
/// Errors
/// ------
/// - `OptError::HessianDimMismatch` on a shape mismatch.
/// - `OptError::InvalidHessian` naming the first non-finite entry.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    if hessian.nrows() != dim || hessian.ncols() != dim {
        return Err(OptError::HessianDimMismatch {
            expected: dim,
            found: (hessian.nrows(), hessian.ncols()),
        });
    }
    for ((row, col), &value) in hessian.indexed_iter() {
        if !value.is_finite() {
            return Err(OptError::InvalidHessian { row, col, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    #[test]
    // Purpose
    // -------
    // Tolerance and step checks accept `None` and positive values and reject
    // the rest.
    //
    // Given
    // -----
    // - `None`, 1e-6, 0, -1 and NaN.
    //
    // Expect
    // ------
    // - `Ok` for the first two, the matching error variant otherwise.
    fn configuration_checks_reject_non_positive_values() {
        // Arrange
        let good = [None, Some(1e-6)];
        let bad = [Some(0.0), Some(-1.0), Some(f64::NAN)];

        // Act / Assert
        for tol in good {
            assert!(verify_tol_grad(tol).is_ok());
            assert!(verify_tol_cost(tol).is_ok());
            assert!(verify_fd_step(tol).is_ok());
        }
        for tol in bad {
            assert!(matches!(verify_tol_grad(tol), Err(OptError::InvalidTolGrad { .. })));
            assert!(matches!(verify_tol_cost(tol), Err(OptError::InvalidTolCost { .. })));
            assert!(matches!(verify_fd_step(tol), Err(OptError::InvalidFdStep { .. })));
        }
    }

    #[test]
    // Purpose
    // -------
    // State checks name the first offending entry.
    //
    // Given
    // -----
    // - A gradient with NaN at index 1, a missing theta, a 2×3 Hessian.
    //
    // Expect
    // ------
    // - `InvalidGradient { index: 1 }`, `MissingThetaHat`,
    //   `HessianDimMismatch`.
    fn state_checks_report_offending_entry() {
        // Arrange
        let grad = Array1::from(vec![1.0, f64::NAN, f64::INFINITY]);
        let hess = Array2::<f64>::zeros((2, 3));

        // Act / Assert
        assert!(matches!(validate_grad(&grad, 3), Err(OptError::InvalidGradient { index: 1, .. })));
        assert!(matches!(
            validate_grad(&grad, 2),
            Err(OptError::GradientDimMismatch { expected: 2, found: 3 })
        ));
        assert_eq!(validate_theta_hat(None), Err(OptError::MissingThetaHat));
        assert!(matches!(validate_hessian(&hess, 2), Err(OptError::HessianDimMismatch { .. })));
        assert!(validate_value(f64::NEG_INFINITY).is_err());
    }
}
