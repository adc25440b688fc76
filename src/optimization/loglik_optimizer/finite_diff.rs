//! loglik_optimizer::finite_diff — numerical derivatives with error capture.
//!
//! Purpose
//! -------
//! Approximate gradients and Hessians of objectives that have no analytic
//! derivative, which is every spectrum fit: the model function is a black
//! box.
//!
//! Key behaviors
//! -------------
//! - [`run_fd_diff`]: `finitediff` forward differences with its adaptive
//!   step.
//! - [`fixed_step_forward_diff`]: forward differences with a caller-chosen
//!   step `h`, `g_i = (f(θ + h·e_i) − f(θ)) / h`. Fits in log-parameter space
//!   use `h = 1e-4`, a relative step of about 0.01% on every parameter.
//! - [`compute_hessian`]: Hessian of a gradient function, central first and
//!   forward as a fallback, symmetrized before returning.
//! - [`fixed_step_hessian`]: central second differences of the objective
//!   itself with a caller-chosen step. Differencing a numerical gradient
//!   again compounds roundoff, so black-box objectives use this one.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objective closures cannot return `Result`. They park the first error
//!   in a shared `RefCell<Option<Error>>` and return NaN; every helper here
//!   clears the cell first and turns a parked error into `Err` afterwards.
//! - Returned gradients satisfy [`validate_grad`]; returned Hessians satisfy
//!   [`validate_hessian`] and are exactly symmetric.
//!
//! Testing notes
//! -------------
//! - Unit tests below cover error capture, validation failures and
//!   symmetrization; the fit driver's tests exercise the fixed-step path on
//!   real likelihoods.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Adaptive forward-difference gradient of `func` at `theta`.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Evaluation point; its length is the gradient length.
/// - `func`: `&G`
///   Objective closure that parks failures in `closure_err`.
/// - `closure_err`: `&RefCell<Option<Error>>`
///   Shared error slot; cleared on entry.
///
/// Errors
/// ------
/// - Any error parked by `func`, converted through `From<Error>`.
/// - `OptError::InvalidGradient` when an entry is non-finite.
///
/// Examples
/// --------
/// ```rust
/// # use std::cell::RefCell;
/// # use argmin::core::Error;
/// # use ndarray::array;
/// # use sfs_fit::optimization::loglik_optimizer::finite_diff::run_fd_diff;
/// let closure_err: RefCell<Option<Error>> = RefCell::new(None);
/// let f = |x: &ndarray::Array1<f64>| x.dot(x);
/// let grad = run_fd_diff(&array![1.0, -2.0], &f, &closure_err).unwrap();
/// assert!((grad[1] + 4.0).abs() < 1e-4);
/// ```
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    finish_gradient(fd_grad, theta.len(), closure_err)
}

/// Forward-difference gradient with a fixed step.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Evaluation point.
/// - `func`: `&G`
///   Objective closure that parks failures in `closure_err`.
/// - `step`: `f64`
///   Absolute step added to each coordinate in turn. Callers validate it
///   with `verify_fd_step`.
/// - `closure_err`: `&RefCell<Option<Error>>`
///   Shared error slot; cleared on entry.
///
/// Returns
/// -------
/// `OptResult<Grad>`
///   `dim + 1` objective evaluations: one at `theta`, one per coordinate.
///
/// Errors
/// ------
/// - Any error parked by `func`.
/// - `OptError::InvalidGradient` when an entry is non-finite.
pub fn fixed_step_forward_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, step: f64, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let base = func(theta);
    let mut shifted = theta.clone();
    let mut grad = Grad::zeros(theta.len());
    for i in 0..theta.len() {
        shifted[i] = theta[i] + step;
        grad[i] = (func(&shifted) - base) / step;
        shifted[i] = theta[i];
    }
    finish_gradient(grad, theta.len(), closure_err)
}

/// Finite-difference Hessian of the gradient function `f` at `theta`.
///
/// Central differences are tried first. If that matrix fails validation,
/// forward differences are used and only their validation error is
/// reported. The result is symmetrized.
///
/// Errors
/// ------
/// - `OptError::HessianDimMismatch` / `OptError::InvalidHessian` when the
///   forward-difference fallback is also unusable.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use sfs_fit::optimization::loglik_optimizer::{Theta, finite_diff::compute_hessian};
/// // Gradient of x² + 3y²
/// let grad_fn = |t: &Theta| array![2.0 * t[0], 6.0 * t[1]];
/// let hess = compute_hessian(&grad_fn, &array![1.0, 1.0]).unwrap();
/// assert!((hess[[1, 1]] - 6.0).abs() < 1e-5);
/// ```
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut hess = theta.central_hessian(f);
    if validate_hessian(&hess, dim).is_err() {
        hess = theta.forward_hessian(f);
        validate_hessian(&hess, dim)?;
    }
    symmetrize_hess(&mut hess);
    Ok(hess)
}

/// Central second-difference Hessian of `func` with a fixed step.
///
/// Diagonal entries use `(f(θ + h·e_i) − 2f(θ) + f(θ − h·e_i)) / h²`;
/// off-diagonal entries use the four-point stencil
/// `(f(++) − f(+−) − f(−+) + f(−−)) / 4h²`.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Evaluation point.
/// - `func`: `&G`
///   Objective closure that parks failures in `closure_err`.
/// - `step`: `f64`
///   Absolute step `h`. Roundoff grows like `ε·|f| / h²`, so steps near
///   `1e-4` suit objectives of moderate magnitude.
/// - `closure_err`: `&RefCell<Option<Error>>`
///   Shared error slot; cleared on entry.
///
/// Returns
/// -------
/// `OptResult<Hessian>`
///   An exactly symmetric `dim × dim` matrix from `1 + 2·dim²` evaluations
///   at most.
///
/// Errors
/// ------
/// - Any error parked by `func`.
/// - `OptError::InvalidHessian` when an entry is non-finite.
///
/// Examples
/// --------
/// ```rust
/// # use std::cell::RefCell;
/// # use argmin::core::Error;
/// # use ndarray::array;
/// # use sfs_fit::optimization::loglik_optimizer::{Theta, finite_diff::fixed_step_hessian};
/// let closure_err: RefCell<Option<Error>> = RefCell::new(None);
/// let f = |t: &Theta| t[0] * t[0] + 3.0 * t[0] * t[1];
/// let hess = fixed_step_hessian(&array![1.0, 2.0], &f, 1e-4, &closure_err).unwrap();
/// assert!((hess[[0, 0]] - 2.0).abs() < 1e-4);
/// assert!((hess[[0, 1]] - 3.0).abs() < 1e-4);
/// ```
pub fn fixed_step_hessian<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, step: f64, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Hessian> {
    closure_err.replace(None);
    let dim = theta.len();
    let base = func(theta);
    let at = |offsets: &[(usize, f64)]| {
        let mut shifted = theta.clone();
        for &(i, delta) in offsets {
            shifted[i] += delta;
        }
        func(&shifted)
    };
    let h2 = step * step;
    let mut hess = Hessian::zeros((dim, dim));
    for i in 0..dim {
        hess[[i, i]] = (at(&[(i, step)]) - 2.0 * base + at(&[(i, -step)])) / h2;
        for j in 0..i {
            let value = (at(&[(i, step), (j, step)])
                - at(&[(i, step), (j, -step)])
                - at(&[(i, -step), (j, step)])
                + at(&[(i, -step), (j, -step)]))
                / (4.0 * h2);
            hess[[i, j]] = value;
            hess[[j, i]] = value;
        }
    }
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_hessian(&hess, dim)?;
    Ok(hess)
}

// ---- Helper methods ----

fn finish_gradient(
    grad: Grad, dim: usize, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&grad, dim)?;
    Ok(grad)
}

/// Average each off-diagonal pair in place; the diagonal is untouched.
fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
