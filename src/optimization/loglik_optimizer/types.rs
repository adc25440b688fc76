//! loglik_optimizer::types — numeric aliases and pre-wired solvers.
//!
//! Purpose
//! -------
//! Name the vector, matrix and solver types the optimizer is built from, so
//! the fitting layer can talk about `Theta` and `LbfgsMoreThuente` instead of
//! spelling out `ndarray` and `argmin` generics.
//!
//! Conventions
//! -----------
//! - `Theta` is the optimizer-space parameter vector. For spectrum fits it
//!   holds log-parameters; the fit driver exponentiates before calling the
//!   model.
//! - `Cost` is the minimized quantity `−ℓ(θ)`.
//! - `Hessian` is `dim × dim` and, when produced by the fit driver, is the
//!   Hessian of the cost in log-parameter space.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Optimizer-space parameter vector.
pub type Theta = Array1<f64>;

/// Gradient of the cost or of the log-likelihood; same length as `Theta`.
pub type Grad = Array1<f64>;

/// Dense square second-derivative matrix.
pub type Hessian = Array2<f64>;

/// Scalar objective value handed to `argmin`.
pub type Cost = f64;

/// Counters reported by `argmin` (`"cost_count"`, `"gradient_count"`, ...).
pub type FnEvalMap = HashMap<String, u64>;

/// History length used when `MLEOptions::lbfgs_mem` is unset.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS paired with the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS paired with the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
