//! optimization — likelihood maximization and the spectrum-fit driver.
//!
//! Purpose
//! -------
//! Turn "find the demographic parameters that best explain this spectrum"
//! into an L-BFGS run, and report what the run found.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer`: generic `argmin`-backed maximization of any
//!   `LogLikelihood`, with finite-difference gradients and Hessians.
//! - `numerical_stability`: the `ln`/`exp` maps between natural and
//!   optimizer space.
//! - `fit`: the spectrum objective, its per-call session and
//!   `optimize_log`.
//! - `errors`: one error enum, `OptError`, for all of the above, wrapping
//!   `SpectrumError` when scoring fails.
//!
//! Conventions
//! -----------
//! - Log-likelihoods are maximized by minimizing `−ℓ`; every user-facing
//!   value is `ℓ`.
//! - Domain trouble during a search (bounds, undefined likelihoods) is a
//!   penalty, not an error. Errors mean bad input or a broken model.
//! - Progress goes through `tracing` or a caller-supplied observer; the
//!   crate never installs a subscriber.
pub mod errors;
pub mod fit;
pub mod loglik_optimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use sfs_fit::optimization::prelude::*;
//
// to import the fitting surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::fit::{
        Bounds, Evaluation, FitOptions, FitOutcome, ModelFunc, ProgressObserver, TracingObserver,
        WriterObserver, optimize_log, optimize_log_with_observer,
    };
    pub use super::loglik_optimizer::{
        LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Theta, Tolerances, maximize,
    };
}
