//! fit — maximum-likelihood fitting of demographic models to spectra.
//!
//! Purpose
//! -------
//! Given a data spectrum and a model function producing expected spectra,
//! find the parameters that maximize the composite likelihood. The search
//! runs in log-parameter space on top of `loglik_optimizer`.
//!
//! Key behaviors
//! -------------
//! - [`optimize_log`] / [`optimize_log_with_observer`]: validate inputs,
//!   build one [`SfsObjective`] with its own [`FitSession`], maximize, map
//!   the result back to natural space and optionally form the log-space
//!   Hessian.
//! - [`SfsObjective`] scores one point: bounds first, then the model,
//!   optional folding, Poisson or multinomial likelihood. Out-of-bounds and
//!   undefined points score `−OUT_OF_BOUNDS_PENALTY` so a bad trial never
//!   stops the search.
//! - [`FitSession`] counts evaluations and forwards every `k`-th to a
//!   [`ProgressObserver`] ([`TracingObserver`] or [`WriterObserver`]),
//!   rate limiting flushes.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters are strictly positive; `θ = ln p` is what L-BFGS sees.
//! - Bounds are checked in natural space and are inclusive.
//! - The model must return a spectrum with the data's shape; anything else
//!   aborts the fit with `OptError::Spectrum`.
//! - No state outlives a call: independent fits can run concurrently.
//!
//! Testing notes
//! -------------
//! - Unit tests cover options, the session, each objective outcome and a
//!   one-parameter fit; `tests/fit_pipeline.rs` runs scale and shape fits
//!   end to end.
pub mod api;
pub mod objective;
pub mod options;
pub mod session;

pub use self::{
    api::{FitOutcome, optimize_log, optimize_log_with_observer},
    objective::{Evaluation, ModelFunc, OUT_OF_BOUNDS_PENALTY, SfsObjective},
    options::{Bounds, DEFAULT_EPSILON, DEFAULT_TOL_GRAD, FitOptions},
    session::{FitSession, ProgressObserver, ProgressReport, TracingObserver, WriterObserver},
};
