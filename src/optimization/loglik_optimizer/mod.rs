//! loglik_optimizer — L-BFGS maximization of log-likelihoods on `argmin`.
//!
//! Purpose
//! -------
//! Maximize any `ℓ(θ)` exposed through the [`LogLikelihood`] trait. The
//! spectrum-fitting driver is one such likelihood; nothing in this module
//! knows about spectra.
//!
//! Key behaviors
//! -------------
//! - [`maximize`] checks the starting point, picks the line search, builds
//!   the solver ([`builders`]) and runs it ([`run::run_lbfgs`]).
//! - [`adapter::ArgMinAdapter`] presents `−ℓ(θ)` to `argmin` and supplies
//!   gradients: analytic when the model has one, otherwise central
//!   differences or fixed-step forward differences per
//!   [`MLEOptions::fd_step`].
//! - [`finite_diff`] also provides the Hessian used for post-fit curvature.
//!
//! Invariants & assumptions
//! ------------------------
//! - Models implement `ℓ` and `∇ℓ`, never the cost.
//! - Model failures are `OptError`s. They cross `argmin` as
//!   `argmin::core::Error` and are recovered unchanged on the way out.
//! - [`Tolerances`] and [`MLEOptions`] are validated on construction.
//!
//! Testing notes
//! -------------
//! - Each submodule has unit tests; `api` runs full solves on a Gaussian
//!   likelihood with both line searches.
pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};
