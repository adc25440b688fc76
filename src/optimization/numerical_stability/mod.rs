//! numerical_stability — parameter-space transforms for the fit driver.
//!
//! Purpose
//! -------
//! Move positive model parameters into an unconstrained, well-scaled space
//! for L-BFGS and back again.
//!
//! Key behaviors
//! -------------
//! - [`to_log_params`]: validated `p ↦ ln p`.
//! - [`from_log_params`]: `θ ↦ exp θ`; overflow to `+∞` is left to the
//!   fit driver's bounds and penalty.
//!
//! Conventions
//! -----------
//! - Pure functions over `ndarray` vectors; no logging, no I/O.
//! - Bounds are never enforced here. `optimization::fit` checks them in
//!   natural space after exponentiating.
pub mod transformations;

pub use self::transformations::{from_log_params, to_log_params};
