//! likelihood — scoring model spectra against data.
//!
//! Purpose
//! -------
//! Provide the composite Poisson likelihood used to fit demographic models,
//! its multinomial (scale-free) variant, the optimal scaling between a model
//! and data, and residuals for inspecting a fit.
//!
//! Key behaviors
//! -------------
//! - [`ll_per_bin`] / [`ll`] / [`minus_ll`]: independent Poisson cells.
//! - [`optimal_sfs_scaling`] and the `*_multinom` family: rescale the model
//!   to the data's mass before scoring.
//! - [`linear_poisson_residual`] / [`anscombe_poisson_residual`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Model and data must share a shape; a mismatch is
//!   `SpectrumError::ShapeMismatch`.
//! - Masked cells in either input are excluded from every sum and masked in
//!   every per-cell output.
//! - Totals are NaN when an unmasked cell is undefined (`0·ln 0`); nothing
//!   here replaces NaN.
//!
//! Downstream usage
//! ----------------
//! - `optimization::fit::SfsObjective` calls [`ll`] or [`ll_multinom`] once
//!   per evaluation.
pub mod poisson;
pub mod residuals;

pub use self::{
    poisson::{
        ll, ll_multinom, ll_multinom_per_bin, ll_per_bin, minus_ll, minus_ll_multinom,
        optimal_sfs_scaling,
    },
    residuals::{anscombe_poisson_residual, linear_poisson_residual},
};
