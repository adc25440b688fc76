//! Log-space reparameterization for strictly positive model parameters.
//!
//! Demographic parameters (population sizes, times, migration rates) are
//! positive and span orders of magnitude. Optimizing `θ = ln p` removes the
//! positivity constraint and makes a fixed finite-difference step a relative
//! step on `p`.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::Theta,
};

/// Map natural parameters to optimizer space, `θ_i = ln p_i`.
///
/// Errors
/// ------
/// - `OptError::InvalidInitialParams` for an empty vector, or for the first
///   entry that is non-finite or not strictly positive.
pub fn to_log_params(params: &[f64]) -> OptResult<Theta> {
    if params.is_empty() {
        return Err(OptError::InvalidInitialParams {
            index: 0,
            value: f64::NAN,
            reason: "At least one parameter is required.",
        });
    }
    for (index, &value) in params.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidInitialParams {
                index,
                value,
                reason: "Parameters must be finite.",
            });
        }
        if value <= 0.0 {
            return Err(OptError::InvalidInitialParams {
                index,
                value,
                reason: "Parameters must be strictly positive to be optimized in log space.",
            });
        }
    }
    Ok(params.iter().map(|p| p.ln()).collect())
}

/// Map optimizer-space values back, `p_i = exp θ_i`.
///
/// Entries above `ln(f64::MAX)` overflow to `+∞`. They are not clamped: the
/// fit driver treats such a point as out of bounds, or the model's
/// likelihood comes out undefined and the point is penalized.
pub fn from_log_params(theta: &Theta) -> Theta {
    theta.mapv(f64::exp)
}
