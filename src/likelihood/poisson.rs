//! Poisson and multinomial log-likelihoods between model and data spectra.
//!
//! Each cell of the data is treated as an independent Poisson draw whose
//! mean is the matching model cell:
//!
//! ```text
//! ll(m, d) = −m + d·ln(m) − lnΓ(d + 1)
//! ```
//!
//! The multinomial variant first rescales the model by the factor θ* that
//! maximizes the Poisson likelihood, `θ* = Σd / Σm`, so only the shape of
//! the model matters. Cells masked in either spectrum are ignored.
//!
//! Undefined cells (`m = 0`, `d = 0` gives `0·ln 0`) are NaN and make the
//! total NaN; callers that optimize treat NaN as an infeasible point.
use crate::spectrum::{
    core::{arithmetic::ensure_same_shape, data::Spectrum},
    errors::SpectrumResult,
};
use ndarray::{ArrayD, Zip};
use statrs::function::gamma::ln_gamma;

/// Poisson log-likelihood of every cell.
///
/// Returns
/// -------
/// `SpectrumResult<Spectrum>`
///   Per-cell log-likelihoods, masked wherever `model` or `data` is masked.
///
/// Errors
/// ------
/// - `SpectrumError::ShapeMismatch` when the shapes differ.
pub fn ll_per_bin(model: &Spectrum, data: &Spectrum) -> SpectrumResult<Spectrum> {
    let mut per_bin = model.zip_with(data, cell_ll)?;
    per_bin.set_fill_value(f64::NAN);
    Ok(per_bin)
}

/// Total Poisson log-likelihood over cells unmasked in both spectra.
pub fn ll(model: &Spectrum, data: &Spectrum) -> SpectrumResult<f64> {
    Ok(ll_per_bin(model, data)?.sum())
}

pub fn minus_ll(model: &Spectrum, data: &Spectrum) -> SpectrumResult<f64> {
    Ok(-ll(model, data)?)
}

/// Scale factor θ* maximizing `ll(θ·model, data)`.
///
/// Setting `∂/∂θ Σ(−θm + d·ln θm) = 0` gives `θ* = Σd / Σm`, taken over the
/// cells unmasked in both spectra.
///
/// Errors
/// ------
/// - `SpectrumError::ShapeMismatch` when the shapes differ.
pub fn optimal_sfs_scaling(model: &Spectrum, data: &Spectrum) -> SpectrumResult<f64> {
    ensure_same_shape(model, data)?;
    let both = joint_mask(model, data);
    let mut model_sum = 0.0;
    let mut data_sum = 0.0;
    Zip::from(model.data_ref()).and(data.data_ref()).and(&both).for_each(|&m, &d, &masked| {
        if !masked {
            model_sum += m;
            data_sum += d;
        }
    });
    Ok(data_sum / model_sum)
}

/// Per-cell log-likelihood after optimally rescaling `model`.
pub fn ll_multinom_per_bin(model: &Spectrum, data: &Spectrum) -> SpectrumResult<Spectrum> {
    let theta = optimal_sfs_scaling(model, data)?;
    ll_per_bin(&model.scale(theta), data)
}

/// Multinomial log-likelihood: Poisson likelihood of the optimally scaled
/// model.
pub fn ll_multinom(model: &Spectrum, data: &Spectrum) -> SpectrumResult<f64> {
    Ok(ll_multinom_per_bin(model, data)?.sum())
}

pub fn minus_ll_multinom(model: &Spectrum, data: &Spectrum) -> SpectrumResult<f64> {
    Ok(-ll_multinom(model, data)?)
}

fn cell_ll(m: f64, d: f64) -> f64 {
    -m + d * m.ln() - ln_gamma(d + 1.0)
}

pub(crate) fn joint_mask(a: &Spectrum, b: &Spectrum) -> ArrayD<bool> {
    Zip::from(a.mask_ref()).and(b.mask_ref()).map_collect(|&x, &y| x || y)
}
