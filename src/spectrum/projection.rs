//! spectrum::projection — hypergeometric downsampling of sample sizes.
//!
//! Purpose
//! -------
//! Reduce the sample size of one or more populations by asking, for every
//! source count `h` out of `n_from` chromosomes, how often `j` derived
//! alleles would be seen in a subsample of `n_to` chromosomes drawn without
//! replacement.
//!
//! Key behaviors
//! -------------
//! - [`project`] applies the transform axis by axis; axes whose size does
//!   not change are skipped, so projecting to the current sizes returns an
//!   equal spectrum.
//! - [`projection_weights`] returns the weight vector `w(·|h)` from a
//!   process-wide cache keyed by `(n_to, n_from, h)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `w(j|h) = C(h, j)·C(n_from − h, n_to − j) / C(n_from, n_to)`, nonzero
//!   only for `j ∈ [max(0, h − (n_from − n_to)), min(h, n_to)]`, and
//!   `Σ_j w(j|h) = 1`. Weights are evaluated in log space so large sample
//!   sizes do not overflow.
//! - A masked source cell contributes no value and masks every destination
//!   cell it carries positive weight to. Unmasked totals are therefore
//!   preserved when the input has no masked cells.
//!
//! Conventions
//! -----------
//! - Cache entries are immutable `Arc<[f64]>` of length `n_to + 1`. Readers
//!   share the lock; a miss computes outside the lock and inserts through
//!   `entry().or_insert`, so racing first inserts are harmless.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the weight support and normalization, the 1-D corner
//!   scenario, mass preservation in 2-D and the argument errors.
use crate::spectrum::{
    core::data::Spectrum,
    errors::{SpectrumError, SpectrumResult},
};
use ndarray::{ArrayD, Axis, IxDyn, Zip};
use statrs::function::factorial::ln_binomial;
use std::{
    collections::HashMap,
    sync::{Arc, OnceLock, RwLock},
};
use tracing::debug;

type WeightKey = (usize, usize, usize);

static WEIGHT_CACHE: OnceLock<RwLock<HashMap<WeightKey, Arc<[f64]>>>> = OnceLock::new();

/// Project `spectrum` down to `target_sizes` (one sample size per population).
///
/// Parameters
/// ----------
/// - `spectrum`: `&Spectrum`
///   Source spectrum; left untouched.
/// - `target_sizes`: `&[usize]`
///   Requested sample size per population, each `<=` the current one.
///
/// Returns
/// -------
/// `SpectrumResult<Spectrum>`
///   A spectrum of shape `target_sizes + 1` with the source fill value.
///
/// Errors
/// ------
/// - `SpectrumError::DimensionMismatch` when `target_sizes.len()` differs
///   from the number of populations.
/// - `SpectrumError::ProjectionUpsample` when a target exceeds the current
///   sample size on that axis.
///
/// Examples
/// --------
/// ```rust
/// # use sfs_fit::spectrum::{project, Spectrum};
/// let fs = Spectrum::from_shape_vec(&[3], vec![0.0, 10.0, 0.0], true).unwrap();
/// let projected = project(&fs, &[1]).unwrap();
/// assert!((projected.data()[[0]] - 5.0).abs() < 1e-12);
/// assert!((projected.data()[[1]] - 5.0).abs() < 1e-12);
/// ```
pub fn project(spectrum: &Spectrum, target_sizes: &[usize]) -> SpectrumResult<Spectrum> {
    spectrum.ensure_dimension(target_sizes.len())?;
    let source_sizes = spectrum.sample_sizes();
    for (axis, (&to, &from)) in target_sizes.iter().zip(source_sizes.iter()).enumerate() {
        if to > from {
            return Err(SpectrumError::ProjectionUpsample { axis, from, to });
        }
    }

    let mut data = spectrum.data_ref().clone();
    let mut mask = spectrum.mask_ref().clone();
    for (axis, (&to, &from)) in target_sizes.iter().zip(source_sizes.iter()).enumerate() {
        if to == from {
            continue;
        }
        let (next_data, next_mask) = project_axis(&data, &mask, axis, from, to);
        data = next_data;
        mask = next_mask;
    }
    debug!(from = ?source_sizes, to = ?target_sizes, "projected spectrum");
    Ok(Spectrum::from_parts(data, mask, spectrum.fill_value()))
}

/// Hypergeometric weights `w(j | hits)` for `j = 0..=n_to`.
///
/// Panics
/// ------
/// - Panics if `n_to > n_from` or `hits > n_from`; [`project`] never calls
///   it that way.
pub fn projection_weights(n_to: usize, n_from: usize, hits: usize) -> Arc<[f64]> {
    assert!(n_to <= n_from && hits <= n_from, "projection weights need n_to, hits <= n_from");
    let key = (n_to, n_from, hits);
    let cache = WEIGHT_CACHE.get_or_init(|| RwLock::new(HashMap::new()));
    if let Ok(guard) = cache.read() {
        if let Some(weights) = guard.get(&key) {
            return Arc::clone(weights);
        }
    }
    let weights: Arc<[f64]> = compute_weights(n_to, n_from, hits).into();
    match cache.write() {
        Ok(mut guard) => Arc::clone(guard.entry(key).or_insert(weights)),
        // A poisoned cache still yields correct weights; they just are not stored.
        Err(_) => weights,
    }
}

fn compute_weights(n_to: usize, n_from: usize, hits: usize) -> Vec<f64> {
    let mut weights = vec![0.0; n_to + 1];
    let least = hits.saturating_sub(n_from - n_to);
    let most = hits.min(n_to);
    let ln_total = ln_binomial(n_from as u64, n_to as u64);
    for (j, w) in weights.iter_mut().enumerate().take(most + 1).skip(least) {
        let ln_w = ln_binomial(hits as u64, j as u64)
            + ln_binomial((n_from - hits) as u64, (n_to - j) as u64)
            - ln_total;
        *w = ln_w.exp();
    }
    weights
}

fn project_axis(
    data: &ArrayD<f64>, mask: &ArrayD<bool>, axis: usize, n_from: usize, n_to: usize,
) -> (ArrayD<f64>, ArrayD<bool>) {
    let mut shape = data.shape().to_vec();
    shape[axis] = n_to + 1;
    let mut out = ArrayD::<f64>::zeros(IxDyn(&shape));
    let mut out_mask = ArrayD::from_elem(IxDyn(&shape), false);
    let weights: Vec<Arc<[f64]>> =
        (0..=n_from).map(|hits| projection_weights(n_to, n_from, hits)).collect();

    Zip::from(data.lanes(Axis(axis)))
        .and(mask.lanes(Axis(axis)))
        .and(out.lanes_mut(Axis(axis)))
        .and(out_mask.lanes_mut(Axis(axis)))
        .for_each(|src, src_mask, mut dst, mut dst_mask| {
            for (hits, w) in weights.iter().enumerate() {
                if src_mask[hits] {
                    for (j, &wj) in w.iter().enumerate() {
                        if wj > 0.0 {
                            dst_mask[j] = true;
                        }
                    }
                    continue;
                }
                let value = src[hits];
                if value == 0.0 {
                    continue;
                }
                for (j, &wj) in w.iter().enumerate() {
                    dst[j] += wj * value;
                }
            }
        });
    (out, out_mask)
}
