//! Elementwise spectrum arithmetic with mask propagation, and equality.
//!
//! Every binary operation requires equal shapes and ORs the two masks: a
//! cell excluded from either operand is excluded from the result. Values
//! under masked cells are still combined (they are never read), so no
//! special casing is needed for NaN payloads.
use crate::spectrum::{
    core::data::Spectrum,
    errors::{SpectrumError, SpectrumResult},
};
use ndarray::{ArrayD, Zip};
use std::ops::{Div, Mul};

impl Spectrum {
    /// Combine two spectra cell by cell with `op`, OR-ing their masks.
    ///
    /// Errors
    /// ------
    /// - `SpectrumError::ShapeMismatch` when the shapes differ.
    pub fn zip_with<F>(&self, other: &Spectrum, op: F) -> SpectrumResult<Spectrum>
    where
        F: Fn(f64, f64) -> f64,
    {
        ensure_same_shape(self, other)?;
        let data: ArrayD<f64> =
            Zip::from(self.data_ref()).and(other.data_ref()).map_collect(|&a, &b| op(a, b));
        let mask: ArrayD<bool> =
            Zip::from(self.mask_ref()).and(other.mask_ref()).map_collect(|&a, &b| a || b);
        Ok(Spectrum::from_parts(data, mask, self.fill_value()))
    }

    pub fn try_add(&self, other: &Spectrum) -> SpectrumResult<Spectrum> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn try_sub(&self, other: &Spectrum) -> SpectrumResult<Spectrum> {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn try_mul(&self, other: &Spectrum) -> SpectrumResult<Spectrum> {
        self.zip_with(other, |a, b| a * b)
    }

    pub fn try_div(&self, other: &Spectrum) -> SpectrumResult<Spectrum> {
        self.zip_with(other, |a, b| a / b)
    }

    /// Apply `op` to every cell, keeping the mask.
    pub fn map(&self, op: impl Fn(f64) -> f64) -> Spectrum {
        Spectrum::from_parts(self.data_ref().mapv(op), self.mask_ref().clone(), self.fill_value())
    }

    /// Multiply every cell by `factor`.
    pub fn scale(&self, factor: f64) -> Spectrum {
        self.map(|v| v * factor)
    }

    /// Copy of `self` whose mask is OR-ed with `extra`.
    pub(crate) fn with_extra_mask(&self, extra: &ArrayD<bool>) -> Spectrum {
        let mut mask = self.mask_ref().clone();
        mask.zip_mut_with(extra, |m, &e| *m = *m || e);
        Spectrum::from_parts(self.data_ref().clone(), mask, self.fill_value())
    }
}

impl Mul<f64> for &Spectrum {
    type Output = Spectrum;

    fn mul(self, rhs: f64) -> Spectrum {
        self.scale(rhs)
    }
}

impl Mul<f64> for Spectrum {
    type Output = Spectrum;

    fn mul(self, rhs: f64) -> Spectrum {
        self.scale(rhs)
    }
}

impl Div<f64> for &Spectrum {
    type Output = Spectrum;

    fn div(self, rhs: f64) -> Spectrum {
        self.map(|v| v / rhs)
    }
}

impl Div<f64> for Spectrum {
    type Output = Spectrum;

    fn div(self, rhs: f64) -> Spectrum {
        self.map(|v| v / rhs)
    }
}

/// Two spectra are equal when they share shape and mask and agree on every
/// unmasked cell. Masked payloads and fill values are ignored.
impl PartialEq for Spectrum {
    fn eq(&self, other: &Self) -> bool {
        if self.shape() != other.shape() || self.mask_ref() != other.mask_ref() {
            return false;
        }
        self.data_ref()
            .iter()
            .zip(other.data_ref().iter())
            .zip(self.mask_ref().iter())
            .all(|((a, b), &masked)| masked || a == b)
    }
}

pub(crate) fn ensure_same_shape(left: &Spectrum, right: &Spectrum) -> SpectrumResult<()> {
    if left.shape() != right.shape() {
        return Err(SpectrumError::ShapeMismatch {
            left: left.shape().to_vec(),
            right: right.shape().to_vec(),
        });
    }
    Ok(())
}
