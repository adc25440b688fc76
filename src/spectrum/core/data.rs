//! Masked N-dimensional frequency spectrum container.
//!
//! Purpose
//! -------
//! Provide the data model every transform and likelihood in the crate works
//! on: an `f64` histogram of derived-allele counts indexed by one axis per
//! population, a boolean mask of the same shape, and a fill value used when
//! rendering masked cells.
//!
//! Key behaviors
//! -------------
//! - [`Spectrum::new`] validates shapes and optionally masks the two corner
//!   cells (absent in every population, fixed in every population).
//! - Accessors expose sample sizes, dimensionality, raw data and mask views,
//!   and mask-aware reductions ([`Spectrum::sum`], [`Spectrum::count_unmasked`]).
//! - [`Spectrum::mask_corners`] and [`Spectrum::unmask_all`] are the only
//!   in-place mutators; every transform returns a fresh instance.
//!
//! Invariants & assumptions
//! ------------------------
//! - `mask.shape() == data.shape()` at all times.
//! - At least one axis, and every axis has extent ≥ 1; the sample size of
//!   population `i` is `shape[i] - 1`.
//! - Values stored under a masked cell are never read by reductions,
//!   transforms, or likelihoods; they may be anything (including NaN).
//!
//! Conventions
//! -----------
//! - Storage is row-major (`ndarray` standard layout); flat indices follow
//!   the order of the flat-text file format.
//! - `true` in the mask means *excluded*.
//!
//! Testing notes
//! -------------
//! - Unit tests cover construction (default corner masking, explicit masks,
//!   shape errors), accessors and the in-place mask operations.
use crate::spectrum::errors::{SpectrumError, SpectrumResult};
use ndarray::{ArrayD, ArrayViewD, IxDyn};

/// `Spectrum` — masked joint allele-count histogram.
///
/// Fields
/// ------
/// - `data`: `ArrayD<f64>`
///   Cell values; axis `i` has length `n_i + 1`.
/// - `mask`: `ArrayD<bool>`
///   Exclusion flags with the same shape as `data`.
/// - `fill_value`: `f64`
///   Value substituted for masked cells by [`Spectrum::filled`]; NaN by
///   default so masked cells serialize as `nan`.
///
/// Invariants
/// ----------
/// - `data.shape() == mask.shape()`, `data.ndim() >= 1`, no zero-length axis.
#[derive(Debug, Clone)]
pub struct Spectrum {
    data: ArrayD<f64>,
    mask: ArrayD<bool>,
    fill_value: f64,
}

impl Spectrum {
    /// Construct a spectrum from raw data, an optional mask and a corner flag.
    ///
    /// Parameters
    /// ----------
    /// - `data`: `ArrayD<f64>`
    ///   Histogram values, one axis per population.
    /// - `mask`: `Option<ArrayD<bool>>`
    ///   Explicit mask; `None` starts with every cell unmasked.
    /// - `mask_corners`: `bool`
    ///   When `true`, the all-absent and all-fixed cells are masked.
    ///
    /// Errors
    /// ------
    /// - `SpectrumError::EmptySpectrum` for a 0-dimensional array.
    /// - `SpectrumError::ZeroLengthAxis` when any axis has length 0.
    /// - `SpectrumError::MaskShapeMismatch` when `mask` has another shape.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::{ArrayD, IxDyn};
    /// # use sfs_fit::spectrum::Spectrum;
    /// let data = ArrayD::from_shape_vec(IxDyn(&[3]), vec![0.0, 10.0, 0.0]).unwrap();
    /// let fs = Spectrum::new(data, None, true).unwrap();
    /// assert_eq!(fs.sample_sizes(), vec![2]);
    /// assert!(fs.is_masked(&[0]) && fs.is_masked(&[2]));
    /// ```
    pub fn new(
        data: ArrayD<f64>, mask: Option<ArrayD<bool>>, mask_corners: bool,
    ) -> SpectrumResult<Self> {
        validate_shape(data.shape())?;
        let mask = match mask {
            Some(mask) => {
                if mask.shape() != data.shape() {
                    return Err(SpectrumError::MaskShapeMismatch {
                        data: data.shape().to_vec(),
                        mask: mask.shape().to_vec(),
                    });
                }
                mask
            }
            None => ArrayD::from_elem(data.raw_dim(), false),
        };
        let mut spectrum = Spectrum { data, mask, fill_value: f64::NAN };
        if mask_corners {
            spectrum.mask_corners();
        }
        Ok(spectrum)
    }

    /// Construct a spectrum from a shape and row-major values.
    ///
    /// Errors
    /// ------
    /// - `SpectrumError::ValueCountMismatch` when `values.len()` differs from
    ///   the product of `shape`.
    /// - Any error from [`Spectrum::new`].
    pub fn from_shape_vec(
        shape: &[usize], values: Vec<f64>, mask_corners: bool,
    ) -> SpectrumResult<Self> {
        validate_shape(shape)?;
        let expected: usize = shape.iter().product();
        let found = values.len();
        let data = ArrayD::from_shape_vec(IxDyn(shape), values)
            .map_err(|_| SpectrumError::ValueCountMismatch { expected, found })?;
        Spectrum::new(data, None, mask_corners)
    }

    /// Assemble a spectrum from already-consistent parts.
    ///
    /// Used by transforms whose output shapes are correct by construction.
    pub(crate) fn from_parts(data: ArrayD<f64>, mask: ArrayD<bool>, fill_value: f64) -> Self {
        debug_assert_eq!(data.shape(), mask.shape());
        Spectrum { data, mask, fill_value }
    }

    /// Mask the "seen in no samples" and "seen in all samples" cells.
    pub fn mask_corners(&mut self) {
        let origin = vec![0; self.num_populations()];
        let fixed = self.sample_sizes();
        self.mask[IxDyn(&origin)] = true;
        self.mask[IxDyn(&fixed)] = true;
    }

    /// Unmask every cell.
    pub fn unmask_all(&mut self) {
        self.mask.fill(false);
    }

    /// Per-population sample sizes (`shape - 1`).
    pub fn sample_sizes(&self) -> Vec<usize> {
        self.data.shape().iter().map(|&n| n - 1).collect()
    }

    /// Number of populations, i.e. the dimensionality of the array.
    pub fn num_populations(&self) -> usize {
        self.data.ndim()
    }

    /// Array shape (`sample_sizes + 1`).
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Raw cell values, including whatever sits under masked cells.
    pub fn data(&self) -> ArrayViewD<'_, f64> {
        self.data.view()
    }

    /// Exclusion mask.
    pub fn mask(&self) -> ArrayViewD<'_, bool> {
        self.mask.view()
    }

    pub fn fill_value(&self) -> f64 {
        self.fill_value
    }

    pub fn set_fill_value(&mut self, fill_value: f64) {
        self.fill_value = fill_value;
    }

    /// Copy of the data with masked cells replaced by the fill value.
    pub fn filled(&self) -> ArrayD<f64> {
        self.filled_with(self.fill_value)
    }

    /// Copy of the data with masked cells replaced by `value`.
    pub fn filled_with(&self, value: f64) -> ArrayD<f64> {
        let mut out = self.data.clone();
        out.zip_mut_with(&self.mask, |v, &m| {
            if m {
                *v = value;
            }
        });
        out
    }

    /// `true` when the cell at `index` is masked.
    ///
    /// Panics
    /// ------
    /// - Panics if `index` is out of bounds, like `ndarray` indexing.
    pub fn is_masked(&self, index: &[usize]) -> bool {
        self.mask[IxDyn(index)]
    }

    /// Value at `index`, or `None` when the cell is masked or out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        let ix = IxDyn(index);
        match self.mask.get(ix.clone()) {
            Some(false) => self.data.get(ix).copied(),
            _ => None,
        }
    }

    /// Sum over unmasked cells.
    pub fn sum(&self) -> f64 {
        self.data.iter().zip(self.mask.iter()).filter_map(|(&v, &m)| (!m).then_some(v)).sum()
    }

    /// Number of unmasked cells.
    pub fn count_unmasked(&self) -> usize {
        self.mask.iter().filter(|&&m| !m).count()
    }

    /// Fail unless the spectrum has exactly `npop` populations.
    ///
    /// Errors
    /// ------
    /// - `SpectrumError::DimensionMismatch` when `num_populations() != npop`.
    pub fn ensure_dimension(&self, npop: usize) -> SpectrumResult<()> {
        if self.num_populations() != npop {
            return Err(SpectrumError::DimensionMismatch {
                expected: npop,
                found: self.num_populations(),
            });
        }
        Ok(())
    }

    pub(crate) fn data_ref(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub(crate) fn mask_ref(&self) -> &ArrayD<bool> {
        &self.mask
    }
}

/// Reject 0-dimensional shapes and zero-length axes.
pub(crate) fn validate_shape(shape: &[usize]) -> SpectrumResult<()> {
    if shape.is_empty() {
        return Err(SpectrumError::EmptySpectrum);
    }
    if let Some(axis) = shape.iter().position(|&n| n == 0) {
        return Err(SpectrumError::ZeroLengthAxis { axis });
    }
    Ok(())
}
