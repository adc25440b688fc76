//! spectrum — masked allele-frequency spectra and their transforms.
//!
//! Purpose
//! -------
//! Own the [`Spectrum`] data model and every Spectrum → Spectrum transform
//! used before scoring: projection to smaller sample sizes, folding to
//! minor-allele form, marginalization over populations and Poisson
//! resampling, plus the text formats spectra are stored in.
//!
//! Key behaviors
//! -------------
//! - `core`: the container, its arithmetic and equality.
//! - [`project`], [`fold`], [`marginalize`]: pure transforms returning new
//!   spectra.
//! - `sampling`: `Spectrum::sample` for parametric bootstraps.
//! - `io`: flat-text reader/writer and `ms` reader.
//!
//! Invariants & assumptions
//! ------------------------
//! - Transforms never mutate their input and never re-mask corners unless
//!   asked to (`marginalize`'s flag, `Spectrum::new`).
//! - Masked cells carry no information: they are zero for accumulation and
//!   skipped by reductions.
//!
//! Downstream usage
//! ----------------
//! - `likelihood` scores pairs of spectra; `optimization::fit` folds model
//!   and data on request before scoring.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests; `tests/spectrum_transforms.rs`
//!   exercises the transforms together and the on-disk round trip.
pub mod core;
pub mod errors;
pub mod fold;
pub mod io;
pub mod marginal;
pub mod projection;
pub mod sampling;

pub use self::{
    core::Spectrum,
    errors::{SpectrumError, SpectrumResult},
    fold::fold,
    marginal::marginalize,
    projection::{project, projection_weights},
};
