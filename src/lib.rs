//! sfs_fit — allele-frequency spectra, composite likelihoods and
//! demographic model fitting.
//!
//! Purpose
//! -------
//! Represent site-frequency spectra as masked N-dimensional arrays, apply
//! the transforms needed to compare them (projection, folding,
//! marginalization), score model spectra against data with Poisson or
//! multinomial likelihoods, and fit demographic models by maximum
//! likelihood in log-parameter space.
//!
//! Key behaviors
//! -------------
//! - [`spectrum`]: the [`Spectrum`](spectrum::Spectrum) type, its transforms,
//!   Poisson resampling and the flat-text and `ms` file formats.
//! - [`likelihood`]: per-cell and total log-likelihoods, the optimal
//!   scaling θ*, residuals.
//! - [`optimization`]: a generic `argmin` L-BFGS maximizer and the
//!   spectrum-fit driver `optimization::fit::optimize_log`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Axis `i` of a spectrum has extent `n_i + 1` for sample size `n_i`.
//! - Masked cells never contribute to sums or likelihoods, and outputs of
//!   cell-wise operations are masked wherever an input was.
//!
//! Conventions
//! -----------
//! - Fallible spectrum operations return `SpectrumResult<T>`; optimizer and
//!   fit operations return `OptResult<T>`, which wraps spectrum errors.
//! - Diagnostics are `tracing` events. Binaries and tests choose the
//!   subscriber.
//!
//! Testing notes
//! -------------
//! - Unit tests sit next to the code; `tests/spectrum_transforms.rs` and
//!   `tests/fit_pipeline.rs` exercise the public surface end to end.
pub mod likelihood;
pub mod optimization;
pub mod spectrum;
