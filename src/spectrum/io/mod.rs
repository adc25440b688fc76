//! spectrum::io — reading and writing spectra.
//!
//! Purpose
//! -------
//! Move spectra in and out of the two text formats the fitting workflow
//! consumes: the flat-text spectrum format (read and write) and raw `ms`
//! simulator output (read only).
//!
//! Key behaviors
//! -------------
//! - Stream functions ([`read_flat`], [`write_flat`], [`read_ms`]) take any
//!   `BufRead` / `Write`.
//! - Path helpers on [`Spectrum`] open the file and delegate.
//!
//! Invariants & assumptions
//! ------------------------
//! - Format violations surface as IO-format [`SpectrumError`] variants; a
//!   failing stream surfaces as `SpectrumError::Io`.
pub mod flat;
pub mod ms;

pub use self::{
    flat::{read_flat, write_flat, FlatSpectrum, DEFAULT_PRECISION},
    ms::{read_ms, MsHeader, MsSpectrum},
};

use crate::spectrum::{core::data::Spectrum, errors::SpectrumResult};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

impl Spectrum {
    /// Read a flat-text spectrum file, discarding its comments.
    pub fn from_file(path: impl AsRef<Path>, mask_corners: bool) -> SpectrumResult<Spectrum> {
        Ok(Self::from_file_with_comments(path, mask_corners)?.spectrum)
    }

    /// Read a flat-text spectrum file together with its comment lines.
    pub fn from_file_with_comments(
        path: impl AsRef<Path>, mask_corners: bool,
    ) -> SpectrumResult<FlatSpectrum> {
        let file = File::open(path)?;
        read_flat(BufReader::new(file), mask_corners)
    }

    /// Write the spectrum to `path` in the flat-text format.
    ///
    /// Masked cells are written as `nan`; values use `precision`
    /// significant digits ([`DEFAULT_PRECISION`] matches full `f64`
    /// round-tripping closely enough for fitting).
    pub fn to_file(
        &self, path: impl AsRef<Path>, precision: usize, comments: &[&str],
    ) -> SpectrumResult<()> {
        let file = File::create(path)?;
        write_flat(self, BufWriter::new(file), precision, comments)
    }

    /// Build a spectrum from an `ms` output file.
    pub fn from_ms_file(
        path: impl AsRef<Path>, average: bool, mask_corners: bool,
    ) -> SpectrumResult<MsSpectrum> {
        let file = File::open(path)?;
        read_ms(BufReader::new(file), average, mask_corners)
    }
}
