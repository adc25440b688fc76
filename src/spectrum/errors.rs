//! Errors for masked frequency spectra (construction, transforms, file I/O).
//!
//! This module defines [`SpectrumError`], the single error type raised by the
//! spectrum data model, the projection/fold/marginalization transforms, the
//! likelihood engine and the spectrum readers and writers.
//!
//! ## Conventions
//! - **Indices are 0-based** and axes are numbered in population order.
//! - Errors split into two families: *invalid-argument* errors (caller asked
//!   for something the data model cannot represent) and *IO-format* errors
//!   (a file or stream did not follow the expected layout). Use
//!   [`SpectrumError::is_invalid_argument`] / [`SpectrumError::is_io_format`]
//!   to classify without matching every variant.
//! - Errors are never retried; they fail fast and propagate to the caller.

/// Result alias for spectrum operations that may produce [`SpectrumError`].
pub type SpectrumResult<T> = Result<T, SpectrumError>;

/// Unified error type for spectrum construction, transforms and I/O.
#[derive(Debug, Clone, PartialEq)]
pub enum SpectrumError {
    // ---- Construction ----
    /// Explicit mask does not have the same shape as the data.
    MaskShapeMismatch { data: Vec<usize>, mask: Vec<usize> },

    /// A spectrum needs at least one population axis.
    EmptySpectrum,

    /// Every axis must hold at least one cell (sample size ≥ 0).
    ZeroLengthAxis { axis: usize },

    /// Flat values cannot be reshaped into the requested shape.
    ValueCountMismatch { expected: usize, found: usize },

    // ---- Arithmetic / likelihood ----
    /// Two spectra combined elementwise must share a shape.
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    /// Operation only supports spectra with a given number of populations.
    DimensionMismatch { expected: usize, found: usize },

    // ---- Projection ----
    /// Projection can only reduce sample sizes.
    ProjectionUpsample { axis: usize, from: usize, to: usize },

    // ---- Marginalization ----
    /// Axis index is not a population of this spectrum.
    InvalidAxis { axis: usize, ndim: usize },

    /// Axis listed more than once.
    DuplicateAxis { axis: usize },

    /// Marginalizing over every population leaves nothing to index.
    MarginalizeAllAxes { ndim: usize },

    // ---- Sampling ----
    /// Poisson mean rejected by the sampler.
    InvalidPoissonMean { value: f64 },

    // ---- Flat-text format ----
    /// Stream ended before the shape line.
    MissingShape,

    /// Shape line holds a token that is not a positive integer.
    MalformedShape { line: String },

    /// Value token could not be parsed as a float.
    MalformedValue { token: String },

    /// Fewer or more values than the shape line declares.
    TruncatedValues { expected: usize, found: usize },

    // ---- ms output ----
    /// First line is not an ms command line.
    UnrecognizedCommand { command: String },

    /// ms run block is truncated or malformed.
    MalformedMsBlock { run: usize, reason: String },

    // ---- I/O ----
    /// Underlying reader or writer failed.
    Io { text: String },
}

impl SpectrumError {
    /// `true` for errors caused by an invalid request (shapes, axes, sizes).
    pub fn is_invalid_argument(&self) -> bool {
        !self.is_io_format()
    }

    /// `true` for errors caused by a malformed file or a failing stream.
    pub fn is_io_format(&self) -> bool {
        matches!(
            self,
            SpectrumError::MissingShape
                | SpectrumError::MalformedShape { .. }
                | SpectrumError::MalformedValue { .. }
                | SpectrumError::TruncatedValues { .. }
                | SpectrumError::MalformedMsBlock { .. }
                | SpectrumError::Io { .. }
        )
    }
}

impl std::error::Error for SpectrumError {}

impl std::fmt::Display for SpectrumError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Construction ----
            SpectrumError::MaskShapeMismatch { data, mask } => {
                write!(f, "Mask shape {mask:?} does not match data shape {data:?}")
            }
            SpectrumError::EmptySpectrum => {
                write!(f, "Spectrum must have at least one population axis")
            }
            SpectrumError::ZeroLengthAxis { axis } => {
                write!(f, "Axis {axis} has length zero; sample sizes must be non-negative")
            }
            SpectrumError::ValueCountMismatch { expected, found } => {
                write!(f, "Expected {expected} values for the declared shape, found {found}")
            }

            // ---- Arithmetic / likelihood ----
            SpectrumError::ShapeMismatch { left, right } => {
                write!(f, "Spectrum shapes differ: {left:?} vs {right:?}")
            }
            SpectrumError::DimensionMismatch { expected, found } => {
                write!(f, "Only compatible with {expected}-population spectra, got {found}")
            }

            // ---- Projection ----
            SpectrumError::ProjectionUpsample { axis, from, to } => {
                write!(
                    f,
                    "Cannot project axis {axis} to a sample size greater than original \
                     ({from} -> {to})"
                )
            }

            // ---- Marginalization ----
            SpectrumError::InvalidAxis { axis, ndim } => {
                write!(f, "Axis {axis} out of range for a {ndim}-population spectrum")
            }
            SpectrumError::DuplicateAxis { axis } => {
                write!(f, "Axis {axis} listed more than once")
            }
            SpectrumError::MarginalizeAllAxes { ndim } => {
                write!(f, "Cannot marginalize over all {ndim} populations")
            }

            // ---- Sampling ----
            SpectrumError::InvalidPoissonMean { value } => {
                write!(f, "Invalid Poisson mean {value}")
            }

            // ---- Flat-text format ----
            SpectrumError::MissingShape => {
                write!(f, "Spectrum file ended before the shape line")
            }
            SpectrumError::MalformedShape { line } => {
                write!(f, "Malformed shape line: '{line}'")
            }
            SpectrumError::MalformedValue { token } => {
                write!(f, "Malformed spectrum value: '{token}'")
            }
            SpectrumError::TruncatedValues { expected, found } => {
                write!(f, "Spectrum file declares {expected} values but holds {found}")
            }

            // ---- ms output ----
            SpectrumError::UnrecognizedCommand { command } => {
                write!(f, "Unrecognized command string: {command}")
            }
            SpectrumError::MalformedMsBlock { run, reason } => {
                write!(f, "Malformed ms output in run {run}: {reason}")
            }

            // ---- I/O ----
            SpectrumError::Io { text } => {
                write!(f, "I/O error: {text}")
            }
        }
    }
}

impl From<std::io::Error> for SpectrumError {
    fn from(err: std::io::Error) -> Self {
        SpectrumError::Io { text: err.to_string() }
    }
}
