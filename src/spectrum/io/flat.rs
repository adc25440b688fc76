//! Flat-text spectrum format.
//!
//! Layout
//! ------
//! ```text
//! # optional comment lines
//! 3 4
//! v000 v001 ... (row-major values, whitespace separated, any line breaks)
//! ```
//! Masked cells are written as `nan`, and `nan` tokens are masked when read
//! back. Values are written the way C's `%.<p>g` renders them.
use crate::spectrum::{
    core::data::{validate_shape, Spectrum},
    errors::{SpectrumError, SpectrumResult},
};
use ndarray::{ArrayD, IxDyn};
use std::io::{BufRead, Write};

/// Default number of significant digits written per value.
pub const DEFAULT_PRECISION: usize = 16;

/// Spectrum read from a flat-text stream together with its comment lines.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatSpectrum {
    pub spectrum: Spectrum,
    /// Comment lines without the leading `#`, trimmed.
    pub comments: Vec<String>,
}

/// Parse a spectrum from `reader`.
///
/// Parameters
/// ----------
/// - `reader`: any `BufRead`
/// - `mask_corners`: `bool`
///   Mask the two corner cells in addition to any `nan` cells.
///
/// Errors
/// ------
/// - `SpectrumError::MissingShape` if the stream ends before a shape line.
/// - `SpectrumError::MalformedShape` if a shape token is not an integer.
/// - `SpectrumError::MalformedValue` for an unparseable value token.
/// - `SpectrumError::TruncatedValues` if the value count differs from the
///   product of the shape.
/// - `SpectrumError::Io` when the reader fails.
pub fn read_flat<R: BufRead>(reader: R, mask_corners: bool) -> SpectrumResult<FlatSpectrum> {
    let mut lines = reader.lines();
    let mut comments = Vec::new();

    let shape_line = loop {
        let line = match lines.next() {
            Some(line) => line?,
            None => return Err(SpectrumError::MissingShape),
        };
        let trimmed = line.trim();
        if let Some(comment) = trimmed.strip_prefix('#') {
            comments.push(comment.trim().to_string());
        } else if !trimmed.is_empty() {
            break trimmed.to_string();
        }
    };
    let shape = parse_shape(&shape_line)?;
    validate_shape(&shape)?;
    let expected: usize = shape.iter().product();

    let mut values = Vec::with_capacity(expected);
    for line in lines {
        for token in line?.split_whitespace() {
            let value: f64 = token
                .parse()
                .map_err(|_| SpectrumError::MalformedValue { token: token.to_string() })?;
            values.push(value);
        }
    }
    if values.len() != expected {
        return Err(SpectrumError::TruncatedValues { expected, found: values.len() });
    }

    let mask: Vec<bool> = values.iter().map(|v| v.is_nan()).collect();
    let data = ArrayD::from_shape_vec(IxDyn(&shape), values)
        .map_err(|_| SpectrumError::TruncatedValues { expected, found: expected })?;
    let mask = ArrayD::from_shape_vec(IxDyn(&shape), mask)
        .map_err(|_| SpectrumError::TruncatedValues { expected, found: expected })?;
    let spectrum = Spectrum::new(data, Some(mask), mask_corners)?;
    Ok(FlatSpectrum { spectrum, comments })
}

/// Write `spectrum` to `writer` in the flat-text format.
///
/// Parameters
/// ----------
/// - `precision`: significant digits per value (`%.<p>g`); 0 is treated as 1.
/// - `comments`: written first, one `# ` line each.
///
/// Errors
/// ------
/// - `SpectrumError::Io` when the writer fails.
pub fn write_flat<W: Write>(
    spectrum: &Spectrum, mut writer: W, precision: usize, comments: &[&str],
) -> SpectrumResult<()> {
    for comment in comments {
        writeln!(writer, "# {}", comment.trim())?;
    }
    for extent in spectrum.shape() {
        write!(writer, "{extent} ")?;
    }
    writeln!(writer)?;
    let rendered: Vec<String> =
        spectrum.filled().iter().map(|&v| format_general(v, precision)).collect();
    writeln!(writer, "{}", rendered.join(" "))?;
    writer.flush()?;
    Ok(())
}

fn parse_shape(line: &str) -> SpectrumResult<Vec<usize>> {
    let malformed = || SpectrumError::MalformedShape { line: line.to_string() };
    line.split_whitespace().map(|tok| tok.parse::<usize>().map_err(|_| malformed())).collect()
}

/// Render `value` like C's `%.<precision>g`.
pub(crate) fn format_general(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let digits = precision.max(1);
    let scientific = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", strip_zeros(mantissa), sign, exponent.abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        strip_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn strip_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
