//! Reader for `ms` coalescent simulator output.
//!
//! The stream starts with the command line (`ms nsam nreps [-I npop n1 ..]`)
//! and a seed line, followed by one block per replicate:
//!
//! ```text
//! //
//! segsites: 3
//! positions: 0.1 0.5 0.9
//! 010
//! 110
//! ...
//! ```
//! Each segregating site adds one to the cell indexed by its per-population
//! derived-allele counts.
use crate::spectrum::{
    core::data::Spectrum,
    errors::{SpectrumError, SpectrumResult},
};
use ndarray::{ArrayD, IxDyn};
use std::io::{BufRead, Lines};

/// Command and seed lines of an ms file, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsHeader {
    pub command: String,
    pub seeds: String,
}

/// Spectrum built from ms output plus the header it came with.
#[derive(Debug, Clone, PartialEq)]
pub struct MsSpectrum {
    pub spectrum: Spectrum,
    pub header: MsHeader,
}

/// Build a spectrum from ms output.
///
/// Parameters
/// ----------
/// - `reader`: any `BufRead` positioned at the command line.
/// - `average`: `bool`
///   Divide the accumulated counts by the declared number of replicates.
/// - `mask_corners`: `bool`
///
/// Errors
/// ------
/// - `SpectrumError::UnrecognizedCommand` if the first token is not an ms
///   invocation or its sample configuration cannot be read.
/// - `SpectrumError::MalformedMsBlock` for missing or malformed replicate
///   blocks (separator, `segsites:`, `positions:`, haplotype lines).
/// - `SpectrumError::Io` when the reader fails.
pub fn read_ms<R: BufRead>(
    reader: R, average: bool, mask_corners: bool,
) -> SpectrumResult<MsSpectrum> {
    let mut lines = reader.lines();
    let command = match lines.next() {
        Some(line) => line?,
        None => return Err(SpectrumError::UnrecognizedCommand { command: String::new() }),
    };
    let (pop_sizes, runs) = parse_command(&command)?;
    let seeds = match lines.next() {
        Some(line) => line?,
        None => return Err(malformed(0, "missing seed line")),
    };

    let total: usize = pop_sizes.iter().sum();
    let shape: Vec<usize> = pop_sizes.iter().map(|n| n + 1).collect();
    let mut data = ArrayD::<f64>::zeros(IxDyn(&shape));
    let mut counts = vec![0usize; pop_sizes.len()];

    for run in 0..runs {
        loop {
            let line = lines.next().ok_or_else(|| malformed(run, "missing // separator"))??;
            if line.starts_with("//") {
                break;
            }
        }
        let segsites_line = next_nonblank(&mut lines)?
            .ok_or_else(|| malformed(run, "missing segsites line"))?;
        let segsites = segsites_line
            .strip_prefix("segsites:")
            .and_then(|rest| rest.trim().parse::<usize>().ok())
            .ok_or_else(|| malformed(run, &format!("bad segsites line {segsites_line:?}")))?;
        if segsites == 0 {
            continue;
        }
        let positions = next_nonblank(&mut lines)?;
        if !positions.as_deref().is_some_and(|line| line.starts_with("positions:")) {
            return Err(malformed(run, "missing positions line"));
        }

        let mut haplotypes = Vec::with_capacity(total);
        for chrom in 0..total {
            let line = next_nonblank(&mut lines)?
                .ok_or_else(|| malformed(run, &format!("missing haplotype {chrom}")))?;
            if line.len() < segsites {
                return Err(malformed(
                    run,
                    &format!("haplotype {chrom} has {} sites, expected {segsites}", line.len()),
                ));
            }
            haplotypes.push(line.into_bytes());
        }

        for site in 0..segsites {
            let mut start = 0;
            for (pop, &size) in pop_sizes.iter().enumerate() {
                counts[pop] =
                    haplotypes[start..start + size].iter().filter(|h| h[site] == b'1').count();
                start += size;
            }
            data[IxDyn(&counts)] += 1.0;
        }
    }

    let mut spectrum = Spectrum::new(data, None, mask_corners)?;
    if average && runs > 0 {
        spectrum = spectrum / runs as f64;
    }
    Ok(MsSpectrum { spectrum, header: MsHeader { command, seeds } })
}

/// Per-population sample sizes and replicate count from the command line.
fn parse_command(command: &str) -> SpectrumResult<(Vec<usize>, usize)> {
    let unrecognized = || SpectrumError::UnrecognizedCommand { command: command.to_string() };
    let terms: Vec<&str> = command.split_whitespace().collect();
    if terms.len() < 3 || !terms[0].contains("ms") {
        return Err(unrecognized());
    }
    let nsam: usize = terms[1].parse().map_err(|_| unrecognized())?;
    let runs: usize = terms[2].parse().map_err(|_| unrecognized())?;

    let pop_sizes = match terms.iter().position(|&t| t == "-I") {
        None => vec![nsam],
        Some(flag) => {
            let npop: usize =
                terms.get(flag + 1).and_then(|t| t.parse().ok()).ok_or_else(unrecognized)?;
            let sizes = terms
                .get(flag + 2..flag + 2 + npop)
                .ok_or_else(unrecognized)?
                .iter()
                .map(|t| t.parse::<usize>().map_err(|_| unrecognized()))
                .collect::<SpectrumResult<Vec<_>>>()?;
            if npop == 0 || sizes.iter().sum::<usize>() != nsam {
                return Err(unrecognized());
            }
            sizes
        }
    };
    Ok((pop_sizes, runs))
}

fn next_nonblank<R: BufRead>(lines: &mut Lines<R>) -> SpectrumResult<Option<String>> {
    for line in lines.by_ref() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
    Ok(None)
}

fn malformed(run: usize, reason: &str) -> SpectrumError {
    SpectrumError::MalformedMsBlock { run, reason: reason.to_string() }
}
