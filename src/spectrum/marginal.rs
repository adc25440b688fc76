//! spectrum::marginal — summing populations out of a joint spectrum.
use crate::spectrum::{
    core::data::Spectrum,
    errors::{SpectrumError, SpectrumResult},
};
use ndarray::{ArrayD, Axis, Zip};
use tracing::debug;

/// Sum the populations listed in `axes` out of `spectrum`.
///
/// Axes are processed from highest to lowest so the remaining indices stay
/// valid. Masked cells contribute nothing; an output cell is masked only
/// when every cell summed into it was masked.
///
/// Parameters
/// ----------
/// - `spectrum`: `&Spectrum`
/// - `axes`: `&[usize]`
///   Populations to remove (0-based, any order, no repeats).
/// - `mask_corners`: `bool`
///   Re-mask the corners of the reduced spectrum.
///
/// Errors
/// ------
/// - `SpectrumError::InvalidAxis` for an axis `>= num_populations()`.
/// - `SpectrumError::DuplicateAxis` when an axis is listed twice.
/// - `SpectrumError::MarginalizeAllAxes` when nothing would remain.
pub fn marginalize(
    spectrum: &Spectrum, axes: &[usize], mask_corners: bool,
) -> SpectrumResult<Spectrum> {
    let ndim = spectrum.num_populations();
    let mut sorted = axes.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    for (i, &axis) in sorted.iter().enumerate() {
        if axis >= ndim {
            return Err(SpectrumError::InvalidAxis { axis, ndim });
        }
        if i > 0 && sorted[i - 1] == axis {
            return Err(SpectrumError::DuplicateAxis { axis });
        }
    }
    if sorted.len() == ndim {
        return Err(SpectrumError::MarginalizeAllAxes { ndim });
    }

    let mut values = spectrum.filled_with(0.0);
    let mut mask = spectrum.mask_ref().clone();
    for &axis in &sorted {
        values = values.sum_axis(Axis(axis));
        mask = all_along(&mask, axis);
    }
    let mut out = Spectrum::from_parts(values, mask, spectrum.fill_value());
    if mask_corners {
        out.mask_corners();
    }
    debug!(removed = ?sorted, remaining = ?out.sample_sizes(), "marginalized spectrum");
    Ok(out)
}

fn all_along(mask: &ArrayD<bool>, axis: usize) -> ArrayD<bool> {
    let mut shape = mask.shape().to_vec();
    shape.remove(axis);
    let mut out = ArrayD::from_elem(ndarray::IxDyn(&shape), true);
    Zip::from(&mut out).and(mask.lanes(Axis(axis))).for_each(|o, lane| {
        *o = lane.iter().all(|&m| m);
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Summing out the second population yields row sums.
    //
    // Given
    // -----
    // - An unmasked 3×3 spectrum of 0..=8.
    //
    // Expect
    // ------
    // - `[3, 12, 21]` with no mask.
    fn marginalize_second_axis_gives_row_sums() {
        // Arrange
        let fs = Spectrum::from_shape_vec(&[3, 3], (0..9).map(f64::from).collect(), false)
            .unwrap();

        // Act
        let marginal = marginalize(&fs, &[1], false).unwrap();

        // Assert
        assert_eq!(marginal.shape(), &[3]);
        assert_eq!(marginal.data().to_owned(), array![3.0, 12.0, 21.0].into_dyn());
        assert_eq!(marginal.count_unmasked(), 3);
    }

    #[test]
    // Purpose
    // -------
    // Masked cells are excluded from sums and only fully masked lanes mask.
    //
    // Given
    // -----
    // - A 2×2 spectrum with (0,0) and (0,1) masked (row 0 fully masked) and
    //   (1,0) masked.
    //
    // Expect
    // ------
    // - Row 0 masked; row 1 holds only the unmasked value.
    fn fully_masked_lanes_stay_masked() {
        // Arrange
        let data = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        let mask = array![[true, true], [true, false]].into_dyn();
        let fs = Spectrum::new(data, Some(mask), false).unwrap();

        // Act
        let marginal = marginalize(&fs, &[1], false).unwrap();

        // Assert
        assert!(marginal.is_masked(&[0]));
        assert_eq!(marginal.get(&[1]), Some(4.0));
    }

    #[test]
    // Purpose
    // -------
    // Corner re-masking applies to the reduced shape.
    //
    // Given
    // -----
    // - A 3-population spectrum of ones, marginalized over axes (2, 0).
    //
    // Expect
    // ------
    // - 1-D result of length 4, cells equal to 2·3 = 6, ends masked.
    fn marginalize_several_axes_and_mask_corners() {
        // Arrange
        let fs = Spectrum::from_shape_vec(&[2, 4, 3], vec![1.0; 24], false).unwrap();

        // Act
        let marginal = marginalize(&fs, &[2, 0], true).unwrap();

        // Assert
        assert_eq!(marginal.shape(), &[4]);
        assert_eq!(marginal.get(&[1]), Some(6.0));
        assert!(marginal.is_masked(&[0]) && marginal.is_masked(&[3]));
    }

    #[test]
    // Purpose
    // -------
    // Bad axis lists are invalid arguments.
    //
    // Given
    // -----
    // - A 2-population spectrum.
    //
    // Expect
    // ------
    // - Out-of-range, duplicate and all-axes requests fail distinctly.
    fn invalid_axes_are_rejected() {
        // Arrange
        let fs = Spectrum::from_shape_vec(&[2, 2], vec![1.0; 4], false).unwrap();

        // Act / Assert
        assert_eq!(
            marginalize(&fs, &[2], true).unwrap_err(),
            SpectrumError::InvalidAxis { axis: 2, ndim: 2 }
        );
        assert_eq!(
            marginalize(&fs, &[1, 1], true).unwrap_err(),
            SpectrumError::DuplicateAxis { axis: 1 }
        );
        assert_eq!(
            marginalize(&fs, &[0, 1], true).unwrap_err(),
            SpectrumError::MarginalizeAllAxes { ndim: 2 }
        );
    }
}
