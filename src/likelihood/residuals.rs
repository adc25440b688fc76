//! Residuals between a model spectrum and data, for diagnostics.
use crate::spectrum::{core::data::Spectrum, errors::SpectrumResult};
use ndarray::{ArrayD, Zip};

/// Linear Poisson residuals `(model − data) / sqrt(model)`.
///
/// Parameters
/// ----------
/// - `mask`: `Option<f64>`
///   When set, cells where both model and data are `<=` the threshold are
///   masked, which removes cells where the residual is undefined (0 with the
///   threshold at 0).
///
/// Errors
/// ------
/// - `SpectrumError::ShapeMismatch` when the shapes differ.
pub fn linear_poisson_residual(
    model: &Spectrum, data: &Spectrum, mask: Option<f64>,
) -> SpectrumResult<Spectrum> {
    let resid = model.zip_with(data, |m, d| (m - d) / m.sqrt())?;
    Ok(match mask {
        Some(level) => resid.with_extra_mask(&below(model, data, level, false)),
        None => resid,
    })
}

/// Anscombe Poisson residuals.
///
/// With `A(x) = x^{2/3} − x^{−1/3}/9`, the residual is
/// `−1.5·(A(data) − A(model)) / model^{1/6}`, positive where the model
/// exceeds the data. Both sides are transformed because data spectra are
/// often projected or averaged and so not integer valued.
///
/// Parameters
/// ----------
/// - `mask`: `Option<f64>`
///   When set, masks cells where both values are `<=` the threshold and
///   cells where the data is 0.
pub fn anscombe_poisson_residual(
    model: &Spectrum, data: &Spectrum, mask: Option<f64>,
) -> SpectrumResult<Spectrum> {
    let transform = |x: f64| x.powf(2.0 / 3.0) - x.powf(-1.0 / 3.0) / 9.0;
    let resid =
        model.zip_with(data, |m, d| -1.5 * (transform(d) - transform(m)) / m.powf(1.0 / 6.0))?;
    Ok(match mask {
        Some(level) => resid.with_extra_mask(&below(model, data, level, true)),
        None => resid,
    })
}

fn below(model: &Spectrum, data: &Spectrum, level: f64, zero_data: bool) -> ArrayD<bool> {
    Zip::from(model.data_ref())
        .and(data.data_ref())
        .map_collect(|&m, &d| (m <= level && d <= level) || (zero_data && d == 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Linear residuals follow the closed form and the threshold masks small
    // cells.
    //
    // Given
    // -----
    // - Model `[4, 0, 9]`, data `[2, 0, 9]`, threshold 0.
    //
    // Expect
    // ------
    // - Residuals `[1, ·, 0]` with cell 1 masked.
    fn linear_residuals() {
        // Arrange
        let model = Spectrum::from_shape_vec(&[3], vec![4.0, 0.0, 9.0], false).unwrap();
        let data = Spectrum::from_shape_vec(&[3], vec![2.0, 0.0, 9.0], false).unwrap();

        // Act
        let resid = linear_poisson_residual(&model, &data, Some(0.0)).unwrap();

        // Assert
        assert_eq!(resid.get(&[0]), Some(1.0));
        assert!(resid.is_masked(&[1]));
        assert_eq!(resid.get(&[2]), Some(0.0));
    }

    #[test]
    // Purpose
    // -------
    // Anscombe residuals vanish on a perfect fit, are positive when the model
    // is high, and mask zero data under a threshold.
    //
    // Given
    // -----
    // - Model `[5, 8, 0.5]`, data `[5, 2, 0]`, threshold 1e-2.
    //
    // Expect
    // ------
    // - 0 at cell 0, positive at cell 1, cell 2 masked.
    fn anscombe_residuals() {
        // Arrange
        let model = Spectrum::from_shape_vec(&[3], vec![5.0, 8.0, 0.5], false).unwrap();
        let data = Spectrum::from_shape_vec(&[3], vec![5.0, 2.0, 0.0], false).unwrap();

        // Act
        let resid = anscombe_poisson_residual(&model, &data, Some(1e-2)).unwrap();
        let unmasked = anscombe_poisson_residual(&model, &data, None).unwrap();

        // Assert
        assert_relative_eq!(resid.get(&[0]).unwrap(), 0.0, epsilon = 1e-12);
        assert!(resid.get(&[1]).unwrap() > 0.0);
        assert!(resid.is_masked(&[2]));
        assert!(!unmasked.is_masked(&[2]));
    }
}
