//! spectrum::sampling — Poisson resampling of a spectrum.
//!
//! Draws an independent Poisson count for every usable cell, using the cell
//! value as the mean. Cells that are masked or hold a non-positive value have
//! no meaningful sampling distribution and are masked in the output.
use crate::spectrum::{
    core::data::Spectrum,
    errors::{SpectrumError, SpectrumResult},
};
use ndarray::{ArrayD, Zip};
use rand::Rng;
use rand_distr::{Distribution, Poisson};

impl Spectrum {
    /// Poisson-sample a new spectrum with `self` as the cell means.
    ///
    /// Parameters
    /// ----------
    /// - `rng`: `&mut R`
    ///   Caller-provided generator, so runs can be made reproducible.
    ///
    /// Returns
    /// -------
    /// `SpectrumResult<Spectrum>`
    ///   Integer-valued counts; cells that were masked or `<= 0` are masked
    ///   and hold 0. Corners are always masked in the sample, even when
    ///   `self` left them unmasked.
    ///
    /// Errors
    /// ------
    /// - `SpectrumError::InvalidPoissonMean` when an unmasked cell holds a
    ///   positive value `rand_distr::Poisson` rejects.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SpectrumResult<Spectrum> {
        let bad: ArrayD<bool> = Zip::from(self.data_ref())
            .and(self.mask_ref())
            .map_collect(|&v, &m| m || v.is_nan() || v <= 0.0);
        let mut counts = ArrayD::<f64>::zeros(self.data_ref().raw_dim());
        for ((out, &mean), &skip) in counts.iter_mut().zip(self.data_ref().iter()).zip(bad.iter()) {
            if skip {
                continue;
            }
            let poisson =
                Poisson::new(mean).map_err(|_| SpectrumError::InvalidPoissonMean { value: mean })?;
            *out = poisson.sample(rng);
        }
        let mut sampled = Spectrum::from_parts(counts, bad, self.fill_value());
        sampled.mask_corners();
        Ok(sampled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    // Purpose
    // -------
    // Zero and masked cells are masked in the sample; others are counts.
    //
    // Given
    // -----
    // - `[0, 0, 5, 200, 0]` with corner masking (cells 0 and 4 masked).
    //
    // Expect
    // ------
    // - Cells 0, 1 and 4 masked; cells 2 and 3 non-negative integers.
    fn sampling_masks_unusable_cells() {
        // Arrange
        let fs = Spectrum::from_shape_vec(&[5], vec![0.0, 0.0, 5.0, 200.0, 0.0], true).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);

        // Act
        let sampled = fs.sample(&mut rng).unwrap();

        // Assert
        assert!(sampled.is_masked(&[0]) && sampled.is_masked(&[1]) && sampled.is_masked(&[4]));
        for idx in [2usize, 3] {
            let v = sampled.get(&[idx]).unwrap();
            assert!(v >= 0.0 && v.fract() == 0.0);
        }
    }

    #[test]
    // Purpose
    // -------
    // Corners come back masked even when the source left them unmasked.
    //
    // Given
    // -----
    // - 2-D `[[4, 3], [2, 6]]` with nothing masked.
    //
    // Expect
    // ------
    // - (0, 0) and (1, 1) masked; (0, 1) and (1, 0) unmasked counts.
    fn sampling_masks_corners() {
        // Arrange
        let fs = Spectrum::from_shape_vec(&[2, 2], vec![4.0, 3.0, 2.0, 6.0], false).unwrap();
        let mut rng = SmallRng::seed_from_u64(11);

        // Act
        let sampled = fs.sample(&mut rng).unwrap();

        // Assert
        assert!(sampled.is_masked(&[0, 0]) && sampled.is_masked(&[1, 1]));
        assert!(!sampled.is_masked(&[0, 1]) && !sampled.is_masked(&[1, 0]));
    }

    #[test]
    // Purpose
    // -------
    // The sample mean tracks the cell value.
    //
    // Given
    // -----
    // - A single interior cell of mean 50 sampled 2000 times.
    //
    // Expect
    // ------
    // - Empirical mean within 1 of 50.
    fn sample_mean_tracks_cell_value() {
        // Arrange
        let fs = Spectrum::from_shape_vec(&[3], vec![0.0, 50.0, 0.0], false).unwrap();
        let mut rng = SmallRng::seed_from_u64(2024);

        // Act
        let total: f64 = (0..2000).map(|_| fs.sample(&mut rng).unwrap().data()[[1]]).sum();

        // Assert
        assert!((total / 2000.0 - 50.0).abs() < 1.0);
    }
}
