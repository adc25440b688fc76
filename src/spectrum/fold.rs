//! spectrum::fold — minor-allele folding.
//!
//! Purpose
//! -------
//! Collapse a derived-allele spectrum into a minor-allele spectrum when the
//! ancestral state is unknown. Cell `idx` and its mirror `n − idx` describe
//! the same polymorphism seen from opposite polarities.
//!
//! Key behaviors
//! -------------
//! - Cells whose total count exceeds `floor(T/2)` (`T = Σ n_i`) are folded
//!   onto their mirror and then masked.
//! - When `T` is even, the self-mirrored cells at exactly `T/2` are averaged
//!   pairwise so no polymorphism is counted twice.
//! - The output mask is the input mask, its mirror image, and the folded-out
//!   region. Corners are not re-masked.
//!
//! Invariants & assumptions
//! ------------------------
//! - Masked input cells contribute zero.
//! - Total unmasked mass is preserved when no masked cell folds onto an
//!   unmasked one.
//! - Folding a folded spectrum returns an equal spectrum: once the whole
//!   folded-out region is masked, only the mask of the retained region is
//!   mirrored.
use crate::spectrum::core::{
    data::Spectrum,
    indexing::{reversed, total_per_cell},
};
use ndarray::{ArrayD, Zip};
use tracing::debug;

/// Fold `spectrum` into minor-allele form.
///
/// Returns
/// -------
/// `Spectrum`
///   Same shape as the input; cells with total count above `floor(T/2)`
///   are masked.
pub fn fold(spectrum: &Spectrum) -> Spectrum {
    let total_samples: usize = spectrum.sample_sizes().iter().sum();
    let half = total_samples / 2;
    let totals = total_per_cell(spectrum.shape());
    let folded_out: ArrayD<bool> = totals.mapv(|t| t > half);

    let values = spectrum.filled_with(0.0);
    let outgoing: ArrayD<f64> =
        Zip::from(&values).and(&folded_out).map_collect(|&v, &out| if out { v } else { 0.0 });
    let mut folded = &values + &reversed(&outgoing);

    if total_samples % 2 == 0 {
        let ambiguous: ArrayD<f64> =
            Zip::from(&values).and(&totals).map_collect(|&v, &t| if t == half { v } else { 0.0 });
        let mirrored = reversed(&ambiguous);
        Zip::from(&mut folded).and(&ambiguous).and(&mirrored).for_each(|f, &a, &m| {
            *f += -0.5 * a + 0.5 * m;
        });
    }

    let mask = spectrum.mask_ref();
    let already_folded = Zip::from(mask).and(&folded_out).all(|&m, &out| m || !out);
    let mirrored_mask = if already_folded {
        let retained: ArrayD<bool> =
            Zip::from(mask).and(&folded_out).map_collect(|&m, &out| m && !out);
        reversed(&retained)
    } else {
        reversed(mask)
    };
    let final_mask: ArrayD<bool> = Zip::from(mask)
        .and(&mirrored_mask)
        .and(&folded_out)
        .map_collect(|&m, &r, &out| m || r || out);

    debug!(total_samples, already_folded, "folded spectrum");
    Spectrum::from_parts(folded, final_mask, spectrum.fill_value())
}
