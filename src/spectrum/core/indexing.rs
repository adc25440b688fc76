//! Index arithmetic shared by the fold and projection transforms.
use ndarray::{ArrayD, Axis, Dimension, IxDyn};

/// Copy of `array` with every axis reversed, so that cell `idx` of the
/// result holds `array[n - idx]`.
pub(crate) fn reversed<T: Clone>(array: &ArrayD<T>) -> ArrayD<T> {
    let mut view = array.view();
    for axis in 0..view.ndim() {
        view.invert_axis(Axis(axis));
    }
    view.to_owned()
}

/// Array of the given shape whose cells hold the sum of their own indices,
/// i.e. the total derived-allele count across populations.
pub(crate) fn total_per_cell(shape: &[usize]) -> ArrayD<usize> {
    ArrayD::from_shape_fn(IxDyn(shape), |idx| idx.slice().iter().sum())
}
