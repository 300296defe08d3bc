//! Slice batching between volumes and model tensors
//!
//! Models see a batch of 2D slices shaped `[batch, rows, columns, 1]`.

use std::ops::Range;

use contracts::{Mask, Volume};
use ndarray::Array4;

/// Split `slices` into consecutive ranges of at most `batch_size`
pub fn batch_ranges(slices: usize, batch_size: usize) -> Vec<Range<usize>> {
    let batch_size = batch_size.max(1);
    (0..slices)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(slices))
        .collect()
}

/// Copy the slices of `range` into a model input tensor
pub fn gather_batch(volume: &Volume, range: Range<usize>) -> Array4<f32> {
    let (rows, columns, _) = volume.dim();
    Array4::from_shape_fn((range.len(), rows, columns, 1), |(b, r, c, _)| {
        volume[[r, c, range.start + b]]
    })
}

/// Threshold model probabilities for the slices of `range` into `mask`.
///
/// `probabilities` are in logical `[batch, rows, columns, ...]` order, so any
/// output shape with one value per input pixel is accepted.
///
/// # Errors
/// Returns the received element count when it does not match the batch
pub fn scatter_probabilities<I>(
    mask: &mut Mask,
    range: Range<usize>,
    probabilities: I,
    threshold: f32,
) -> Result<(), usize>
where
    I: ExactSizeIterator<Item = f32>,
{
    let (rows, columns, _) = mask.dim();
    let plane = rows * columns;
    let expected = range.len() * plane;
    if probabilities.len() != expected {
        return Err(probabilities.len());
    }

    for (i, p) in probabilities.enumerate() {
        let z = range.start + i / plane;
        let r = (i % plane) / columns;
        let c = i % columns;
        mask[[r, c, z]] = u8::from(p > threshold);
    }
    Ok(())
}
