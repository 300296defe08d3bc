//! Volume types
//!
//! Dense 3D arrays laid out `(rows, columns, slices)`.

use ndarray::Array3;

/// Image intensities
pub type Volume = Array3<f32>;

/// Binary tissue mask, values in {0, 1}
pub type Mask = Array3<u8>;

/// Per-voxel T2 relaxation time in milliseconds, 0 where no valid fit
pub type T2Map = Array3<f32>;

/// Axis along which slices (and interleaved echoes) are stacked
pub const SLICE_AXIS: ndarray::Axis = ndarray::Axis(2);

/// Echoes per DESS acquisition
pub const DESS_ECHOS: usize = 2;

/// Number of voxels set in a mask
pub fn mask_voxel_count(mask: &Mask) -> usize {
    mask.iter().filter(|&&v| v > 0).count()
}
