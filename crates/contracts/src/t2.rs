//! T2Summary - T2 Mapping Service output per tissue

use serde::Serialize;

use crate::Tissue;

/// Statistics of a T2 map restricted to one tissue mask.
///
/// Only voxels inside the mask with a valid (non-zero) T2 contribute to the
/// statistics; `valid_voxels == 0` leaves them all at zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct T2Summary {
    pub tissue: Tissue,
    /// Voxels set in the mask
    pub mask_voxels: usize,
    /// Mask voxels with a valid T2 value
    pub valid_voxels: usize,
    pub mean_ms: f64,
    pub std_ms: f64,
    pub median_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl T2Summary {
    /// Summary of a tissue without any valid voxel
    pub fn empty(tissue: Tissue, mask_voxels: usize) -> Self {
        Self {
            tissue,
            mask_voxels,
            valid_voxels: 0,
            mean_ms: 0.0,
            std_ms: 0.0,
            median_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        }
    }
}
