//! Masked T2 statistics

use contracts::{mask_voxel_count, ContractError, Mask, T2Map, T2Summary, Tissue};

/// Summarize `t2_map` over the voxels set in `mask`.
///
/// Voxels without a valid fit (T2 <= 0) are excluded; they are still counted
/// in `mask_voxels`.
///
/// # Errors
/// `ShapeMismatch` when the mask and map shapes differ
pub fn summarize(t2_map: &T2Map, mask: &Mask, tissue: Tissue) -> Result<T2Summary, ContractError> {
    if t2_map.dim() != mask.dim() {
        return Err(ContractError::shape_mismatch(
            format!("{tissue} mask vs T2 map"),
            t2_map.dim(),
            mask.dim(),
        ));
    }

    let mut values: Vec<f64> = t2_map
        .iter()
        .zip(mask.iter())
        .filter(|&(&t2, &m)| m > 0 && t2 > 0.0)
        .map(|(&t2, _)| t2 as f64)
        .collect();

    let mask_voxels = mask_voxel_count(mask);
    if values.is_empty() {
        return Ok(T2Summary::empty(tissue, mask_voxels));
    }

    values.sort_by(f64::total_cmp);
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    };

    Ok(T2Summary {
        tissue,
        mask_voxels,
        valid_voxels: n,
        mean_ms: mean,
        std_ms: variance.sqrt(),
        median_ms: median,
        min_ms: values[0],
        max_ms: values[n - 1],
    })
}
