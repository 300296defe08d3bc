//! Volume preprocessing: echo splitting and whitening

use contracts::{ContractError, Volume, SLICE_AXIS};
use ndarray::s;
use tracing::warn;

/// Split a multi-echo volume into one sub-volume per echo.
///
/// Echoes are interleaved along the slice axis, so sub-volume `i` holds
/// slices `i, i + echos, i + 2 * echos, ...`.
///
/// # Errors
/// `InvalidEchoCount` when `echos` is zero or does not divide the slice count
pub fn split_volume(volume: &Volume, echos: usize) -> Result<Vec<Volume>, ContractError> {
    let slices = volume.len_of(SLICE_AXIS);
    if echos == 0 || slices % echos != 0 {
        return Err(ContractError::InvalidEchoCount { echos, slices });
    }

    Ok((0..echos)
        .map(|echo| volume.slice(s![.., .., echo..;echos]).to_owned())
        .collect())
}

/// Normalize intensities to zero mean and unit variance.
///
/// A constant volume has no spread to scale by; it is only mean-centered.
pub fn whiten_volume(volume: &Volume) -> Volume {
    if volume.is_empty() {
        return volume.clone();
    }

    let n = volume.len() as f64;
    let mean = volume.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = volume
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std = variance.sqrt();

    if std > 0.0 && std.is_finite() {
        volume.mapv(|v| ((v as f64 - mean) / std) as f32)
    } else {
        warn!(mean, std, "volume has no intensity spread, only centering");
        volume.mapv(|v| (v as f64 - mean) as f32)
    }
}
