//! Inference configuration
//!
//! Built once during argument resolution and handed to the segmenter at
//! construction; never mutated afterwards.

use contracts::ContractError;
use tracing::warn;

/// Default number of slices per inference batch
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Process-wide inference settings
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceConfig {
    /// Slices per inference batch, must be > 0
    pub batch_size: usize,

    /// Accelerator device id (None = CPU)
    pub device: Option<i32>,

    /// Probability above which a voxel belongs to the tissue
    pub threshold: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            device: None,
            threshold: 0.5,
        }
    }
}

impl InferenceConfig {
    /// Create a validated configuration
    ///
    /// # Errors
    /// `ConfigValidation` if `batch_size` is zero or `threshold` is outside (0, 1)
    pub fn new(batch_size: usize, threshold: f32) -> Result<Self, ContractError> {
        if batch_size == 0 {
            return Err(ContractError::config_validation(
                "batch_size",
                "batch size must be > 0",
            ));
        }
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(ContractError::config_validation(
                "threshold",
                format!("threshold must be in (0, 1), got {threshold}"),
            ));
        }
        Ok(Self {
            batch_size,
            device: None,
            threshold,
        })
    }

    /// Select an accelerator from a device list such as `"0"` or `"1,2"`.
    ///
    /// Only the first id is used; inference runs on a single device.
    pub fn with_device(mut self, devices: &str) -> Result<Self, ContractError> {
        let ids: Vec<&str> = devices.split(',').map(str::trim).collect();
        let first = ids.first().copied().unwrap_or_default();
        let device = first.parse::<i32>().map_err(|_| {
            ContractError::config_validation("gpu", format!("invalid device id '{devices}'"))
        })?;
        if device < 0 {
            return Err(ContractError::config_validation(
                "gpu",
                format!("device id must be >= 0, got {device}"),
            ));
        }
        if ids.len() > 1 {
            warn!(device, requested = %devices, "multiple devices requested, using the first");
        }
        self.device = Some(device);
        Ok(self)
    }
}
