//! Mock segmenter
//!
//! Deterministic stand-in for model inference, with injectable failures.

use std::collections::BTreeSet;

use contracts::{ContractError, Mask, Segmenter, Tissue, Volume};
use tracing::instrument;

/// Mock segmenter configuration
#[derive(Debug, Clone)]
pub struct MockSegmenterConfig {
    /// Voxels strictly above this intensity are foreground
    pub level: f32,
    /// Tissues for which a mask of the wrong shape is returned
    pub wrong_shape_for: BTreeSet<Tissue>,
    /// Tissues for which segmentation fails
    pub fail_for: BTreeSet<Tissue>,
}

impl Default for MockSegmenterConfig {
    fn default() -> Self {
        Self {
            level: 0.0,
            wrong_shape_for: BTreeSet::new(),
            fail_for: BTreeSet::new(),
        }
    }
}

/// Mock segmenter
///
/// Thresholds the input at `level` and records every call.
#[derive(Debug, Default)]
pub struct MockSegmenter {
    config: MockSegmenterConfig,
    /// (tissue, input volume) per call, in call order
    calls: Vec<(Tissue, Volume)>,
}

impl MockSegmenter {
    pub fn new() -> Self {
        Self::with_config(MockSegmenterConfig::default())
    }

    pub fn with_config(config: MockSegmenterConfig) -> Self {
        Self {
            config,
            calls: Vec::new(),
        }
    }

    /// Tissues segmented so far, in call order
    pub fn tissues(&self) -> Vec<Tissue> {
        self.calls.iter().map(|(t, _)| *t).collect()
    }

    /// Inputs received so far
    pub fn calls(&self) -> &[(Tissue, Volume)] {
        &self.calls
    }
}

impl Segmenter for MockSegmenter {
    #[instrument(name = "mock_segment", skip(self, volume))]
    fn segment(&mut self, volume: &Volume, tissue: Tissue) -> Result<Mask, ContractError> {
        self.calls.push((tissue, volume.clone()));

        if self.config.fail_for.contains(&tissue) {
            return Err(ContractError::inference(tissue, "injected failure"));
        }

        if self.config.wrong_shape_for.contains(&tissue) {
            let (rows, columns, slices) = volume.dim();
            return Ok(Mask::zeros((rows, columns, slices + 1)));
        }

        let level = self.config.level;
        Ok(volume.mapv(|v| u8::from(v > level)))
    }
}
