//! OnnxSegmenter - per-tissue ONNX Runtime inference
//!
//! Sessions are created on first use of a tissue and cached for the rest of
//! the run; a model is never loaded for a tissue that was not requested.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;

use contracts::{ContractError, Mask, Segmenter, Tissue, Volume};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use tracing::{debug, info, instrument};

use crate::batch::{batch_ranges, gather_batch, scatter_probabilities};
use crate::config::InferenceConfig;
use crate::registry::ModelRegistry;

/// Attach the tissue being segmented to a runtime error
trait OrtResultExt<T> {
    fn for_tissue(self, tissue: Tissue) -> Result<T, ContractError>;
}

impl<T, E: Display> OrtResultExt<T> for Result<T, E> {
    fn for_tissue(self, tissue: Tissue) -> Result<T, ContractError> {
        self.map_err(|e| ContractError::inference(tissue, e.to_string()))
    }
}

/// Segmenter backed by one ONNX model per tissue
pub struct OnnxSegmenter {
    config: InferenceConfig,
    registry: ModelRegistry,
    sessions: BTreeMap<Tissue, Session>,
}

impl OnnxSegmenter {
    pub fn new(config: InferenceConfig, registry: ModelRegistry) -> Self {
        Self {
            config,
            registry,
            sessions: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Number of models loaded so far
    pub fn loaded_models(&self) -> usize {
        self.sessions.len()
    }

    fn session(&mut self, tissue: Tissue) -> Result<&mut Session, ContractError> {
        if !self.sessions.contains_key(&tissue) {
            let path = self.registry.resolve(tissue)?;
            let session = build_session(&path, tissue, self.config.device)?;
            self.sessions.insert(tissue, session);
        }
        self.sessions
            .get_mut(&tissue)
            .ok_or_else(|| ContractError::inference(tissue, "session cache miss"))
    }
}

fn build_session(path: &Path, tissue: Tissue, device: Option<i32>) -> Result<Session, ContractError> {
    info!(%tissue, path = %path.display(), "Loading model");

    let builder = Session::builder()
        .for_tissue(tissue)?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .for_tissue(tissue)?;
    let builder = with_device(builder, tissue, device)?;

    builder.commit_from_file(path).for_tissue(tissue)
}

#[cfg(feature = "cuda")]
fn with_device(
    builder: ort::session::builder::SessionBuilder,
    tissue: Tissue,
    device: Option<i32>,
) -> Result<ort::session::builder::SessionBuilder, ContractError> {
    use ort::execution_providers::CUDAExecutionProvider;

    match device {
        Some(id) => builder
            .with_execution_providers([CUDAExecutionProvider::default()
                .with_device_id(id)
                .build()])
            .for_tissue(tissue),
        None => Ok(builder),
    }
}

#[cfg(not(feature = "cuda"))]
fn with_device(
    builder: ort::session::builder::SessionBuilder,
    _tissue: Tissue,
    device: Option<i32>,
) -> Result<ort::session::builder::SessionBuilder, ContractError> {
    if let Some(id) = device {
        tracing::warn!(device = id, "built without the `cuda` feature, running on CPU");
    }
    Ok(builder)
}

impl Segmenter for OnnxSegmenter {
    #[instrument(name = "onnx_segment", skip(self, volume), fields(shape = ?volume.dim()))]
    fn segment(&mut self, volume: &Volume, tissue: Tissue) -> Result<Mask, ContractError> {
        let batch_size = self.config.batch_size;
        let threshold = self.config.threshold;
        let mut mask = Mask::zeros(volume.dim());
        let session = self.session(tissue)?;

        for range in batch_ranges(volume.dim().2, batch_size) {
            let batch = gather_batch(volume, range.clone());
            let (n, rows, columns, channels) = batch.dim();
            let (data, _) = batch.into_raw_vec_and_offset();
            let input =
                Tensor::from_array(([n, rows, columns, channels], data)).for_tissue(tissue)?;

            let outputs = session.run(ort::inputs![input]).for_tissue(tissue)?;
            let (_, probabilities) = outputs[0].try_extract_tensor::<f32>().for_tissue(tissue)?;

            scatter_probabilities(&mut mask, range.clone(), probabilities.iter().copied(), threshold)
                .map_err(|got| {
                    ContractError::inference(
                        tissue,
                        format!(
                            "model returned {got} values for slices {range:?}, expected {}",
                            range.len() * volume.dim().0 * volume.dim().1
                        ),
                    )
                })?;
            debug!(?range, "batch segmented");
        }

        Ok(mask)
    }
}
