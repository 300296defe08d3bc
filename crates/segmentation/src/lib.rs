//! # Segmentation
//!
//! Tissue segmentation service.
//!
//! Responsibilities:
//! - Hold the process-wide inference configuration (batch size, device, threshold)
//! - Resolve per-tissue model weights
//! - Run slice-wise ONNX inference and threshold probabilities into masks
//! - Provide a deterministic mock for tests
//!
//! ## Feature Flags
//!
//! - `cuda`: Register the CUDA execution provider when a device is configured

mod batch;
mod config;
mod mock;
mod onnx;
mod registry;

pub use batch::{batch_ranges, gather_batch, scatter_probabilities};
pub use config::{InferenceConfig, DEFAULT_BATCH_SIZE};
pub use contracts::Segmenter;
pub use mock::{MockSegmenter, MockSegmenterConfig};
pub use onnx::OnnxSegmenter;
pub use registry::ModelRegistry;
