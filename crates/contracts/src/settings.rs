//! Settings - Config Loader output
//!
//! Model weights location and T2 fitting constants. Every field has a
//! default, so an empty file (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::Tissue;

/// Complete settings document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Segmentation model settings
    #[serde(default)]
    pub model: ModelSettings,

    /// DESS T2 fitting constants
    #[serde(default)]
    pub t2: T2Settings,
}

/// Segmentation model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Directory holding `<tissue>.onnx` weight files
    #[serde(default = "default_weights_dir")]
    pub weights_dir: PathBuf,

    /// Probability above which a voxel belongs to the tissue
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Per-tissue weight file overrides, keyed by tissue name
    #[serde(default)]
    pub weights: BTreeMap<String, PathBuf>,
}

fn default_weights_dir() -> PathBuf {
    PathBuf::from("weights")
}

fn default_threshold() -> f32 {
    0.5
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            weights_dir: default_weights_dir(),
            threshold: default_threshold(),
            weights: BTreeMap::new(),
        }
    }
}

impl ModelSettings {
    /// Weight file for a tissue: the override if present, else `<weights_dir>/<tissue>.onnx`
    pub fn weights_path(&self, tissue: Tissue) -> PathBuf {
        match self.weights.get(tissue.as_str()) {
            Some(path) => path.clone(),
            None => self.weights_dir.join(tissue.file_name("onnx")),
        }
    }

    /// Resolve relative paths against the directory of the settings file
    pub fn rebase(&mut self, base: &Path) {
        if self.weights_dir.is_relative() {
            self.weights_dir = base.join(&self.weights_dir);
        }
        for path in self.weights.values_mut() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// DESS T2 fitting constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct T2Settings {
    /// Assumed tissue T1 (s)
    #[serde(default = "default_t1")]
    pub t1_s: f64,

    /// Apparent diffusion coefficient
    #[serde(default = "default_diffusivity")]
    pub diffusivity: f64,

    /// Fits at or below this value (ms) are discarded
    #[serde(default)]
    pub min_ms: f64,

    /// Fits above this value (ms) are discarded
    #[serde(default = "default_max_ms")]
    pub max_ms: f64,

    /// Override for the spoiler gradient area tag
    #[serde(default)]
    pub gl_area: Option<f64>,

    /// Override for the spoiler gradient duration tag (µs)
    #[serde(default)]
    pub tg_us: Option<f64>,
}

fn default_t1() -> f64 {
    1.2
}

fn default_diffusivity() -> f64 {
    1.25e-9
}

fn default_max_ms() -> f64 {
    100.0
}

impl Default for T2Settings {
    fn default() -> Self {
        Self {
            t1_s: default_t1(),
            diffusivity: default_diffusivity(),
            min_ms: 0.0,
            max_ms: default_max_ms(),
            gl_area: None,
            tg_us: None,
        }
    }
}
