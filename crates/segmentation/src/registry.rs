//! ModelRegistry - tissue to weights file resolution

use std::path::PathBuf;

use contracts::{ContractError, ModelSettings, Tissue};

/// Maps each tissue to its ONNX weights file
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    settings: ModelSettings,
}

impl ModelRegistry {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }

    /// Weights file for `tissue`, which may not exist
    pub fn weights_path(&self, tissue: Tissue) -> PathBuf {
        self.settings.weights_path(tissue)
    }

    /// Weights file for `tissue`, checked to exist
    ///
    /// # Errors
    /// `ModelNotFound` if the file is missing
    pub fn resolve(&self, tissue: Tissue) -> Result<PathBuf, ContractError> {
        let path = self.weights_path(tissue);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ContractError::ModelNotFound { tissue, path })
        }
    }

    /// Tissues among `tissues` whose weights file is missing
    pub fn missing(&self, tissues: &[Tissue]) -> Vec<(Tissue, PathBuf)> {
        tissues
            .iter()
            .filter_map(|&t| self.resolve(t).err().map(|_| (t, self.weights_path(t))))
            .collect()
    }
}
