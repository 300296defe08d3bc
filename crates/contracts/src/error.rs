//! Layered error definitions
//!
//! Categorized by source: config / dicom / preprocess / model / t2 / output

use std::path::PathBuf;

use thiserror::Error;

use crate::Tissue;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== DICOM Errors =====
    /// Source path missing or not a directory
    #[error("Directory '{}' does not exist", .path.display())]
    DirectoryNotFound { path: PathBuf },

    /// No DICOM file matched in the directory
    #[error("no dicom files found in '{}'{}", .path.display(), ext_hint(.extension))]
    EmptySeries {
        path: PathBuf,
        extension: Option<String>,
    },

    /// A single file could not be read or decoded
    #[error("failed to read dicom file '{}': {message}", .path.display())]
    DicomRead { path: PathBuf, message: String },

    /// Slices of a series disagree with each other
    #[error("inconsistent dicom series: {message}")]
    InconsistentSeries { message: String },

    /// A required attribute is absent from the reference file
    #[error("missing dicom attribute {name} {tag}")]
    MissingTag { tag: String, name: String },

    // ===== Preprocessing Errors =====
    /// Slice count not divisible by the echo count
    #[error("cannot split {slices} slices into {echos} echos")]
    InvalidEchoCount { echos: usize, slices: usize },

    // ===== Model Errors =====
    /// No weights file for a tissue
    #[error("no model weights for {tissue} at '{}'", .path.display())]
    ModelNotFound { tissue: Tissue, path: PathBuf },

    /// Inference failed or produced unusable output
    #[error("inference failed for {tissue}: {message}")]
    Inference { tissue: Tissue, message: String },

    // ===== Shape Errors =====
    /// Two volumes that must agree in shape do not
    #[error("shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: String,
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    // ===== Output Errors =====
    /// Mask file could not be written
    #[error("failed to write mask '{}': {message}", .path.display())]
    MaskWrite { path: PathBuf, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

fn ext_hint(extension: &Option<String>) -> String {
    match extension {
        Some(ext) => format!(" with extension '{ext}'"),
        None => String::new(),
    }
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create directory-not-found error
    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryNotFound { path: path.into() }
    }

    /// Create dicom read error
    pub fn dicom_read(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DicomRead {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create missing attribute error
    pub fn missing_tag(tag: impl Into<String>, name: impl Into<String>) -> Self {
        Self::MissingTag {
            tag: tag.into(),
            name: name.into(),
        }
    }

    /// Create inference error
    pub fn inference(tissue: Tissue, message: impl Into<String>) -> Self {
        Self::Inference {
            tissue,
            message: message.into(),
        }
    }

    /// Create shape mismatch error
    pub fn shape_mismatch(
        context: impl Into<String>,
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    ) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Create mask write error
    pub fn mask_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MaskWrite {
            path: path.into(),
            message: message.into(),
        }
    }
}
