//! Error types for CLI operations.

use std::path::PathBuf;

use contracts::{ContractError, Tissue};
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Required argument absent
    #[error("missing required argument: {name}")]
    MissingArgument { name: String },

    /// DICOM source path missing or not a directory
    #[error("Directory '{}' does not exist", .path.display())]
    DirectoryNotFound { path: PathBuf },

    /// A flag was given without the flag it depends on
    #[error("{flag} requires {requires}")]
    IncompatibleFlags { flag: String, requires: String },

    /// Argument present but unusable
    #[error("invalid value for {name}: {message}")]
    InvalidArgument { name: String, message: String },

    /// Segmentation returned a mask that does not match its input volume.
    ///
    /// Never recovered: it means the model or the preprocessing is broken.
    #[error(
        "internal error: {tissue} mask has shape {actual:?}, input volume has shape {expected:?}"
    )]
    ShapeInvariant {
        tissue: Tissue,
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    /// Error raised by a pipeline component
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn missing_argument(name: impl Into<String>) -> Self {
        Self::MissingArgument { name: name.into() }
    }

    pub fn incompatible_flags(flag: impl Into<String>, requires: impl Into<String>) -> Self {
        Self::IncompatibleFlags {
            flag: flag.into(),
            requires: requires.into(),
        }
    }

    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
