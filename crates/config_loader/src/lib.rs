//! # Config Loader
//!
//! Settings loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON settings files
//! - Validate settings legality
//! - Generate `Settings`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let settings = ConfigLoader::load_from_path(Path::new("kneeseg.toml")).unwrap();
//! println!("Weights: {}", settings.model.weights_dir.display());
//! ```

mod parser;
mod validator;

pub use contracts::Settings;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Settings loader
///
/// Provides static methods to load settings from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    /// Relative weight paths are resolved against the file's directory.
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<Settings, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        let mut settings = Self::load_from_str(&content, format)?;
        if let Some(base) = path.parent() {
            settings.model.rebase(base);
        }
        Ok(settings)
    }

    /// Load settings from an optional path, falling back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Settings, ContractError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Ok(Settings::default()),
        }
    }

    /// Load settings from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<Settings, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize Settings to TOML string
    pub fn to_toml(settings: &Settings) -> Result<String, ContractError> {
        toml::to_string_pretty(settings)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize Settings to JSON string
    pub fn to_json(settings: &Settings) -> Result<String, ContractError> {
        serde_json::to_string_pretty(settings)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer settings format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<Settings, ContractError> {
        let settings = parser::parse(content, format)?;
        validator::validate(&settings)?;
        Ok(settings)
    }
}
