//! TOML persistence for extraction options.
//!
//! ```toml
//! max_frequencies = 4
//! frac_freq_accuracy_limit = 1e-6
//! upper_freq_limit = 0.5
//! refinement = "brent"
//! ```
//!
//! Missing keys take their [`NaffConfig::default`] values.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tunescan_analysis::NaffConfig;

/// Errors that can occur while loading or saving configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Parsed options failed validation
    #[error(transparent)]
    Invalid(#[from] tunescan_analysis::Error),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }
}

/// Load and validate options from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<NaffConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let config: NaffConfig = toml::from_str(&text)?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "loaded analysis config");
    Ok(config)
}

/// Save options to a TOML file.
pub fn save_config<P: AsRef<Path>>(config: &NaffConfig, path: P) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let text = toml::to_string_pretty(config)?;
    std::fs::write(path, text).map_err(|e| ConfigError::write_file(path, e))
}
