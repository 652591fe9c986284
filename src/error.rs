//! # Error Types Module
//!
//! Centralized error handling for the dashboard.
//!
//! ## Error Types
//! - `DatasetError`: reading or parsing one of the three static JSON datasets
//! - `ConfigError`: configuration file I/O and parsing errors
//!
//! Missing cross-references between datasets and missing metric values are
//! not errors: they are "no data" and handled by the resolver layer.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while loading the static datasets
#[derive(Debug)]
pub enum DatasetError {
    /// Failed to read a dataset file
    ReadFailed { path: PathBuf, source: std::io::Error },
    /// Dataset file is not valid JSON of the expected shape
    ParseFailed { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::ReadFailed { path, source } => {
                write!(f, "Failed to read dataset {}: {}", path.display(), source)
            }
            DatasetError::ParseFailed { path, source } => {
                write!(f, "Failed to parse dataset {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::ReadFailed { source, .. } => Some(source),
            DatasetError::ParseFailed { source, .. } => Some(source),
        }
    }
}

/// Errors that can occur during configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read config file
    ReadFailed(std::io::Error),
    /// Failed to write config file
    WriteFailed(std::io::Error),
    /// Failed to parse config file
    ParseFailed(toml::de::Error),
    /// Failed to serialize config
    SerializeFailed(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFailed(e) => {
                write!(f, "Failed to read config file: {}", e)
            }
            ConfigError::WriteFailed(e) => {
                write!(f, "Failed to write config file: {}", e)
            }
            ConfigError::ParseFailed(e) => {
                write!(f, "Failed to parse config file: {}", e)
            }
            ConfigError::SerializeFailed(e) => {
                write!(f, "Failed to serialize config: {}", e)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadFailed(e) => Some(e),
            ConfigError::WriteFailed(e) => Some(e),
            ConfigError::ParseFailed(e) => Some(e),
            ConfigError::SerializeFailed(e) => Some(e),
        }
    }
}
