//! Configuration error types

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while resolving cloud configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No clouds.yaml exists in any search location
    #[error("clouds.yaml not found (searched: {})", join_paths(.searched))]
    FileNotFound { searched: Vec<PathBuf> },

    /// A candidate file exists but could not be read
    #[error("Failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    /// The file is not valid clouds.yaml
    #[error("Failed to parse clouds.yaml: {0}")]
    Parse(String),

    /// The requested cloud is not defined in clouds.yaml
    #[error("Cloud not found in clouds.yaml: {0}")]
    CloudNotFound(String),

    /// No cloud name was given and the file does not define exactly one cloud
    #[error("Unable to determine which cloud to use: {}", describe_candidates(.0))]
    AmbiguousCloud(Vec<String>),

    /// A required auth field is absent after every override was applied
    #[error("Missing input for argument [{0}]")]
    MissingInput(String),

    /// A setting holds a value outside its accepted set
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl ConfigError {
    /// Create a read error for a path
    pub fn read(path: &Path, message: impl Into<String>) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a missing input error
    pub fn missing_input(field: impl Into<String>) -> Self {
        Self::MissingInput(field.into())
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_candidates(names: &[String]) -> String {
    if names.is_empty() {
        "no clouds are defined".to_string()
    } else {
        format!(
            "{} clouds are defined ({}), set OS_CLOUD or pass a cloud name",
            names.len(),
            names.join(", ")
        )
    }
}
