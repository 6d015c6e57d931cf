//! Error types for policy loading.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or validate a [`ThrowPolicy`](crate::config::ThrowPolicy).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read policy file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed policy: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid policy value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
