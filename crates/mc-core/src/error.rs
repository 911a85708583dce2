//! Checker errors.

use std::path::PathBuf;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown rule id '{0}'")]
    UnknownRule(String),

    #[error("identifier_length_max must be at least 1")]
    ZeroIdentifierLength,
}

/// Errors raised while checking a file.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("File {0} not found.")]
    NotFound(PathBuf),

    #[error("Error reading file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
