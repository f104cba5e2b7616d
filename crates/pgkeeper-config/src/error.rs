//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or writing a pg_keeper INI configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse INI config at {path}: {source}")]
    Parse { path: PathBuf, source: ini::Error },

    #[error("failed to write config file at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("missing required key [{section}] {key}")]
    MissingKey { section: &'static str, key: &'static str },

    #[error("invalid value for [{section}] {key}: {value:?}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
    },

    #[error("unrecognized role {0:?}, expected \"monitor\" or \"keeper\"")]
    UnknownRole(String),

    #[error("XDG directory error: {0}")]
    Xdg(String),
}
