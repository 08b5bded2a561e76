//! Error types for creature name tables

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a creature name table
#[derive(Debug, Error)]
pub enum NamesError {
    #[error("failed to read name table {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse name table TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
