//! Common error types for Gig Preflight

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for Gig Preflight operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the preflight crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Named config file could not be read
    #[error("Read TOML failed ({path}): {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for [`crate::config::TomlConfig`]
    #[error("Parse TOML failed: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
