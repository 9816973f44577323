//! Error types for ciprobe

use thiserror::Error;

/// Result type alias using the ciprobe common Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding remote state or loading configuration
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The server reported a result outside the known outcome set.
    #[error("Unknown build outcome '{0}' (expected SUCCESS, UNSTABLE, FAILURE, ABORTED or NOT_BUILT)")]
    UnknownOutcome(String),
}
