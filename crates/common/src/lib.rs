//! ciprobe Common Library
//!
//! Shared types and configuration for the ciprobe harness.

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{HarnessConfig, HttpConfig, WaitConfig};
pub use error::{Error, Result};
pub use types::*;

/// ciprobe version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default config file path
pub fn default_config_path() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".ciprobe")
        .join("config.toml")
}

/// Home directory helper
mod dirs {
    pub fn home_dir() -> Option<std::path::PathBuf> {
        std::env::var_os("HOME").map(std::path::PathBuf::from)
    }
}
