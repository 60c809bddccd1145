//! Error types for the configuration assembly pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving a context, applying presets, or loading
/// configuration fragments. All of these surface synchronously during
/// startup; a process restart is the only recovery path.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid context '{0}': root must be one of Development, Testing, Production")]
    InvalidContext(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Failed to load fragment {path}: {message}")]
    FragmentLoad { path: PathBuf, message: String },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid key path: {0}")]
    InvalidKeyPath(String),

    #[error("Type mismatch at {path}: expected {expected}")]
    TypeMismatch { path: String, expected: String },

    #[error("Serialization failed: {0}")]
    Serialize(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
