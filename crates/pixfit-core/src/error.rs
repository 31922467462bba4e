//! Error types for the pixfit encoding pipeline.
//!
//! Per-image failures are `PipelineError`s and are recovered by the batch
//! processor. `PixfitError` covers everything that stops a whole run.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for pixfit operations.
#[derive(Error, Debug)]
pub enum PixfitError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// The output folder could not be created; no image was attempted.
    #[error("Cannot create output folder {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Coarse classification of a per-image failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    CodecFailure,
    Timeout,
    IoFailure,
}

/// Per-image pipeline errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The request itself is malformed (empty path, zero dimension, ...)
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The image library failed to decode or encode
    #[error("Codec error for {path}: {message}")]
    Codec { path: PathBuf, message: String },

    /// A single codec or filesystem call exceeded its budget
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// Filesystem stat or write failed
    #[error("IO error for {path}: {message}")]
    Io { path: PathBuf, message: String },
}

impl PipelineError {
    /// Shorthand for an `InvalidInput` error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Codec { .. } => ErrorKind::CodecFailure,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Io { .. } => ErrorKind::IoFailure,
        }
    }
}

/// Convenience type alias for pixfit results.
pub type Result<T> = std::result::Result<T, PixfitError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
