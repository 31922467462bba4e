//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::ImageFormat;

/// Output settings: where encoded images go and what they should look like.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output folder (supports `~`). Empty means "next to the working directory".
    pub folder: PathBuf,

    /// Target encoding format
    pub format: ImageFormat,

    /// Longest edge allowed in the output, in pixels
    pub max_dimension: u32,

    /// Desired output size in bytes
    pub target_file_size: u64,

    /// Accepted deviation from `target_file_size`, in bytes
    pub size_tolerance: u64,

    /// Template for output filenames (see `naming`)
    pub filename_template: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::new(),
            format: ImageFormat::Jpeg,
            max_dimension: 2560,
            target_file_size: 1_000_000,
            size_tolerance: 50_000,
            filename_template: "{filename}_{width}x{height}".to_string(),
        }
    }
}

/// Values that seed the user/settings template tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Rendered by `{user_initials}`
    pub user_initials: String,

    /// Rendered by `{project_name}`
    pub project_name: String,
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Input extensions picked up when scanning directories
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Budget for each codec call (header read, encode probe, write).
    /// A call that runs over is reported as a timeout but is not killed; it
    /// finishes in the background, so slow calls can overlap later ones.
    pub codec_timeout_ms: u64,

    /// Source files larger than this are rejected before decoding
    pub max_file_size_mb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            codec_timeout_ms: 30_000,
            max_file_size_mb: 100,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
