//! Core data types for the pixfit encoding pipeline.
//!
//! Requests flow in, results and progress events flow out. None of these
//! are mutated after construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// User-supplied template values, keyed by token name.
pub type FieldValues = BTreeMap<String, String>;

/// Output encodings pixfit can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Webp,
    Png,
}

impl ImageFormat {
    /// Canonical lowercase name, as rendered by `{format}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
            Self::Png => "png",
        }
    }

    /// File extension for this format (`jpeg` becomes `jpg`).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            other => other.as_str(),
        }
    }

    /// Lossy formats go through the quality search.
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Webp)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            "png" => Ok(Self::Png),
            other => Err(format!("unsupported output format: {other}")),
        }
    }
}

/// Everything needed to encode one source image.
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    /// Source image on disk
    pub source_path: PathBuf,

    /// Folder the encoded file is written into
    pub output_folder: PathBuf,

    /// Output must fit inside `max_dimension × max_dimension`
    pub max_dimension: u32,

    /// Target encoding
    pub format: ImageFormat,

    /// Desired encoded size in bytes
    pub target_file_size: u64,

    /// Accepted deviation from `target_file_size`, in bytes
    pub size_tolerance: u64,

    /// Filename template, without extension
    pub filename_template: String,

    /// Run-scoped template values
    pub field_values: FieldValues,

    /// Zero-based position in the batch
    pub sequence_index: usize,

    /// Batch size, reported in progress events
    pub total: usize,
}

/// Outcome of a successful encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,

    /// Source file size in bytes
    pub original_size: u64,

    /// Encoded size in bytes
    pub output_size: u64,

    pub original_width: u32,
    pub original_height: u32,
    pub output_width: u32,
    pub output_height: u32,

    /// Quality of the final probe; `None` for lossless formats
    pub quality_used: Option<u8>,

    pub format: ImageFormat,

    /// Filename the output was written under
    pub rendered_filename: String,
}

/// Stage an image is in when a progress event is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Resizing,
    Optimizing,
    Writing,
    Complete,
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Resizing => "resizing",
            Self::Optimizing => "optimizing",
            Self::Writing => "writing",
            Self::Complete => "complete",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Transient notification about one image's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub sequence_index: usize,
    pub total: usize,
    pub source_filename: String,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ProgressEvent {
    pub fn new(sequence_index: usize, total: usize, source_filename: &str, phase: Phase) -> Self {
        Self {
            sequence_index,
            total,
            source_filename: source_filename.to_string(),
            phase,
            error_message: None,
        }
    }

    pub fn error(
        sequence_index: usize,
        total: usize,
        source_filename: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::new(sequence_index, total, source_filename, Phase::Error)
        }
    }
}

/// A failed image in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageError {
    pub path: PathBuf,
    pub message: String,
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<EncodeResult>,
    pub errors: Vec<ImageError>,

    /// True when the run stopped early on a cancellation request
    #[serde(default)]
    pub cancelled: bool,
}

impl BatchReport {
    /// Total source bytes of the successful images.
    pub fn bytes_in(&self) -> u64 {
        self.results.iter().map(|r| r.original_size).sum()
    }

    /// Total encoded bytes written.
    pub fn bytes_out(&self) -> u64 {
        self.results.iter().map(|r| r.output_size).sum()
    }
}

/// Final path component of a source path, for display and progress events.
pub fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn sample_result() -> EncodeResult {
        EncodeResult {
            input_path: PathBuf::from("/photos/beach.png"),
            output_path: PathBuf::from("/out/beach_800x600.png"),
            original_size: 4096,
            output_size: 2048,
            original_width: 1600,
            original_height: 1200,
            output_width: 800,
            output_height: 600,
            quality_used: None,
            format: ImageFormat::Png,
            rendered_filename: "beach_800x600.png".to_string(),
        }
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::Webp.extension(), "webp");
        assert_eq!(ImageFormat::Png.extension(), "png");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JPG".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!("webp".parse::<ImageFormat>().unwrap(), ImageFormat::Webp);
        assert!("gif".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn test_result_serializes_null_quality() {
        let json = serde_json::to_string(&sample_result()).unwrap();
        assert!(json.contains("\"quality_used\":null"));
        assert!(json.contains("\"format\":\"png\""));
    }

    #[test]
    fn test_progress_event_skips_missing_error() {
        let event = ProgressEvent::new(0, 3, "a.jpg", Phase::Writing);
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("error_message"));
        assert!(json.contains("\"phase\":\"writing\""));

        let failed = ProgressEvent::error(1, 3, "b.jpg", "boom");
        assert_eq!(failed.phase, Phase::Error);
        assert_eq!(failed.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_report_byte_totals() {
        let report = BatchReport {
            results: vec![sample_result(), sample_result()],
            errors: vec![],
            cancelled: false,
        };
        assert_eq!(report.bytes_in(), 8192);
        assert_eq!(report.bytes_out(), 4096);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/a/b/photo.jpg")), "photo.jpg");
        assert_eq!(display_name(Path::new("")), "unknown");
    }
}
