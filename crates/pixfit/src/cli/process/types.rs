//! CLI enum types for the process command: encode format, report format.

use clap::ValueEnum;
use pixfit_core::{ImageFormat, OutputFormat as CoreOutputFormat};

/// Output image formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Lossy JPEG, quality searched against the target size
    #[value(alias = "jpg")]
    Jpeg,
    /// Lossy WebP, quality searched against the target size
    Webp,
    /// Lossless PNG, single encode
    Png,
}

impl From<FormatArg> for ImageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg => ImageFormat::Jpeg,
            FormatArg::Webp => ImageFormat::Webp,
            FormatArg::Png => ImageFormat::Png,
        }
    }
}

/// Report file formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Whole report as one JSON object
    #[default]
    Json,
    /// One record per line (newline-delimited)
    Jsonl,
}

impl From<ReportFormat> for CoreOutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => CoreOutputFormat::Json,
            ReportFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}
