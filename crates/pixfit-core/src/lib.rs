//! pixfit core - size-targeted image encoding.
//!
//! pixfit resizes images to fit a bounding box and re-encodes them so the
//! output lands near a target file size, naming each output from a
//! filename template.
//!
//! # Architecture
//!
//! ```text
//! Source → Read header → Fit box → Encode (quality search) → Probe → Name → Write
//! ```
//!
//! Images in a batch are processed one at a time; each codec call runs on
//! the blocking pool with a timeout. A failing image is recorded and the
//! batch moves on; a [`CancellationToken`] stops the batch between images.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pixfit_core::{BatchJob, BatchProcessor, CancellationToken, Config, TracingSink};
//!
//! #[tokio::main]
//! async fn main() -> pixfit_core::Result<()> {
//!     let config = Config::load()?;
//!     let job = BatchJob::from_config(&config, vec!["./photo.jpg".into()], Default::default());
//!     let report = BatchProcessor::new(&config)
//!         .run(&job, &CancellationToken::new(), &TracingSink)
//!         .await?;
//!     println!("{} encoded, {} failed", report.results.len(), report.errors.len());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, ErrorKind, PipelineError, PipelineResult, PixfitError, Result};
pub use naming::{preview_filename, render_filename, TemplateContext};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{
    progress_channel, BatchJob, BatchProcessor, CancellationToken, DiscoveredFile,
    FileDiscovery, ImageEncoder, NullSink, ProgressSink, TracingSink,
};
pub use types::{
    BatchReport, EncodeRequest, EncodeResult, FieldValues, ImageError, ImageFormat, Phase,
    ProgressEvent,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_processor_from_default_config() {
        let config = Config::default();
        let job = BatchJob::from_config(&config, Vec::new(), FieldValues::new());
        assert!(job.is_empty());
        let _processor = BatchProcessor::new(&config);
    }
}
