//! Sequential batch runs over a list of source images.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Config, LimitsConfig};
use crate::error::{PixfitError, Result};
use crate::types::{
    display_name, BatchReport, EncodeRequest, FieldValues, ImageError, ImageFormat, ProgressEvent,
};

use super::cancel::CancellationToken;
use super::codec::ImageCodec;
use super::encoder::ImageEncoder;
use super::progress::ProgressSink;

/// Files plus the settings shared by every image of a run.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub files: Vec<PathBuf>,
    pub output_folder: PathBuf,
    pub max_dimension: u32,
    pub format: ImageFormat,
    pub target_file_size: u64,
    pub size_tolerance: u64,
    pub filename_template: String,
    pub field_values: FieldValues,
}

impl BatchJob {
    /// Build a job from the `[output]` and `[naming]` config sections.
    ///
    /// `field_values` are layered over the naming values from the config.
    pub fn from_config(config: &Config, files: Vec<PathBuf>, field_values: FieldValues) -> Self {
        let mut values = config.field_values();
        values.extend(field_values);

        Self {
            files,
            output_folder: config.output_folder(),
            max_dimension: config.output.max_dimension,
            format: config.output.format,
            target_file_size: config.output.target_file_size,
            size_tolerance: config.output.size_tolerance,
            filename_template: config.output.filename_template.clone(),
            field_values: values,
        }
    }

    /// Encode request for the file at `index`.
    pub fn request(&self, index: usize) -> Option<EncodeRequest> {
        let source_path = self.files.get(index)?.clone();
        Some(EncodeRequest {
            source_path,
            output_folder: self.output_folder.clone(),
            max_dimension: self.max_dimension,
            format: self.format,
            target_file_size: self.target_file_size,
            size_tolerance: self.size_tolerance,
            filename_template: self.filename_template.clone(),
            field_values: self.field_values.clone(),
            sequence_index: index,
            total: self.files.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Runs a [`BatchJob`] one image at a time.
pub struct BatchProcessor {
    encoder: ImageEncoder,
}

impl BatchProcessor {
    pub fn new(config: &Config) -> Self {
        Self {
            encoder: ImageEncoder::new(config.limits.clone()),
        }
    }

    /// Create a processor with a custom codec.
    pub fn with_codec(codec: Arc<dyn ImageCodec>, limits: LimitsConfig) -> Self {
        Self {
            encoder: ImageEncoder::with_codec(codec, limits),
        }
    }

    /// The single-image encoder used for each file.
    pub fn encoder(&self) -> &ImageEncoder {
        &self.encoder
    }

    /// Encode every file in order.
    ///
    /// The token is reset on entry and checked before each image; an image
    /// already started is never interrupted. A failing image is recorded in
    /// the report (and as an `error` progress event) and the run moves on.
    /// Only failing to create the output folder aborts the whole run.
    pub async fn run(
        &self,
        job: &BatchJob,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<BatchReport> {
        cancel.reset();

        tokio::fs::create_dir_all(&job.output_folder)
            .await
            .map_err(|source| PixfitError::OutputDirectory {
                path: job.output_folder.clone(),
                source,
            })?;

        tracing::info!(
            "Encoding {} images to {:?} ({}, target {} ± {} bytes)",
            job.len(),
            job.output_folder,
            job.format,
            job.target_file_size,
            job.size_tolerance
        );

        let mut report = BatchReport::default();

        for index in 0..job.len() {
            if cancel.is_cancelled() {
                tracing::info!(
                    "Cancelled after {} of {} images",
                    report.results.len() + report.errors.len(),
                    job.len()
                );
                report.cancelled = true;
                break;
            }

            let Some(request) = job.request(index) else {
                break;
            };

            match self.encoder.encode(&request, progress).await {
                Ok(result) => report.results.push(result),
                Err(e) => {
                    tracing::error!("Failed: {:?} - {}", request.source_path, e);
                    progress.push(ProgressEvent::error(
                        index,
                        job.len(),
                        &display_name(&request.source_path),
                        e.to_string(),
                    ));
                    report.errors.push(ImageError {
                        path: request.source_path,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}
