//! Small JPEG previews as base64 data URLs.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::ImageFormat;

use super::codec::EncodeOptions;
use super::encoder::ImageEncoder;
use super::resize::BoundingBox;

/// Longest edge of a preview, in pixels.
pub const PREVIEW_SIZE: u32 = 200;

/// JPEG quality used for previews.
pub const PREVIEW_QUALITY: u8 = 60;

impl ImageEncoder {
    /// Encode a downscaled JPEG preview and return it as a
    /// `data:image/jpeg;base64,...` URL.
    pub async fn preview_data_url(&self, path: &Path) -> PipelineResult<String> {
        if path.as_os_str().is_empty() {
            return Err(PipelineError::invalid("source path must be a non-empty path"));
        }

        let source = path.to_path_buf();
        let bytes = self
            .run_codec("preview", path, move |codec| {
                codec.encode(
                    &source,
                    BoundingBox::square(PREVIEW_SIZE),
                    EncodeOptions::for_quality(ImageFormat::Jpeg, PREVIEW_QUALITY),
                )
            })
            .await?;

        tracing::debug!("Preview for {:?}: {} bytes", path, bytes.len());
        Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(bytes)))
    }
}
