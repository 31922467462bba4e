//! Image codec capability used by the encoder.
//!
//! Codec calls are synchronous and CPU-bound; the encoder runs them on the
//! blocking pool under a timeout. [`StandardCodec`] is backed by the `image`
//! crate for decoding and PNG, mozjpeg for JPEG (with the baseline `image`
//! encoder as the non-mozjpeg path) and libwebp (`webp` crate) for lossy WebP.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use thiserror::Error;

use super::resize::{BoundingBox, Dimensions};
use crate::types::ImageFormat;

/// zlib-style effort level used for PNG output.
pub const PNG_COMPRESSION_LEVEL: u8 = 6;

/// Error reported by a codec implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CodecError(pub String);

impl CodecError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<image::ImageError> for CodecError {
    fn from(e: image::ImageError) -> Self {
        Self(e.to_string())
    }
}

/// Format-specific encode settings. Each variant only carries what its
/// format understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOptions {
    /// `mozjpeg` selects the mozjpeg encoder (trellis quantisation,
    /// progressive scans); off falls back to the baseline encoder.
    Jpeg { quality: u8, mozjpeg: bool },
    Webp { quality: u8 },
    Png { compression_level: u8 },
}

impl EncodeOptions {
    /// Options for `format` at `quality`. JPEG always goes through mozjpeg;
    /// PNG ignores the quality and uses the fixed compression level.
    pub fn for_quality(format: ImageFormat, quality: u8) -> Self {
        match format {
            ImageFormat::Jpeg => Self::Jpeg {
                quality,
                mozjpeg: true,
            },
            ImageFormat::Webp => Self::Webp { quality },
            ImageFormat::Png => Self::lossless(),
        }
    }

    pub fn lossless() -> Self {
        Self::Png {
            compression_level: PNG_COMPRESSION_LEVEL,
        }
    }

    pub fn format(&self) -> ImageFormat {
        match self {
            Self::Jpeg { .. } => ImageFormat::Jpeg,
            Self::Webp { .. } => ImageFormat::Webp,
            Self::Png { .. } => ImageFormat::Png,
        }
    }

    /// Quality for lossy variants, `None` for PNG.
    pub fn quality(&self) -> Option<u8> {
        match self {
            Self::Jpeg { quality, .. } | Self::Webp { quality } => Some(*quality),
            Self::Png { .. } => None,
        }
    }
}

/// Decode, resize and encode operations the pipeline relies on.
pub trait ImageCodec: Send + Sync {
    /// Read dimensions from the file header without decoding pixels.
    fn read_dimensions(&self, path: &Path) -> Result<Dimensions, CodecError>;

    /// Decode `path`, fit it inside `bounds` (never upscaling) and encode.
    ///
    /// Every call starts again from the source file.
    fn encode(
        &self,
        path: &Path,
        bounds: BoundingBox,
        options: EncodeOptions,
    ) -> Result<Vec<u8>, CodecError>;

    /// Read dimensions from an encoded buffer's header.
    fn probe_dimensions(&self, bytes: &[u8]) -> Result<Dimensions, CodecError>;
}

/// Default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodec;

impl StandardCodec {
    fn decode(path: &Path) -> Result<DynamicImage, CodecError> {
        let reader = image::ImageReader::open(path)
            .map_err(|e| CodecError(format!("Cannot open file: {e}")))?
            .with_guessed_format()
            .map_err(|e| CodecError(format!("Cannot detect image format: {e}")))?;
        Ok(reader.decode()?)
    }

    fn png_compression(level: u8) -> CompressionType {
        match level {
            0..=3 => CompressionType::Fast,
            4..=6 => CompressionType::Default,
            _ => CompressionType::Best,
        }
    }

    fn encode_image(image: &DynamicImage, options: EncodeOptions) -> Result<Vec<u8>, CodecError> {
        let mut buffer = Cursor::new(Vec::new());
        match options {
            EncodeOptions::Jpeg {
                quality,
                mozjpeg: true,
            } => return Self::encode_mozjpeg(image, quality),
            EncodeOptions::Jpeg {
                quality,
                mozjpeg: false,
            } => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))?;
            }
            EncodeOptions::Png { compression_level } => {
                let encoder = PngEncoder::new_with_quality(
                    &mut buffer,
                    Self::png_compression(compression_level),
                    PngFilter::Adaptive,
                );
                image.write_with_encoder(encoder)?;
            }
            EncodeOptions::Webp { quality } => {
                let (width, height) = image.dimensions();
                let rgba;
                let rgb;
                let encoder = if image.color().has_alpha() {
                    rgba = image.to_rgba8();
                    webp::Encoder::from_rgba(rgba.as_raw(), width, height)
                } else {
                    rgb = image.to_rgb8();
                    webp::Encoder::from_rgb(rgb.as_raw(), width, height)
                };
                let memory = encoder
                    .encode_simple(false, quality as f32)
                    .map_err(|e| CodecError(format!("WebP encode failed: {e:?}")))?;
                return Ok(memory.to_vec());
            }
        }
        Ok(buffer.into_inner())
    }

    /// libjpeg reports fatal errors by unwinding, so the whole compression
    /// runs inside `catch_unwind`.
    fn encode_mozjpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let result = panic::catch_unwind(AssertUnwindSafe(|| -> std::io::Result<Vec<u8>> {
            let mut compress = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
            compress.set_size(width as usize, height as usize);
            compress.set_quality(quality as f32);
            let mut started = compress.start_compress(Vec::new())?;
            started.write_scanlines(rgb.as_raw())?;
            started.finish()
        }));

        match result {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(e)) => Err(CodecError(format!("mozjpeg encode failed: {e}"))),
            Err(_) => Err(CodecError::new("mozjpeg encode failed: libjpeg error")),
        }
    }
}

impl ImageCodec for StandardCodec {
    fn read_dimensions(&self, path: &Path) -> Result<Dimensions, CodecError> {
        let (width, height) = image::ImageReader::open(path)
            .map_err(|e| CodecError(format!("Cannot open file: {e}")))?
            .with_guessed_format()
            .map_err(|e| CodecError(format!("Cannot detect image format: {e}")))?
            .into_dimensions()?;
        Ok(Dimensions::new(width, height))
    }

    fn encode(
        &self,
        path: &Path,
        bounds: BoundingBox,
        options: EncodeOptions,
    ) -> Result<Vec<u8>, CodecError> {
        let source = Self::decode(path)?;
        let (width, height) = source.dimensions();
        let target = bounds.fit(Dimensions::new(width, height));

        let resized = if target.width != width || target.height != height {
            source.resize_exact(target.width, target.height, FilterType::Lanczos3)
        } else {
            source
        };
        Self::encode_image(&resized, options)
    }

    fn probe_dimensions(&self, bytes: &[u8]) -> Result<Dimensions, CodecError> {
        let (width, height) = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError(format!("Cannot detect image format: {e}")))?
            .into_dimensions()?;
        Ok(Dimensions::new(width, height))
    }
}
