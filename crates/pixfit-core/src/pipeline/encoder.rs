//! Single-image pipeline: metadata, resize, encode (with quality search for
//! lossy formats), filename rendering, write.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::naming::{render_filename, TemplateContext};
use crate::types::{display_name, EncodeRequest, EncodeResult, Phase, ProgressEvent};

use super::codec::{CodecError, EncodeOptions, ImageCodec, StandardCodec};
use super::progress::ProgressSink;
use super::quality::{QualitySearch, SizeTarget};
use super::resize::BoundingBox;
use super::validate::Validator;

/// Encodes one image at a time against a size target.
pub struct ImageEncoder {
    codec: Arc<dyn ImageCodec>,
    validator: Validator,
    search: QualitySearch,
    timeout_ms: u64,
}

impl ImageEncoder {
    /// Create an encoder backed by [`StandardCodec`].
    pub fn new(limits: LimitsConfig) -> Self {
        Self::with_codec(Arc::new(StandardCodec), limits)
    }

    /// Create an encoder with a custom codec.
    pub fn with_codec(codec: Arc<dyn ImageCodec>, limits: LimitsConfig) -> Self {
        Self {
            codec,
            timeout_ms: limits.codec_timeout_ms,
            validator: Validator::new(limits),
            search: QualitySearch::default(),
        }
    }

    /// Override the quality search bounds.
    pub fn with_search(mut self, search: QualitySearch) -> Self {
        self.search = search;
        self
    }

    /// Run a codec call on the blocking pool under the per-call timeout.
    ///
    /// A blocking task cannot be aborted: on timeout the caller gets
    /// `PipelineError::Timeout` while the job keeps running to completion
    /// on its pool thread and its result is dropped. Calls for later images
    /// can therefore overlap with abandoned ones, bounded by tokio's
    /// blocking pool size.
    pub(crate) async fn run_codec<T, F>(&self, stage: &str, path: &Path, job: F) -> PipelineResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn ImageCodec) -> Result<T, CodecError> + Send + 'static,
    {
        let codec = Arc::clone(&self.codec);
        let call = tokio::task::spawn_blocking(move || job(codec.as_ref()));

        match timeout(Duration::from_millis(self.timeout_ms), call).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(e))) => Err(PipelineError::Codec {
                path: path.to_path_buf(),
                message: format!("{stage}: {e}"),
            }),
            Ok(Err(e)) => Err(PipelineError::Codec {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: stage.to_string(),
                timeout_ms: self.timeout_ms,
            }),
        }
    }

    /// Encode one image and write it into the request's output folder.
    ///
    /// Emits `resizing`, one `optimizing` per encode, `writing` and
    /// `complete`. Failures are returned without an `error` event; the
    /// caller decides how to report them.
    pub async fn encode(
        &self,
        request: &EncodeRequest,
        progress: &dyn ProgressSink,
    ) -> PipelineResult<EncodeResult> {
        let start = Instant::now();
        self.validator.validate_request(request)?;

        let path = request.source_path.as_path();
        let name = display_name(path);
        let emit = |phase: Phase| {
            progress.push(ProgressEvent::new(
                request.sequence_index,
                request.total,
                &name,
                phase,
            ))
        };
        tracing::debug!("Encoding: {:?}", path);

        emit(Phase::Resizing);

        // Header-only read; original values are reported verbatim
        let source = path.to_path_buf();
        let original = self
            .run_codec("metadata", path, move |codec| codec.read_dimensions(&source))
            .await?;
        let original_size = tokio::fs::metadata(path)
            .await
            .map_err(|e| PipelineError::Io {
                path: path.to_path_buf(),
                message: format!("Cannot read metadata: {e}"),
            })?
            .len();
        self.validator.check_file_size(path, original_size)?;

        let bounds = BoundingBox::square(request.max_dimension);

        let (bytes, quality_used) = if request.format.is_lossy() {
            let target = SizeTarget::new(request.target_file_size, request.size_tolerance);
            let format = request.format;
            let outcome = self
                .search
                .run(target, |quality| {
                    emit(Phase::Optimizing);
                    let source = path.to_path_buf();
                    let options = EncodeOptions::for_quality(format, quality);
                    self.run_codec("encode", path, move |codec| {
                        codec.encode(&source, bounds, options)
                    })
                })
                .await?;
            if !outcome.converged {
                tracing::debug!(
                    "  {} did not reach {} ± {} bytes in {} probes, keeping q={} ({} bytes)",
                    name,
                    target.bytes,
                    target.tolerance,
                    outcome.probes,
                    outcome.quality,
                    outcome.bytes.len()
                );
            }
            (outcome.bytes, Some(outcome.quality))
        } else {
            emit(Phase::Optimizing);
            let source = path.to_path_buf();
            let bytes = self
                .run_codec("encode", path, move |codec| {
                    codec.encode(&source, bounds, EncodeOptions::lossless())
                })
                .await?;
            (bytes, None)
        };

        // Dimensions of what was actually encoded, not what was asked for
        let (bytes, output) = self
            .run_codec("output metadata", path, move |codec| {
                codec.probe_dimensions(&bytes).map(|dims| (bytes, dims))
            })
            .await?;

        let context = TemplateContext::new(
            path,
            output.width,
            output.height,
            request.format,
            request.sequence_index + 1,
            &request.field_values,
        );
        let rendered_filename = render_filename(&request.filename_template, &context);
        let output_path: PathBuf = request.output_folder.join(&rendered_filename);

        emit(Phase::Writing);
        self.write_output(path, &output_path, &bytes).await?;
        emit(Phase::Complete);

        tracing::debug!(
            "Encoded {:?} -> {:?} in {:?} ({}x{} -> {}x{}, {} -> {} bytes, q={:?})",
            name,
            rendered_filename,
            start.elapsed(),
            original.width,
            original.height,
            output.width,
            output.height,
            original_size,
            bytes.len(),
            quality_used
        );

        Ok(EncodeResult {
            input_path: path.to_path_buf(),
            output_path,
            original_size,
            output_size: bytes.len() as u64,
            original_width: original.width,
            original_height: original.height,
            output_width: output.width,
            output_height: output.height,
            quality_used,
            format: request.format,
            rendered_filename,
        })
    }

    async fn write_output(&self, source: &Path, output: &Path, bytes: &[u8]) -> PipelineResult<()> {
        match timeout(
            Duration::from_millis(self.timeout_ms),
            tokio::fs::write(output, bytes),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PipelineError::Io {
                path: output.to_path_buf(),
                message: format!("Cannot write output: {e}"),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: source.to_path_buf(),
                stage: "write".to_string(),
                timeout_ms: self.timeout_ms,
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pipeline::resize::Dimensions;
    use crate::types::{FieldValues, ImageFormat};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Codec stand-in: fixed source dimensions, output length from a size
    /// model, optional failure and delay. Encoded buffers carry their
    /// dimensions in the first 8 bytes so `probe_dimensions` can read them.
    pub(crate) struct MockCodec {
        pub source: Dimensions,
        pub size_model: Box<dyn Fn(EncodeOptions) -> usize + Send + Sync>,
        pub fail_paths: Vec<String>,
        pub delay: Option<Duration>,
        pub encode_calls: Arc<AtomicU32>,
        pub in_flight: Arc<AtomicU32>,
        pub max_in_flight: Arc<AtomicU32>,
    }

    impl MockCodec {
        pub(crate) fn new(width: u32, height: u32) -> Self {
            Self {
                source: Dimensions::new(width, height),
                size_model: Box::new(|options| match options.quality() {
                    Some(q) => q as usize * 1000,
                    None => 5000,
                }),
                fail_paths: Vec::new(),
                delay: None,
                encode_calls: Arc::new(AtomicU32::new(0)),
                in_flight: Arc::new(AtomicU32::new(0)),
                max_in_flight: Arc::new(AtomicU32::new(0)),
            }
        }

        pub(crate) fn failing_on(mut self, needle: &str) -> Self {
            self.fail_paths.push(needle.to_string());
            self
        }

        fn fails(&self, path: &Path) -> bool {
            let path = path.to_string_lossy();
            self.fail_paths.iter().any(|needle| path.contains(needle.as_str()))
        }
    }

    impl ImageCodec for MockCodec {
        fn read_dimensions(&self, path: &Path) -> Result<Dimensions, CodecError> {
            if self.fails(path) {
                return Err(CodecError::new("corrupt header"));
            }
            Ok(self.source)
        }

        fn encode(
            &self,
            path: &Path,
            bounds: BoundingBox,
            options: EncodeOptions,
        ) -> Result<Vec<u8>, CodecError> {
            self.encode_calls.fetch_add(1, Ordering::SeqCst);
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.fails(path) {
                return Err(CodecError::new("decoder blew up"));
            }
            let dims = bounds.fit(self.source);
            let len = (self.size_model)(options).max(8);
            let mut bytes = vec![0u8; len];
            bytes[0..4].copy_from_slice(&dims.width.to_le_bytes());
            bytes[4..8].copy_from_slice(&dims.height.to_le_bytes());
            Ok(bytes)
        }

        fn probe_dimensions(&self, bytes: &[u8]) -> Result<Dimensions, CodecError> {
            if bytes.len() < 8 {
                return Err(CodecError::new("truncated"));
            }
            let width = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            let height = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
            Ok(Dimensions::new(width, height))
        }
    }

    /// Sink that records every event.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub events: Mutex<Vec<ProgressEvent>>,
    }

    impl RecordingSink {
        pub(crate) fn phases(&self) -> Vec<Phase> {
            self.events.lock().unwrap().iter().map(|e| e.phase).collect()
        }
    }

    impl ProgressSink for RecordingSink {
        fn push(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    pub(crate) fn write_source(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, vec![7u8; 4096]).unwrap();
        path
    }

    fn request(source: PathBuf, output: &Path, format: ImageFormat) -> EncodeRequest {
        EncodeRequest {
            source_path: source,
            output_folder: output.to_path_buf(),
            max_dimension: 1000,
            format,
            target_file_size: 42_000,
            size_tolerance: 500,
            filename_template: "{filename}_{width}x{height}".to_string(),
            field_values: FieldValues::new(),
            sequence_index: 0,
            total: 1,
        }
    }

    #[tokio::test]
    async fn test_lossy_encode_hits_target() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path(), "photo.png");
        let encoder = ImageEncoder::with_codec(
            Arc::new(MockCodec::new(4000, 3000)),
            LimitsConfig::default(),
        );
        let sink = RecordingSink::default();

        let result = encoder
            .encode(&request(source.clone(), dir.path(), ImageFormat::Jpeg), &sink)
            .await
            .unwrap();

        assert_eq!(result.quality_used, Some(42));
        assert_eq!(result.output_size, 42_000);
        assert_eq!(result.original_size, 4096);
        assert_eq!((result.original_width, result.original_height), (4000, 3000));
        assert_eq!((result.output_width, result.output_height), (1000, 750));
        assert_eq!(result.rendered_filename, "photo_1000x750.jpg");
        assert_eq!(result.output_path, dir.path().join("photo_1000x750.jpg"));
        assert_eq!(
            std::fs::metadata(&result.output_path).unwrap().len(),
            42_000
        );

        assert_eq!(
            sink.phases(),
            vec![
                Phase::Resizing,
                Phase::Optimizing,
                Phase::Optimizing,
                Phase::Optimizing,
                Phase::Writing,
                Phase::Complete,
            ]
        );
    }

    #[tokio::test]
    async fn test_png_has_no_quality() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path(), "diagram.png");
        let codec = MockCodec::new(800, 600);
        let calls = codec.encode_calls.clone();
        let encoder = ImageEncoder::with_codec(Arc::new(codec), LimitsConfig::default());
        let sink = RecordingSink::default();

        let result = encoder
            .encode(&request(source, dir.path(), ImageFormat::Png), &sink)
            .await
            .unwrap();

        assert_eq!(result.quality_used, None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!((result.output_width, result.output_height), (800, 600));
        assert_eq!(result.rendered_filename, "diagram_800x600.png");
        assert_eq!(
            sink.phases(),
            vec![
                Phase::Resizing,
                Phase::Optimizing,
                Phase::Writing,
                Phase::Complete
            ]
        );
    }

    #[tokio::test]
    async fn test_counter_uses_sequence_index() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path(), "a.png");
        let encoder =
            ImageEncoder::with_codec(Arc::new(MockCodec::new(10, 10)), LimitsConfig::default());

        let mut req = request(source, dir.path(), ImageFormat::Png);
        req.filename_template = "{counter}".to_string();
        req.field_values
            .insert("counter".to_string(), "5".to_string());
        req.sequence_index = 2;

        let result = encoder.encode(&req, &crate::pipeline::NullSink).await.unwrap();
        assert_eq!(result.rendered_filename, "007.png");
    }

    #[tokio::test]
    async fn test_codec_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path(), "broken.jpg");
        let encoder = ImageEncoder::with_codec(
            Arc::new(MockCodec::new(100, 100).failing_on("broken")),
            LimitsConfig::default(),
        );
        let sink = RecordingSink::default();

        let err = encoder
            .encode(&request(source, dir.path(), ImageFormat::Webp), &sink)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CodecFailure);
        assert!(err.to_string().contains("corrupt header"));
        assert!(!sink.phases().contains(&Phase::Complete));
    }

    #[tokio::test]
    async fn test_missing_source_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let encoder =
            ImageEncoder::with_codec(Arc::new(MockCodec::new(10, 10)), LimitsConfig::default());

        let err = encoder
            .encode(
                &request(dir.path().join("ghost.jpg"), dir.path(), ImageFormat::Jpeg),
                &crate::pipeline::NullSink,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[tokio::test]
    async fn test_empty_path_is_rejected_before_codec() {
        let dir = tempfile::tempdir().unwrap();
        let codec = MockCodec::new(10, 10);
        let calls = codec.encode_calls.clone();
        let encoder = ImageEncoder::with_codec(Arc::new(codec), LimitsConfig::default());
        let sink = RecordingSink::default();

        let err = encoder
            .encode(&request(PathBuf::new(), dir.path(), ImageFormat::Jpeg), &sink)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(sink.phases().is_empty());
    }

    #[tokio::test]
    async fn test_slow_codec_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path(), "slow.png");
        let mut codec = MockCodec::new(10, 10);
        codec.delay = Some(Duration::from_millis(300));
        let encoder = ImageEncoder::with_codec(
            Arc::new(codec),
            LimitsConfig {
                codec_timeout_ms: 20,
                ..LimitsConfig::default()
            },
        );

        let err = encoder
            .encode(&request(source, dir.path(), ImageFormat::Png), &crate::pipeline::NullSink)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.to_string().contains("encode"));
    }

    #[tokio::test]
    async fn test_unwritable_output_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path(), "a.png");
        let encoder =
            ImageEncoder::with_codec(Arc::new(MockCodec::new(10, 10)), LimitsConfig::default());

        let missing_folder = dir.path().join("does-not-exist");
        let err = encoder
            .encode(
                &request(source, &missing_folder, ImageFormat::Png),
                &crate::pipeline::NullSink,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[tokio::test]
    async fn test_real_codec_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("gradient.png");
        image::RgbImage::from_fn(640, 480, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
        })
        .save(&source)
        .unwrap();

        let encoder = ImageEncoder::new(LimitsConfig::default());
        let mut req = request(source, dir.path(), ImageFormat::Jpeg);
        req.max_dimension = 320;
        req.target_file_size = 8_000;
        req.size_tolerance = 2_000;

        let result = encoder.encode(&req, &crate::pipeline::NullSink).await.unwrap();
        assert_eq!((result.output_width, result.output_height), (320, 240));
        let quality = result.quality_used.unwrap();
        assert!((10..=95).contains(&quality));
        assert_eq!(
            std::fs::metadata(&result.output_path).unwrap().len(),
            result.output_size
        );
    }
}
