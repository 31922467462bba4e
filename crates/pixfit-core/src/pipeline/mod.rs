//! Size-targeted encoding pipeline.
//!
//! - **resize**: bounding-box fitting, never upscales
//! - **codec**: decode/encode capability and the `image`/`webp` backed default
//! - **quality**: binary search over quality against a byte-size target
//! - **encoder**: one image end to end, with per-call timeouts
//! - **batch**: sequential runs with cancellation and per-image failure isolation
//! - **progress**: progress event sinks
//! - **preview**: small JPEG data URLs
//! - **discovery**: find image files in directories
//! - **validate**: request checks before any codec work

pub mod batch;
pub mod cancel;
pub mod codec;
pub mod discovery;
pub mod encoder;
pub mod preview;
pub mod progress;
pub mod quality;
pub mod resize;
pub mod validate;

// Re-exports for convenient access
pub use batch::{BatchJob, BatchProcessor};
pub use cancel::CancellationToken;
pub use codec::{CodecError, EncodeOptions, ImageCodec, StandardCodec, PNG_COMPRESSION_LEVEL};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use encoder::ImageEncoder;
pub use preview::{PREVIEW_QUALITY, PREVIEW_SIZE};
pub use progress::{progress_channel, NullSink, ProgressSink, TracingSink};
pub use quality::{QualitySearch, SearchOutcome, SizeTarget};
pub use resize::{BoundingBox, Dimensions};
pub use validate::Validator;
