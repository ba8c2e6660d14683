//! Tourmedia Processing Library
//!
//! Everything between the multipart body and the bare filenames a controller
//! persists: intake policy, compression (image re-encode, video transcode
//! with a copy-through degrade path), shape normalization, batch deletion and
//! the compensating-delete helpers used around entity writes.

pub mod batch;
pub mod compression;
pub mod lifecycle;
pub mod output;
pub mod traits;
pub mod upload;
pub mod validator;
pub mod video;

// Re-export commonly used types
pub use batch::BatchExecutor;
pub use compression::ImageCompressor;
pub use lifecycle::MediaLifecycle;
pub use traits::{CompressorSet, MediaCompressor};
pub use upload::{
    CompressionSummary, FinalizedFile, UploadIntake, UploadOutcome, UploadPipeline, UploadShape,
};
pub use validator::{AcceptedPart, IntakeError, IntakeLimits, IntakeSession};
pub use video::{EncoderProbe, TranscodeError, Transcoder, VideoCompressor};
