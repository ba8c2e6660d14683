//! Application state.
//!
//! `MediaState` bundles the pipeline services an entity controller needs:
//! the store, the intake limits, the composed upload pipeline, batch deletion
//! and the compensating-delete helpers.

use std::sync::Arc;

use tourmedia_core::Config;
use tourmedia_processing::{
    BatchExecutor, IntakeLimits, MediaLifecycle, UploadPipeline, VideoCompressor,
};
use tourmedia_storage::MediaStore;

#[derive(Clone)]
pub struct MediaState {
    pub store: Arc<dyn MediaStore>,
    pub limits: IntakeLimits,
    pub pipeline: UploadPipeline,
    pub executor: BatchExecutor,
    pub lifecycle: MediaLifecycle,
    /// Shared with the pipeline; kept here for the readiness probe.
    pub video: Arc<VideoCompressor>,
}

pub struct AppState {
    pub config: Config,
    pub media: MediaState,
}
