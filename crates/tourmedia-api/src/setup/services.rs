//! Pipeline service construction

use std::sync::Arc;

use anyhow::{Context, Result};
use tourmedia_core::Config;
use tourmedia_processing::{
    BatchExecutor, CompressorSet, ImageCompressor, IntakeLimits, MediaCompressor, MediaLifecycle,
    UploadPipeline, VideoCompressor,
};
use tourmedia_storage::{LocalMediaStore, MediaStore};

use crate::state::{AppState, MediaState};

/// Build the shared state over the local uploads root.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let store: Arc<dyn MediaStore> = Arc::new(
        LocalMediaStore::new(config.uploads_root())
            .await
            .with_context(|| {
                format!(
                    "Failed to create uploads root {}",
                    config.uploads_root().display()
                )
            })?,
    );

    let video = Arc::new(VideoCompressor::from_ffmpeg_path(
        config.ffmpeg_path(),
        config.encoder_probe_cache(),
    ));
    if !video.probe().is_available().await {
        tracing::warn!(
            ffmpeg_path = %config.ffmpeg_path(),
            "Video encoder not available; videos will be stored without transcoding"
        );
    }

    let image: Arc<dyn MediaCompressor> = Arc::new(ImageCompressor::new());
    let video_compressor: Arc<dyn MediaCompressor> = video.clone();
    let pipeline = UploadPipeline::new(CompressorSet::new(image, video_compressor));

    let executor = BatchExecutor::new(store.clone());
    let lifecycle = MediaLifecycle::new(executor.clone());

    let limits = IntakeLimits {
        max_image_size_bytes: config.max_image_size_bytes(),
        max_video_size_bytes: config.max_video_size_bytes(),
    };

    Ok(Arc::new(AppState {
        config: config.clone(),
        media: MediaState {
            store,
            limits,
            pipeline,
            executor,
            lifecycle,
            video,
        },
    }))
}
