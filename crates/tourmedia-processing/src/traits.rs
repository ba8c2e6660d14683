use std::sync::Arc;

use async_trait::async_trait;
use tourmedia_core::{CompressionResult, MediaKind, UploadedAsset};

/// In-place compression of a stored upload.
///
/// Implementations rewrite `asset.stored_path`, `asset.size_bytes` and, when
/// the container changes, `asset.mime_type`. They never return an error: a
/// failed attempt is a `CompressionResult` with `success == false` and the
/// source left on disk untouched.
#[async_trait]
pub trait MediaCompressor: Send + Sync {
    async fn compress(&self, asset: &mut UploadedAsset) -> CompressionResult;
}

/// One compressor per media kind.
#[derive(Clone)]
pub struct CompressorSet {
    image: Arc<dyn MediaCompressor>,
    video: Arc<dyn MediaCompressor>,
}

impl CompressorSet {
    pub fn new(image: Arc<dyn MediaCompressor>, video: Arc<dyn MediaCompressor>) -> Self {
        Self { image, video }
    }

    pub fn for_kind(&self, kind: MediaKind) -> &Arc<dyn MediaCompressor> {
        match kind {
            MediaKind::Image => &self.image,
            MediaKind::Video => &self.video,
        }
    }
}
