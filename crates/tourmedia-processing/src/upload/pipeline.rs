use std::time::Instant;

use tourmedia_core::UploadedAsset;

use super::finalize::{finalize, normalize};
use super::types::{CompressionSummary, UploadOutcome, UploadShape};
use crate::batch::compress_all;
use crate::traits::CompressorSet;

/// Composes normalize → compress → finalize for an intake's output.
#[derive(Clone)]
pub struct UploadPipeline {
    compressors: CompressorSet,
}

impl UploadPipeline {
    pub fn new(compressors: CompressorSet) -> Self {
        Self { compressors }
    }

    pub fn compressors(&self) -> &CompressorSet {
        &self.compressors
    }

    /// Run the post-intake stages.
    ///
    /// Compression failures never fail the upload: each file carries its own
    /// `CompressionResult` and the summary counts how many succeeded.
    pub async fn process(&self, shape: UploadShape, compress: bool) -> UploadOutcome {
        let start = Instant::now();
        let pairs = normalize(shape);

        if !compress {
            let files = finalize(
                pairs
                    .into_iter()
                    .map(|(field, asset)| (field, asset, None))
                    .collect(),
            );
            return UploadOutcome {
                files,
                compression: None,
            };
        }

        let (fields, assets): (Vec<String>, Vec<UploadedAsset>) = pairs.into_iter().unzip();
        let compressed = compress_all(&self.compressors, assets).await;
        let attempted = compressed.len();
        let succeeded = compressed.iter().filter(|(_, r)| r.success).count();

        let files = finalize(
            fields
                .into_iter()
                .zip(compressed)
                .map(|(field, (asset, result))| (field, asset, Some(result)))
                .collect(),
        );

        tracing::info!(
            files = attempted,
            compressed = succeeded,
            duration_ms = start.elapsed().as_millis() as u64,
            "Upload processed"
        );

        UploadOutcome {
            files,
            compression: Some(CompressionSummary {
                attempted,
                succeeded,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tempfile::tempdir;
    use tourmedia_core::{
        CompressionFailureKind, CompressionResult, ContentDomain, MediaKind,
    };

    use crate::traits::MediaCompressor;

    /// Renames the file to `compressed-*`, failing for names containing "bad".
    struct RenamingCompressor;

    #[async_trait]
    impl MediaCompressor for RenamingCompressor {
        async fn compress(&self, asset: &mut UploadedAsset) -> CompressionResult {
            let name = asset.stored_filename();
            if name.contains("bad") {
                return CompressionResult::failed(
                    asset.size_bytes,
                    0,
                    asset.stored_path.display().to_string(),
                    CompressionFailureKind::ProcessingError,
                    "boom",
                );
            }
            let target = asset.stored_path.with_file_name(format!("compressed-{}", name));
            tokio::fs::rename(&asset.stored_path, &target).await.unwrap();
            asset.stored_path = target.clone();
            CompressionResult::succeeded(asset.size_bytes, asset.size_bytes, 0, target.display().to_string())
        }
    }

    fn pipeline() -> UploadPipeline {
        let compressor: Arc<dyn MediaCompressor> = Arc::new(RenamingCompressor);
        UploadPipeline::new(CompressorSet::new(compressor.clone(), compressor))
    }

    async fn staged(dir: &std::path::Path, name: &str) -> UploadedAsset {
        let path = dir.join(name);
        tokio::fs::write(&path, b"x").await.unwrap();
        UploadedAsset {
            mime_type: "image/png".to_string(),
            original_name: name.to_string(),
            stored_path: path,
            size_bytes: 1,
            field_name: "images".to_string(),
            kind: MediaKind::Image,
            content_domain: ContentDomain::parse("posts").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_siblings() {
        let dir = tempdir().unwrap();
        let shape = UploadShape::Multiple(vec![
            staged(dir.path(), "a-1.png").await,
            staged(dir.path(), "bad-2.png").await,
            staged(dir.path(), "c-3.png").await,
        ]);

        let outcome = pipeline().process(shape, true).await;

        assert_eq!(
            outcome.compression,
            Some(CompressionSummary {
                attempted: 3,
                succeeded: 2
            })
        );
        assert_eq!(
            outcome.filenames(),
            vec!["compressed-a-1.png", "bad-2.png", "compressed-c-3.png"]
        );
        assert!(!outcome.files[1].compression.as_ref().unwrap().success);
        assert_eq!(outcome.fields()["images"].len(), 3);
    }

    #[tokio::test]
    async fn test_without_compression_keeps_names() {
        let dir = tempdir().unwrap();
        let shape = UploadShape::Single(staged(dir.path(), "a-1.png").await);

        let outcome = pipeline().process(shape, false).await;

        assert!(outcome.compression.is_none());
        assert_eq!(outcome.filenames(), vec!["a-1.png"]);
        assert!(outcome.files[0].compression.is_none());
    }
}
