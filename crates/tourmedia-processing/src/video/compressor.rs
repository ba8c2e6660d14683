use std::time::Instant;

use async_trait::async_trait;
use tourmedia_core::{CompressionFailureKind, CompressionResult, UploadedAsset};

use super::probe::EncoderProbe;
use super::transcoder::{TranscodeError, Transcoder};
use crate::output::{commit_output, compressed_sibling, copy_through};
use crate::traits::MediaCompressor;

pub const ENCODER_UNAVAILABLE_WARNING: &str = "encoder unavailable";

const TRANSCODED_EXTENSION: &str = "mp4";
const TRANSCODED_MIME: &str = "video/mp4";

pub struct VideoCompressor {
    probe: EncoderProbe,
    transcoder: Transcoder,
}

impl VideoCompressor {
    pub fn new(probe: EncoderProbe, transcoder: Transcoder) -> Self {
        Self { probe, transcoder }
    }

    /// Probe and transcoder sharing one encoder path.
    pub fn from_ffmpeg_path(ffmpeg_path: &str, cache_probe: bool) -> Self {
        let probe = if cache_probe {
            EncoderProbe::cached(ffmpeg_path)
        } else {
            EncoderProbe::new(ffmpeg_path)
        };
        Self::new(probe, Transcoder::new(ffmpeg_path))
    }

    pub fn probe(&self) -> &EncoderProbe {
        &self.probe
    }

    async fn degrade(&self, asset: &mut UploadedAsset, start: Instant) -> CompressionResult {
        let source = asset.stored_path.clone();
        let target = compressed_sibling(&source, None);

        match copy_through(&source, &target).await {
            Ok(size) => {
                tracing::warn!(
                    path = %target.display(),
                    ffmpeg_path = %self.probe.ffmpeg_path(),
                    size_bytes = size,
                    "Encoder unavailable, video stored without transcoding"
                );
                asset.stored_path = target.clone();
                asset.size_bytes = size;
                CompressionResult::passed_through(
                    size,
                    start.elapsed().as_millis() as u64,
                    target.display().to_string(),
                    ENCODER_UNAVAILABLE_WARNING,
                )
            }
            Err(e) => CompressionResult::failed(
                asset.size_bytes,
                start.elapsed().as_millis() as u64,
                source.display().to_string(),
                CompressionFailureKind::ProcessingError,
                format!("Failed to copy video: {}", e),
            ),
        }
    }
}

#[async_trait]
impl MediaCompressor for VideoCompressor {
    async fn compress(&self, asset: &mut UploadedAsset) -> CompressionResult {
        let start = Instant::now();

        if !self.probe.is_available().await {
            return self.degrade(asset, start).await;
        }

        let source = asset.stored_path.clone();
        let original_size = asset.size_bytes;
        let target = compressed_sibling(&source, Some(TRANSCODED_EXTENSION));
        let fail = |kind: CompressionFailureKind, error: String| {
            tracing::warn!(
                path = %source.display(),
                error = %error,
                "Video compression failed, keeping original"
            );
            CompressionResult::failed(
                original_size,
                start.elapsed().as_millis() as u64,
                source.display().to_string(),
                kind,
                error,
            )
        };

        if let Err(e) = self.transcoder.transcode(&source, &target).await {
            let kind = match e {
                TranscodeError::Setup(_) => CompressionFailureKind::SetupError,
                TranscodeError::Encoder(_) => CompressionFailureKind::FfmpegError,
            };
            return fail(kind, e.to_string());
        }

        let compressed_size = match commit_output(&source, &target).await {
            Ok(size) => size,
            Err(e) => {
                return fail(
                    CompressionFailureKind::ProcessingError,
                    format!("Failed to finalize transcoded video: {}", e),
                )
            }
        };

        asset.stored_path = target.clone();
        asset.size_bytes = compressed_size;
        asset.mime_type = TRANSCODED_MIME.to_string();

        CompressionResult::succeeded(
            original_size,
            compressed_size,
            start.elapsed().as_millis() as u64,
            target.display().to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;
    use tourmedia_core::{ContentDomain, MediaKind};

    fn asset(path: PathBuf, size: u64) -> UploadedAsset {
        UploadedAsset {
            mime_type: "video/webm".to_string(),
            original_name: "tour.webm".to_string(),
            stored_path: path,
            size_bytes: size,
            field_name: "video".to_string(),
            kind: MediaKind::Video,
            content_domain: ContentDomain::parse("posts").unwrap(),
        }
    }

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_unavailable_encoder_copies_through() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("tour-1.webm");
        let bytes = vec![7u8; 4096];
        tokio::fs::write(&source, &bytes).await.unwrap();

        let compressor = VideoCompressor::from_ffmpeg_path("/nonexistent/ffmpeg", false);
        let mut asset = asset(source, bytes.len() as u64);
        let result = compressor.compress(&mut asset).await;

        assert!(result.success);
        assert_eq!(result.warning.as_deref(), Some(ENCODER_UNAVAILABLE_WARNING));
        assert_eq!(result.compressed_size, result.original_size);
        assert_eq!(files_in(dir.path()), vec!["compressed-tour-1.webm"]);
        assert_eq!(tokio::fs::read(&asset.stored_path).await.unwrap(), bytes);
        assert_eq!(asset.mime_type, "video/webm");
    }

    #[tokio::test]
    async fn test_empty_video_copies_through_without_encoder() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("blank-1.webm");
        tokio::fs::write(&source, b"").await.unwrap();

        let compressor = VideoCompressor::from_ffmpeg_path("/nonexistent/ffmpeg", false);
        let mut asset = asset(source, 0);
        let result = compressor.compress(&mut asset).await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.warning.as_deref(), Some(ENCODER_UNAVAILABLE_WARNING));
        assert_eq!(result.compressed_size, 0);
        assert_eq!(files_in(dir.path()), vec!["compressed-blank-1.webm"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_encoder_failure_keeps_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("tour-2.mov");
        tokio::fs::write(&source, b"not a real movie").await.unwrap();

        // Probe succeeds, the encoder itself exits non-zero.
        let compressor = VideoCompressor::new(EncoderProbe::new("true"), Transcoder::new("false"));
        let mut asset = asset(source.clone(), 16);
        let result = compressor.compress(&mut asset).await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(CompressionFailureKind::FfmpegError));
        assert_eq!(files_in(dir.path()), vec!["tour-2.mov"]);
        assert_eq!(asset.stored_path, source);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unstartable_encoder_is_setup_error() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("tour-3.mp4");
        tokio::fs::write(&source, b"movie").await.unwrap();

        let compressor = VideoCompressor::new(
            EncoderProbe::new("true"),
            Transcoder::new("/nonexistent/ffmpeg"),
        );
        let mut asset = asset(source, 5);
        let result = compressor.compress(&mut asset).await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(CompressionFailureKind::SetupError));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_transcode_replaces_source() {
        use crate::video::testing::fake_encoder;

        let bin = tempdir().unwrap();
        let dir = tempdir().unwrap();
        let source = dir.path().join("tour-4.mov");
        tokio::fs::write(&source, vec![1u8; 64]).await.unwrap();

        let encoder = fake_encoder(bin.path(), "printf 'h264 bytes' > \"$out\"");
        let compressor = VideoCompressor::new(EncoderProbe::new("true"), Transcoder::new(encoder));
        let mut asset = asset(source, 64);
        let result = compressor.compress(&mut asset).await;

        assert!(result.success, "{:?}", result.error);
        assert!(result.warning.is_none());
        assert_eq!(result.original_size, 64);
        assert_eq!(result.compressed_size, 10);
        assert_eq!(files_in(dir.path()), vec!["compressed-tour-4.mp4"]);
        assert_eq!(asset.stored_path, dir.path().join("compressed-tour-4.mp4"));
        assert_eq!(asset.mime_type, "video/mp4");
        assert_eq!(asset.size_bytes, 10);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_transcode_output_keeps_source() {
        use crate::video::testing::fake_encoder;

        let bin = tempdir().unwrap();
        let dir = tempdir().unwrap();
        let source = dir.path().join("tour-5.mov");
        tokio::fs::write(&source, b"movie").await.unwrap();

        // Exits 0 without producing anything usable.
        let encoder = fake_encoder(bin.path(), ": > \"$out\"");
        let compressor = VideoCompressor::new(EncoderProbe::new("true"), Transcoder::new(encoder));
        let mut asset = asset(source.clone(), 5);
        let result = compressor.compress(&mut asset).await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(CompressionFailureKind::ProcessingError));
        assert_eq!(files_in(dir.path()), vec!["tour-5.mov"]);
        assert_eq!(asset.stored_path, source);
        assert_eq!(asset.mime_type, "video/webm");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_interrupted_compression_keeps_only_source() {
        use crate::video::testing::{fake_encoder, wait_for_file};

        let bin = tempdir().unwrap();
        let dir = tempdir().unwrap();
        let source = dir.path().join("tour-1.mov");
        tokio::fs::write(&source, b"movie").await.unwrap();

        let encoder = fake_encoder(bin.path(), "printf partial > \"$out\"\nsleep 30");
        let compressor = VideoCompressor::new(EncoderProbe::new("true"), Transcoder::new(encoder));
        let mut asset = asset(source, 5);
        let mut compress = Box::pin(compressor.compress(&mut asset));
        let compressed = dir.path().join("compressed-tour-1.mp4");

        tokio::select! {
            _ = &mut compress => panic!("encoder finished early"),
            _ = wait_for_file(&compressed) => {}
        }
        drop(compress);

        assert_eq!(files_in(dir.path()), vec!["tour-1.mov"]);
    }
}
