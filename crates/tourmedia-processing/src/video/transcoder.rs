use std::path::Path;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tourmedia_core::constants::{MAX_VIDEO_HEIGHT, MAX_VIDEO_WIDTH};

use crate::output::PendingOutput;

const VIDEO_CODEC: &str = "libx264";
const PRESET: &str = "medium";
const CRF: &str = "28";
const MAX_RATE: &str = "2M";
const BUF_SIZE: &str = "4M";
const AUDIO_CODEC: &str = "aac";
const AUDIO_BITRATE: &str = "128k";

/// Trailing stderr kept in error messages.
const STDERR_TAIL_BYTES: usize = 2000;

#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The encoder process could not be started.
    #[error("Failed to start encoder: {0}")]
    Setup(String),

    /// The encoder ran and exited unsuccessfully.
    #[error("Encoder failed: {0}")]
    Encoder(String),
}

/// Fixed-configuration H.264/AAC transcoder driving an ffmpeg binary.
#[derive(Debug, Clone)]
pub struct Transcoder {
    ffmpeg_path: String,
}

impl Transcoder {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Scale filter bounding output to 1920x1080 without upscaling, with even sides.
    pub fn scale_filter() -> String {
        format!(
            "scale='min({w},iw)':'min({h},ih)':force_original_aspect_ratio=decrease,scale=trunc(iw/2)*2:trunc(ih/2)*2",
            w = MAX_VIDEO_WIDTH,
            h = MAX_VIDEO_HEIGHT
        )
    }

    pub fn build_args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-c:v".to_string(),
            VIDEO_CODEC.to_string(),
            "-preset".to_string(),
            PRESET.to_string(),
            "-crf".to_string(),
            CRF.to_string(),
            "-maxrate".to_string(),
            MAX_RATE.to_string(),
            "-bufsize".to_string(),
            BUF_SIZE.to_string(),
            "-c:a".to_string(),
            AUDIO_CODEC.to_string(),
            "-b:a".to_string(),
            AUDIO_BITRATE.to_string(),
            "-vf".to_string(),
            Self::scale_filter(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            "-y".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    /// Run the encoder to completion.
    ///
    /// The child is killed if this future is dropped, so a request deadline
    /// also bounds the transcode. A failed or interrupted run leaves no
    /// partial output.
    pub async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        if self.ffmpeg_path.trim().is_empty() {
            return Err(TranscodeError::Setup("encoder path is empty".to_string()));
        }
        if !tokio::fs::try_exists(input).await.unwrap_or(false) {
            return Err(TranscodeError::Setup(format!(
                "input {} does not exist",
                input.display()
            )));
        }

        let pending = PendingOutput::new(output);
        let start = std::time::Instant::now();
        let result = Command::new(&self.ffmpeg_path)
            .args(Self::build_args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let out = result
            .map_err(|e| TranscodeError::Setup(format!("{}: {}", self.ffmpeg_path, e)))?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let tail = tail(&stderr, STDERR_TAIL_BYTES);
            tracing::error!(
                input = %input.display(),
                status = %out.status,
                stderr = %tail,
                "Transcode failed"
            );
            return Err(TranscodeError::Encoder(format!(
                "{} ({})",
                out.status,
                tail.trim()
            )));
        }

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Transcode finished"
        );

        pending.keep();
        Ok(())
    }
}

fn tail(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut start = s.len() - max_bytes;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_build_args_fixed_configuration() {
        let args = Transcoder::build_args(Path::new("in.mov"), Path::new("out.mp4"));
        let joined = args.join(" ");

        assert!(joined.contains("-i in.mov"));
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-preset medium"));
        assert!(joined.contains("-crf 28"));
        assert!(joined.contains("-maxrate 2M -bufsize 4M"));
        assert!(joined.contains("-c:a aac -b:a 128k"));
        assert!(joined.contains("-movflags +faststart"));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn test_scale_filter_never_upscales() {
        let filter = Transcoder::scale_filter();
        assert!(filter.contains("min(1920,iw)"));
        assert!(filter.contains("min(1080,ih)"));
        assert!(filter.contains("force_original_aspect_ratio=decrease"));
    }

    #[test]
    fn test_tail_respects_char_boundaries() {
        assert_eq!(tail("abc", 10), "abc");
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("ééé", 3), "é");
    }

    #[tokio::test]
    async fn test_missing_binary_is_setup_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        tokio::fs::write(&input, b"video").await.unwrap();

        let result = Transcoder::new("/nonexistent/ffmpeg")
            .transcode(&input, &dir.path().join("out.mp4"))
            .await;
        assert!(matches!(result, Err(TranscodeError::Setup(_))));
    }

    #[tokio::test]
    async fn test_missing_input_is_setup_error() {
        let dir = tempdir().unwrap();
        let result = Transcoder::new("ffmpeg")
            .transcode(&dir.path().join("gone.mp4"), &dir.path().join("out.mp4"))
            .await;
        assert!(matches!(result, Err(TranscodeError::Setup(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_encoder_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        tokio::fs::write(&input, b"video").await.unwrap();

        let result = Transcoder::new("false")
            .transcode(&input, &dir.path().join("out.mp4"))
            .await;
        assert!(matches!(result, Err(TranscodeError::Encoder(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_interrupted_transcode_leaves_no_output() {
        use crate::video::testing::{fake_encoder, wait_for_file};

        let bin = tempdir().unwrap();
        let dir = tempdir().unwrap();
        let input = dir.path().join("tour-1.mov");
        let output = dir.path().join("compressed-tour-1.mp4");
        tokio::fs::write(&input, b"movie").await.unwrap();

        let encoder = fake_encoder(bin.path(), "printf partial > \"$out\"\nsleep 30");
        let transcoder = Transcoder::new(encoder);
        let mut transcode = Box::pin(transcoder.transcode(&input, &output));

        tokio::select! {
            _ = &mut transcode => panic!("encoder finished early"),
            _ = wait_for_file(&output) => {}
        }
        drop(transcode);

        assert!(!output.exists());
        assert!(input.exists());
    }
}
