use std::process::Stdio;
use std::sync::RwLock;

use tokio::process::Command;

/// Encoder-availability check.
///
/// Re-probes on every call unless constructed with [`EncoderProbe::cached`],
/// in which case the first answer is kept until [`EncoderProbe::invalidate`].
#[derive(Debug)]
pub struct EncoderProbe {
    ffmpeg_path: String,
    cache: Option<RwLock<Option<bool>>>,
}

impl EncoderProbe {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            cache: None,
        }
    }

    pub fn cached(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            cache: Some(RwLock::new(None)),
        }
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    pub async fn is_available(&self) -> bool {
        if let Some(cache) = &self.cache {
            let cached = *cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(available) = cached {
                return available;
            }
        }

        let available = probe(&self.ffmpeg_path).await;

        if let Some(cache) = &self.cache {
            *cache.write().unwrap_or_else(|e| e.into_inner()) = Some(available);
        }

        tracing::debug!(
            ffmpeg_path = %self.ffmpeg_path,
            available = available,
            "Encoder probe"
        );

        available
    }

    /// Forget a memoized answer so the next call probes again.
    pub fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            *cache.write().unwrap_or_else(|e| e.into_inner()) = None;
        }
    }
}

async fn probe(ffmpeg_path: &str) -> bool {
    if ffmpeg_path.trim().is_empty() {
        return false;
    }

    // Windows installs are looked up at a fixed location rather than on PATH.
    if cfg!(windows) {
        return tokio::fs::try_exists(ffmpeg_path).await.unwrap_or(false);
    }

    Command::new(ffmpeg_path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}
