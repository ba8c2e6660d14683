//! Filesystem steps shared by the compressors.
//!
//! Every branch follows the same order: write the output, verify it (non-empty
//! for encoder output, same length for verbatim copies), and only then remove
//! the source.

use std::io;
use std::path::{Path, PathBuf};

use tourmedia_core::constants::COMPRESSED_PREFIX;

/// Sibling path carrying the `compressed-` prefix, optionally with a new extension.
pub fn compressed_sibling(source: &Path, extension: Option<&str>) -> PathBuf {
    let name = match extension {
        Some(ext) => {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("{}{}.{}", COMPRESSED_PREFIX, stem, ext)
        }
        None => {
            let file_name = source
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("{}{}", COMPRESSED_PREFIX, file_name)
        }
    };
    source.with_file_name(name)
}

/// Size of a freshly written output; an absent or empty file is an error.
pub async fn verify_output(path: &Path) -> io::Result<u64> {
    let meta = tokio::fs::metadata(path).await?;
    if !meta.is_file() || meta.len() == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("output {} is empty", path.display()),
        ));
    }
    Ok(meta.len())
}

/// Remove the source once the output has been verified.
///
/// If the source cannot be removed the output is rolled back so exactly one
/// file remains for the upload.
pub async fn commit_output(source: &Path, output: &Path) -> io::Result<u64> {
    let size = match verify_output(output).await {
        Ok(size) => size,
        Err(e) => {
            discard(output).await;
            return Err(e);
        }
    };

    remove_source(source, output).await?;
    Ok(size)
}

/// Copy the source bytes verbatim to `target`, then commit.
///
/// The copy is verified against the source length rather than for being
/// non-empty, so an empty upload passes through unchanged.
pub async fn copy_through(source: &Path, target: &Path) -> io::Result<u64> {
    let copied = match tokio::fs::copy(source, target).await {
        Ok(copied) => copied,
        Err(e) => {
            discard(target).await;
            return Err(e);
        }
    };

    let written = match tokio::fs::metadata(target).await {
        Ok(meta) => meta.len(),
        Err(e) => {
            discard(target).await;
            return Err(e);
        }
    };
    if written != copied {
        discard(target).await;
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "copy {} is truncated ({} of {} bytes)",
                target.display(),
                written,
                copied
            ),
        ));
    }

    remove_source(source, target).await?;
    Ok(written)
}

async fn remove_source(source: &Path, output: &Path) -> io::Result<()> {
    if let Err(e) = tokio::fs::remove_file(source).await {
        discard(output).await;
        return Err(e);
    }
    Ok(())
}

/// Best-effort removal of a partial output.
pub async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial output");
        }
    }
}

/// Removes a file that has not been committed yet when dropped.
///
/// Held across awaits that may be cancelled (request deadline, client
/// disconnect) so an interrupted step leaves nothing behind. [`keep`] disarms
/// it once the file belongs to the caller.
///
/// [`keep`]: PendingOutput::keep
#[derive(Debug)]
pub struct PendingOutput {
    path: Option<PathBuf>,
}

impl PendingOutput {
    pub fn new(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
        }
    }

    /// Point the guard at the file's new location without removing the old one.
    pub fn retarget(&mut self, path: &Path) {
        if self.path.is_some() {
            self.path = Some(path.to_path_buf());
        }
    }

    pub fn keep(mut self) {
        self.path = None;
    }
}

impl Drop for PendingOutput {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed uncommitted output"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove uncommitted output")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_compressed_sibling() {
        let source = Path::new("uploads/videos/posts/clip-1.mov");
        assert_eq!(
            compressed_sibling(source, None),
            PathBuf::from("uploads/videos/posts/compressed-clip-1.mov")
        );
        assert_eq!(
            compressed_sibling(source, Some("mp4")),
            PathBuf::from("uploads/videos/posts/compressed-clip-1.mp4")
        );
    }

    #[tokio::test]
    async fn test_copy_through_preserves_bytes_and_removes_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.gif");
        let target = dir.path().join("compressed-a.gif");
        tokio::fs::write(&source, b"GIF89a-bytes").await.unwrap();

        let size = copy_through(&source, &target).await.unwrap();

        assert_eq!(size, 12);
        assert!(!source.exists());
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"GIF89a-bytes");
    }

    #[tokio::test]
    async fn test_copy_through_accepts_empty_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("empty.webm");
        let target = dir.path().join("compressed-empty.webm");
        tokio::fs::write(&source, b"").await.unwrap();

        let size = copy_through(&source, &target).await.unwrap();

        assert_eq!(size, 0);
        assert!(!source.exists());
        assert!(target.exists());
    }

    #[tokio::test]
    async fn test_empty_output_keeps_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.mp4");
        let output = dir.path().join("compressed-a.mp4");
        tokio::fs::write(&source, b"video").await.unwrap();
        tokio::fs::write(&output, b"").await.unwrap();

        assert!(commit_output(&source, &output).await.is_err());
        assert!(source.exists());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_output_keeps_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.mp4");
        tokio::fs::write(&source, b"video").await.unwrap();

        let missing = dir.path().join("compressed-a.mp4");
        assert!(commit_output(&source, &missing).await.is_err());
        assert!(source.exists());
    }

    #[test]
    fn test_pending_output_removed_unless_kept() {
        let dir = tempdir().unwrap();
        let dropped = dir.path().join("compressed-a.mp4");
        let kept = dir.path().join("compressed-b.mp4");
        std::fs::write(&dropped, b"partial").unwrap();
        std::fs::write(&kept, b"complete").unwrap();

        drop(PendingOutput::new(&dropped));
        PendingOutput::new(&kept).keep();

        assert!(!dropped.exists());
        assert!(kept.exists());
    }

    #[test]
    fn test_pending_output_retarget_leaves_old_path() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.png");
        let output = dir.path().join("compressed-a.png");
        std::fs::write(&source, b"source").unwrap();
        std::fs::write(&output, b"output").unwrap();

        let mut pending = PendingOutput::new(&source);
        pending.retarget(&output);
        drop(pending);

        assert!(source.exists());
        assert!(!output.exists());
    }
}
