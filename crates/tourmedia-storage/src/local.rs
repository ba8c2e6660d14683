use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tourmedia_core::{ContentDomain, MediaKind};

use crate::layout::{generate_filename, UploadLayout};
use crate::traits::{MediaStore, StorageError, StorageResult};

/// Attempts at finding a free filename before giving up.
const MAX_NAME_ATTEMPTS: i64 = 32;

/// Local filesystem storage implementation
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    layout: UploadLayout,
}

impl LocalMediaStore {
    /// Create a store rooted at `root`, creating the root if it is missing.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create uploads root {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalMediaStore {
            layout: UploadLayout::new(root),
        })
    }

    fn check_path(&self, path: &Path) -> StorageResult<()> {
        if !self.layout.contains(path) {
            return Err(StorageError::InvalidPath(format!(
                "{} is outside the uploads root",
                path.display()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    fn layout(&self) -> &UploadLayout {
        &self.layout
    }

    async fn store_new(
        &self,
        kind: MediaKind,
        domain: &ContentDomain,
        original_name: &str,
        extension: &str,
        data: Bytes,
    ) -> StorageResult<PathBuf> {
        let dir = self.layout.ensure_dir(kind, domain).await?;
        let start = std::time::Instant::now();
        let base_millis = chrono::Utc::now().timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let filename = generate_filename(original_name, base_millis + attempt, extension);
            let path = dir.join(&filename);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(StorageError::UploadFailed(format!(
                        "Failed to create file {}: {}",
                        path.display(),
                        e
                    )))
                }
            };

            let written = async {
                file.write_all(&data).await?;
                file.sync_all().await
            }
            .await;

            if let Err(e) = written {
                let _ = fs::remove_file(&path).await;
                return Err(StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                )));
            }

            tracing::info!(
                path = %path.display(),
                content_domain = %domain,
                media_kind = %kind,
                size_bytes = data.len(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Stored upload"
            );

            return Ok(path);
        }

        Err(StorageError::UploadFailed(format!(
            "No free filename for {} after {} attempts",
            original_name, MAX_NAME_ATTEMPTS
        )))
    }

    async fn delete(&self, path: &Path) -> StorageResult<()> {
        self.check_path(path)?;

        if !fs::try_exists(path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }

        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Deleted stored file");
                Ok(())
            }
            // Removed concurrently between the check and the unlink.
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_path_buf()))
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
