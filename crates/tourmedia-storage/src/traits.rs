//! Storage abstraction trait
//!
//! The upload and deletion stages talk to the persisted layout only through
//! [`MediaStore`], so handlers and tests can share one implementation over a
//! configurable root.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tourmedia_core::{ContentDomain, MediaKind};

use crate::layout::UploadLayout;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found")]
    NotFound(PathBuf),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Directory layout this store writes into.
    fn layout(&self) -> &UploadLayout;

    /// Write a new file under `{kind}/{domain}/` and return its absolute path.
    ///
    /// Never overwrites: the generated name is opened create-new and bumped on
    /// collision.
    async fn store_new(
        &self,
        kind: MediaKind,
        domain: &ContentDomain,
        original_name: &str,
        extension: &str,
        data: Bytes,
    ) -> StorageResult<PathBuf>;

    /// Remove a stored file. A missing file is [`StorageError::NotFound`].
    async fn delete(&self, path: &Path) -> StorageResult<()>;
}
