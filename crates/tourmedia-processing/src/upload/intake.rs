use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use tourmedia_core::{AppError, ContentDomain, UploadMode, UploadedAsset};
use tourmedia_storage::{MediaStore, StorageError};

use super::types::UploadShape;
use crate::validator::{AcceptedPart, IntakeError, IntakeLimits, IntakeSession};

/// Collects the files of one multipart request.
///
/// Parts are validated by the [`IntakeSession`] before they are written; if
/// the request is rejected part-way, [`UploadIntake::abort`] removes whatever
/// was already stored for it. Dropping an intake that was neither finished
/// nor aborted (client disconnect, request deadline) removes its files too.
pub struct UploadIntake {
    session: IntakeSession,
    store: Arc<dyn MediaStore>,
    domain: ContentDomain,
    staged: Vec<UploadedAsset>,
}

impl UploadIntake {
    pub fn new(
        mode: UploadMode,
        limits: IntakeLimits,
        store: Arc<dyn MediaStore>,
        domain: ContentDomain,
    ) -> Self {
        Self {
            session: IntakeSession::new(mode, limits),
            store,
            domain,
            staged: Vec::new(),
        }
    }

    pub fn mode(&self) -> UploadMode {
        self.session.mode()
    }

    /// Field, count and type checks for a part about to be read.
    pub fn accept_part(
        &mut self,
        field_name: &str,
        mime_type: &str,
    ) -> Result<AcceptedPart, IntakeError> {
        self.session.begin_file(field_name, mime_type)
    }

    /// Write a fully buffered, accepted part to its domain directory.
    pub async fn store_part(
        &mut self,
        part: &AcceptedPart,
        original_name: &str,
        data: Bytes,
    ) -> Result<&UploadedAsset, AppError> {
        part.check_size(data.len() as u64)?;

        let size_bytes = data.len() as u64;
        let stored_path = self
            .store
            .store_new(
                part.field.kind,
                &self.domain,
                original_name,
                part.extension,
                data,
            )
            .await
            .map_err(|e| match e {
                StorageError::InvalidPath(msg) => AppError::BadRequest(msg),
                other => AppError::Storage(other.to_string()),
            })?;

        self.staged.push(UploadedAsset {
            mime_type: part.mime_type.clone(),
            original_name: original_name.to_string(),
            stored_path,
            size_bytes,
            field_name: part.field.name.to_string(),
            kind: part.field.kind,
            content_domain: self.domain.clone(),
        });

        Ok(&self.staged[self.staged.len() - 1])
    }

    pub fn staged(&self) -> &[UploadedAsset] {
        &self.staged
    }

    /// Remove every file already stored for this request.
    pub async fn abort(mut self) {
        let staged = std::mem::take(&mut self.staged);
        remove_staged(self.store.as_ref(), &staged).await;
        if !staged.is_empty() {
            tracing::debug!(
                removed = staged.len(),
                content_domain = %self.domain,
                "Rolled back rejected upload"
            );
        }
    }

    /// Hand the stored files over in the mode's shape.
    pub fn finish(mut self) -> Result<UploadShape, AppError> {
        let mode = self.session.mode();
        let mut staged = std::mem::take(&mut self.staged);

        if staged.is_empty() {
            let expected: Vec<&str> = mode.fields().iter().map(|f| f.name).collect();
            return Err(AppError::NoFile(format!(
                "No file uploaded. Expected field(s): {}",
                expected.join(", ")
            )));
        }

        Ok(match mode {
            _ if mode.is_single() => UploadShape::Single(staged.remove(0)),
            UploadMode::Mixed => {
                let mut map: BTreeMap<String, Vec<UploadedAsset>> = BTreeMap::new();
                for asset in staged {
                    map.entry(asset.field_name.clone()).or_default().push(asset);
                }
                UploadShape::FieldMap(map)
            }
            _ => UploadShape::Multiple(staged),
        })
    }
}

impl Drop for UploadIntake {
    fn drop(&mut self) {
        if self.staged.is_empty() {
            return;
        }

        let staged = std::mem::take(&mut self.staged);
        tracing::warn!(
            files = staged.len(),
            content_domain = %self.domain,
            "Upload interrupted, removing staged files"
        );

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store = self.store.clone();
                handle.spawn(async move {
                    remove_staged(store.as_ref(), &staged).await;
                });
            }
            Err(_) => {
                for asset in &staged {
                    if let Err(e) = std::fs::remove_file(&asset.stored_path) {
                        tracing::error!(
                            path = %asset.stored_path.display(),
                            error = %e,
                            "Failed to remove file from interrupted upload"
                        );
                    }
                }
            }
        }
    }
}

async fn remove_staged(store: &dyn MediaStore, staged: &[UploadedAsset]) {
    for asset in staged {
        match store.delete(&asset.stored_path).await {
            Ok(()) | Err(StorageError::NotFound(_)) => {}
            Err(e) => tracing::error!(
                path = %asset.stored_path.display(),
                error = %e,
                "Failed to remove staged upload file"
            ),
        }
    }
}
