//! Multi-item operations that never abort on a single item's failure.

use std::sync::Arc;

use tourmedia_core::{
    BatchDeletionReport, CompressionResult, ContentDomain, DeletionOutcome, UploadedAsset,
};
use tourmedia_storage::{DeletionResolver, MediaStore, StorageError};

use crate::output::PendingOutput;
use crate::traits::CompressorSet;

/// Compress each asset independently, in order.
///
/// Until the whole batch is done every file of it is held as pending, so a
/// batch dropped part-way (request deadline, client disconnect) removes the
/// upload's files instead of orphaning them.
pub async fn compress_all(
    compressors: &CompressorSet,
    assets: Vec<UploadedAsset>,
) -> Vec<(UploadedAsset, CompressionResult)> {
    let mut pending: Vec<PendingOutput> = assets
        .iter()
        .map(|asset| PendingOutput::new(&asset.stored_path))
        .collect();

    let mut results = Vec::with_capacity(assets.len());
    for (mut asset, guard) in assets.into_iter().zip(pending.iter_mut()) {
        let result = compressors.for_kind(asset.kind).compress(&mut asset).await;
        guard.retarget(&asset.stored_path);
        results.push((asset, result));
    }

    pending.into_iter().for_each(PendingOutput::keep);
    results
}

/// Deletes stored files by identifier.
#[derive(Clone)]
pub struct BatchExecutor {
    store: Arc<dyn MediaStore>,
    resolver: DeletionResolver,
}

impl BatchExecutor {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        let resolver = DeletionResolver::new(store.layout().clone());
        Self { store, resolver }
    }

    /// Resolve and delete one identifier; every failure becomes an outcome.
    pub async fn delete_one(
        &self,
        identifier: &str,
        content_domain: Option<&ContentDomain>,
    ) -> DeletionOutcome {
        let path = match self.resolver.resolve(identifier, content_domain).await {
            Ok(path) => path,
            Err(e) => return DeletionOutcome::failed(identifier, e.to_string()),
        };

        match self.store.delete(&path).await {
            Ok(()) => DeletionOutcome::deleted(identifier),
            Err(StorageError::NotFound(_)) => DeletionOutcome::failed(identifier, "File not found"),
            Err(e) => {
                tracing::warn!(
                    identifier = %identifier,
                    path = %path.display(),
                    error = %e,
                    "Failed to delete file"
                );
                DeletionOutcome::failed(identifier, e.to_string())
            }
        }
    }

    /// Delete every identifier, continuing past individual failures.
    pub async fn delete_all<S: AsRef<str>>(
        &self,
        identifiers: &[S],
        content_domain: Option<&ContentDomain>,
    ) -> BatchDeletionReport {
        let mut outcomes = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            outcomes.push(self.delete_one(identifier.as_ref(), content_domain).await);
        }

        let report = BatchDeletionReport::from_outcomes(outcomes);
        tracing::info!(
            total = report.total_files,
            deleted = report.deleted_count,
            failed = report.failed_count,
            content_domain = content_domain.map(|d| d.as_str()).unwrap_or("-"),
            "Batch delete finished"
        );
        report
    }
}
