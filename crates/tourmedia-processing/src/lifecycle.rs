//! Compensating deletes around entity writes.
//!
//! Filesystem writes and the caller's database commit are not transactional.
//! These helpers implement the write → persist → compensate saga: new files
//! are removed when persisting fails, and replaced files are removed only
//! after persisting succeeds. Both are eventual; failures are logged for
//! manual reconciliation and never escalated.

use std::future::Future;

use tourmedia_core::{BatchDeletionReport, ContentDomain};

use crate::batch::BatchExecutor;

#[derive(Clone)]
pub struct MediaLifecycle {
    executor: BatchExecutor,
}

impl MediaLifecycle {
    pub fn new(executor: BatchExecutor) -> Self {
        Self { executor }
    }

    /// Best-effort removal of files whose owning write did not commit.
    pub async fn compensate(
        &self,
        filenames: &[String],
        content_domain: &ContentDomain,
    ) -> BatchDeletionReport {
        let report = self.executor.delete_all(filenames, Some(content_domain)).await;
        self.log_leftovers(&report, content_domain, "compensating delete");
        report
    }

    /// Persist newly uploaded files, compensating them if persisting fails.
    pub async fn persist_new<T, E, F, Fut>(
        &self,
        new_files: &[String],
        content_domain: &ContentDomain,
        persist: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match persist().await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.compensate(new_files, content_domain).await;
                Err(e)
            }
        }
    }

    /// Swap `old_files` for `new_files`.
    ///
    /// `persist` runs first; the old files are deleted only once it has
    /// succeeded. On failure the new files are compensated and the old ones
    /// are left untouched.
    pub async fn replace<T, E, F, Fut>(
        &self,
        old_files: &[String],
        new_files: &[String],
        content_domain: &ContentDomain,
        persist: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let value = self.persist_new(new_files, content_domain, persist).await?;

        // Old references may be shared with the new list when only some changed.
        let stale: Vec<String> = old_files
            .iter()
            .filter(|f| !new_files.contains(f))
            .cloned()
            .collect();

        if !stale.is_empty() {
            let report = self.executor.delete_all(&stale, Some(content_domain)).await;
            self.log_leftovers(&report, content_domain, "replaced media cleanup");
        }

        Ok(value)
    }

    fn log_leftovers(&self, report: &BatchDeletionReport, domain: &ContentDomain, step: &str) {
        if report.failed_count == 0 {
            return;
        }
        let leftovers: Vec<&str> = report
            .results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.identifier.as_str())
            .collect();
        tracing::error!(
            step = step,
            content_domain = %domain,
            failed = report.failed_count,
            files = ?leftovers,
            "Media reconciliation needed"
        );
    }
}
