//! Shared path and filename generation for the uploads tree.
//!
//! Directory format: `{root}/{images|videos}/{content_domain}/`. Filename
//! format: `{sanitized_base}-{timestamp_millis}.{ext}`.

use std::path::{Path, PathBuf};

use tourmedia_core::constants::PUBLIC_UPLOADS_PREFIX;
use tourmedia_core::{ContentDomain, MediaKind};

use crate::traits::{StorageError, StorageResult};

/// Root of the persisted upload tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLayout {
    root: PathBuf,
}

impl UploadLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/{kind}/{domain}`, without touching the filesystem.
    pub fn domain_dir(&self, kind: MediaKind, domain: &ContentDomain) -> PathBuf {
        self.root.join(kind.dir_name()).join(domain.as_str())
    }

    /// `{root}/{kind}`, the legacy flat directory.
    pub fn legacy_dir(&self, kind: MediaKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Resolve the destination directory, creating it if missing.
    ///
    /// Idempotent: an existing directory is not an error.
    pub async fn ensure_dir(
        &self,
        kind: MediaKind,
        domain: &ContentDomain,
    ) -> StorageResult<PathBuf> {
        let dir = self.domain_dir(kind, domain);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create upload directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(dir)
    }

    /// Whether `path` lies lexically inside this layout's root.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
            && !path
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
    }

    /// Relative path of a stored file as reported to clients
    /// (`uploads/images/posts/x.jpg` for the default root).
    pub fn display_path(&self, kind: MediaKind, domain: &ContentDomain, filename: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.root.display().to_string().trim_end_matches('/'),
            kind.dir_name(),
            domain,
            filename
        )
    }
}

/// Public URL of a stored file.
pub fn public_url(
    base_url: &str,
    kind: MediaKind,
    domain: &ContentDomain,
    filename: &str,
) -> String {
    format!(
        "{}{}/{}/{}/{}",
        base_url.trim_end_matches('/'),
        PUBLIC_UPLOADS_PREFIX,
        kind.dir_name(),
        domain,
        urlencoding::encode(filename)
    )
}

/// Replace every character outside `[A-Za-z0-9.-]` with `-`, collapse
/// repeated dashes and trim them from both ends.
pub fn sanitize_base_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            c
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Build a stored filename from the client's original name.
///
/// Only the base name (last path component, extension removed) of
/// `original_name` is kept.
pub fn generate_filename(original_name: &str, timestamp_millis: i64, extension: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    let stem = Path::new(base)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "{}-{}.{}",
        sanitize_base_name(&stem),
        timestamp_millis,
        extension
    )
}
