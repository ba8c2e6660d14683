//! Identifier-to-path resolution for deletion.
//!
//! Accepts whatever a caller has on hand for a stored file (a public URL, a
//! relative path, or the bare filename persisted in an entity record) and maps
//! it to exactly one path under the uploads root.

use std::path::PathBuf;

use thiserror::Error;
use tourmedia_core::{ContentDomain, MediaKind};

use crate::layout::UploadLayout;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Identifier is empty")]
    EmptyIdentifier,

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Path segments recovered from an identifier.
#[derive(Debug, PartialEq, Eq)]
struct ParsedIdentifier {
    /// Segments after the `public`/`uploads` anchor, when one was found.
    anchored: Option<Vec<String>>,
    filename: String,
}

#[derive(Debug, Clone)]
pub struct DeletionResolver {
    layout: UploadLayout,
}

impl DeletionResolver {
    pub fn new(layout: UploadLayout) -> Self {
        Self { layout }
    }

    /// Map `identifier` to the single file it refers to.
    ///
    /// Search order: an anchored `{kind}/{domain}/{file}` or `{kind}/{file}`
    /// that exists, then `{kind}/{domain}/{file}` for the supplied (or
    /// anchored) domain, then the legacy flat `{kind}/{file}`. The returned
    /// path is not guaranteed to exist; deletion checks that separately.
    pub async fn resolve(
        &self,
        identifier: &str,
        content_domain: Option<&ContentDomain>,
    ) -> Result<PathBuf, ResolveError> {
        let parsed = parse_identifier(identifier)?;

        let kind = MediaKind::from_filename(&parsed.filename)
            .ok_or_else(|| ResolveError::UnsupportedFileType(parsed.filename.clone()))?;

        let mut anchored_domain = None;
        if let Some(segments) = &parsed.anchored {
            if let Some((candidate, domain)) = self.anchored_candidate(segments, kind) {
                if path_exists(&candidate).await {
                    return Ok(candidate);
                }
                anchored_domain = domain;
            }
        }

        if let Some(domain) = content_domain.or(anchored_domain.as_ref()) {
            let candidate = self.layout.domain_dir(kind, domain).join(&parsed.filename);
            if path_exists(&candidate).await {
                return Ok(candidate);
            }
            tracing::debug!(
                identifier = %identifier,
                content_domain = %domain,
                "Not found under content domain, trying legacy layout"
            );
        }

        Ok(self.layout.legacy_dir(kind).join(&parsed.filename))
    }

    /// Path named directly by anchored segments, if they follow the layout.
    fn anchored_candidate(
        &self,
        segments: &[String],
        kind: MediaKind,
    ) -> Option<(PathBuf, Option<ContentDomain>)> {
        match segments {
            [dir, domain, file] if dir == kind.dir_name() => {
                let domain = ContentDomain::parse(domain).ok()?;
                Some((self.layout.domain_dir(kind, &domain).join(file), Some(domain)))
            }
            [dir, file] if dir == kind.dir_name() => {
                Some((self.layout.legacy_dir(kind).join(file), None))
            }
            _ => None,
        }
    }
}

async fn path_exists(path: &std::path::Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn parse_identifier(identifier: &str) -> Result<ParsedIdentifier, ResolveError> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(ResolveError::EmptyIdentifier);
    }

    let is_url = identifier.contains("://");
    if !is_url && !identifier.contains(['/', '\\']) {
        check_filename(identifier, identifier)?;
        return Ok(ParsedIdentifier {
            anchored: None,
            filename: identifier.to_string(),
        });
    }

    let path_part = if is_url {
        let without_query = identifier
            .split(['?', '#'])
            .next()
            .unwrap_or(identifier);
        // Drop `scheme://host`.
        without_query
            .split_once("://")
            .and_then(|(_, rest)| rest.split_once('/'))
            .map(|(_, path)| path)
            .unwrap_or("")
    } else {
        identifier
    };

    let segments: Vec<String> = path_part
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .map(|s| {
            urlencoding::decode(s)
                .map(|c| c.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
        .collect();

    if segments.iter().any(|s| s == ".." || s.contains(['/', '\\'])) {
        return Err(ResolveError::InvalidIdentifier(identifier.to_string()));
    }

    let filename = segments
        .last()
        .cloned()
        .ok_or_else(|| ResolveError::InvalidIdentifier(identifier.to_string()))?;
    check_filename(&filename, identifier)?;

    let anchored = if let Some(pos) = segments.iter().position(|s| s == "public") {
        let rest = &segments[pos + 1..];
        Some(match rest.first() {
            Some(first) if first == "uploads" => rest[1..].to_vec(),
            _ => rest.to_vec(),
        })
    } else {
        segments
            .iter()
            .position(|s| s == "uploads")
            .map(|pos| segments[pos + 1..].to_vec())
    };

    Ok(ParsedIdentifier { anchored, filename })
}

fn check_filename(filename: &str, identifier: &str) -> Result<(), ResolveError> {
    if filename == "." || filename == ".." {
        return Err(ResolveError::InvalidIdentifier(identifier.to_string()));
    }
    Ok(())
}
