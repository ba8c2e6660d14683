use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::{
    IMAGES_DIR, IMAGE_EXTENSIONS, IMAGE_MIME_EXTENSIONS, VIDEOS_DIR, VIDEO_EXTENSIONS,
    VIDEO_MIME_EXTENSIONS,
};

/// Media kind, derived from the MIME major type.
///
/// Selects both the storage subtree and the compression branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Derive the kind from a MIME type's major part (`image/*`, `video/*`).
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let major = mime_type.split('/').next()?.trim().to_lowercase();
        match major.as_str() {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }

    /// Derive the kind from a file extension using the intake allowlist.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.trim_start_matches('.').to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Derive the kind from a bare filename's extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Directory name of this kind's subtree under the uploads root.
    pub fn dir_name(self) -> &'static str {
        match self {
            MediaKind::Image => IMAGES_DIR,
            MediaKind::Video => VIDEOS_DIR,
        }
    }

    fn mime_table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            MediaKind::Image => IMAGE_MIME_EXTENSIONS,
            MediaKind::Video => VIDEO_MIME_EXTENSIONS,
        }
    }

    /// MIME types this kind accepts at intake.
    pub fn allowed_mime_types(self) -> Vec<&'static str> {
        self.mime_table().iter().map(|(mime, _)| *mime).collect()
    }

    /// Stored extension for a MIME type, restricted to this kind's allowlist.
    pub fn extension_for(self, mime_type: &str) -> Option<&'static str> {
        let normalized = mime_type.trim().to_lowercase();
        self.mime_table()
            .iter()
            .find(|(mime, _)| *mime == normalized)
            .map(|(_, ext)| *ext)
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentDomainError {
    #[error("Content domain must not be empty")]
    Empty,

    #[error("Content domain too long: {0} characters (max 64)")]
    TooLong(usize),

    #[error("Content domain contains invalid characters: {0}")]
    InvalidCharacters(String),
}

/// Namespace partitioning upload storage by owning entity type
/// (`posts`, `users`, `explore`, `restaurants`, ...).
///
/// Only `[A-Za-z0-9_-]` is accepted so a domain is always a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "posts")]
pub struct ContentDomain(String);

impl ContentDomain {
    const MAX_LEN: usize = 64;

    pub fn parse(value: &str) -> Result<Self, ContentDomainError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ContentDomainError::Empty);
        }
        if value.len() > Self::MAX_LEN {
            return Err(ContentDomainError::TooLong(value.len()));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ContentDomainError::InvalidCharacters(value.to_string()));
        }
        Ok(ContentDomain(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContentDomain {
    type Err = ContentDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentDomain {
    type Error = ContentDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentDomain> for String {
    fn from(domain: ContentDomain) -> Self {
        domain.0
    }
}

impl AsRef<str> for ContentDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ContentDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
