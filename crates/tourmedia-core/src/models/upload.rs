use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::media::{ContentDomain, MediaKind};
use crate::constants::{
    MAX_IMAGES_PER_REQUEST, MAX_VIDEOS_PER_REQUEST, MIXED_MAX_IMAGES, MIXED_MAX_VIDEOS,
};

/// A multipart field the caller declared for an upload mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: MediaKind,
    pub max_count: usize,
}

const SINGLE_IMAGE_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "image",
    kind: MediaKind::Image,
    max_count: 1,
}];

const SINGLE_VIDEO_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "video",
    kind: MediaKind::Video,
    max_count: 1,
}];

const MULTI_IMAGE_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "images",
    kind: MediaKind::Image,
    max_count: MAX_IMAGES_PER_REQUEST,
}];

const MULTI_VIDEO_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "videos",
    kind: MediaKind::Video,
    max_count: MAX_VIDEOS_PER_REQUEST,
}];

const MIXED_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "images",
        kind: MediaKind::Image,
        max_count: MIXED_MAX_IMAGES,
    },
    FieldSpec {
        name: "videos",
        kind: MediaKind::Video,
        max_count: MIXED_MAX_VIDEOS,
    },
    FieldSpec {
        name: "image",
        kind: MediaKind::Image,
        max_count: 1,
    },
    FieldSpec {
        name: "video",
        kind: MediaKind::Video,
        max_count: 1,
    },
];

/// Declared shape of an upload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum UploadMode {
    SingleImage,
    SingleVideo,
    MultiImage,
    MultiVideo,
    Mixed,
}

impl UploadMode {
    pub const ALL: [UploadMode; 5] = [
        UploadMode::SingleImage,
        UploadMode::SingleVideo,
        UploadMode::MultiImage,
        UploadMode::MultiVideo,
        UploadMode::Mixed,
    ];

    /// Fields accepted in this mode, with their kind and per-field cardinality.
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            UploadMode::SingleImage => SINGLE_IMAGE_FIELDS,
            UploadMode::SingleVideo => SINGLE_VIDEO_FIELDS,
            UploadMode::MultiImage => MULTI_IMAGE_FIELDS,
            UploadMode::MultiVideo => MULTI_VIDEO_FIELDS,
            UploadMode::Mixed => MIXED_FIELDS,
        }
    }

    pub fn field(self, name: &str) -> Option<FieldSpec> {
        self.fields().iter().copied().find(|f| f.name == name)
    }

    /// Total number of files a request in this mode may carry.
    pub fn max_files(self) -> usize {
        self.fields().iter().map(|f| f.max_count).sum()
    }

    /// Single-file modes hand back one file rather than a list.
    pub fn is_single(self) -> bool {
        matches!(self, UploadMode::SingleImage | UploadMode::SingleVideo)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UploadMode::SingleImage => "single-image",
            UploadMode::SingleVideo => "single-video",
            UploadMode::MultiImage => "multi-image",
            UploadMode::MultiVideo => "multi-video",
            UploadMode::Mixed => "mixed",
        }
    }
}

impl FromStr for UploadMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single-image" => Ok(UploadMode::SingleImage),
            "single-video" => Ok(UploadMode::SingleVideo),
            "multi-image" => Ok(UploadMode::MultiImage),
            "multi-video" => Ok(UploadMode::MultiVideo),
            "mixed" => Ok(UploadMode::Mixed),
            _ => Err(anyhow::anyhow!("Invalid upload mode: {}", s)),
        }
    }
}

impl Display for UploadMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Machine-readable rejection codes produced by the intake gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadErrorCode {
    LimitFileSize,
    LimitFileCount,
    LimitUnexpectedFile,
    InvalidFileType,
}

impl UploadErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadErrorCode::LimitFileSize => "LIMIT_FILE_SIZE",
            UploadErrorCode::LimitFileCount => "LIMIT_FILE_COUNT",
            UploadErrorCode::LimitUnexpectedFile => "LIMIT_UNEXPECTED_FILE",
            UploadErrorCode::InvalidFileType => "INVALID_FILE_TYPE",
        }
    }

    /// Shared code-to-status mapping: limits are 413, everything else 400.
    pub fn http_status_code(self) -> u16 {
        match self {
            UploadErrorCode::LimitFileSize | UploadErrorCode::LimitFileCount => 413,
            UploadErrorCode::LimitUnexpectedFile | UploadErrorCode::InvalidFileType => 400,
        }
    }
}

impl Display for UploadErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// In-flight descriptor of a received file.
///
/// Created by the intake gate once the bytes are on disk; the compressor and
/// finalizer rewrite `stored_path`, `size_bytes` and `mime_type` in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub mime_type: String,
    pub original_name: String,
    pub stored_path: PathBuf,
    pub size_bytes: u64,
    pub field_name: String,
    pub kind: MediaKind,
    pub content_domain: ContentDomain,
}

impl UploadedAsset {
    /// Bare filename of the stored file (the only value callers persist).
    pub fn stored_filename(&self) -> String {
        self.stored_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
