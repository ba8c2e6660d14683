use std::collections::HashMap;

use tourmedia_core::{AppError, FieldSpec, MediaKind, UploadErrorCode, UploadMode};

/// Intake rejections. Raised before the offending part reaches disk.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("File too large. Maximum size for {kind}s is {max_mb} MB")]
    FileTooLarge { kind: MediaKind, max_mb: u64 },

    #[error("Too many files for field '{field}' (max {max})")]
    TooManyFiles { field: String, max: usize },

    #[error("Unexpected field '{field}' for {mode} upload")]
    UnexpectedField { field: String, mode: UploadMode },

    #[error("Invalid file type: {mime_type}. Allowed types: {allowed}")]
    InvalidFileType { mime_type: String, allowed: String },
}

impl IntakeError {
    pub fn code(&self) -> UploadErrorCode {
        match self {
            IntakeError::FileTooLarge { .. } => UploadErrorCode::LimitFileSize,
            IntakeError::TooManyFiles { .. } => UploadErrorCode::LimitFileCount,
            IntakeError::UnexpectedField { .. } => UploadErrorCode::LimitUnexpectedFile,
            IntakeError::InvalidFileType { .. } => UploadErrorCode::InvalidFileType,
        }
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        AppError::upload(err.code(), err.to_string())
    }
}

/// Per-kind size limits, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeLimits {
    pub max_image_size_bytes: u64,
    pub max_video_size_bytes: u64,
}

impl IntakeLimits {
    pub fn max_size(&self, kind: MediaKind) -> u64 {
        match kind {
            MediaKind::Image => self.max_image_size_bytes,
            MediaKind::Video => self.max_video_size_bytes,
        }
    }

    /// Largest body a request in `mode` can legitimately carry.
    pub fn max_body_bytes(&self, mode: UploadMode) -> u64 {
        mode.fields()
            .iter()
            .map(|f| self.max_size(f.kind).saturating_mul(f.max_count as u64))
            .fold(0, u64::saturating_add)
    }
}

/// A file part that passed the field, count and type checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedPart {
    pub field: FieldSpec,
    pub mime_type: String,
    pub extension: &'static str,
    pub max_bytes: u64,
}

impl AcceptedPart {
    /// Size check, applied while the part is still being buffered.
    pub fn check_size(&self, size: u64) -> Result<(), IntakeError> {
        if size > self.max_bytes {
            return Err(IntakeError::FileTooLarge {
                kind: self.field.kind,
                max_mb: self.max_bytes / (1024 * 1024),
            });
        }
        Ok(())
    }
}

/// Stateful gate for one multipart request.
///
/// Each file part is announced with [`IntakeSession::begin_file`] before any
/// of its bytes are stored; the session tracks per-field counts across the
/// whole request.
#[derive(Debug)]
pub struct IntakeSession {
    mode: UploadMode,
    limits: IntakeLimits,
    counts: HashMap<&'static str, usize>,
}

impl IntakeSession {
    pub fn new(mode: UploadMode, limits: IntakeLimits) -> Self {
        Self {
            mode,
            limits,
            counts: HashMap::new(),
        }
    }

    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    pub fn begin_file(
        &mut self,
        field_name: &str,
        mime_type: &str,
    ) -> Result<AcceptedPart, IntakeError> {
        let field = self
            .mode
            .field(field_name)
            .ok_or_else(|| IntakeError::UnexpectedField {
                field: field_name.to_string(),
                mode: self.mode,
            })?;

        let count = self.counts.entry(field.name).or_insert(0);
        if *count >= field.max_count {
            return Err(IntakeError::TooManyFiles {
                field: field.name.to_string(),
                max: field.max_count,
            });
        }

        let mime_type = mime_type.trim().to_lowercase();
        // The declared field fixes the kind; the MIME major type must agree.
        let extension = MediaKind::from_mime(&mime_type)
            .filter(|kind| *kind == field.kind)
            .and_then(|kind| kind.extension_for(&mime_type))
            .ok_or_else(|| IntakeError::InvalidFileType {
                mime_type: mime_type.clone(),
                allowed: field.kind.allowed_mime_types().join(", "),
            })?;

        *count += 1;

        Ok(AcceptedPart {
            field,
            mime_type,
            extension,
            max_bytes: self.limits.max_size(field.kind),
        })
    }

    pub fn accepted_count(&self) -> usize {
        self.counts.values().sum()
    }
}
