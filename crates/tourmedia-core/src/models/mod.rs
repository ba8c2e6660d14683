pub mod compression;
pub mod deletion;
pub mod media;
pub mod upload;

pub use compression::{CompressionFailureKind, CompressionResult};
pub use deletion::{BatchDeletionReport, DeletionOutcome};
pub use media::{ContentDomain, ContentDomainError, MediaKind};
pub use upload::{FieldSpec, UploadErrorCode, UploadMode, UploadedAsset};
