//! Tourmedia Core Library
//!
//! Domain models, error types, allowlists and configuration shared by the
//! media asset pipeline crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, MediaPipelineConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    BatchDeletionReport, CompressionFailureKind, CompressionResult, ContentDomain,
    ContentDomainError, DeletionOutcome, FieldSpec, MediaKind, UploadErrorCode, UploadMode,
    UploadedAsset,
};
