use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Why a compression attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum CompressionFailureKind {
    /// The encoder invocation could not be started.
    SetupError,
    /// The external encoder ran and reported failure.
    FfmpegError,
    /// Decoding, encoding or filesystem work inside this process failed.
    ProcessingError,
}

/// Outcome of one compression attempt.
///
/// Always produced, including on degrade paths; failures are carried in
/// `success`/`error` rather than raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompressionResult {
    pub success: bool,
    pub original_size: u64,
    pub compressed_size: u64,
    /// Percentage saved, formatted with two decimals (`"37.52%"`).
    pub compression_ratio: String,
    pub processing_time_ms: u64,
    pub output_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<CompressionFailureKind>,
}

impl CompressionResult {
    pub fn succeeded(
        original_size: u64,
        compressed_size: u64,
        processing_time_ms: u64,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            original_size,
            compressed_size,
            compression_ratio: format_ratio(original_size, compressed_size),
            processing_time_ms,
            output_path: output_path.into(),
            warning: None,
            error: None,
            error_kind: None,
        }
    }

    /// Successful copy-through: bytes preserved verbatim, with a warning.
    pub fn passed_through(
        size: u64,
        processing_time_ms: u64,
        output_path: impl Into<String>,
        warning: impl Into<String>,
    ) -> Self {
        Self {
            warning: Some(warning.into()),
            ..Self::succeeded(size, size, processing_time_ms, output_path)
        }
    }

    /// Failed attempt; `source_path` is left untouched and reported as the output.
    pub fn failed(
        original_size: u64,
        processing_time_ms: u64,
        source_path: impl Into<String>,
        kind: CompressionFailureKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            original_size,
            compressed_size: original_size,
            compression_ratio: format_ratio(original_size, original_size),
            processing_time_ms,
            output_path: source_path.into(),
            warning: None,
            error: Some(error.into()),
            error_kind: Some(kind),
        }
    }
}

/// Percentage of bytes saved, e.g. `1000 -> 250` gives `"75.00%"`.
pub fn format_ratio(original_size: u64, compressed_size: u64) -> String {
    if original_size == 0 {
        return "0.00%".to_string();
    }
    let saved = 1.0 - (compressed_size as f64 / original_size as f64);
    format!("{:.2}%", saved * 100.0)
}
